// Copyright 2025 The Wharf Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The local `wharf/` directory holding the workspace summary and manifests.
//!
//! ```text
//! wharf/
//!   .workspace                      # application: <app>
//!   <workload>/manifest.yml
//!   environments/<env>/manifest.yml
//! ```

use crate::domain::manifest::workload_type_from_manifest;
use crate::domain::model::WorkloadCategory;
use crate::domain::ports::{WorkspaceReader, WorkspaceWriter};
use crate::shared::error::{Result, ResultExt, WharfError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const WORKSPACE_DIR: &str = "wharf";
pub const SUMMARY_FILE: &str = ".workspace";
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const MANIFEST_FILE: &str = "manifest.yml";

/// How many parent directories are searched for a `wharf/` directory.
const MAX_DISCOVERY_DEPTH: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
struct Summary {
    application: String,
}

pub struct FsWorkspace {
    /// Directory that contains `wharf/`, once found.
    root: Option<PathBuf>,
    start: PathBuf,
}

impl FsWorkspace {
    /// Searches `start` and its parents for a `wharf/` directory.
    pub fn discover(start: impl Into<PathBuf>) -> Self {
        let start = start.into();
        let mut dir = Some(start.as_path());
        let mut root = None;
        for _ in 0..=MAX_DISCOVERY_DEPTH {
            let Some(current) = dir else { break };
            if current.join(WORKSPACE_DIR).is_dir() {
                root = Some(current.to_path_buf());
                break;
            }
            dir = current.parent();
        }
        debug!(start = %start.display(), root = ?root, "workspace discovery");
        Self { root, start }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn workspace_dir(&self) -> Result<PathBuf> {
        self.root
            .as_ref()
            .map(|r| r.join(WORKSPACE_DIR))
            .ok_or(WharfError::NoWorkspace)
    }

    fn workload_manifest_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.workspace_dir()?.join(name).join(MANIFEST_FILE))
    }

    fn environment_manifest_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self
            .workspace_dir()?
            .join(ENVIRONMENTS_DIR)
            .join(name)
            .join(MANIFEST_FILE))
    }

    /// Names of sub-directories of `dir` holding a manifest, sorted.
    fn manifest_dirs(dir: &Path, skip: &[&str]) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if skip.contains(&name.as_str()) || !entry.path().join(MANIFEST_FILE).is_file() {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    fn workloads_in(&self, category: WorkloadCategory) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for name in self.list_workloads()? {
            let raw = self.read_workload_manifest(&name)?;
            match workload_type_from_manifest(&name, &raw) {
                Ok(t) if t.category() == category => out.push(name),
                Ok(_) => {}
                Err(e) => warn!(workload = %name, error = %e, "skipping unreadable manifest"),
            }
        }
        Ok(out)
    }
}

impl WorkspaceReader for FsWorkspace {
    fn app_name(&self) -> Result<String> {
        let path = self.workspace_dir()?.join(SUMMARY_FILE);
        if !path.is_file() {
            return Err(WharfError::NoWorkspace);
        }
        let summary: Summary = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
        Ok(summary.application)
    }

    fn list_environments(&self) -> Result<Vec<String>> {
        Self::manifest_dirs(&self.workspace_dir()?.join(ENVIRONMENTS_DIR), &[])
    }

    fn list_workloads(&self) -> Result<Vec<String>> {
        Self::manifest_dirs(&self.workspace_dir()?, &[ENVIRONMENTS_DIR])
    }

    fn list_services(&self) -> Result<Vec<String>> {
        self.workloads_in(WorkloadCategory::Service)
    }

    fn list_jobs(&self) -> Result<Vec<String>> {
        self.workloads_in(WorkloadCategory::Job)
    }

    fn read_workload_manifest(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.workload_manifest_path(name)?;
        fs::read(&path).with_context_msg(|| format!("read {}", path.display()))
    }

    fn read_environment_manifest(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.environment_manifest_path(name)?;
        fs::read(&path).with_context_msg(|| format!("read {}", path.display()))
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let root = self.root.as_ref().ok_or(WharfError::NoWorkspace)?;
        let full = root.join(path);
        fs::read(&full).with_context_msg(|| format!("read {}", full.display()))
    }
}

impl WorkspaceWriter for FsWorkspace {
    fn create_summary(&self, app: &str) -> Result<PathBuf> {
        let dir = self
            .root
            .as_ref()
            .unwrap_or(&self.start)
            .join(WORKSPACE_DIR);
        let path = dir.join(SUMMARY_FILE);

        if path.is_file() {
            let existing: Summary = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
            if existing.application != app {
                return Err(WharfError::validation(format!(
                    "workspace is already registered with application {}",
                    existing.application
                )));
            }
            return Ok(path);
        }

        fs::create_dir_all(&dir)?;
        let summary = serde_yaml::to_string(&Summary {
            application: app.to_string(),
        })?;
        fs::write(&path, summary)?;
        Ok(path)
    }

    fn write_environment_manifest(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.environment_manifest_path(name)?;
        if path.is_file() {
            debug!(path = %path.display(), "environment manifest already exists");
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}
