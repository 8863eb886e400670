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

use crate::shared::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "WHARF_CONFIG";
pub const DEFAULT_STORE_NAMESPACE: &str = "wharf-system";
pub const DEFAULT_ROLLOUT_TIMEOUT_SECS: u64 = 300;

/// User-level settings, read from `~/.wharf/config.toml` unless overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the kubeconfig; `None` uses the default resolution.
    pub kubeconfig: Option<String>,
    /// Kubeconfig context; `None` uses the current context.
    pub context: Option<String>,
    /// Namespace holding application, environment and workload records.
    pub store_namespace: String,
    pub rollout_timeout_secs: u64,
    /// Application used when there is no workspace and `--app` is not given.
    pub default_app: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            store_namespace: DEFAULT_STORE_NAMESPACE.to_string(),
            rollout_timeout_secs: DEFAULT_ROLLOUT_TIMEOUT_SECS,
            default_app: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path)
            .with_context_msg(|| format!("read config file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context_msg(|| format!("parse config file {}", path.display()))?;
        Ok(settings)
    }

    /// Resolve the settings file from an explicit path (`--config` or
    /// `$WHARF_CONFIG`) or the home directory. Only an explicit path is
    /// required to exist.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wharf").join("config.toml"))
}
