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

//! Workload and environment manifests read from the workspace.
//!
//! A workload manifest is decoded in two passes: first only its `type` field
//! is read to pick the workload kind, then the whole document is decoded into
//! the typed body for that kind.

use crate::domain::model::WorkloadType;
use crate::shared::error::{Result, ResultExt, WharfError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ENVIRONMENT_MANIFEST_TYPE: &str = "Environment";

#[derive(Debug, Deserialize)]
struct TypeProbe {
    #[serde(rename = "type")]
    workload_type: Option<String>,
}

/// Reads the declared workload type of a raw manifest.
pub fn workload_type_from_manifest(name: &str, raw: &[u8]) -> Result<WorkloadType> {
    let probe: TypeProbe = serde_yaml::from_slice(raw)
        .with_context_msg(|| format!("unmarshal manifest for workload {}", name))?;
    let declared = probe.workload_type.ok_or_else(|| {
        WharfError::validation(format!("manifest for workload {} has no type", name))
    })?;
    declared.parse::<WorkloadType>().map_err(|_| {
        WharfError::validation(format!(
            "unrecognized workload type {:?} in manifest for workload {}",
            declared, name
        ))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub location: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidecarConfig {
    pub image: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
}

/// Per-environment overrides under the `environments` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentOverride {
    pub image: Option<ImageConfig>,
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
    pub count: Option<u32>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
}

/// Fields shared by every workload kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadProps {
    pub name: String,
    #[serde(default)]
    pub image: ImageConfig,
    /// CPU in millicores.
    pub cpu: Option<u32>,
    /// Memory in MiB.
    pub memory: Option<u32>,
    pub count: Option<u32>,
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Environment variable name to `secret-name/key`.
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    pub env_file: Option<String>,
    #[serde(default)]
    pub sidecars: BTreeMap<String, SidecarConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, EnvironmentOverride>,
}

impl WorkloadProps {
    fn apply_override(&mut self, ov: &EnvironmentOverride) {
        if let Some(image) = &ov.image {
            if image.location.is_some() {
                self.image.location = image.location.clone();
            }
            if image.port.is_some() {
                self.image.port = image.port;
            }
        }
        if ov.cpu.is_some() {
            self.cpu = ov.cpu;
        }
        if ov.memory.is_some() {
            self.memory = ov.memory;
        }
        if ov.count.is_some() {
            self.count = ov.count;
        }
        self.variables
            .extend(ov.variables.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.secrets
            .extend(ov.secrets.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn image_location(&self) -> Result<&str> {
        self.image.location.as_deref().ok_or_else(|| {
            WharfError::validation(format!(
                "manifest for workload {} must set image.location",
                self.name
            ))
        })
    }

    pub fn desired_count(&self) -> u32 {
        self.count.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_path")]
    pub path: String,
    pub healthcheck: Option<String>,
}

fn default_http_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancedWebServiceManifest {
    #[serde(flatten)]
    pub props: WorkloadProps,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendServiceManifest {
    #[serde(flatten)]
    pub props: WorkloadProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerServiceManifest {
    #[serde(flatten)]
    pub props: WorkloadProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJobManifest {
    #[serde(flatten)]
    pub props: WorkloadProps,
    pub schedule: String,
    /// Seconds before a run is terminated.
    pub timeout: Option<u32>,
    pub retries: Option<u32>,
}

/// A workload manifest, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkloadManifest {
    LoadBalancedWebService(LoadBalancedWebServiceManifest),
    BackendService(BackendServiceManifest),
    WorkerService(WorkerServiceManifest),
    ScheduledJob(ScheduledJobManifest),
}

impl WorkloadManifest {
    pub fn parse(name: &str, raw: &[u8]) -> Result<Self> {
        let workload_type = workload_type_from_manifest(name, raw)?;
        let context = || format!("unmarshal {} manifest for workload {}", workload_type, name);
        let manifest = match workload_type {
            WorkloadType::LoadBalancedWebService => WorkloadManifest::LoadBalancedWebService(
                serde_yaml::from_slice(raw).with_context_msg(context)?,
            ),
            WorkloadType::BackendService => {
                WorkloadManifest::BackendService(serde_yaml::from_slice(raw).with_context_msg(context)?)
            }
            WorkloadType::WorkerService => {
                WorkloadManifest::WorkerService(serde_yaml::from_slice(raw).with_context_msg(context)?)
            }
            WorkloadType::ScheduledJob => {
                WorkloadManifest::ScheduledJob(serde_yaml::from_slice(raw).with_context_msg(context)?)
            }
        };
        Ok(manifest)
    }

    pub fn workload_type(&self) -> WorkloadType {
        match self {
            WorkloadManifest::LoadBalancedWebService(_) => WorkloadType::LoadBalancedWebService,
            WorkloadManifest::BackendService(_) => WorkloadType::BackendService,
            WorkloadManifest::WorkerService(_) => WorkloadType::WorkerService,
            WorkloadManifest::ScheduledJob(_) => WorkloadType::ScheduledJob,
        }
    }

    pub fn props(&self) -> &WorkloadProps {
        match self {
            WorkloadManifest::LoadBalancedWebService(m) => &m.props,
            WorkloadManifest::BackendService(m) => &m.props,
            WorkloadManifest::WorkerService(m) => &m.props,
            WorkloadManifest::ScheduledJob(m) => &m.props,
        }
    }

    fn props_mut(&mut self) -> &mut WorkloadProps {
        match self {
            WorkloadManifest::LoadBalancedWebService(m) => &mut m.props,
            WorkloadManifest::BackendService(m) => &mut m.props,
            WorkloadManifest::WorkerService(m) => &mut m.props,
            WorkloadManifest::ScheduledJob(m) => &mut m.props,
        }
    }

    pub fn name(&self) -> &str {
        &self.props().name
    }

    /// Returns the manifest with the overrides for `env` merged in.
    pub fn for_environment(&self, env: &str) -> Self {
        let mut merged = self.clone();
        if let Some(ov) = self.props().environments.get(env) {
            merged.props_mut().apply_override(ov);
        }
        merged.props_mut().environments.clear();
        merged
    }

    pub fn validate(&self) -> Result<()> {
        let props = self.props();
        props.image_location()?;
        if props.count == Some(0) && !matches!(self, WorkloadManifest::ScheduledJob(_)) {
            return Err(WharfError::validation(format!(
                "count for workload {} must be greater than 0",
                props.name
            )));
        }
        for (var, reference) in &props.secrets {
            parse_secret_ref(reference).with_context_msg(|| format!("secret {}", var))?;
        }
        match self {
            WorkloadManifest::LoadBalancedWebService(_) => {
                if props.image.port.is_none() {
                    return Err(WharfError::validation(format!(
                        "manifest for workload {} must set image.port for a {}",
                        props.name,
                        WorkloadType::LoadBalancedWebService
                    )));
                }
            }
            WorkloadManifest::ScheduledJob(job) => {
                if job.schedule.split_whitespace().count() != 5 {
                    return Err(WharfError::validation(format!(
                        "schedule {:?} for job {} must be a five-field cron expression",
                        job.schedule, props.name
                    )));
                }
            }
            WorkloadManifest::BackendService(_) | WorkloadManifest::WorkerService(_) => {}
        }
        Ok(())
    }
}

/// Splits a `secret-name/key` reference.
pub fn parse_secret_ref(reference: &str) -> Result<(&str, &str)> {
    match reference.split_once('/') {
        Some((name, key)) if !name.is_empty() && !key.is_empty() => Ok((name, key)),
        _ => Err(WharfError::validation(format!(
            "secret reference {:?} must have the form <secret-name>/<key>",
            reference
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceQuotaConfig {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub pods: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub manifest_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_quota: Option<ResourceQuotaConfig>,
}

impl EnvironmentManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manifest_type: ENVIRONMENT_MANIFEST_TYPE.to_string(),
            namespace_labels: BTreeMap::new(),
            resource_quota: None,
        }
    }

    pub fn parse(name: &str, raw: &[u8]) -> Result<Self> {
        let manifest: EnvironmentManifest = serde_yaml::from_slice(raw)
            .with_context_msg(|| format!("unmarshal manifest for environment {}", name))?;
        if manifest.manifest_type != ENVIRONMENT_MANIFEST_TYPE {
            return Err(WharfError::validation(format!(
                "manifest for environment {} has type {:?}, expected {:?}",
                name, manifest.manifest_type, ENVIRONMENT_MANIFEST_TYPE
            )));
        }
        Ok(manifest)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
