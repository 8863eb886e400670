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

//! Records kept in the remote store and the workload kinds they describe.

use crate::shared::error::WharfError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub app: String,
    pub name: String,
    /// Kubernetes namespace the environment's workloads run in.
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub prod: bool,
}

impl Environment {
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        let app = app.into();
        let name = name.into();
        Self {
            namespace: default_namespace(&app, &name),
            app,
            name,
            region: None,
            prod: false,
        }
    }
}

pub fn default_namespace(app: &str, env: &str) -> String {
    format!("{}-{}", app, env)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub app: String,
    pub name: String,
    #[serde(rename = "type")]
    pub workload_type: WorkloadType,
}

impl Workload {
    pub fn new(app: impl Into<String>, name: impl Into<String>, workload_type: WorkloadType) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
            workload_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WorkloadType {
    LoadBalancedWebService,
    BackendService,
    WorkerService,
    ScheduledJob,
}

impl WorkloadType {
    pub const ALL: [WorkloadType; 4] = [
        WorkloadType::LoadBalancedWebService,
        WorkloadType::BackendService,
        WorkloadType::WorkerService,
        WorkloadType::ScheduledJob,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::LoadBalancedWebService => "Load Balanced Web Service",
            WorkloadType::BackendService => "Backend Service",
            WorkloadType::WorkerService => "Worker Service",
            WorkloadType::ScheduledJob => "Scheduled Job",
        }
    }

    pub fn category(&self) -> WorkloadCategory {
        match self {
            WorkloadType::ScheduledJob => WorkloadCategory::Job,
            _ => WorkloadCategory::Service,
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadType {
    type Err = WharfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkloadType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| WharfError::validation(format!("invalid workload type {:?}", s)))
    }
}

impl TryFrom<String> for WorkloadType {
    type Error = WharfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkloadType> for String {
    fn from(value: WorkloadType) -> Self {
        value.as_str().to_string()
    }
}

/// Services run continuously, jobs run to completion on a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadCategory {
    Service,
    Job,
}

impl WorkloadCategory {
    /// Short name used for subcommands and error prefixes.
    pub fn short_name(&self) -> &'static str {
        match self {
            WorkloadCategory::Service => "svc",
            WorkloadCategory::Job => "job",
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            WorkloadCategory::Service => "service",
            WorkloadCategory::Job => "job",
        }
    }
}

impl fmt::Display for WorkloadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Observed state of a deployed service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub app: String,
    pub env: String,
    pub name: String,
    pub desired: u32,
    pub running: u32,
    pub image: Option<String>,
    pub endpoint: Option<String>,
    pub tasks: Vec<TaskStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatus {
    pub id: String,
    pub phase: String,
    pub ready: bool,
    pub restarts: u32,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}
