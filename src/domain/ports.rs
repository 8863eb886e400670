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

//! Narrow interfaces to everything outside the command logic: the remote
//! record store, the local workspace, the terminal, and the platform.

use crate::domain::manifest::{EnvironmentManifest, WorkloadManifest};
use crate::domain::model::{
    Application, Environment, ServiceStatus, Workload, WorkloadCategory, WorkloadType,
};
use crate::shared::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Remote store of application, environment and workload records.
///
/// Lookups of a single record return `NoSuchApplication`, `NoSuchEnvironment`
/// or `NoSuchWorkload` when the record does not exist.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_application(&self, name: &str) -> Result<Application>;

    async fn list_applications(&self) -> Result<Vec<Application>>;

    async fn create_application(&self, app: &Application) -> Result<()>;

    async fn get_environment(&self, app: &str, env: &str) -> Result<Environment>;

    async fn list_environments(&self, app: &str) -> Result<Vec<Environment>>;

    async fn create_environment(&self, env: &Environment) -> Result<()>;

    async fn get_workload(&self, app: &str, name: &str) -> Result<Workload>;

    async fn list_workloads(&self, app: &str) -> Result<Vec<Workload>>;

    async fn create_workload(&self, workload: &Workload) -> Result<()>;

    async fn list_services(&self, app: &str) -> Result<Vec<Workload>> {
        Ok(self
            .list_workloads(app)
            .await?
            .into_iter()
            .filter(|w| w.workload_type.category() == WorkloadCategory::Service)
            .collect())
    }

    async fn list_jobs(&self, app: &str) -> Result<Vec<Workload>> {
        Ok(self
            .list_workloads(app)
            .await?
            .into_iter()
            .filter(|w| w.workload_type.category() == WorkloadCategory::Job)
            .collect())
    }
}

/// Read access to the local workspace.
pub trait WorkspaceReader: Send + Sync {
    /// Application recorded in the workspace summary.
    fn app_name(&self) -> Result<String>;

    /// Environments with a manifest in the workspace.
    fn list_environments(&self) -> Result<Vec<String>>;

    /// Workloads (services and jobs) with a manifest in the workspace.
    fn list_workloads(&self) -> Result<Vec<String>>;

    fn list_services(&self) -> Result<Vec<String>>;

    fn list_jobs(&self) -> Result<Vec<String>>;

    fn read_workload_manifest(&self, name: &str) -> Result<Vec<u8>>;

    fn read_environment_manifest(&self, name: &str) -> Result<Vec<u8>>;

    /// Reads a file given relative to the workspace root.
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
}

pub trait WorkspaceWriter: Send + Sync {
    fn create_summary(&self, app: &str) -> Result<PathBuf>;

    /// Writes an environment manifest unless one already exists.
    fn write_environment_manifest(&self, name: &str, contents: &str) -> Result<PathBuf>;
}

pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str, help: &str, default: bool) -> Result<bool>;

    fn get(&self, message: &str, help: &str, default: Option<&str>) -> Result<String>;

    fn select_one(&self, message: &str, help: &str, options: &[String]) -> Result<String>;
}

/// Resolves a name interactively from the candidates the workspace or the
/// store knows about.
#[async_trait]
pub trait Selector: Send + Sync {
    /// Any workload with a manifest in the workspace.
    async fn workload(&self, prompt: &str, help: &str) -> Result<String>;

    /// A service or job with a manifest in the workspace.
    async fn workspace_workload(
        &self,
        category: WorkloadCategory,
        prompt: &str,
        help: &str,
    ) -> Result<String>;

    /// A service or job registered in the application.
    async fn app_workload(
        &self,
        category: WorkloadCategory,
        prompt: &str,
        help: &str,
        app: &str,
    ) -> Result<String>;

    /// An environment registered in the application.
    async fn environment(&self, prompt: &str, help: &str, app: &str) -> Result<String>;

    /// An environment with a manifest in the workspace.
    async fn workspace_environment(&self, prompt: &str, help: &str) -> Result<String>;
}

/// Registers a workload that already has a manifest with the application.
#[async_trait]
pub trait WorkloadInitializer: Send + Sync {
    async fn add_workload_to_app(
        &self,
        app: &str,
        name: &str,
        workload_type: WorkloadType,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadArtifactsOutput {
    pub image: String,
    /// ConfigMap holding the uploaded env file, if the manifest has one.
    pub env_file_config: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeployWorkloadInput {
    pub environment: Environment,
    pub manifest: WorkloadManifest,
    pub artifacts: UploadArtifactsOutput,
    /// Return as soon as the resources are applied.
    pub detach: bool,
    /// Restart pods even when nothing changed.
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployOutcome {
    pub endpoint: Option<String>,
    pub resources: Vec<String>,
}

#[async_trait]
pub trait WorkloadDeployer: Send + Sync {
    async fn upload_artifacts(
        &self,
        env: &Environment,
        manifest: &WorkloadManifest,
    ) -> Result<UploadArtifactsOutput>;

    async fn deploy_workload(&self, input: &DeployWorkloadInput) -> Result<DeployOutcome>;
}

#[async_trait]
pub trait EnvironmentDeployer: Send + Sync {
    /// Creates the minimal infrastructure an environment needs to exist.
    async fn bootstrap(&self, env: &Environment) -> Result<()>;

    async fn deploy_environment(
        &self,
        env: &Environment,
        manifest: &EnvironmentManifest,
    ) -> Result<()>;
}

#[async_trait]
pub trait StatusDescriber: Send + Sync {
    async fn describe(&self, env: &Environment, name: &str) -> Result<ServiceStatus>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Option<Vec<String>>,
    pub env: BTreeMap<String, String>,
    /// Published `(host, container)` ports. Only the pause container publishes.
    pub ports: Vec<(u16, u16)>,
    /// Join the network namespace of this container.
    pub network_of: Option<String>,
}

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Starts a detached container.
    async fn run(&self, spec: &ContainerSpec) -> Result<()>;

    async fn is_running(&self, name: &str) -> Result<bool>;

    /// Stops and removes a container.
    async fn stop(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolves a `secret-name/key` reference inside a namespace.
    async fn resolve(&self, namespace: &str, reference: &str) -> Result<String>;
}
