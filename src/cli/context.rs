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

//! Wires the concrete collaborators every command is built from.

use crate::cli::action::{ActionCommand, CommandFactory};
use crate::cli::deploy::DeployWkldVars;
use crate::cli::deploy_workload::DeployWorkloadOpts;
use crate::cli::env::{DeployEnvOpts, DeployEnvVars, InitEnvOpts, InitEnvVars};
use crate::domain::config::Settings;
use crate::domain::initializer::StoreWorkloadInitializer;
use crate::domain::model::WorkloadCategory;
use crate::domain::ports::{
    ContainerEngine, EnvironmentDeployer, Prompter, SecretResolver, Selector, StatusDescriber,
    Store, WorkloadDeployer, WorkloadInitializer, WorkspaceReader, WorkspaceWriter,
};
use crate::infrastructure::docker::DockerEngine;
use crate::infrastructure::kubernetes::{
    KubeClient, KubeDeployer, KubeSecretResolver, KubeStatusDescriber, KubeStore,
};
use crate::infrastructure::prompt::{PromptSelector, TermPrompter};
use crate::infrastructure::workspace::FsWorkspace;
use crate::shared::error::{Result, WharfError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct Collaborators {
    pub settings: Settings,
    pub store: Arc<dyn Store>,
    pub ws_reader: Arc<dyn WorkspaceReader>,
    pub ws_writer: Arc<dyn WorkspaceWriter>,
    pub prompter: Arc<dyn Prompter>,
    pub selector: Arc<dyn Selector>,
    pub initializer: Arc<dyn WorkloadInitializer>,
    pub workload_deployer: Arc<dyn WorkloadDeployer>,
    pub env_deployer: Arc<dyn EnvironmentDeployer>,
    pub describer: Arc<dyn StatusDescriber>,
    pub secrets: Arc<dyn SecretResolver>,
    pub engine: Arc<dyn ContainerEngine>,
}

impl Collaborators {
    /// Connects to the cluster and discovers the workspace from the current
    /// directory.
    pub async fn connect(settings: Settings) -> Result<Self> {
        let client = KubeClient::connect(settings.kubeconfig.clone(), settings.context.clone()).await?;
        let workspace = Arc::new(FsWorkspace::discover(std::env::current_dir()?));

        let store: Arc<dyn Store> = Arc::new(KubeStore::new(
            client.clone(),
            settings.store_namespace.clone(),
        ));
        let prompter: Arc<dyn Prompter> = Arc::new(TermPrompter);
        let selector = Arc::new(PromptSelector::new(
            store.clone(),
            workspace.clone(),
            prompter.clone(),
        ));
        let deployer = Arc::new(KubeDeployer::new(
            client.clone(),
            workspace.clone(),
            Duration::from_secs(settings.rollout_timeout_secs),
        ));

        Ok(Self {
            initializer: Arc::new(StoreWorkloadInitializer::new(store.clone())),
            describer: Arc::new(KubeStatusDescriber::new(client.clone())),
            secrets: Arc::new(KubeSecretResolver::new(client)),
            engine: Arc::new(DockerEngine::default()),
            ws_reader: workspace.clone(),
            ws_writer: workspace,
            workload_deployer: deployer.clone(),
            env_deployer: deployer,
            settings,
            store,
            prompter,
            selector,
        })
    }

    /// Application to act on: the `--app` flag, then the workspace, then the
    /// `default_app` setting.
    pub fn resolve_app(&self, flag: Option<String>) -> Result<String> {
        resolve_app(flag, self.ws_reader.as_ref(), &self.settings)
    }
}

pub fn resolve_app(
    flag: Option<String>,
    ws: &dyn WorkspaceReader,
    settings: &Settings,
) -> Result<String> {
    if let Some(app) = flag.filter(|a| !a.is_empty()) {
        return Ok(app);
    }
    match ws.app_name() {
        Ok(app) => return Ok(app),
        Err(WharfError::NoWorkspace) => {}
        Err(e) => return Err(e),
    }
    if let Some(app) = settings.default_app.clone() {
        debug!(app = %app, "using default application from settings");
        return Ok(app);
    }
    Err(WharfError::validation(
        "could not determine the application: pass --app, run from a workspace or set default_app",
    ))
}

/// Builds the env and workload commands from the shared collaborators.
pub struct DefaultCommandFactory {
    ctx: Collaborators,
}

impl DefaultCommandFactory {
    pub fn new(ctx: Collaborators) -> Self {
        Self { ctx }
    }
}

impl CommandFactory for DefaultCommandFactory {
    fn init_env(&self, vars: InitEnvVars) -> Box<dyn ActionCommand> {
        Box::new(InitEnvOpts::new(
            vars,
            self.ctx.store.clone(),
            self.ctx.ws_writer.clone(),
            self.ctx.prompter.clone(),
            self.ctx.env_deployer.clone(),
        ))
    }

    fn deploy_env(&self, vars: DeployEnvVars) -> Box<dyn ActionCommand> {
        Box::new(DeployEnvOpts::new(
            vars,
            self.ctx.store.clone(),
            self.ctx.ws_reader.clone(),
            self.ctx.selector.clone(),
            self.ctx.env_deployer.clone(),
        ))
    }

    fn deploy_workload(
        &self,
        category: WorkloadCategory,
        vars: DeployWkldVars,
    ) -> Box<dyn ActionCommand> {
        Box::new(DeployWorkloadOpts::new(
            category,
            vars,
            self.ctx.store.clone(),
            self.ctx.ws_reader.clone(),
            self.ctx.selector.clone(),
            self.ctx.workload_deployer.clone(),
        ))
    }
}
