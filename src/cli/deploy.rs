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

//! `wharf deploy`: brings an environment and a workload to a deployable
//! state, asking before each step it has to take on the user's behalf, then
//! hands off to `svc deploy` or `job deploy`.

use crate::cli::action::{ActionCommand, CommandFactory};
use crate::cli::env::{DeployEnvVars, InitEnvVars};
use crate::domain::flags::TriState;
use crate::domain::manifest::workload_type_from_manifest;
use crate::domain::model::WorkloadType;
use crate::domain::naming::validate_name;
use crate::domain::ports::{Prompter, Selector, Store, WorkloadInitializer, WorkspaceReader};
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Flags shared by `wharf deploy`, `wharf svc deploy` and `wharf job deploy`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployWkldVars {
    pub app: String,
    pub name: String,
    pub env_name: String,
    pub init_env: TriState,
    pub deploy_env: TriState,
    pub init_wkld: TriState,
    pub detach: bool,
    pub force: bool,
}

pub struct DeployOpts {
    pub vars: DeployWkldVars,

    store: Arc<dyn Store>,
    ws: Arc<dyn WorkspaceReader>,
    prompt: Arc<dyn Prompter>,
    sel: Arc<dyn Selector>,
    initializer: Arc<dyn WorkloadInitializer>,
    factory: Arc<dyn CommandFactory>,

    env_exists_in_app: bool,
    env_exists_in_ws: bool,
    wl_type: Option<WorkloadType>,
    recommendations: Vec<String>,
}

impl DeployOpts {
    pub fn new(
        vars: DeployWkldVars,
        store: Arc<dyn Store>,
        ws: Arc<dyn WorkspaceReader>,
        prompt: Arc<dyn Prompter>,
        sel: Arc<dyn Selector>,
        initializer: Arc<dyn WorkloadInitializer>,
        factory: Arc<dyn CommandFactory>,
    ) -> Self {
        Self {
            vars,
            store,
            ws,
            prompt,
            sel,
            initializer,
            factory,
            env_exists_in_app: false,
            env_exists_in_ws: false,
            wl_type: None,
            recommendations: Vec::new(),
        }
    }

    pub fn env_exists_in_app(&self) -> bool {
        self.env_exists_in_app
    }

    pub fn env_exists_in_ws(&self) -> bool {
        self.env_exists_in_ws
    }

    /// Type of the workload once it has been resolved.
    pub fn workload_type(&self) -> Option<WorkloadType> {
        self.wl_type
    }

    /// Records where the environment exists: registered in the application,
    /// present as a manifest in the workspace, or both.
    pub async fn check_env_exists(&mut self) -> Result<()> {
        let env = self.vars.env_name.clone();
        self.env_exists_in_app = match self.store.get_environment(&self.vars.app, &env).await {
            Ok(_) => true,
            Err(e) if matches!(e.root(), WharfError::NoSuchEnvironment { .. }) => false,
            Err(e) => return Err(WharfError::wrap(format!("get environment {}", env), e)),
        };

        let envs = self
            .ws
            .list_environments()
            .context_msg("retrieve environments from workspace")?;
        self.env_exists_in_ws = envs.iter().any(|e| *e == env);

        debug!(
            env = %env,
            in_app = self.env_exists_in_app,
            in_workspace = self.env_exists_in_ws,
            "checked environment"
        );
        Ok(())
    }

    pub async fn maybe_init_env(&mut self) -> Result<()> {
        let env = self.vars.env_name.clone();
        let app = self.vars.app.clone();

        if !self.env_exists_in_app && !self.env_exists_in_ws {
            return Err(WharfError::validation(format!(
                "environment {} does not exist in the workspace or application {}",
                env, app
            )));
        }
        if self.env_exists_in_app {
            return Ok(());
        }

        let init = match self.vars.init_env.as_bool() {
            Some(init) => init,
            None => self
                .prompt
                .confirm(
                    &format!("Environment {} does not exist in app {}. Initialize it?", env, app),
                    "The environment must be initialized before it can be deployed to.",
                    true,
                )
                .context_msg("confirm environment initialization")?,
        };
        if !init {
            return Err(WharfError::validation(format!(
                "environment {} does not exist in application {}",
                env, app
            )));
        }

        let mut cmd = self.factory.init_env(InitEnvVars {
            app: app.clone(),
            name: env.clone(),
            ..Default::default()
        });
        cmd.validate().await.context_msg("validate env init")?;
        cmd.ask().await.context_msg("ask env init")?;
        cmd.execute().await.context_msg("execute env init")?;
        self.env_exists_in_app = true;
        info!(env = %env, app = %app, "initialized environment");

        if self.vars.deploy_env == TriState::No {
            return Err(WharfError::validation(format!(
                "environment {} was initialized but has not been deployed",
                env
            )));
        }
        Ok(())
    }

    pub async fn maybe_deploy_env(&mut self) -> Result<()> {
        if !self.env_exists_in_ws {
            return Ok(());
        }
        let env = self.vars.env_name.clone();

        let deploy = match self.vars.deploy_env.as_bool() {
            Some(deploy) => deploy,
            None => self
                .prompt
                .confirm(
                    &format!("Deploy environment {}?", env),
                    "Applies the environment manifest from your workspace.",
                    true,
                )
                .context_msg("confirm environment deployment")?,
        };
        if !deploy {
            return Ok(());
        }

        let mut cmd = self.factory.deploy_env(DeployEnvVars {
            app: self.vars.app.clone(),
            name: env.clone(),
        });
        cmd.validate().await.context_msg("validate env deploy")?;
        cmd.ask().await.context_msg("ask env deploy")?;
        cmd.execute().await.context_msg("execute env deploy")?;
        info!(env = %env, "deployed environment");
        Ok(())
    }

    async fn resolve_name(&mut self) -> Result<()> {
        if !self.vars.name.is_empty() {
            return Ok(());
        }
        self.vars.name = self
            .sel
            .workload(
                "Select a service or job in your workspace",
                "The workload you want to deploy.",
            )
            .await
            .context_msg("select workload")?;
        Ok(())
    }

    /// Finds the workload's type, registering the workload with the
    /// application first if it is only known to the workspace.
    pub async fn resolve_workload(&mut self) -> Result<WorkloadType> {
        let app = self.vars.app.clone();
        let name = self.vars.name.clone();

        let workloads = self
            .store
            .list_workloads(&app)
            .await
            .context_msg("retrieve workloads")?;
        if let Some(w) = workloads.iter().find(|w| w.name == name) {
            self.wl_type = Some(w.workload_type);
            return Ok(w.workload_type);
        }

        if self.vars.init_wkld == TriState::No {
            return Err(WharfError::validation(format!(
                "workload {} is uninitialized but --init-wkld=false was specified",
                name
            )));
        }

        let raw = self
            .ws
            .read_workload_manifest(&name)
            .with_context_msg(|| format!("read manifest for workload {}", name))?;
        let workload_type = workload_type_from_manifest(&name, &raw)?;

        if self.vars.init_wkld == TriState::Unset {
            let init = self
                .prompt
                .confirm(
                    &format!("Workload {} does not exist in app {}. Initialize it?", name, app),
                    "The workload must be added to the application before it can be deployed.",
                    true,
                )
                .context_msg("confirm workload initialization")?;
            if !init {
                return Err(WharfError::validation(format!(
                    "workload {} must be initialized before it can be deployed",
                    name
                )));
            }
        }

        self.initializer
            .add_workload_to_app(&app, &name, workload_type)
            .await
            .with_context_msg(|| format!("add workload {} to application {}", name, app))?;

        self.wl_type = Some(workload_type);
        Ok(workload_type)
    }

    async fn deploy_workload(&mut self, workload_type: WorkloadType) -> Result<()> {
        let category = workload_type.category();
        let short = category.short_name();

        let mut cmd = self.factory.deploy_workload(category, self.vars.clone());
        cmd.ask()
            .await
            .with_context_msg(|| format!("ask {} deploy", short))?;
        cmd.validate()
            .await
            .with_context_msg(|| format!("validate {} deploy", short))?;
        cmd.execute()
            .await
            .with_context_msg(|| format!("execute {} deploy", short))?;
        self.recommendations = cmd.recommend_actions().context_msg("recommend actions")?;
        Ok(())
    }
}

#[async_trait]
impl ActionCommand for DeployOpts {
    async fn validate(&mut self) -> Result<()> {
        if !self.vars.name.is_empty() {
            validate_name("workload", &self.vars.name)?;
        }
        if !self.vars.env_name.is_empty() {
            validate_name("environment", &self.vars.env_name)?;
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        self.resolve_name().await
    }

    async fn execute(&mut self) -> Result<()> {
        self.resolve_name().await?;
        if !self.vars.env_name.is_empty() {
            self.check_env_exists().await?;
            self.maybe_init_env().await?;
            self.maybe_deploy_env().await?;
        }
        let workload_type = self.resolve_workload().await?;
        self.deploy_workload(workload_type).await
    }

    fn recommend_actions(&self) -> Result<Vec<String>> {
        Ok(self.recommendations.clone())
    }
}
