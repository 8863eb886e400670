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

//! `wharf env init`, `wharf env deploy` and `wharf env ls`.

use crate::cli::action::ActionCommand;
use crate::cli::display::TableRenderer;
use crate::domain::manifest::EnvironmentManifest;
use crate::domain::model::Environment;
use crate::domain::naming::validate_name;
use crate::domain::ports::{
    EnvironmentDeployer, Prompter, Selector, Store, WorkspaceReader, WorkspaceWriter,
};
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitEnvVars {
    pub app: String,
    pub name: String,
    pub prod: bool,
    /// Namespace to run the environment in, `<app>-<env>` when not given.
    pub namespace: Option<String>,
}

pub struct InitEnvOpts {
    pub vars: InitEnvVars,
    store: Arc<dyn Store>,
    ws: Arc<dyn WorkspaceWriter>,
    prompt: Arc<dyn Prompter>,
    deployer: Arc<dyn EnvironmentDeployer>,
}

impl InitEnvOpts {
    pub fn new(
        vars: InitEnvVars,
        store: Arc<dyn Store>,
        ws: Arc<dyn WorkspaceWriter>,
        prompt: Arc<dyn Prompter>,
        deployer: Arc<dyn EnvironmentDeployer>,
    ) -> Self {
        Self {
            vars,
            store,
            ws,
            prompt,
            deployer,
        }
    }

    async fn validate_env_name(&self) -> Result<()> {
        validate_name("environment", &self.vars.name)?;
        match self.store.get_environment(&self.vars.app, &self.vars.name).await {
            Ok(_) => Err(WharfError::already_exists(
                "environment",
                &self.vars.name,
                &self.vars.app,
            )),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(WharfError::wrap(
                format!("get environment {}", self.vars.name),
                e,
            )),
        }
    }

    fn environment(&self) -> Environment {
        let mut env = Environment::new(&self.vars.app, &self.vars.name);
        env.prod = self.vars.prod;
        if let Some(namespace) = &self.vars.namespace {
            env.namespace = namespace.clone();
        }
        env
    }
}

#[async_trait]
impl ActionCommand for InitEnvOpts {
    async fn validate(&mut self) -> Result<()> {
        self.store
            .get_application(&self.vars.app)
            .await
            .with_context_msg(|| format!("get application {}", self.vars.app))?;
        if let Some(namespace) = &self.vars.namespace {
            validate_name("namespace", namespace)?;
        }
        if !self.vars.name.is_empty() {
            self.validate_env_name().await?;
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if !self.vars.name.is_empty() {
            return Ok(());
        }
        self.vars.name = self
            .prompt
            .get(
                "What is your environment's name?",
                "A unique identifier for an environment (e.g. dev, test, prod).",
                None,
            )
            .context_msg("get environment name")?;
        self.validate_env_name().await
    }

    async fn execute(&mut self) -> Result<()> {
        let manifest = EnvironmentManifest::new(&self.vars.name).to_yaml()?;
        match self.ws.write_environment_manifest(&self.vars.name, &manifest) {
            Ok(path) => println!("✓ Manifest for environment {} at {}", self.vars.name, path.display()),
            Err(WharfError::NoWorkspace) => debug!("no workspace, skipping environment manifest"),
            Err(e) => return Err(WharfError::wrap("write environment manifest", e)),
        }

        let env = self.environment();
        self.deployer
            .bootstrap(&env)
            .await
            .with_context_msg(|| format!("bootstrap environment {}", env.name))?;
        self.store
            .create_environment(&env)
            .await
            .with_context_msg(|| format!("add environment {} to application {}", env.name, env.app))?;

        println!(
            "✓ Environment {} created in namespace {}",
            env.name, env.namespace
        );
        Ok(())
    }

    fn recommend_actions(&self) -> Result<Vec<String>> {
        Ok(vec![format!(
            "Run `wharf env deploy --name {}` to apply the environment manifest.",
            self.vars.name
        )])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployEnvVars {
    pub app: String,
    pub name: String,
}

pub struct DeployEnvOpts {
    pub vars: DeployEnvVars,
    store: Arc<dyn Store>,
    ws: Arc<dyn WorkspaceReader>,
    sel: Arc<dyn Selector>,
    deployer: Arc<dyn EnvironmentDeployer>,
}

impl DeployEnvOpts {
    pub fn new(
        vars: DeployEnvVars,
        store: Arc<dyn Store>,
        ws: Arc<dyn WorkspaceReader>,
        sel: Arc<dyn Selector>,
        deployer: Arc<dyn EnvironmentDeployer>,
    ) -> Self {
        Self {
            vars,
            store,
            ws,
            sel,
            deployer,
        }
    }

    async fn environment(&self) -> Result<Environment> {
        self.store
            .get_environment(&self.vars.app, &self.vars.name)
            .await
            .with_context_msg(|| format!("get environment {}", self.vars.name))
    }
}

#[async_trait]
impl ActionCommand for DeployEnvOpts {
    async fn validate(&mut self) -> Result<()> {
        if self.vars.name.is_empty() {
            return Ok(());
        }
        self.environment().await.map(|_| ())
    }

    async fn ask(&mut self) -> Result<()> {
        if !self.vars.name.is_empty() {
            return Ok(());
        }
        self.vars.name = self
            .sel
            .workspace_environment(
                "Select an environment manifest from your workspace",
                "The environment whose manifest will be applied.",
            )
            .await
            .context_msg("select environment")?;
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let env = self.environment().await?;
        let raw = self
            .ws
            .read_environment_manifest(&env.name)
            .with_context_msg(|| format!("read manifest for environment {}", env.name))?;
        let manifest = EnvironmentManifest::parse(&env.name, &raw)?;

        self.deployer
            .deploy_environment(&env, &manifest)
            .await
            .with_context_msg(|| format!("deploy environment {}", env.name))?;
        println!("✓ Environment {} deployed", env.name);
        Ok(())
    }
}

pub struct ListEnvOpts {
    pub app: String,
    pub json: bool,
    store: Arc<dyn Store>,
}

impl ListEnvOpts {
    pub fn new(app: String, json: bool, store: Arc<dyn Store>) -> Self {
        Self { app, json, store }
    }
}

#[async_trait]
impl ActionCommand for ListEnvOpts {
    async fn validate(&mut self) -> Result<()> {
        self.store
            .get_application(&self.app)
            .await
            .with_context_msg(|| format!("get application {}", self.app))?;
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let envs = self
            .store
            .list_environments(&self.app)
            .await
            .with_context_msg(|| format!("list environments for application {}", self.app))?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&envs)?);
        } else {
            println!("{}", TableRenderer::new().render_environments(&self.app, &envs));
        }
        Ok(())
    }
}
