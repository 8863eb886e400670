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

//! `wharf svc deploy` and `wharf job deploy`.

use crate::cli::action::ActionCommand;
use crate::cli::deploy::DeployWkldVars;
use crate::domain::manifest::WorkloadManifest;
use crate::domain::model::WorkloadCategory;
use crate::domain::naming::validate_name;
use crate::domain::ports::{
    DeployOutcome, DeployWorkloadInput, Selector, Store, WorkloadDeployer, WorkspaceReader,
};
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

pub struct DeployWorkloadOpts {
    pub vars: DeployWkldVars,
    category: WorkloadCategory,
    store: Arc<dyn Store>,
    ws: Arc<dyn WorkspaceReader>,
    sel: Arc<dyn Selector>,
    deployer: Arc<dyn WorkloadDeployer>,
    outcome: Option<DeployOutcome>,
}

impl DeployWorkloadOpts {
    pub fn new(
        category: WorkloadCategory,
        vars: DeployWkldVars,
        store: Arc<dyn Store>,
        ws: Arc<dyn WorkspaceReader>,
        sel: Arc<dyn Selector>,
        deployer: Arc<dyn WorkloadDeployer>,
    ) -> Self {
        Self {
            vars,
            category,
            store,
            ws,
            sel,
            deployer,
            outcome: None,
        }
    }

    pub fn outcome(&self) -> Option<&DeployOutcome> {
        self.outcome.as_ref()
    }

    async fn validate_workload(&self) -> Result<()> {
        let name = &self.vars.name;
        validate_name(self.category.noun(), name)?;
        let workload = self
            .store
            .get_workload(&self.vars.app, name)
            .await
            .with_context_msg(|| format!("get {} {}", self.category.noun(), name))?;
        if workload.workload_type.category() != self.category {
            return Err(WharfError::validation(format!(
                "{} is a {}, use `wharf {} deploy` instead",
                name,
                workload.workload_type,
                workload.workload_type.category().short_name()
            )));
        }
        Ok(())
    }

    async fn validate_env(&self) -> Result<()> {
        self.store
            .get_environment(&self.vars.app, &self.vars.env_name)
            .await
            .with_context_msg(|| format!("get environment {}", self.vars.env_name))?;
        Ok(())
    }
}

#[async_trait]
impl ActionCommand for DeployWorkloadOpts {
    async fn validate(&mut self) -> Result<()> {
        self.store
            .get_application(&self.vars.app)
            .await
            .with_context_msg(|| format!("get application {}", self.vars.app))?;
        if !self.vars.name.is_empty() {
            self.validate_workload().await?;
        }
        if !self.vars.env_name.is_empty() {
            self.validate_env().await?;
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        let noun = self.category.noun();
        if self.vars.name.is_empty() {
            self.vars.name = self
                .sel
                .workspace_workload(
                    self.category,
                    &format!("Select a {} in your workspace", noun),
                    &format!("The {} you want to deploy.", noun),
                )
                .await
                .with_context_msg(|| format!("select {}", noun))?;
        }
        if self.vars.env_name.is_empty() {
            self.vars.env_name = self
                .sel
                .environment(
                    &format!("Select an environment to deploy your {} to", noun),
                    "Environments registered in your application.",
                    &self.vars.app,
                )
                .await
                .context_msg("select environment")?;
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let name = self.vars.name.clone();
        let noun = self.category.noun();
        let env = self
            .store
            .get_environment(&self.vars.app, &self.vars.env_name)
            .await
            .with_context_msg(|| format!("get environment {}", self.vars.env_name))?;

        let raw = self
            .ws
            .read_workload_manifest(&name)
            .with_context_msg(|| format!("read manifest for {} {}", noun, name))?;
        let manifest = WorkloadManifest::parse(&name, &raw)?.for_environment(&env.name);
        if manifest.workload_type().category() != self.category {
            return Err(WharfError::validation(format!(
                "manifest for {} declares a {}",
                name,
                manifest.workload_type()
            )));
        }
        manifest
            .validate()
            .with_context_msg(|| format!("validate manifest for {} {}", noun, name))?;

        let artifacts = self
            .deployer
            .upload_artifacts(&env, &manifest)
            .await
            .context_msg("upload deploy resources")?;
        info!(workload = %name, image = %artifacts.image, "uploaded artifacts");

        println!(
            "Deploying {} {} to environment {}...",
            noun,
            name.bold(),
            env.name.bold()
        );
        let input = DeployWorkloadInput {
            environment: env.clone(),
            manifest,
            artifacts,
            detach: self.vars.detach,
            force: self.vars.force,
        };
        let outcome = self
            .deployer
            .deploy_workload(&input)
            .await
            .with_context_msg(|| format!("deploy {} {} to environment {}", noun, name, env.name))?;

        println!(
            "{} Deployed {} {} to environment {}",
            "✓".green(),
            noun,
            name,
            env.name
        );
        self.outcome = Some(outcome);
        Ok(())
    }

    fn recommend_actions(&self) -> Result<Vec<String>> {
        let mut actions = Vec::new();
        match self.category {
            WorkloadCategory::Service => {
                if let Some(endpoint) = self.outcome.as_ref().and_then(|o| o.endpoint.as_ref()) {
                    actions.push(format!("Your service is reachable at {}.", endpoint));
                }
                actions.push(format!(
                    "Run `wharf svc status --name {} --env {}` to check the health of your service.",
                    self.vars.name, self.vars.env_name
                ));
            }
            WorkloadCategory::Job => {
                actions.push(format!(
                    "Run `wharf job ls --app {}` to see the jobs in your application.",
                    self.vars.app
                ));
            }
        }
        Ok(actions)
    }
}
