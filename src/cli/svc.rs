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

//! `wharf svc status`, `wharf svc ls` and `wharf job ls`.

use crate::cli::action::ActionCommand;
use crate::cli::display::TableRenderer;
use crate::domain::model::{ServiceStatus, WorkloadCategory};
use crate::domain::ports::{Selector, StatusDescriber, Store};
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusVars {
    pub app: String,
    pub name: String,
    pub env_name: String,
    pub json: bool,
}

pub struct StatusOpts {
    pub vars: StatusVars,
    store: Arc<dyn Store>,
    sel: Arc<dyn Selector>,
    describer: Arc<dyn StatusDescriber>,
    status: Option<ServiceStatus>,
}

impl StatusOpts {
    pub fn new(
        vars: StatusVars,
        store: Arc<dyn Store>,
        sel: Arc<dyn Selector>,
        describer: Arc<dyn StatusDescriber>,
    ) -> Self {
        Self {
            vars,
            store,
            sel,
            describer,
            status: None,
        }
    }

    pub fn status(&self) -> Option<&ServiceStatus> {
        self.status.as_ref()
    }
}

#[async_trait]
impl ActionCommand for StatusOpts {
    async fn validate(&mut self) -> Result<()> {
        self.store
            .get_application(&self.vars.app)
            .await
            .with_context_msg(|| format!("get application {}", self.vars.app))?;
        if !self.vars.env_name.is_empty() {
            self.store
                .get_environment(&self.vars.app, &self.vars.env_name)
                .await
                .with_context_msg(|| format!("get environment {}", self.vars.env_name))?;
        }
        if !self.vars.name.is_empty() {
            let workload = self
                .store
                .get_workload(&self.vars.app, &self.vars.name)
                .await
                .with_context_msg(|| format!("get service {}", self.vars.name))?;
            if workload.workload_type.category() != WorkloadCategory::Service {
                return Err(WharfError::validation(format!(
                    "{} is a {}, not a service",
                    workload.name, workload.workload_type
                )));
            }
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if self.vars.env_name.is_empty() {
            self.vars.env_name = self
                .sel
                .environment(
                    "Select an environment",
                    "The environment your service runs in.",
                    &self.vars.app,
                )
                .await
                .context_msg("select environment")?;
        }
        if self.vars.name.is_empty() {
            self.vars.name = self
                .sel
                .app_workload(
                    WorkloadCategory::Service,
                    "Select a service",
                    "Services registered in your application.",
                    &self.vars.app,
                )
                .await
                .context_msg("select service")?;
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let env = self
            .store
            .get_environment(&self.vars.app, &self.vars.env_name)
            .await
            .with_context_msg(|| format!("get environment {}", self.vars.env_name))?;
        let status = self
            .describer
            .describe(&env, &self.vars.name)
            .await
            .with_context_msg(|| format!("describe service {}", self.vars.name))?;

        if self.vars.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!("{}", TableRenderer::new().render_service_status(&status));
        }
        self.status = Some(status);
        Ok(())
    }
}

/// Lists the services or the jobs of an application.
pub struct ListWorkloadsOpts {
    pub app: String,
    pub json: bool,
    category: WorkloadCategory,
    store: Arc<dyn Store>,
}

impl ListWorkloadsOpts {
    pub fn new(category: WorkloadCategory, app: String, json: bool, store: Arc<dyn Store>) -> Self {
        Self {
            app,
            json,
            category,
            store,
        }
    }
}

#[async_trait]
impl ActionCommand for ListWorkloadsOpts {
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
        let workloads = match self.category {
            WorkloadCategory::Service => self.store.list_services(&self.app).await,
            WorkloadCategory::Job => self.store.list_jobs(&self.app).await,
        }
        .with_context_msg(|| format!("list {}s for application {}", self.category.noun(), self.app))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&workloads)?);
        } else {
            println!(
                "{}",
                TableRenderer::new().render_workloads(self.category, &self.app, &workloads)
            );
        }
        Ok(())
    }
}
