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

//! Terminal prompts and the name selectors built on top of them.

use crate::domain::model::WorkloadCategory;
use crate::domain::ports::{Prompter, Selector, Store, WorkspaceReader};
use crate::shared::error::{Result, WharfError};
use async_trait::async_trait;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use std::sync::Arc;
use tracing::debug;

fn prompt_error(err: dialoguer::Error) -> WharfError {
    WharfError::Prompt(err.to_string())
}

fn show_help(help: &str) {
    if !help.is_empty() {
        eprintln!("{}", help.dimmed());
    }
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn confirm(&self, message: &str, help: &str, default: bool) -> Result<bool> {
        show_help(help);
        Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn get(&self, message: &str, help: &str, default: Option<&str>) -> Result<String> {
        show_help(help);
        let mut input = Input::<String>::new().with_prompt(message);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn select_one(&self, message: &str, help: &str, options: &[String]) -> Result<String> {
        show_help(help);
        let index = Select::new()
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        options
            .get(index)
            .cloned()
            .ok_or_else(|| WharfError::Prompt(format!("selection {} out of range", index)))
    }
}

/// Picks names from the workspace or the store, asking only when there is
/// more than one candidate.
pub struct PromptSelector {
    store: Arc<dyn Store>,
    workspace: Arc<dyn WorkspaceReader>,
    prompter: Arc<dyn Prompter>,
}

impl PromptSelector {
    pub fn new(
        store: Arc<dyn Store>,
        workspace: Arc<dyn WorkspaceReader>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            store,
            workspace,
            prompter,
        }
    }

    fn pick(&self, kind: &str, prompt: &str, help: &str, options: Vec<String>) -> Result<String> {
        match options.len() {
            0 => Err(WharfError::validation(format!("no {} found", kind))),
            1 => {
                let only = options[0].clone();
                println!("Only found one {}, defaulting to: {}", kind, only.bold());
                Ok(only)
            }
            n => {
                debug!(kind, candidates = n, "prompting for selection");
                self.prompter.select_one(prompt, help, &options)
            }
        }
    }
}

#[async_trait]
impl Selector for PromptSelector {
    async fn workload(&self, prompt: &str, help: &str) -> Result<String> {
        let options = self.workspace.list_workloads()?;
        self.pick("workload", prompt, help, options)
    }

    async fn workspace_workload(
        &self,
        category: WorkloadCategory,
        prompt: &str,
        help: &str,
    ) -> Result<String> {
        let options = match category {
            WorkloadCategory::Service => self.workspace.list_services()?,
            WorkloadCategory::Job => self.workspace.list_jobs()?,
        };
        self.pick(category.noun(), prompt, help, options)
    }

    async fn app_workload(
        &self,
        category: WorkloadCategory,
        prompt: &str,
        help: &str,
        app: &str,
    ) -> Result<String> {
        let records = match category {
            WorkloadCategory::Service => self.store.list_services(app).await?,
            WorkloadCategory::Job => self.store.list_jobs(app).await?,
        };
        let options = records.into_iter().map(|w| w.name).collect();
        self.pick(category.noun(), prompt, help, options)
    }

    async fn environment(&self, prompt: &str, help: &str, app: &str) -> Result<String> {
        let options = self
            .store
            .list_environments(app)
            .await?
            .into_iter()
            .map(|e| e.name)
            .collect();
        self.pick("environment", prompt, help, options)
    }

    async fn workspace_environment(&self, prompt: &str, help: &str) -> Result<String> {
        let options = self.workspace.list_environments()?;
        self.pick("environment", prompt, help, options)
    }
}
