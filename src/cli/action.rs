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

//! The lifecycle every command goes through, and the factory the deploy
//! command uses to build the sub-commands it delegates to.

use crate::cli::deploy::DeployWkldVars;
use crate::cli::env::{DeployEnvVars, InitEnvVars};
use crate::domain::model::WorkloadCategory;
use crate::shared::error::Result;
use async_trait::async_trait;
use colored::Colorize;

/// A command that gathers its inputs, checks them, then acts.
#[async_trait]
pub trait ActionCommand: Send {
    /// Checks the values already provided by flags.
    async fn validate(&mut self) -> Result<()>;

    /// Prompts for whatever is still missing.
    async fn ask(&mut self) -> Result<()>;

    async fn execute(&mut self) -> Result<()>;

    /// Follow-up commands to suggest once `execute` succeeded.
    fn recommend_actions(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Runs `validate -> ask -> execute` and prints the recommended actions.
pub async fn run_action(cmd: &mut dyn ActionCommand) -> Result<()> {
    cmd.validate().await?;
    cmd.ask().await?;
    cmd.execute().await?;
    print_recommendations(&cmd.recommend_actions()?);
    Ok(())
}

pub fn print_recommendations(actions: &[String]) {
    if actions.is_empty() {
        return;
    }
    println!("\n{}", "Recommended follow-up actions:".bold());
    for action in actions {
        println!("  - {}", action);
    }
}

/// Builds the commands `wharf deploy` hands work off to.
pub trait CommandFactory: Send + Sync {
    fn init_env(&self, vars: InitEnvVars) -> Box<dyn ActionCommand>;

    fn deploy_env(&self, vars: DeployEnvVars) -> Box<dyn ActionCommand>;

    fn deploy_workload(
        &self,
        category: WorkloadCategory,
        vars: DeployWkldVars,
    ) -> Box<dyn ActionCommand>;
}
