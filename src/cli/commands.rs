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

// CLI command definitions

use super::args::{
    AppCommands, DeployArgs, EnvCommands, JobCommands, RunCommands, SvcCommands,
};
use super::context::Collaborators;
use crate::domain::config::settings::CONFIG_ENV_VAR;
use crate::shared::error::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wharf",
    version,
    about = "Deploy containerized services and jobs to Kubernetes",
    long_about = "A CLI for initializing applications and environments and deploying services and jobs to Kubernetes"
)]
pub struct CliArgs {
    /// Path to the settings file (defaults to ~/.wharf/config.toml)
    #[arg(long, global = true, value_name = "PATH", env = CONFIG_ENV_VAR)]
    pub config: Option<String>,

    /// Override settings (-D key=value)
    ///
    /// Keys: settings.kubeconfig, settings.context, settings.store-namespace,
    /// settings.default-app, settings.rollout-timeout
    ///
    /// Example: -Dsettings.context=staging -Dsettings.rollout-timeout=600
    #[arg(short = 'D', global = true, value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Deploy a service or job, initializing the environment and workload first if needed
    Deploy(DeployArgs),

    /// Manage applications
    #[command(subcommand)]
    App(AppCommands),

    /// Manage environments
    #[command(subcommand)]
    Env(EnvCommands),

    /// Manage long-running services
    #[command(subcommand)]
    Svc(SvcCommands),

    /// Manage scheduled jobs
    #[command(subcommand)]
    Job(JobCommands),

    /// Run workloads outside the cluster
    #[command(subcommand)]
    Run(RunCommands),
}

impl Commands {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        match self {
            Commands::Deploy(cmd) => cmd.execute(ctx).await,
            Commands::App(cmd) => cmd.execute(ctx).await,
            Commands::Env(cmd) => cmd.execute(ctx).await,
            Commands::Svc(cmd) => cmd.execute(ctx).await,
            Commands::Job(cmd) => cmd.execute(ctx).await,
            Commands::Run(cmd) => cmd.execute(ctx).await,
        }
    }
}
