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

//! Flags for every subcommand and how each builds its command.

use super::action::{run_action, CommandFactory};
use super::app::{InitAppOpts, ListAppOpts};
use super::context::{Collaborators, DefaultCommandFactory};
use super::deploy::{DeployOpts, DeployWkldVars};
use super::deploy_workload::DeployWorkloadOpts;
use super::env::{DeployEnvOpts, DeployEnvVars, InitEnvOpts, InitEnvVars, ListEnvOpts};
use super::run_local::{RunLocalOpts, RunLocalVars};
use super::svc::{ListWorkloadsOpts, StatusOpts, StatusVars};
use crate::domain::flags::TriState;
use crate::domain::model::WorkloadCategory;
use crate::shared::error::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
pub struct WorkloadArgs {
    /// Name of the application (defaults to the workspace's application)
    #[arg(long, short = 'a')]
    pub app: Option<String>,

    /// Name of the service or job
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Name of the environment
    #[arg(long = "env", short = 'e', default_value = "")]
    pub env_name: String,

    /// Return as soon as the resources are applied instead of waiting for the rollout
    #[arg(long)]
    pub detach: bool,

    /// Restart the workload's pods even if nothing changed
    #[arg(long)]
    pub force: bool,
}

impl WorkloadArgs {
    fn into_vars(self, app: String) -> DeployWkldVars {
        DeployWkldVars {
            app,
            name: self.name,
            env_name: self.env_name,
            detach: self.detach,
            force: self.force,
            ..Default::default()
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Initialize the environment if it only exists in the workspace (asks when omitted)
    #[arg(long, num_args = 0..=1, require_equals = true, default_value = "unset",
          default_missing_value = "true", hide_default_value = true, value_name = "BOOL")]
    pub init_env: TriState,

    /// Deploy the environment manifest before the workload (asks when omitted)
    #[arg(long, num_args = 0..=1, require_equals = true, default_value = "unset",
          default_missing_value = "true", hide_default_value = true, value_name = "BOOL")]
    pub deploy_env: TriState,

    /// Register the workload with the application if needed (asks when omitted)
    #[arg(long, num_args = 0..=1, require_equals = true, default_value = "unset",
          default_missing_value = "true", hide_default_value = true, value_name = "BOOL")]
    pub init_wkld: TriState,
}

impl DeployArgs {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        let app = ctx.resolve_app(self.workload.app.clone())?;
        let mut vars = self.workload.into_vars(app);
        vars.init_env = self.init_env;
        vars.deploy_env = self.deploy_env;
        vars.init_wkld = self.init_wkld;

        let factory: Arc<dyn CommandFactory> = Arc::new(DefaultCommandFactory::new(ctx.clone()));
        let mut opts = DeployOpts::new(
            vars,
            ctx.store,
            ctx.ws_reader,
            ctx.prompter,
            ctx.selector,
            ctx.initializer,
            factory,
        );
        run_action(&mut opts).await
    }
}

#[derive(Subcommand, Debug)]
pub enum AppCommands {
    /// Create an application and a workspace in the current directory
    Init {
        /// Name of the application
        #[arg(default_value = "")]
        name: String,

        /// Domain the application's services are served under
        #[arg(long)]
        domain: Option<String>,
    },

    /// List applications
    Ls {
        #[arg(long)]
        json: bool,
    },
}

impl AppCommands {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        match self {
            AppCommands::Init { name, domain } => {
                let mut opts =
                    InitAppOpts::new(name, domain, ctx.store, ctx.ws_writer, ctx.prompter);
                run_action(&mut opts).await
            }
            AppCommands::Ls { json } => run_action(&mut ListAppOpts::new(json, ctx.store)).await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// Create an environment and register it with the application
    Init {
        #[arg(long, short = 'a')]
        app: Option<String>,

        /// Name of the environment
        #[arg(long, short = 'n', default_value = "")]
        name: String,

        /// Mark the environment as production
        #[arg(long)]
        prod: bool,

        /// Namespace to use instead of <app>-<env>
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Apply an environment manifest from the workspace
    Deploy {
        #[arg(long, short = 'a')]
        app: Option<String>,

        #[arg(long, short = 'n', default_value = "")]
        name: String,
    },

    /// List the environments of an application
    Ls {
        #[arg(long, short = 'a')]
        app: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

impl EnvCommands {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        match self {
            EnvCommands::Init {
                app,
                name,
                prod,
                namespace,
            } => {
                let vars = InitEnvVars {
                    app: ctx.resolve_app(app)?,
                    name,
                    prod,
                    namespace,
                };
                let mut opts = InitEnvOpts::new(
                    vars,
                    ctx.store,
                    ctx.ws_writer,
                    ctx.prompter,
                    ctx.env_deployer,
                );
                run_action(&mut opts).await
            }
            EnvCommands::Deploy { app, name } => {
                let vars = DeployEnvVars {
                    app: ctx.resolve_app(app)?,
                    name,
                };
                let mut opts = DeployEnvOpts::new(
                    vars,
                    ctx.store,
                    ctx.ws_reader,
                    ctx.selector,
                    ctx.env_deployer,
                );
                run_action(&mut opts).await
            }
            EnvCommands::Ls { app, json } => {
                let app = ctx.resolve_app(app)?;
                run_action(&mut ListEnvOpts::new(app, json, ctx.store)).await
            }
        }
    }
}

async fn deploy_workload(
    category: WorkloadCategory,
    args: WorkloadArgs,
    ctx: Collaborators,
) -> Result<()> {
    let app = ctx.resolve_app(args.app.clone())?;
    let mut opts = DeployWorkloadOpts::new(
        category,
        args.into_vars(app),
        ctx.store,
        ctx.ws_reader,
        ctx.selector,
        ctx.workload_deployer,
    );
    run_action(&mut opts).await
}

async fn list_workloads(
    category: WorkloadCategory,
    app: Option<String>,
    json: bool,
    ctx: Collaborators,
) -> Result<()> {
    let app = ctx.resolve_app(app)?;
    run_action(&mut ListWorkloadsOpts::new(category, app, json, ctx.store)).await
}

#[derive(Subcommand, Debug)]
pub enum SvcCommands {
    /// Deploy a service to an environment
    Deploy(WorkloadArgs),

    /// List the services of an application
    Ls {
        #[arg(long, short = 'a')]
        app: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the health and tasks of a deployed service
    Status {
        #[arg(long, short = 'a')]
        app: Option<String>,

        #[arg(long, short = 'n', default_value = "")]
        name: String,

        #[arg(long = "env", short = 'e', default_value = "")]
        env_name: String,

        #[arg(long)]
        json: bool,
    },
}

impl SvcCommands {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        match self {
            SvcCommands::Deploy(args) => deploy_workload(WorkloadCategory::Service, args, ctx).await,
            SvcCommands::Ls { app, json } => {
                list_workloads(WorkloadCategory::Service, app, json, ctx).await
            }
            SvcCommands::Status {
                app,
                name,
                env_name,
                json,
            } => {
                let vars = StatusVars {
                    app: ctx.resolve_app(app)?,
                    name,
                    env_name,
                    json,
                };
                let mut opts = StatusOpts::new(vars, ctx.store, ctx.selector, ctx.describer);
                run_action(&mut opts).await
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// Deploy a scheduled job to an environment
    Deploy(WorkloadArgs),

    /// List the jobs of an application
    Ls {
        #[arg(long, short = 'a')]
        app: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

impl JobCommands {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        match self {
            JobCommands::Deploy(args) => deploy_workload(WorkloadCategory::Job, args, ctx).await,
            JobCommands::Ls { app, json } => {
                list_workloads(WorkloadCategory::Job, app, json, ctx).await
            }
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RunLocalArgs {
    #[arg(long, short = 'a')]
    pub app: Option<String>,

    /// Name of the service or job
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Environment whose secrets and overrides are used
    #[arg(long = "env", short = 'e', default_value = "")]
    pub env_name: String,

    /// Publish a port as host:container instead of the manifest's port
    #[arg(long, value_name = "HOST:CONTAINER")]
    pub port_override: Vec<String>,

    /// Set a variable in a container: [container:]KEY=VALUE
    #[arg(long, value_name = "[CONTAINER:]KEY=VALUE")]
    pub env_var_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum RunCommands {
    /// Run a workload and its sidecars with the local container engine
    Local(RunLocalArgs),
}

impl RunCommands {
    pub async fn execute(self, ctx: Collaborators) -> Result<()> {
        match self {
            RunCommands::Local(args) => {
                let vars = RunLocalVars {
                    app: ctx.resolve_app(args.app)?,
                    name: args.name,
                    env_name: args.env_name,
                    port_overrides: args.port_override,
                    env_overrides: args.env_var_override,
                };
                let mut opts = RunLocalOpts::new(
                    vars,
                    ctx.store,
                    ctx.ws_reader,
                    ctx.selector,
                    ctx.secrets,
                    ctx.engine,
                );
                run_action(&mut opts).await
            }
        }
    }
}
