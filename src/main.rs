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

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wharf::cli::{context::Collaborators, CliArgs};
use wharf::domain::config::{apply_to_settings, parse_dynamic_configs, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if !args.properties.is_empty() {
        let overrides = parse_dynamic_configs(&args.properties)?;
        apply_to_settings(&overrides, &mut settings)?;
    }

    let ctx = Collaborators::connect(settings).await?;
    args.command.execute(ctx).await?;
    Ok(())
}
