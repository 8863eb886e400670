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

//! `wharf app init` and `wharf app ls`.

use crate::cli::action::ActionCommand;
use crate::cli::display::TableRenderer;
use crate::domain::model::Application;
use crate::domain::naming::validate_name;
use crate::domain::ports::{Prompter, Store, WorkspaceWriter};
use crate::shared::error::{Result, ResultExt};
use async_trait::async_trait;
use std::sync::Arc;

pub struct InitAppOpts {
    pub name: String,
    pub domain: Option<String>,
    store: Arc<dyn Store>,
    ws: Arc<dyn WorkspaceWriter>,
    prompt: Arc<dyn Prompter>,
}

impl InitAppOpts {
    pub fn new(
        name: String,
        domain: Option<String>,
        store: Arc<dyn Store>,
        ws: Arc<dyn WorkspaceWriter>,
        prompt: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            name,
            domain,
            store,
            ws,
            prompt,
        }
    }
}

#[async_trait]
impl ActionCommand for InitAppOpts {
    async fn validate(&mut self) -> Result<()> {
        if !self.name.is_empty() {
            validate_name("application", &self.name)?;
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if !self.name.is_empty() {
            return Ok(());
        }
        self.name = self
            .prompt
            .get(
                "What would you like to name your application?",
                "Services and environments are grouped under an application.",
                None,
            )
            .context_msg("get application name")?;
        validate_name("application", &self.name)
    }

    async fn execute(&mut self) -> Result<()> {
        match self.store.get_application(&self.name).await {
            Ok(_) => println!("Application {} already exists", self.name),
            Err(e) if e.is_not_found() => {
                let mut app = Application::new(&self.name);
                app.domain = self.domain.clone();
                self.store
                    .create_application(&app)
                    .await
                    .with_context_msg(|| format!("create application {}", self.name))?;
                println!("✓ Application {} created", self.name);
            }
            Err(e) => return Err(e).with_context_msg(|| format!("get application {}", self.name)),
        }

        let path = self
            .ws
            .create_summary(&self.name)
            .context_msg("create workspace")?;
        println!("✓ Workspace summary written to {}", path.display());
        Ok(())
    }

    fn recommend_actions(&self) -> Result<Vec<String>> {
        Ok(vec![
            "Run `wharf env init` to add an environment to your application.".to_string(),
            "Write a manifest under wharf/<name>/manifest.yml, then run `wharf deploy`."
                .to_string(),
        ])
    }
}

pub struct ListAppOpts {
    pub json: bool,
    store: Arc<dyn Store>,
}

impl ListAppOpts {
    pub fn new(json: bool, store: Arc<dyn Store>) -> Self {
        Self { json, store }
    }
}

#[async_trait]
impl ActionCommand for ListAppOpts {
    async fn validate(&mut self) -> Result<()> {
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let apps = self
            .store
            .list_applications()
            .await
            .context_msg("list applications")?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&apps)?);
        } else {
            println!("{}", TableRenderer::new().render_applications(&apps));
        }
        Ok(())
    }
}
