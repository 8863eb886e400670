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

use crate::domain::ports::{ContainerEngine, ContainerSpec};
use crate::shared::error::{Result, WharfError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Runs containers through the `docker` CLI.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    binary: String,
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run_cli(&self, args: &[String]) -> Result<String> {
        debug!(command = %format!("{} {}", self.binary, args.join(" ")), "running container engine");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| WharfError::Engine(format!("{} {}: {}", self.binary, args[0], e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(WharfError::Engine(format!(
                "{} {}: {}",
                self.binary,
                args[0],
                if stderr.is_empty() { "unknown error".to_string() } else { stderr }
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Arguments for `docker run` that start `spec` detached.
pub fn run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--detach".to_string(),
        "--rm".to_string(),
        "--name".to_string(),
        spec.name.clone(),
    ];
    if let Some(network) = &spec.network_of {
        args.push("--network".to_string());
        args.push(format!("container:{}", network));
    }
    for (host, container) in &spec.ports {
        args.push("--publish".to_string());
        args.push(format!("{}:{}", host, container));
    }
    for (key, value) in &spec.env {
        args.push("--env".to_string());
        args.push(format!("{}={}", key, value));
    }
    args.push(spec.image.clone());
    if let Some(command) = &spec.command {
        args.extend(command.iter().cloned());
    }
    args
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn run(&self, spec: &ContainerSpec) -> Result<()> {
        self.run_cli(&run_args(spec)).await.map(|_| ())
    }

    async fn is_running(&self, name: &str) -> Result<bool> {
        let args = [
            "inspect".to_string(),
            "--format".to_string(),
            "{{.State.Running}}".to_string(),
            name.to_string(),
        ];
        match self.run_cli(&args).await {
            Ok(out) => Ok(out == "true"),
            // --rm removes exited containers, so a missing one has stopped.
            Err(WharfError::Engine(msg)) if msg.contains("No such") => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn stop(&self, name: &str) -> Result<()> {
        let args = ["rm".to_string(), "--force".to_string(), name.to_string()];
        self.run_cli(&args).await.map(|_| ())
    }
}
