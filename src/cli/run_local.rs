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

//! `wharf run local`: runs a workload and its sidecars on the local
//! container engine, with secrets read from the environment it is deployed
//! to.
//!
//! A pause container owns the network namespace and the published ports.
//! It is started first and stopped last; the workload containers join its
//! network.

use crate::cli::action::ActionCommand;
use crate::domain::manifest::WorkloadManifest;
use crate::domain::model::Environment;
use crate::domain::naming::validate_name;
use crate::domain::ports::{
    ContainerEngine, ContainerSpec, SecretResolver, Selector, Store, WorkspaceReader,
};
use crate::infrastructure::constants::PAUSE_IMAGE;
use crate::infrastructure::kubernetes::resources::configmap::parse_env_file;
use crate::infrastructure::kubernetes::resources::platform_env_vars;
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);
const PAUSE_START_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLocalVars {
    pub app: String,
    pub name: String,
    pub env_name: String,
    /// `host:container` port mappings.
    pub port_overrides: Vec<String>,
    /// `[container:]KEY=VALUE` variables.
    pub env_overrides: Vec<String>,
}

/// Parses a `host:container` port mapping.
pub fn parse_port_override(value: &str) -> Result<(u16, u16)> {
    let invalid = || {
        WharfError::validation(format!(
            "port override {:?} must have the form <host port>:<container port>",
            value
        ))
    };
    let (host, container) = value.split_once(':').ok_or_else(invalid)?;
    let host = host.parse::<u16>().map_err(|_| invalid())?;
    let container = container.parse::<u16>().map_err(|_| invalid())?;
    Ok((host, container))
}

/// Parses `[container:]KEY=VALUE`, returning `(container, key, value)`.
/// Without a container prefix the variable targets `default_container`.
pub fn parse_env_override(value: &str, default_container: &str) -> Result<(String, String, String)> {
    let (target, val) = value.split_once('=').ok_or_else(|| {
        WharfError::validation(format!(
            "env var override {:?} must have the form [container:]KEY=VALUE",
            value
        ))
    })?;
    let (container, key) = match target.split_once(':') {
        Some((container, key)) => (container, key),
        None => (default_container, target),
    };
    if key.is_empty() || container.is_empty() {
        return Err(WharfError::validation(format!(
            "env var override {:?} must have the form [container:]KEY=VALUE",
            value
        )));
    }
    Ok((container.to_string(), key.to_string(), val.to_string()))
}

/// Everything needed to start a workload locally.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRunPlan {
    pub pause: ContainerSpec,
    pub containers: Vec<ContainerSpec>,
    /// Secret references keyed by container name, then by variable name.
    pub secrets: BTreeMap<String, BTreeMap<String, String>>,
    /// `--env-var-override` values keyed by container name.
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocalRunPlan {
    /// Adds resolved secret values to each container's environment.
    /// Overrides still win over secrets of the same name.
    pub fn inject_secrets(&mut self, resolved: &HashMap<String, BTreeMap<String, String>>) {
        for container in self.containers.iter_mut() {
            if let Some(values) = resolved.get(&container.name) {
                container.env.extend(values.clone());
            }
            if let Some(values) = self.overrides.get(&container.name) {
                container.env.extend(values.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ContainerState {
    name: String,
    running: bool,
}

pub struct RunLocalOpts {
    pub vars: RunLocalVars,
    store: Arc<dyn Store>,
    ws: Arc<dyn WorkspaceReader>,
    sel: Arc<dyn Selector>,
    secrets: Arc<dyn SecretResolver>,
    engine: Arc<dyn ContainerEngine>,
    poll_interval: Duration,
    pause_timeout: Duration,
}

impl RunLocalOpts {
    pub fn new(
        vars: RunLocalVars,
        store: Arc<dyn Store>,
        ws: Arc<dyn WorkspaceReader>,
        sel: Arc<dyn Selector>,
        secrets: Arc<dyn SecretResolver>,
        engine: Arc<dyn ContainerEngine>,
    ) -> Self {
        Self {
            vars,
            store,
            ws,
            sel,
            secrets,
            engine,
            poll_interval: STATUS_POLL_INTERVAL,
            pause_timeout: PAUSE_START_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_pause_timeout(mut self, timeout: Duration) -> Self {
        self.pause_timeout = timeout;
        self
    }

    /// Lays out the pause container, the workload containers and the
    /// secrets each container needs.
    pub fn plan(&self, env: &Environment, manifest: &WorkloadManifest) -> Result<LocalRunPlan> {
        let props = manifest.props();
        let main_name = format!("{}-{}-{}", env.app, env.name, props.name);
        let pause_name = format!("{}-pause", main_name);
        let platform = platform_env_vars(&env.app, &env.name, &props.name);

        let mut main_env = platform.clone();
        if let Some(path) = &props.env_file {
            let contents = self
                .ws
                .read_file(path)
                .with_context_msg(|| format!("read env file {}", path))?;
            main_env.extend(parse_env_file(&String::from_utf8_lossy(&contents))?);
        }
        main_env.extend(props.variables.clone());

        let mut ports: BTreeMap<u16, u16> = BTreeMap::new();
        if let Some(port) = props.image.port {
            ports.insert(port, port);
        }

        let mut containers = vec![ContainerSpec {
            name: main_name.clone(),
            image: props.image_location()?.to_string(),
            command: props.command.clone(),
            env: main_env,
            ports: Vec::new(),
            network_of: Some(pause_name.clone()),
        }];
        let mut secrets = BTreeMap::new();
        secrets.insert(main_name.clone(), props.secrets.clone());

        for (sidecar_name, sidecar) in &props.sidecars {
            let name = format!("{}-{}", main_name, sidecar_name);
            let mut sidecar_env = platform.clone();
            sidecar_env.extend(sidecar.variables.clone());
            if let Some(port) = sidecar.port {
                ports.insert(port, port);
            }
            containers.push(ContainerSpec {
                name: name.clone(),
                image: sidecar.image.clone(),
                command: None,
                env: sidecar_env,
                ports: Vec::new(),
                network_of: Some(pause_name.clone()),
            });
            secrets.insert(name, sidecar.secrets.clone());
        }

        for value in &self.vars.port_overrides {
            let (host, container) = parse_port_override(value)?;
            ports.insert(container, host);
        }

        let mut overrides: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for value in &self.vars.env_overrides {
            let (target, key, val) = parse_env_override(value, &props.name)?;
            let target = if target == props.name {
                main_name.clone()
            } else {
                format!("{}-{}", main_name, target)
            };
            let container = containers
                .iter_mut()
                .find(|c| c.name == target)
                .ok_or_else(|| {
                    WharfError::validation(format!(
                        "env var override {:?} names a container that is not part of {}",
                        value, props.name
                    ))
                })?;
            container.env.insert(key.clone(), val.clone());
            overrides.entry(target).or_default().insert(key, val);
        }

        let pause = ContainerSpec {
            name: pause_name,
            image: PAUSE_IMAGE.to_string(),
            command: None,
            env: BTreeMap::new(),
            ports: ports.into_iter().map(|(container, host)| (host, container)).collect(),
            network_of: None,
        };

        Ok(LocalRunPlan {
            pause,
            containers,
            secrets,
            overrides,
        })
    }

    /// Resolves every container's secrets concurrently. The first failure
    /// cancels the remaining lookups.
    pub async fn resolve_secrets(
        &self,
        namespace: &str,
        secrets: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<HashMap<String, BTreeMap<String, String>>> {
        let resolved = Arc::new(Mutex::new(HashMap::new()));
        let mut tasks = JoinSet::new();

        for (container, refs) in secrets {
            if refs.is_empty() {
                continue;
            }
            let container = container.clone();
            let refs = refs.clone();
            let namespace = namespace.to_string();
            let resolver = self.secrets.clone();
            let resolved = resolved.clone();
            tasks.spawn(async move {
                let mut values = BTreeMap::new();
                for (key, reference) in refs {
                    let value = resolver
                        .resolve(&namespace, &reference)
                        .await
                        .with_context_msg(|| format!("secret {} for container {}", key, container))?;
                    values.insert(key, value);
                }
                resolved.lock().await.insert(container, values);
                Ok::<(), WharfError>(())
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined.map_err(WharfError::from).and_then(|r| r) {
                tasks.abort_all();
                return Err(WharfError::wrap("get secrets", e));
            }
        }

        let values = std::mem::take(&mut *resolved.lock().await);
        Ok(values)
    }

    fn spawn_watcher(
        &self,
        watched: Arc<Mutex<Vec<String>>>,
        tx: mpsc::Sender<Result<ContainerState>>,
    ) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let interval = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let names = watched.lock().await.clone();
                for name in names {
                    let state = engine
                        .is_running(&name)
                        .await
                        .map(|running| ContainerState { name, running });
                    if tx.send(state).await.is_err() {
                        return;
                    }
                }
            }
        })
    }

    async fn wait_for_pause(
        &self,
        pause: &str,
        rx: &mut mpsc::Receiver<Result<ContainerState>>,
    ) -> Result<()> {
        let wait = async {
            while let Some(state) = rx.recv().await {
                match state? {
                    ContainerState { name, running: true } if name == pause => return Ok(()),
                    _ => continue,
                }
            }
            Err(WharfError::Engine("container status watcher stopped".to_string()))
        };
        tokio::time::timeout(self.pause_timeout, wait)
            .await
            .map_err(|_| {
                WharfError::Timeout(format!(
                    "container {} did not start within {:?}",
                    pause, self.pause_timeout
                ))
            })?
    }

    async fn supervise(
        &self,
        plan: &LocalRunPlan,
        watched: &Arc<Mutex<Vec<String>>>,
        rx: &mut mpsc::Receiver<Result<ContainerState>>,
    ) -> Result<()> {
        try_join_all(plan.containers.iter().map(|c| self.engine.run(c)))
            .await
            .context_msg("start containers")?;
        watched
            .lock()
            .await
            .extend(plan.containers.iter().map(|c| c.name.clone()));
        println!(
            "✓ Running {} locally, press Ctrl-C to stop",
            self.vars.name
        );

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => return Ok(()),
                state = rx.recv() => match state {
                    Some(Ok(ContainerState { name, running: false })) => {
                        println!("Container {} exited", name);
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(WharfError::wrap("check container status", e)),
                    None => return Ok(()),
                },
            }
        }
    }

    /// Stops the pause container last. Workload containers are only stopped
    /// when an attempt was made to start them.
    async fn stop_all(&self, plan: &LocalRunPlan, workloads_started: bool) {
        println!("Stopping containers...");
        let workloads: &[ContainerSpec] = if workloads_started {
            &plan.containers
        } else {
            &[]
        };
        let results = join_all(workloads.iter().map(|c| self.engine.stop(&c.name))).await;
        for (container, result) in workloads.iter().zip(results) {
            if let Err(e) = result {
                warn!(container = %container.name, error = %e, "failed to stop container");
            }
        }
        if let Err(e) = self.engine.stop(&plan.pause.name).await {
            warn!(container = %plan.pause.name, error = %e, "failed to stop container");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, stopping containers"),
        _ = terminate => info!("Received SIGTERM, stopping containers"),
    }
}

#[async_trait]
impl ActionCommand for RunLocalOpts {
    async fn validate(&mut self) -> Result<()> {
        self.store
            .get_application(&self.vars.app)
            .await
            .with_context_msg(|| format!("get application {}", self.vars.app))?;
        if !self.vars.name.is_empty() {
            validate_name("workload", &self.vars.name)?;
        }
        if !self.vars.env_name.is_empty() {
            self.store
                .get_environment(&self.vars.app, &self.vars.env_name)
                .await
                .with_context_msg(|| format!("get environment {}", self.vars.env_name))?;
        }
        for value in &self.vars.port_overrides {
            parse_port_override(value)?;
        }
        Ok(())
    }

    async fn ask(&mut self) -> Result<()> {
        if self.vars.name.is_empty() {
            self.vars.name = self
                .sel
                .workload(
                    "Select a workload to run locally",
                    "Workloads with a manifest in your workspace.",
                )
                .await
                .context_msg("select workload")?;
        }
        if self.vars.env_name.is_empty() {
            self.vars.env_name = self
                .sel
                .environment(
                    "Select an environment to read secrets from",
                    "Secrets and overrides come from this environment.",
                    &self.vars.app,
                )
                .await
                .context_msg("select environment")?;
        }
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        let env = self
            .store
            .get_environment(&self.vars.app, &self.vars.env_name)
            .await
            .with_context_msg(|| format!("get environment {}", self.vars.env_name))?;
        let raw = self
            .ws
            .read_workload_manifest(&self.vars.name)
            .with_context_msg(|| format!("read manifest for workload {}", self.vars.name))?;
        let manifest = WorkloadManifest::parse(&self.vars.name, &raw)?.for_environment(&env.name);
        manifest.validate()?;

        let mut plan = self.plan(&env, &manifest)?;
        let resolved = self.resolve_secrets(&env.namespace, &plan.secrets).await?;
        plan.inject_secrets(&resolved);
        debug!(containers = plan.containers.len(), "local run plan ready");

        self.engine
            .run(&plan.pause)
            .await
            .with_context_msg(|| format!("start container {}", plan.pause.name))?;

        let watched = Arc::new(Mutex::new(vec![plan.pause.name.clone()]));
        let (tx, mut rx) = mpsc::channel(STATUS_CHANNEL_CAPACITY);
        let watcher = self.spawn_watcher(watched.clone(), tx);

        let (result, workloads_started) = match self
            .wait_for_pause(&plan.pause.name, &mut rx)
            .await
            .context_msg("wait for pause container")
        {
            Ok(()) => (self.supervise(&plan, &watched, &mut rx).await, true),
            Err(e) => (Err(e), false),
        };
        watcher.abort();
        self.stop_all(&plan, workloads_started).await;
        result
    }
}
