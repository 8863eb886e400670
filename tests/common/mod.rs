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

//! In-memory fakes of every port, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use wharf::cli::action::{ActionCommand, CommandFactory};
use wharf::cli::deploy::DeployWkldVars;
use wharf::cli::env::{DeployEnvVars, InitEnvVars};
use wharf::domain::manifest::{workload_type_from_manifest, EnvironmentManifest, WorkloadManifest};
use wharf::domain::model::{
    Application, Environment, ServiceStatus, Workload, WorkloadCategory, WorkloadType,
};
use wharf::domain::ports::{
    ContainerEngine, ContainerSpec, DeployOutcome, DeployWorkloadInput, EnvironmentDeployer,
    Prompter, SecretResolver, Selector, StatusDescriber, Store, UploadArtifactsOutput,
    WorkloadDeployer, WorkloadInitializer, WorkspaceReader, WorkspaceWriter,
};
use wharf::shared::error::{Result, WharfError};

pub const LBWS_MANIFEST: &str = "name: api
type: Load Balanced Web Service
image:
  location: nginx:latest
  port: 80
http:
  path: /
  healthcheck: /health
variables:
  LOG_LEVEL: info
secrets:
  DB_PASSWORD: db/password
environments:
  prod:
    count: 3
";

pub const JOB_MANIFEST: &str = "name: report
type: Scheduled Job
image:
  location: busybox:latest
schedule: \"0 * * * *\"
";

pub fn err(msg: &str) -> WharfError {
    WharfError::validation(msg)
}

// ---------------------------------------------------------------------------
// Store

#[derive(Default)]
pub struct FakeStore {
    pub apps: Mutex<Vec<Application>>,
    pub envs: Mutex<Vec<Environment>>,
    pub workloads: Mutex<Vec<Workload>>,
    pub get_environment_error: Option<String>,
    pub list_workloads_error: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(self, app: &str) -> Self {
        self.apps.lock().unwrap().push(Application::new(app));
        self
    }

    pub fn with_env(self, app: &str, env: &str) -> Self {
        self.envs.lock().unwrap().push(Environment::new(app, env));
        self
    }

    pub fn with_workload(self, app: &str, name: &str, workload_type: WorkloadType) -> Self {
        self.workloads
            .lock()
            .unwrap()
            .push(Workload::new(app, name, workload_type));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn get_application(&self, name: &str) -> Result<Application> {
        self.record(format!("get_application {}", name));
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| WharfError::NoSuchApplication {
                name: name.to_string(),
            })
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn create_application(&self, app: &Application) -> Result<()> {
        self.record(format!("create_application {}", app.name));
        self.apps.lock().unwrap().push(app.clone());
        Ok(())
    }

    async fn get_environment(&self, app: &str, env: &str) -> Result<Environment> {
        self.record(format!("get_environment {} {}", app, env));
        if let Some(msg) = &self.get_environment_error {
            return Err(err(msg));
        }
        self.envs
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.app == app && e.name == env)
            .cloned()
            .ok_or_else(|| WharfError::no_such_environment(app, env))
    }

    async fn list_environments(&self, app: &str) -> Result<Vec<Environment>> {
        Ok(self
            .envs
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.app == app)
            .cloned()
            .collect())
    }

    async fn create_environment(&self, env: &Environment) -> Result<()> {
        self.record(format!("create_environment {} {}", env.app, env.name));
        self.envs.lock().unwrap().push(env.clone());
        Ok(())
    }

    async fn get_workload(&self, app: &str, name: &str) -> Result<Workload> {
        self.workloads
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.app == app && w.name == name)
            .cloned()
            .ok_or_else(|| WharfError::no_such_workload(app, name))
    }

    async fn list_workloads(&self, app: &str) -> Result<Vec<Workload>> {
        if let Some(msg) = &self.list_workloads_error {
            return Err(err(msg));
        }
        Ok(self
            .workloads
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.app == app)
            .cloned()
            .collect())
    }

    async fn create_workload(&self, workload: &Workload) -> Result<()> {
        self.workloads.lock().unwrap().push(workload.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Workspace

#[derive(Default)]
pub struct FakeWorkspace {
    pub app: Option<String>,
    pub envs: Vec<String>,
    pub manifests: HashMap<String, String>,
    pub env_manifests: HashMap<String, String>,
    pub files: HashMap<String, String>,
    pub list_environments_error: Option<String>,
    pub written: Mutex<Vec<String>>,
}

impl FakeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, app: &str) -> Self {
        self.app = Some(app.to_string());
        self
    }

    pub fn with_env(mut self, env: &str) -> Self {
        self.envs.push(env.to_string());
        self.env_manifests.insert(
            env.to_string(),
            EnvironmentManifest::new(env).to_yaml().unwrap(),
        );
        self
    }

    pub fn with_manifest(mut self, name: &str, contents: &str) -> Self {
        self.manifests.insert(name.to_string(), contents.to_string());
        self
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    fn names_in(&self, category: WorkloadCategory) -> Vec<String> {
        let mut names: Vec<String> = self
            .manifests
            .iter()
            .filter(|(name, raw)| {
                workload_type_from_manifest(name, raw.as_bytes())
                    .map(|t| t.category() == category)
                    .unwrap_or(false)
            })
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl WorkspaceReader for FakeWorkspace {
    fn app_name(&self) -> Result<String> {
        self.app.clone().ok_or(WharfError::NoWorkspace)
    }

    fn list_environments(&self) -> Result<Vec<String>> {
        if let Some(msg) = &self.list_environments_error {
            return Err(err(msg));
        }
        Ok(self.envs.clone())
    }

    fn list_workloads(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.manifests.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn list_services(&self) -> Result<Vec<String>> {
        Ok(self.names_in(WorkloadCategory::Service))
    }

    fn list_jobs(&self) -> Result<Vec<String>> {
        Ok(self.names_in(WorkloadCategory::Job))
    }

    fn read_workload_manifest(&self, name: &str) -> Result<Vec<u8>> {
        self.manifests
            .get(name)
            .map(|m| m.as_bytes().to_vec())
            .ok_or_else(|| err(&format!("no manifest for {}", name)))
    }

    fn read_environment_manifest(&self, name: &str) -> Result<Vec<u8>> {
        self.env_manifests
            .get(name)
            .map(|m| m.as_bytes().to_vec())
            .ok_or_else(|| err(&format!("no manifest for {}", name)))
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .map(|m| m.as_bytes().to_vec())
            .ok_or_else(|| err(&format!("no file {}", path)))
    }
}

impl WorkspaceWriter for FakeWorkspace {
    fn create_summary(&self, app: &str) -> Result<PathBuf> {
        self.written.lock().unwrap().push(format!("summary {}", app));
        Ok(PathBuf::from("wharf/.workspace"))
    }

    fn write_environment_manifest(&self, name: &str, _contents: &str) -> Result<PathBuf> {
        self.written.lock().unwrap().push(format!("environment {}", name));
        Ok(PathBuf::from(format!("wharf/environments/{}/manifest.yml", name)))
    }
}

// ---------------------------------------------------------------------------
// Prompter and selector

/// Answers prompts from a script; running out of answers is an error.
#[derive(Default)]
pub struct FakePrompter {
    pub confirms: Mutex<VecDeque<std::result::Result<bool, String>>>,
    pub inputs: Mutex<VecDeque<String>>,
    pub selections: Mutex<VecDeque<String>>,
    pub asked: Mutex<Vec<String>>,
}

impl FakePrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirming(answers: &[bool]) -> Self {
        let p = Self::default();
        p.confirms
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| Ok(*a)));
        p
    }

    pub fn failing_confirm(msg: &str) -> Self {
        let p = Self::default();
        p.confirms.lock().unwrap().push_back(Err(msg.to_string()));
        p
    }

    pub fn with_input(self, value: &str) -> Self {
        self.inputs.lock().unwrap().push_back(value.to_string());
        self
    }

    pub fn with_selection(self, value: &str) -> Self {
        self.selections.lock().unwrap().push_back(value.to_string());
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for FakePrompter {
    fn confirm(&self, message: &str, _help: &str, _default: bool) -> Result<bool> {
        self.asked.lock().unwrap().push(message.to_string());
        match self.confirms.lock().unwrap().pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(msg)) => Err(err(&msg)),
            None => Err(err(&format!("unexpected confirm: {}", message))),
        }
    }

    fn get(&self, message: &str, _help: &str, _default: Option<&str>) -> Result<String> {
        self.asked.lock().unwrap().push(message.to_string());
        self.inputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| err(&format!("unexpected input: {}", message)))
    }

    fn select_one(&self, message: &str, _help: &str, options: &[String]) -> Result<String> {
        self.asked.lock().unwrap().push(message.to_string());
        let answer = self
            .selections
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| err(&format!("unexpected select: {}", message)))?;
        assert!(options.contains(&answer), "{} not among {:?}", answer, options);
        Ok(answer)
    }
}

#[derive(Default)]
pub struct FakeSelector {
    pub workload: Option<String>,
    pub environment: Option<String>,
    pub error: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: &str, value: &Option<String>) -> Result<String> {
        self.calls.lock().unwrap().push(call.to_string());
        if let Some(msg) = &self.error {
            return Err(err(msg));
        }
        value.clone().ok_or_else(|| err(&format!("no candidates for {}", call)))
    }
}

#[async_trait]
impl Selector for FakeSelector {
    async fn workload(&self, _prompt: &str, _help: &str) -> Result<String> {
        self.answer("workload", &self.workload)
    }

    async fn workspace_workload(
        &self,
        category: WorkloadCategory,
        _prompt: &str,
        _help: &str,
    ) -> Result<String> {
        self.answer(&format!("workspace_workload {}", category), &self.workload)
    }

    async fn app_workload(
        &self,
        category: WorkloadCategory,
        _prompt: &str,
        _help: &str,
        _app: &str,
    ) -> Result<String> {
        self.answer(&format!("app_workload {}", category), &self.workload)
    }

    async fn environment(&self, _prompt: &str, _help: &str, _app: &str) -> Result<String> {
        self.answer("environment", &self.environment)
    }

    async fn workspace_environment(&self, _prompt: &str, _help: &str) -> Result<String> {
        self.answer("workspace_environment", &self.environment)
    }
}

// ---------------------------------------------------------------------------
// Initializer

#[derive(Default)]
pub struct RecordingInitializer {
    pub calls: Mutex<Vec<(String, String, WorkloadType)>>,
    pub error: Option<String>,
}

impl RecordingInitializer {
    pub fn calls(&self) -> Vec<(String, String, WorkloadType)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkloadInitializer for RecordingInitializer {
    async fn add_workload_to_app(
        &self,
        app: &str,
        name: &str,
        workload_type: WorkloadType,
    ) -> Result<()> {
        if let Some(msg) = &self.error {
            return Err(err(msg));
        }
        self.calls
            .lock()
            .unwrap()
            .push((app.to_string(), name.to_string(), workload_type));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command factory

/// Command whose lifecycle steps append `"<step> <label>"` to a shared log
/// and fail when a matching entry is configured.
pub struct FakeCommand {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
    failures: HashMap<String, String>,
    recommendations: Vec<String>,
}

impl FakeCommand {
    fn step(&self, step: &str) -> Result<()> {
        let key = format!("{} {}", step, self.label);
        self.log.lock().unwrap().push(key.clone());
        match self.failures.get(&key) {
            Some(msg) => Err(err(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActionCommand for FakeCommand {
    async fn validate(&mut self) -> Result<()> {
        self.step("validate")
    }

    async fn ask(&mut self) -> Result<()> {
        self.step("ask")
    }

    async fn execute(&mut self) -> Result<()> {
        self.step("execute")
    }

    fn recommend_actions(&self) -> Result<Vec<String>> {
        self.step("recommend")?;
        Ok(self.recommendations.clone())
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub log: Arc<Mutex<Vec<String>>>,
    pub failures: HashMap<String, String>,
    pub recommendations: Vec<String>,
    pub deploy_vars: Mutex<Vec<(WorkloadCategory, DeployWkldVars)>>,
    pub init_env_vars: Mutex<Vec<InitEnvVars>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `"<step> <label>"` fail with `msg`, e.g. `("ask", "svc deploy")`.
    pub fn failing(mut self, step: &str, label: &str, msg: &str) -> Self {
        self.failures
            .insert(format!("{} {}", step, label), msg.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn command(&self, label: &str) -> Box<dyn ActionCommand> {
        Box::new(FakeCommand {
            label: label.to_string(),
            log: self.log.clone(),
            failures: self.failures.clone(),
            recommendations: self.recommendations.clone(),
        })
    }
}

impl CommandFactory for FakeFactory {
    fn init_env(&self, vars: InitEnvVars) -> Box<dyn ActionCommand> {
        self.init_env_vars.lock().unwrap().push(vars);
        self.command("env init")
    }

    fn deploy_env(&self, _vars: DeployEnvVars) -> Box<dyn ActionCommand> {
        self.command("env deploy")
    }

    fn deploy_workload(
        &self,
        category: WorkloadCategory,
        vars: DeployWkldVars,
    ) -> Box<dyn ActionCommand> {
        self.deploy_vars.lock().unwrap().push((category, vars));
        self.command(&format!("{} deploy", category.short_name()))
    }
}

// ---------------------------------------------------------------------------
// Platform

#[derive(Default)]
pub struct FakeDeployer {
    pub uploaded: Mutex<Vec<String>>,
    pub deployed: Mutex<Vec<DeployWorkloadInput>>,
    pub bootstrapped: Mutex<Vec<Environment>>,
    pub env_deployed: Mutex<Vec<(String, EnvironmentManifest)>>,
    pub endpoint: Option<String>,
    pub deploy_error: Option<String>,
}

#[async_trait]
impl WorkloadDeployer for FakeDeployer {
    async fn upload_artifacts(
        &self,
        _env: &Environment,
        manifest: &WorkloadManifest,
    ) -> Result<UploadArtifactsOutput> {
        self.uploaded
            .lock()
            .unwrap()
            .push(manifest.name().to_string());
        Ok(UploadArtifactsOutput {
            image: manifest.props().image_location()?.to_string(),
            env_file_config: None,
        })
    }

    async fn deploy_workload(&self, input: &DeployWorkloadInput) -> Result<DeployOutcome> {
        if let Some(msg) = &self.deploy_error {
            return Err(err(msg));
        }
        self.deployed.lock().unwrap().push(input.clone());
        Ok(DeployOutcome {
            endpoint: self.endpoint.clone(),
            resources: vec![format!("Deployment/{}", input.manifest.name())],
        })
    }
}

#[async_trait]
impl EnvironmentDeployer for FakeDeployer {
    async fn bootstrap(&self, env: &Environment) -> Result<()> {
        self.bootstrapped.lock().unwrap().push(env.clone());
        Ok(())
    }

    async fn deploy_environment(
        &self,
        env: &Environment,
        manifest: &EnvironmentManifest,
    ) -> Result<()> {
        self.env_deployed
            .lock()
            .unwrap()
            .push((env.name.clone(), manifest.clone()));
        Ok(())
    }
}

pub struct FakeDescriber {
    pub status: ServiceStatus,
}

#[async_trait]
impl StatusDescriber for FakeDescriber {
    async fn describe(&self, env: &Environment, name: &str) -> Result<ServiceStatus> {
        let mut status = self.status.clone();
        status.env = env.name.clone();
        status.name = name.to_string();
        Ok(status)
    }
}

#[derive(Default)]
pub struct FakeSecrets {
    pub values: HashMap<String, String>,
    pub error: Option<String>,
}

#[async_trait]
impl SecretResolver for FakeSecrets {
    async fn resolve(&self, _namespace: &str, reference: &str) -> Result<String> {
        if let Some(msg) = &self.error {
            return Err(err(msg));
        }
        self.values
            .get(reference)
            .cloned()
            .ok_or_else(|| err(&format!("secret {} not found", reference)))
    }
}

/// Container engine that reports a container as stopped after it has been
/// polled `exit_after` times.
#[derive(Default)]
pub struct FakeEngine {
    pub started: Mutex<Vec<ContainerSpec>>,
    pub stopped: Mutex<Vec<String>>,
    pub polls: Mutex<BTreeMap<String, usize>>,
    pub exit_after: HashMap<String, usize>,
    pub never_running: Vec<String>,
}

impl FakeEngine {
    pub fn started_names(&self) -> Vec<String> {
        self.started
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn run(&self, spec: &ContainerSpec) -> Result<()> {
        self.started.lock().unwrap().push(spec.clone());
        Ok(())
    }

    async fn is_running(&self, name: &str) -> Result<bool> {
        if self.never_running.iter().any(|n| n == name) {
            return Ok(false);
        }
        let mut polls = self.polls.lock().unwrap();
        let count = polls.entry(name.to_string()).or_insert(0);
        *count += 1;
        Ok(match self.exit_after.get(name) {
            Some(limit) => *count <= *limit,
            None => true,
        })
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.stopped.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
