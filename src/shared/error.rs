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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, WharfError>;

#[derive(Error, Debug)]
pub enum WharfError {
    #[error("Kubernetes API error: {0}")]
    Kube(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("couldn't find an application named {name}")]
    NoSuchApplication { name: String },

    #[error("couldn't find environment {env} in the application {app}")]
    NoSuchEnvironment { app: String, env: String },

    #[error("couldn't find workload {name} in the application {app}")]
    NoSuchWorkload { app: String, name: String },

    #[error("{resource_type} {name} already exists in application {app}")]
    AlreadyExists {
        resource_type: String,
        name: String,
        app: String,
    },

    #[error("could not find a workspace; run `wharf app init` first")]
    NoWorkspace,

    #[error("{0}")]
    Validation(String),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("container engine error: {0}")]
    Engine(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("background task failed: {0}")]
    Task(String),

    /// A failure from a deeper call, prefixed with what was being attempted.
    #[error("{context}: {cause}")]
    Context {
        context: String,
        cause: Box<WharfError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<kube::Error> for WharfError {
    fn from(err: kube::Error) -> Self {
        WharfError::Kube(err.to_string())
    }
}

impl From<tokio::task::JoinError> for WharfError {
    fn from(err: tokio::task::JoinError) -> Self {
        WharfError::Task(err.to_string())
    }
}

impl WharfError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn no_such_environment(app: impl Into<String>, env: impl Into<String>) -> Self {
        Self::NoSuchEnvironment {
            app: app.into(),
            env: env.into(),
        }
    }

    pub fn no_such_workload(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NoSuchWorkload {
            app: app.into(),
            name: name.into(),
        }
    }

    pub fn already_exists(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        app: impl Into<String>,
    ) -> Self {
        Self::AlreadyExists {
            resource_type: resource_type.into(),
            name: name.into(),
            app: app.into(),
        }
    }

    pub fn wrap(context: impl Into<String>, cause: impl Into<WharfError>) -> Self {
        Self::Context {
            context: context.into(),
            cause: Box::new(cause.into()),
        }
    }

    /// Innermost error once all context prefixes are peeled off.
    pub fn root(&self) -> &WharfError {
        match self {
            Self::Context { cause, .. } => cause.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            Self::NoSuchApplication { .. }
                | Self::NoSuchEnvironment { .. }
                | Self::NoSuchWorkload { .. }
        )
    }
}

/// Prefixes an error with a description of the step that failed.
pub trait ResultExt<T> {
    fn context_msg(self, context: impl Into<String>) -> Result<T>;

    fn with_context_msg<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<WharfError>,
{
    fn context_msg(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| WharfError::wrap(context, e))
    }

    fn with_context_msg<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| WharfError::wrap(f(), e))
    }
}
