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

//! Record store backed by labelled ConfigMaps in a dedicated namespace.

use crate::domain::model::{Application, Environment, Workload};
use crate::domain::ports::Store;
use crate::infrastructure::constants::{
    LABEL_APP, LABEL_RECORD_KIND, RECORD_KIND_APPLICATION, RECORD_KIND_ENVIRONMENT,
    RECORD_KIND_WORKLOAD,
};
use crate::infrastructure::kubernetes::client::{is_status, label_selector, KubeClient};
use crate::infrastructure::kubernetes::resources::{
    decode_record, NamespaceBuilder, RecordConfigMapBuilder,
};
use crate::shared::error::{Result, WharfError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::PostParams;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub struct KubeStore {
    client: KubeClient,
    namespace: String,
}

fn application_record_name(app: &str) -> String {
    format!("application.{}", app)
}

fn environment_record_name(app: &str, env: &str) -> String {
    format!("environment.{}.{}", app, env)
}

fn workload_record_name(app: &str, name: &str) -> String {
    format!("workload.{}.{}", app, name)
}

impl KubeStore {
    pub fn new(client: KubeClient, namespace: String) -> Self {
        Self { client, namespace }
    }

    async fn get_record<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.client.get_opt::<ConfigMap>(&self.namespace, name).await? {
            Some(cm) => Ok(Some(decode_record(&cm)?)),
            None => Ok(None),
        }
    }

    async fn list_records<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        app: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut labels = vec![(LABEL_RECORD_KIND, kind)];
        if let Some(app) = app {
            labels.push((LABEL_APP, app));
        }
        let selector = label_selector(labels);
        debug!(selector = %selector, "listing store records");

        self.client
            .list::<ConfigMap>(&self.namespace, &selector)
            .await?
            .iter()
            .map(|cm| decode_record::<T>(cm))
            .collect()
    }

    async fn create_record<T: Serialize>(
        &self,
        kind: &'static str,
        record_name: String,
        app: &str,
        display_name: &str,
        record: &T,
    ) -> Result<()> {
        let namespace = NamespaceBuilder::new(self.namespace.clone()).build();
        self.client.apply_namespace(&namespace).await?;

        let configmap = RecordConfigMapBuilder::new(
            kind,
            record_name,
            self.namespace.clone(),
            app.to_string(),
        )
        .build(record)?;

        let api = self.client.api::<ConfigMap>(&self.namespace);
        match api.create(&PostParams::default(), &configmap).await {
            Ok(_) => Ok(()),
            Err(e) if is_status(&e, 409) => {
                Err(WharfError::already_exists(kind, display_name, app))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Store for KubeStore {
    async fn get_application(&self, name: &str) -> Result<Application> {
        self.get_record(&application_record_name(name))
            .await?
            .ok_or_else(|| WharfError::NoSuchApplication {
                name: name.to_string(),
            })
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        let mut apps: Vec<Application> =
            self.list_records(RECORD_KIND_APPLICATION, None).await?;
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apps)
    }

    async fn create_application(&self, app: &Application) -> Result<()> {
        self.create_record(
            RECORD_KIND_APPLICATION,
            application_record_name(&app.name),
            &app.name,
            &app.name,
            app,
        )
        .await
    }

    async fn get_environment(&self, app: &str, env: &str) -> Result<Environment> {
        self.get_record(&environment_record_name(app, env))
            .await?
            .ok_or_else(|| WharfError::no_such_environment(app, env))
    }

    async fn list_environments(&self, app: &str) -> Result<Vec<Environment>> {
        let mut envs: Vec<Environment> = self
            .list_records(RECORD_KIND_ENVIRONMENT, Some(app))
            .await?;
        envs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(envs)
    }

    async fn create_environment(&self, env: &Environment) -> Result<()> {
        self.create_record(
            RECORD_KIND_ENVIRONMENT,
            environment_record_name(&env.app, &env.name),
            &env.app,
            &env.name,
            env,
        )
        .await
    }

    async fn get_workload(&self, app: &str, name: &str) -> Result<Workload> {
        self.get_record(&workload_record_name(app, name))
            .await?
            .ok_or_else(|| WharfError::no_such_workload(app, name))
    }

    async fn list_workloads(&self, app: &str) -> Result<Vec<Workload>> {
        let mut workloads: Vec<Workload> =
            self.list_records(RECORD_KIND_WORKLOAD, Some(app)).await?;
        workloads.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(workloads)
    }

    async fn create_workload(&self, workload: &Workload) -> Result<()> {
        self.create_record(
            RECORD_KIND_WORKLOAD,
            workload_record_name(&workload.app, &workload.name),
            &workload.app,
            &workload.name,
            workload,
        )
        .await
    }
}
