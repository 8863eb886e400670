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

use crate::domain::manifest::{EnvironmentManifest, WorkloadManifest};
use crate::domain::model::Environment;
use crate::domain::ports::{
    DeployOutcome, DeployWorkloadInput, EnvironmentDeployer, UploadArtifactsOutput,
    WorkloadDeployer, WorkspaceReader,
};
use crate::infrastructure::constants::{
    LABEL_APP, LABEL_ENV, LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE, ROLLOUT_POLL_SECS,
};
use crate::infrastructure::kubernetes::client::KubeClient;
use crate::infrastructure::kubernetes::resources::{
    EnvFileConfigMapBuilder, NamespaceBuilder, ResourceQuotaBuilder, WorkloadResourceBuilder,
};
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct KubeDeployer {
    client: KubeClient,
    workspace: Arc<dyn WorkspaceReader>,
    rollout_timeout: Duration,
}

impl KubeDeployer {
    pub fn new(
        client: KubeClient,
        workspace: Arc<dyn WorkspaceReader>,
        rollout_timeout: Duration,
    ) -> Self {
        Self {
            client,
            workspace,
            rollout_timeout,
        }
    }

    fn env_labels(env: &Environment) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );
        labels.insert(LABEL_APP.to_string(), env.app.clone());
        labels.insert(LABEL_ENV.to_string(), env.name.clone());
        labels
    }

    /// Polls the Deployment until every replica runs the latest template.
    async fn wait_for_rollout(&self, namespace: &str, name: &str) -> Result<()> {
        let poll = Duration::from_secs(ROLLOUT_POLL_SECS);
        let attempts = (self.rollout_timeout.as_secs() / ROLLOUT_POLL_SECS).max(1) as usize;

        let check = || async move {
            let deployment = self
                .client
                .get_opt::<Deployment>(namespace, name)
                .await?
                .ok_or_else(|| {
                    WharfError::Kube(format!("Deployment {} disappeared during rollout", name))
                })?;
            if rollout_complete(&deployment) {
                Ok(())
            } else {
                Err(WharfError::Timeout(format!(
                    "Deployment {} did not finish rolling out within {}s",
                    name,
                    self.rollout_timeout.as_secs()
                )))
            }
        };

        check
            .retry(
                ConstantBuilder::default()
                    .with_delay(poll)
                    .with_max_times(attempts),
            )
            .when(|e| matches!(e, WharfError::Timeout(_)))
            .notify(|_, _| debug!(deployment = name, "waiting for rollout"))
            .await
    }

    async fn endpoint(&self, namespace: &str, name: &str) -> Result<Option<String>> {
        let service = match self.client.get_opt::<Service>(namespace, name).await? {
            Some(s) => s,
            None => return Ok(None),
        };
        Ok(service_endpoint(&service, namespace))
    }
}

/// A Deployment is rolled out once the controller has observed the latest
/// generation and every desired replica is updated and available.
pub fn rollout_complete(deployment: &Deployment) -> bool {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let generation = deployment.metadata.generation.unwrap_or(0);
    let Some(status) = deployment.status.as_ref() else {
        return false;
    };
    status.observed_generation.unwrap_or(0) >= generation
        && status.updated_replicas.unwrap_or(0) == desired
        && status.available_replicas.unwrap_or(0) == desired
        && status.replicas.unwrap_or(0) == desired
}

/// External address for a LoadBalancer service, or the in-cluster DNS name.
pub fn service_endpoint(service: &Service, namespace: &str) -> Option<String> {
    let name = service.metadata.name.as_deref()?;
    let ingress = service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first());
    if let Some(ingress) = ingress {
        if let Some(host) = ingress.hostname.as_ref().or(ingress.ip.as_ref()) {
            return Some(format!("http://{}", host));
        }
    }
    Some(format!("{}.{}.svc.cluster.local", name, namespace))
}

#[async_trait]
impl WorkloadDeployer for KubeDeployer {
    async fn upload_artifacts(
        &self,
        env: &Environment,
        manifest: &WorkloadManifest,
    ) -> Result<UploadArtifactsOutput> {
        let props = manifest.props();
        let image = props.image_location()?.to_string();

        let env_file_config = match &props.env_file {
            Some(path) => {
                let contents = self
                    .workspace
                    .read_file(path)
                    .with_context_msg(|| format!("read env file {}", path))?;
                let contents = String::from_utf8(contents).map_err(|_| {
                    WharfError::validation(format!("env file {} is not valid UTF-8", path))
                })?;
                let builder = EnvFileConfigMapBuilder::new(
                    props.name.clone(),
                    env.namespace.clone(),
                    Self::env_labels(env),
                );
                let configmap = builder.build(&contents)?;
                self.client.apply(&env.namespace, &configmap).await?;
                info!(file = %path, configmap = %builder.name(), "uploaded env file");
                Some(builder.name())
            }
            None => None,
        };

        Ok(UploadArtifactsOutput {
            image,
            env_file_config,
        })
    }

    async fn deploy_workload(&self, input: &DeployWorkloadInput) -> Result<DeployOutcome> {
        let env = &input.environment;
        let name = input.manifest.name().to_string();

        let mut builder = WorkloadResourceBuilder::new(
            env.clone(),
            input.manifest.clone(),
            input.artifacts.image.clone(),
        )
        .with_env_file_config(input.artifacts.env_file_config.clone());
        if input.force {
            builder = builder.with_restart(chrono::Utc::now().to_rfc3339());
        }
        let resources = builder.build()?;

        if let Some(deployment) = &resources.deployment {
            self.client.apply(&env.namespace, deployment).await?;
            println!("✓ Deployment {} applied", name);
        }
        if let Some(service) = &resources.service {
            self.client.apply(&env.namespace, service).await?;
            println!("✓ Service {} applied", name);
        }
        if let Some(cron_job) = &resources.cron_job {
            self.client.apply(&env.namespace, cron_job).await?;
            println!("✓ CronJob {} applied", name);
        }

        if resources.deployment.is_some() && !input.detach {
            println!("Waiting for {} to finish rolling out...", name);
            self.wait_for_rollout(&env.namespace, &name).await?;
        }

        let endpoint = if resources.service.is_some() {
            self.endpoint(&env.namespace, &name).await?
        } else {
            None
        };

        Ok(DeployOutcome {
            endpoint,
            resources: resources.describe(),
        })
    }
}

#[async_trait]
impl EnvironmentDeployer for KubeDeployer {
    async fn bootstrap(&self, env: &Environment) -> Result<()> {
        let namespace = NamespaceBuilder::new(env.namespace.clone())
            .with_labels(&Self::env_labels(env))
            .build();
        self.client.apply_namespace(&namespace).await?;
        info!(namespace = %env.namespace, "bootstrapped environment namespace");
        Ok(())
    }

    async fn deploy_environment(
        &self,
        env: &Environment,
        manifest: &EnvironmentManifest,
    ) -> Result<()> {
        let namespace = NamespaceBuilder::new(env.namespace.clone())
            .with_labels(&Self::env_labels(env))
            .with_labels(&manifest.namespace_labels)
            .build();
        self.client.apply_namespace(&namespace).await?;
        println!("✓ Namespace {} applied", env.namespace);

        if let Some(quota) = &manifest.resource_quota {
            let quota = ResourceQuotaBuilder::new(env.namespace.clone(), quota.clone()).build();
            self.client.apply(&env.namespace, &quota).await?;
            println!("✓ ResourceQuota applied");
        }
        Ok(())
    }
}
