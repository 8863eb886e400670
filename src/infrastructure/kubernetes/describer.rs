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

use crate::domain::model::{Environment, ServiceStatus, TaskStatus};
use crate::domain::ports::StatusDescriber;
use crate::infrastructure::constants::LABEL_WORKLOAD;
use crate::infrastructure::kubernetes::client::{label_selector, KubeClient};
use crate::infrastructure::kubernetes::deployer::service_endpoint;
use crate::shared::error::{Result, WharfError};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use tracing::debug;

/// Reads a service's Deployment, pods and Service back from the cluster.
pub struct KubeStatusDescriber {
    client: KubeClient,
}

impl KubeStatusDescriber {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }
}

pub fn task_status(pod: &Pod) -> TaskStatus {
    let status = pod.status.as_ref();
    let containers = status
        .and_then(|s| s.container_statuses.as_ref())
        .cloned()
        .unwrap_or_default();

    TaskStatus {
        id: pod.metadata.name.clone().unwrap_or_default(),
        phase: status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        ready: !containers.is_empty() && containers.iter().all(|c| c.ready),
        restarts: containers
            .iter()
            .map(|c| c.restart_count.max(0) as u32)
            .sum(),
        started_at: status.and_then(|s| s.start_time.as_ref()).map(|t| t.0),
    }
}

#[async_trait]
impl StatusDescriber for KubeStatusDescriber {
    async fn describe(&self, env: &Environment, name: &str) -> Result<ServiceStatus> {
        let deployment = self
            .client
            .get_opt::<Deployment>(&env.namespace, name)
            .await?
            .ok_or_else(|| {
                WharfError::validation(format!(
                    "service {} has not been deployed to environment {}",
                    name, env.name
                ))
            })?;

        let desired = deployment
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(0)
            .max(0) as u32;
        let running = deployment
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0)
            .max(0) as u32;
        let image = deployment
            .spec
            .as_ref()
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|p| p.containers.first())
            .and_then(|c| c.image.clone());

        let selector = label_selector([(LABEL_WORKLOAD, name)]);
        let pods = self.client.list::<Pod>(&env.namespace, &selector).await?;
        debug!(service = name, pods = pods.len(), "described service");
        let mut tasks: Vec<TaskStatus> = pods.iter().map(task_status).collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));

        let endpoint = self
            .client
            .get_opt::<Service>(&env.namespace, name)
            .await?
            .and_then(|svc| service_endpoint(&svc, &env.namespace));

        Ok(ServiceStatus {
            app: env.app.clone(),
            env: env.name.clone(),
            name: name.to_string(),
            desired,
            running,
            image,
            endpoint,
            tasks,
        })
    }
}
