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

//! Renders a workload manifest into the Kubernetes objects that run it.

use super::pod::{platform_env_vars, PodSpecBuilder};
use super::service::{ServiceBuilder, ServiceType};
use crate::domain::manifest::{ScheduledJobManifest, WorkloadManifest, WorkloadProps};
use crate::domain::model::{Environment, WorkloadType};
use crate::infrastructure::constants::{
    ANNOTATION_RESTARTED_AT, JOB_HISTORY_LIMIT, LABEL_APP, LABEL_ENV, LABEL_MANAGED_BY,
    LABEL_MANAGED_BY_VALUE, LABEL_WORKLOAD, LABEL_WORKLOAD_TYPE, MAX_SURGE, MAX_UNAVAILABLE,
};
use crate::shared::error::{Result, WharfError};
use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment,
};
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Objects produced for one workload. Which fields are set depends on the
/// workload kind.
#[derive(Debug, Clone, Default)]
pub struct WorkloadResources {
    pub deployment: Option<Deployment>,
    pub service: Option<Service>,
    pub cron_job: Option<CronJob>,
}

impl WorkloadResources {
    /// `Kind/name` of every object, for reporting.
    pub fn describe(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(d) = &self.deployment {
            out.push(format!("Deployment/{}", d.metadata.name.clone().unwrap_or_default()));
        }
        if let Some(s) = &self.service {
            out.push(format!("Service/{}", s.metadata.name.clone().unwrap_or_default()));
        }
        if let Some(c) = &self.cron_job {
            out.push(format!("CronJob/{}", c.metadata.name.clone().unwrap_or_default()));
        }
        out
    }
}

fn type_label(t: WorkloadType) -> String {
    t.as_str().to_lowercase().replace(' ', "-")
}

pub struct WorkloadResourceBuilder {
    env: Environment,
    manifest: WorkloadManifest,
    image: String,
    env_file_config: Option<String>,
    restarted_at: Option<String>,
}

impl WorkloadResourceBuilder {
    pub fn new(env: Environment, manifest: WorkloadManifest, image: String) -> Self {
        Self {
            env,
            manifest,
            image,
            env_file_config: None,
            restarted_at: None,
        }
    }

    pub fn with_env_file_config(mut self, configmap: Option<String>) -> Self {
        self.env_file_config = configmap;
        self
    }

    /// Stamps the pod template so the rollout restarts pods even if nothing
    /// else changed.
    pub fn with_restart(mut self, timestamp: String) -> Self {
        self.restarted_at = Some(timestamp);
        self
    }

    pub fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );
        labels.insert(LABEL_APP.to_string(), self.env.app.clone());
        labels.insert(LABEL_ENV.to_string(), self.env.name.clone());
        labels.insert(LABEL_WORKLOAD.to_string(), self.manifest.name().to_string());
        labels.insert(
            LABEL_WORKLOAD_TYPE.to_string(),
            type_label(self.manifest.workload_type()),
        );
        labels
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_WORKLOAD.to_string(), self.manifest.name().to_string());
        labels
    }

    pub fn build(&self) -> Result<WorkloadResources> {
        match &self.manifest {
            WorkloadManifest::LoadBalancedWebService(m) => {
                let port = m.props.image.port.ok_or_else(|| {
                    WharfError::validation(format!(
                        "{} {} needs image.port",
                        WorkloadType::LoadBalancedWebService,
                        m.props.name
                    ))
                })?;
                let health_check = m
                    .http
                    .healthcheck
                    .clone()
                    .or_else(|| Some(m.http.path.clone()));
                Ok(WorkloadResources {
                    deployment: Some(self.build_deployment(&m.props, health_check)?),
                    service: Some(self.build_service(&m.props, ServiceType::LoadBalancer, port)),
                    cron_job: None,
                })
            }
            WorkloadManifest::BackendService(m) => Ok(WorkloadResources {
                deployment: Some(self.build_deployment(&m.props, None)?),
                service: m
                    .props
                    .image
                    .port
                    .map(|port| self.build_service(&m.props, ServiceType::ClusterIP, port)),
                cron_job: None,
            }),
            WorkloadManifest::WorkerService(m) => Ok(WorkloadResources {
                deployment: Some(self.build_deployment(&m.props, None)?),
                service: None,
                cron_job: None,
            }),
            WorkloadManifest::ScheduledJob(m) => Ok(WorkloadResources {
                deployment: None,
                service: None,
                cron_job: Some(self.build_cron_job(m)?),
            }),
        }
    }

    fn pod_spec<'a>(&self, props: &'a WorkloadProps) -> PodSpecBuilder<'a> {
        PodSpecBuilder::new(
            props,
            self.image.clone(),
            platform_env_vars(&self.env.app, &self.env.name, &props.name),
        )
        .with_env_file_config(self.env_file_config.clone())
    }

    fn pod_template(&self, spec: PodSpec) -> PodTemplateSpec {
        let annotations = self.restarted_at.as_ref().map(|ts| {
            let mut annotations = BTreeMap::new();
            annotations.insert(ANNOTATION_RESTARTED_AT.to_string(), ts.clone());
            annotations
        });

        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(self.get_labels()),
                annotations,
                ..Default::default()
            }),
            spec: Some(spec),
        }
    }

    fn metadata(&self, name: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(self.env.namespace.clone()),
            labels: Some(self.get_labels()),
            ..Default::default()
        }
    }

    fn build_deployment(
        &self,
        props: &WorkloadProps,
        health_check: Option<String>,
    ) -> Result<Deployment> {
        let spec = self.pod_spec(props).with_health_check(health_check).build()?;

        Ok(Deployment {
            metadata: self.metadata(&props.name),
            spec: Some(DeploymentSpec {
                replicas: Some(props.desired_count() as i32),
                selector: LabelSelector {
                    match_labels: Some(self.get_selector_labels()),
                    ..Default::default()
                },
                strategy: Some(DeploymentStrategy {
                    type_: Some("RollingUpdate".to_string()),
                    rolling_update: Some(RollingUpdateDeployment {
                        max_surge: Some(IntOrString::String(MAX_SURGE.to_string())),
                        max_unavailable: Some(IntOrString::String(MAX_UNAVAILABLE.to_string())),
                    }),
                }),
                template: self.pod_template(spec),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn build_service(&self, props: &WorkloadProps, service_type: ServiceType, port: u16) -> Service {
        ServiceBuilder::new(
            props.name.clone(),
            self.env.namespace.clone(),
            service_type,
            port,
            self.get_labels(),
        )
        .build()
    }

    fn build_cron_job(&self, job: &ScheduledJobManifest) -> Result<CronJob> {
        let spec = self
            .pod_spec(&job.props)
            .with_restart_policy("Never")
            .build()?;

        Ok(CronJob {
            metadata: self.metadata(&job.props.name),
            spec: Some(CronJobSpec {
                schedule: job.schedule.clone(),
                concurrency_policy: Some("Forbid".to_string()),
                successful_jobs_history_limit: Some(JOB_HISTORY_LIMIT),
                failed_jobs_history_limit: Some(JOB_HISTORY_LIMIT),
                job_template: JobTemplateSpec {
                    metadata: None,
                    spec: Some(JobSpec {
                        backoff_limit: job.retries.map(|r| r as i32),
                        active_deadline_seconds: job.timeout.map(i64::from),
                        template: self.pod_template(spec),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}
