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

//! Container and pod template construction shared by every workload kind.

use crate::domain::manifest::{parse_secret_ref, SidecarConfig, WorkloadProps};
use crate::infrastructure::constants::{DEFAULT_CPU_MILLIS, DEFAULT_MEMORY_MIB};
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::{
    ConfigMapEnvSource, Container, ContainerPort, EnvFromSource, EnvVar, EnvVarSource,
    HTTPGetAction, PodSpec, Probe, ResourceRequirements, SecretKeySelector,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Variables every container of a workload receives so it can discover
/// where it runs.
pub fn platform_env_vars(app: &str, env: &str, workload: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert("WHARF_APPLICATION_NAME".to_string(), app.to_string());
    vars.insert("WHARF_ENVIRONMENT_NAME".to_string(), env.to_string());
    vars.insert("WHARF_SERVICE_NAME".to_string(), workload.to_string());
    vars
}

pub struct EnvironmentBuilder {
    plain: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
}

impl EnvironmentBuilder {
    pub fn new(platform_vars: BTreeMap<String, String>) -> Self {
        Self {
            plain: platform_vars,
            secrets: BTreeMap::new(),
        }
    }

    pub fn with_variables(mut self, vars: &BTreeMap<String, String>) -> Self {
        self.plain.extend(vars.clone());
        self
    }

    pub fn with_secrets(mut self, secrets: &BTreeMap<String, String>) -> Self {
        self.secrets.extend(secrets.clone());
        self
    }

    pub fn build(self) -> Result<Vec<EnvVar>> {
        let mut env_vars: Vec<EnvVar> = self
            .plain
            .into_iter()
            .map(|(name, value)| EnvVar {
                name,
                value: Some(value),
                ..Default::default()
            })
            .collect();

        for (name, reference) in &self.secrets {
            let (secret, key) = parse_secret_ref(reference)?;
            env_vars.push(EnvVar {
                name: name.clone(),
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: secret.to_string(),
                        key: key.to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            });
        }

        Ok(env_vars)
    }
}

fn resource_requirements(cpu_millis: u32, memory_mib: u32) -> ResourceRequirements {
    let mut requests = BTreeMap::new();
    requests.insert("cpu".to_string(), Quantity(format!("{}m", cpu_millis)));
    requests.insert("memory".to_string(), Quantity(format!("{}Mi", memory_mib)));

    let mut limits = BTreeMap::new();
    limits.insert("memory".to_string(), Quantity(format!("{}Mi", memory_mib)));

    ResourceRequirements {
        requests: Some(requests),
        limits: Some(limits),
        ..Default::default()
    }
}

fn container_ports(port: Option<u16>) -> Option<Vec<ContainerPort>> {
    port.map(|p| {
        vec![ContainerPort {
            container_port: i32::from(p),
            name: Some("http".to_string()),
            ..Default::default()
        }]
    })
}

/// Builds the pod spec for a workload: its main container followed by the
/// sidecars in name order.
pub struct PodSpecBuilder<'a> {
    props: &'a WorkloadProps,
    image: String,
    platform_vars: BTreeMap<String, String>,
    env_file_config: Option<String>,
    health_check_path: Option<String>,
    restart_policy: Option<String>,
}

impl<'a> PodSpecBuilder<'a> {
    pub fn new(props: &'a WorkloadProps, image: String, platform_vars: BTreeMap<String, String>) -> Self {
        Self {
            props,
            image,
            platform_vars,
            env_file_config: None,
            health_check_path: None,
            restart_policy: None,
        }
    }

    pub fn with_env_file_config(mut self, configmap: Option<String>) -> Self {
        self.env_file_config = configmap;
        self
    }

    pub fn with_health_check(mut self, path: Option<String>) -> Self {
        self.health_check_path = path;
        self
    }

    pub fn with_restart_policy(mut self, policy: &str) -> Self {
        self.restart_policy = Some(policy.to_string());
        self
    }

    pub fn build(&self) -> Result<PodSpec> {
        let mut containers = vec![self.build_main_container()?];
        for (name, sidecar) in &self.props.sidecars {
            containers.push(self.build_sidecar(name, sidecar)?);
        }

        Ok(PodSpec {
            containers,
            restart_policy: self.restart_policy.clone(),
            ..Default::default()
        })
    }

    fn build_main_container(&self) -> Result<Container> {
        let env = EnvironmentBuilder::new(self.platform_vars.clone())
            .with_variables(&self.props.variables)
            .with_secrets(&self.props.secrets)
            .build()?;

        let env_from = self.env_file_config.as_ref().map(|name| {
            vec![EnvFromSource {
                config_map_ref: Some(ConfigMapEnvSource {
                    name: name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }]
        });

        let readiness_probe = match (&self.health_check_path, self.props.image.port) {
            (Some(path), Some(port)) => Some(Probe {
                http_get: Some(HTTPGetAction {
                    path: Some(path.clone()),
                    port: IntOrString::Int(i32::from(port)),
                    ..Default::default()
                }),
                period_seconds: Some(10),
                ..Default::default()
            }),
            _ => None,
        };

        Ok(Container {
            name: self.props.name.clone(),
            image: Some(self.image.clone()),
            command: self.props.command.clone(),
            env: Some(env),
            env_from,
            ports: container_ports(self.props.image.port),
            resources: Some(resource_requirements(
                self.props.cpu.unwrap_or(DEFAULT_CPU_MILLIS),
                self.props.memory.unwrap_or(DEFAULT_MEMORY_MIB),
            )),
            readiness_probe,
            ..Default::default()
        })
    }

    fn build_sidecar(&self, name: &str, sidecar: &SidecarConfig) -> Result<Container> {
        let env = EnvironmentBuilder::new(self.platform_vars.clone())
            .with_variables(&sidecar.variables)
            .with_secrets(&sidecar.secrets)
            .build()?;

        Ok(Container {
            name: name.to_string(),
            image: Some(sidecar.image.clone()),
            env: Some(env),
            ports: container_ports(sidecar.port),
            ..Default::default()
        })
    }
}
