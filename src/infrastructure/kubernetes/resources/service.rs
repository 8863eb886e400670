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

use crate::infrastructure::constants::{LABEL_WORKLOAD, SERVICE_PORT};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    ClusterIP,
    LoadBalancer,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ClusterIP => "ClusterIP",
            ServiceType::LoadBalancer => "LoadBalancer",
        }
    }
}

/// Builds the Service in front of a workload's pods.
pub struct ServiceBuilder {
    workload: String,
    namespace: String,
    service_type: ServiceType,
    target_port: u16,
    labels: BTreeMap<String, String>,
}

impl ServiceBuilder {
    pub fn new(
        workload: String,
        namespace: String,
        service_type: ServiceType,
        target_port: u16,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            workload,
            namespace,
            service_type,
            target_port,
            labels,
        }
    }

    pub fn build(&self) -> Service {
        let mut selector = BTreeMap::new();
        selector.insert(LABEL_WORKLOAD.to_string(), self.workload.clone());

        Service {
            metadata: ObjectMeta {
                name: Some(self.workload.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.clone()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some(self.service_type.as_str().to_string()),
                ports: Some(vec![self.create_service_port()]),
                selector: Some(selector),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn create_service_port(&self) -> ServicePort {
        ServicePort {
            name: Some("http".to_string()),
            port: SERVICE_PORT,
            target_port: Some(IntOrString::Int(i32::from(self.target_port))),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }
    }
}
