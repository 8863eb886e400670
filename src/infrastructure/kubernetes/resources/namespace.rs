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

use crate::domain::manifest::ResourceQuotaConfig;
use crate::infrastructure::constants::{LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE};
use k8s_openapi::api::core::v1::{Namespace, ResourceQuota, ResourceQuotaSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

pub struct NamespaceBuilder {
    name: String,
    labels: BTreeMap<String, String>,
}

impl NamespaceBuilder {
    pub fn new(name: String) -> Self {
        Self {
            name,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_labels(mut self, labels: &BTreeMap<String, String>) -> Self {
        self.labels.extend(labels.clone());
        self
    }

    pub fn build(&self) -> Namespace {
        let mut labels = self.labels.clone();
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );

        Namespace {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

pub struct ResourceQuotaBuilder {
    namespace: String,
    quota: ResourceQuotaConfig,
}

impl ResourceQuotaBuilder {
    pub fn new(namespace: String, quota: ResourceQuotaConfig) -> Self {
        Self { namespace, quota }
    }

    pub fn name(&self) -> String {
        format!("{}-quota", self.namespace)
    }

    pub fn build(&self) -> ResourceQuota {
        let mut hard = BTreeMap::new();
        if let Some(cpu) = &self.quota.cpu {
            hard.insert("requests.cpu".to_string(), Quantity(cpu.clone()));
        }
        if let Some(memory) = &self.quota.memory {
            hard.insert("requests.memory".to_string(), Quantity(memory.clone()));
        }
        if let Some(pods) = self.quota.pods {
            hard.insert("pods".to_string(), Quantity(pods.to_string()));
        }

        ResourceQuota {
            metadata: ObjectMeta {
                name: Some(self.name()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(ResourceQuotaSpec {
                hard: Some(hard),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
