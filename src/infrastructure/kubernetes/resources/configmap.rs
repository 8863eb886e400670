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

use crate::infrastructure::constants::{
    LABEL_APP, LABEL_MANAGED_BY, LABEL_MANAGED_BY_VALUE, LABEL_RECORD_KIND, LABEL_WORKLOAD,
    RECORD_DATA_KEY,
};
use crate::shared::error::{Result, ResultExt, WharfError};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// Builds the ConfigMap that stores one application, environment or
/// workload record as JSON.
pub struct RecordConfigMapBuilder {
    kind: &'static str,
    name: String,
    namespace: String,
    app: String,
}

impl RecordConfigMapBuilder {
    pub fn new(kind: &'static str, name: String, namespace: String, app: String) -> Self {
        Self {
            kind,
            name,
            namespace,
            app,
        }
    }

    pub fn build<T: Serialize>(&self, record: &T) -> Result<ConfigMap> {
        let mut data = BTreeMap::new();
        data.insert(RECORD_DATA_KEY.to_string(), serde_json::to_string(record)?);

        Ok(ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.get_labels()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        })
    }

    pub fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_RECORD_KIND.to_string(), self.kind.to_string());
        labels.insert(LABEL_APP.to_string(), self.app.clone());
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );
        labels
    }
}

pub fn decode_record<T: DeserializeOwned>(configmap: &ConfigMap) -> Result<T> {
    let name = configmap.metadata.name.as_deref().unwrap_or_default();
    let raw = configmap
        .data
        .as_ref()
        .and_then(|d| d.get(RECORD_DATA_KEY))
        .ok_or_else(|| {
            WharfError::config_error(format!("record {} has no {} key", name, RECORD_DATA_KEY))
        })?;
    serde_json::from_str(raw).with_context_msg(|| format!("decode record {}", name))
}

/// Builds the ConfigMap holding the variables of a workload's env file.
pub struct EnvFileConfigMapBuilder {
    workload: String,
    namespace: String,
    labels: BTreeMap<String, String>,
}

impl EnvFileConfigMapBuilder {
    pub fn new(workload: String, namespace: String, labels: BTreeMap<String, String>) -> Self {
        Self {
            workload,
            namespace,
            labels,
        }
    }

    pub fn name(&self) -> String {
        format!("{}-env-file", self.workload)
    }

    pub fn build(&self, contents: &str) -> Result<ConfigMap> {
        let mut labels = self.labels.clone();
        labels.insert(LABEL_WORKLOAD.to_string(), self.workload.clone());

        Ok(ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.name()),
                namespace: Some(self.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            },
            data: Some(parse_env_file(contents)?),
            ..Default::default()
        })
    }
}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_env_file(contents: &str) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=').ok_or_else(|| {
            WharfError::validation(format!("env file line {}: expected KEY=VALUE", idx + 1))
        })?;
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        vars.insert(key.trim().to_string(), value.to_string());
    }
    Ok(vars)
}
