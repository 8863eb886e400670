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

use crate::domain::manifest::parse_secret_ref;
use crate::domain::ports::SecretResolver;
use crate::infrastructure::kubernetes::client::KubeClient;
use crate::shared::error::{Result, WharfError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;

pub struct KubeSecretResolver {
    client: KubeClient,
}

impl KubeSecretResolver {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }
}

/// Value of `key` in a Secret, from either `data` or `stringData`.
pub fn secret_value(secret: &Secret, key: &str) -> Option<String> {
    if let Some(bytes) = secret.data.as_ref().and_then(|d| d.get(key)) {
        return String::from_utf8(bytes.0.clone()).ok();
    }
    secret
        .string_data
        .as_ref()
        .and_then(|d| d.get(key))
        .cloned()
}

#[async_trait]
impl SecretResolver for KubeSecretResolver {
    async fn resolve(&self, namespace: &str, reference: &str) -> Result<String> {
        let (name, key) = parse_secret_ref(reference)?;
        let secret = self
            .client
            .get_opt::<Secret>(namespace, name)
            .await?
            .ok_or_else(|| {
                WharfError::validation(format!(
                    "secret {} not found in namespace {}",
                    name, namespace
                ))
            })?;
        secret_value(&secret, key).ok_or_else(|| {
            WharfError::validation(format!("secret {} has no key {}", name, key))
        })
    }
}
