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

use crate::infrastructure::constants::FIELD_MANAGER;
use crate::shared::error::{Result, WharfError};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{ListParams, Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Thin wrapper over a kube [`Client`] with the handful of typed calls the
/// store, deployers and describers share.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    pub async fn connect(
        kubeconfig_path: Option<String>,
        context: Option<String>,
    ) -> Result<Self> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        if kubeconfig_path.is_none() && context.is_none() {
            let client = Client::try_default().await.map_err(|e| {
                WharfError::Kube(format!("Failed to create Kubernetes client: {}", e))
            })?;
            return Ok(Self { client });
        }

        let kubeconfig = if let Some(path) = kubeconfig_path {
            Kubeconfig::read_from(path)
                .map_err(|e| WharfError::Kube(format!("Failed to load kubeconfig: {}", e)))?
        } else {
            Kubeconfig::read()
                .map_err(|e| WharfError::Kube(format!("Failed to load kubeconfig: {}", e)))?
        };

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                WharfError::Kube(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            WharfError::Kube(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client })
    }

    pub fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Server-side applies `obj`, creating it when it does not exist yet.
    pub async fn apply<K>(&self, namespace: &str, obj: &K) -> Result<K>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        K::DynamicType: Default,
    {
        let name = obj.meta().name.clone().ok_or_else(|| {
            WharfError::config_error(format!(
                "{} name is required",
                K::kind(&Default::default())
            ))
        })?;
        let api: Api<K> = self.api(namespace);
        let patch_params = PatchParams::apply(FIELD_MANAGER).force();
        Ok(api.patch(&name, &patch_params, &Patch::Apply(obj)).await?)
    }

    pub async fn get_opt<K>(&self, namespace: &str, name: &str) -> Result<Option<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = self.api(namespace);
        Ok(api.get_opt(name).await?)
    }

    pub async fn list<K>(&self, namespace: &str, label_selector: &str) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = self.api(namespace);
        let list_params = ListParams::default().labels(label_selector);
        Ok(api.list(&list_params).await?.items)
    }

    pub async fn apply_namespace(&self, namespace: &Namespace) -> Result<()> {
        let name = namespace
            .metadata
            .name
            .as_ref()
            .ok_or_else(|| WharfError::config_error("Namespace name is required"))?;
        let api: Api<Namespace> = Api::all(self.client.clone());
        let patch_params = PatchParams::apply(FIELD_MANAGER).force();
        api.patch(name, &patch_params, &Patch::Apply(namespace))
            .await?;
        Ok(())
    }
}

/// True when the API server answered with the given HTTP status.
pub fn is_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == code)
}

/// Builds a label selector string from key/value pairs.
pub fn label_selector<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    labels
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
