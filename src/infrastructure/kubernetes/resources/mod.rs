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

//! Builders for the Kubernetes objects wharf manages

pub mod configmap;
pub mod namespace;
pub mod pod;
pub mod service;
pub mod workload;

pub use self::configmap::{decode_record, EnvFileConfigMapBuilder, RecordConfigMapBuilder};
pub use self::namespace::{NamespaceBuilder, ResourceQuotaBuilder};
pub use self::pod::{platform_env_vars, EnvironmentBuilder, PodSpecBuilder};
pub use self::service::{ServiceBuilder, ServiceType};
pub use self::workload::{WorkloadResourceBuilder, WorkloadResources};
