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

use crate::domain::model::{Workload, WorkloadType};
use crate::domain::ports::{Store, WorkloadInitializer};
use crate::shared::error::{Result, ResultExt, WharfError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Registers workloads straight into the store, for manifests that were
/// written by hand instead of generated by an init command.
pub struct StoreWorkloadInitializer {
    store: Arc<dyn Store>,
}

impl StoreWorkloadInitializer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WorkloadInitializer for StoreWorkloadInitializer {
    async fn add_workload_to_app(
        &self,
        app: &str,
        name: &str,
        workload_type: WorkloadType,
    ) -> Result<()> {
        self.store
            .get_application(app)
            .await
            .with_context_msg(|| format!("get application {}", app))?;

        match self.store.create_workload(&Workload::new(app, name, workload_type)).await {
            Ok(()) => {
                info!(app, workload = name, r#type = %workload_type, "registered workload");
                Ok(())
            }
            // Registering twice is harmless.
            Err(WharfError::AlreadyExists { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
