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

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "wharf-cli";

/// Resource labels
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const LABEL_MANAGED_BY_VALUE: &str = "wharf";
pub const LABEL_APP: &str = "wharf.dev/app";
pub const LABEL_ENV: &str = "wharf.dev/env";
pub const LABEL_WORKLOAD: &str = "wharf.dev/workload";
pub const LABEL_WORKLOAD_TYPE: &str = "wharf.dev/workload-type";

/// Store record labels
pub const LABEL_RECORD_KIND: &str = "wharf.dev/kind";
pub const RECORD_KIND_APPLICATION: &str = "application";
pub const RECORD_KIND_ENVIRONMENT: &str = "environment";
pub const RECORD_KIND_WORKLOAD: &str = "workload";
pub const RECORD_DATA_KEY: &str = "record";

/// Annotations
pub const ANNOTATION_RESTARTED_AT: &str = "wharf.dev/restartedAt";

/// Defaults applied when a manifest leaves them out
pub const DEFAULT_CPU_MILLIS: u32 = 256;
pub const DEFAULT_MEMORY_MIB: u32 = 512;
pub const SERVICE_PORT: i32 = 80;

/// Rolling update settings
pub const MAX_UNAVAILABLE: &str = "25%";
pub const MAX_SURGE: &str = "25%";

/// Rollout polling interval in seconds
pub const ROLLOUT_POLL_SECS: u64 = 2;

/// Scheduled job defaults
pub const JOB_HISTORY_LIMIT: i32 = 3;

/// Local run
pub const PAUSE_IMAGE: &str = "registry.k8s.io/pause:3.9";
