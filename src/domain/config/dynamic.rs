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

use crate::domain::config::Settings;
use crate::shared::error::{Result, WharfError};
use std::collections::HashMap;

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for config in configs {
        let (key, value) = config.split_once('=').ok_or_else(|| {
            WharfError::config_error(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(WharfError::config_error(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

pub fn apply_to_settings(configs: &HashMap<String, String>, settings: &mut Settings) -> Result<()> {
    for (key, value) in configs {
        match key.as_str() {
            "settings.kubeconfig" => settings.kubeconfig = Some(value.clone()),
            "settings.context" => settings.context = Some(value.clone()),
            "settings.store-namespace" => settings.store_namespace = value.clone(),
            "settings.default-app" => settings.default_app = Some(value.clone()),
            "settings.rollout-timeout" => {
                settings.rollout_timeout_secs = value.parse::<u64>().map_err(|_| {
                    WharfError::config_error(format!(
                        "settings.rollout-timeout must be a number of seconds, got '{}'",
                        value
                    ))
                })?;
            }
            other => {
                return Err(WharfError::config_error(format!(
                    "Unknown config key: '{}'",
                    other
                )))
            }
        }
    }
    Ok(())
}
