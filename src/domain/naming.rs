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

use crate::shared::error::{Result, WharfError};
use regex::Regex;
use std::sync::OnceLock;

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z]([a-z0-9-]*[a-z0-9])?$").expect("name regex is valid")
    })
}

/// Names end up inside Kubernetes object names, so they must be DNS-1123
/// labels short enough to leave room for the `<app>-<env>` namespace prefix.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(WharfError::validation(format!("{} name must not be empty", kind)));
    }
    if name.len() > 30 {
        return Err(WharfError::validation(format!(
            "{} name {} must be at most 30 characters",
            kind, name
        )));
    }
    if !name_regex().is_match(name) {
        return Err(WharfError::validation(format!(
            "{} name {} is invalid: must start with a lowercase letter and contain only lowercase letters, numbers, and hyphens",
            kind, name
        )));
    }
    Ok(())
}
