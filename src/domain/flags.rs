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

use std::fmt;
use std::str::FromStr;

/// A boolean flag that may also be left unset.
///
/// `--init-env` means `Yes`, `--init-env=false` means `No` and omitting the
/// flag entirely means `Unset`, in which case the command asks the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unset,
    Yes,
    No,
}

impl TriState {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::Yes => Some(true),
            TriState::No => Some(false),
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => TriState::Unset,
            Some(true) => TriState::Yes,
            Some(false) => TriState::No,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

impl FromStr for TriState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "unset" => Ok(TriState::Unset),
            "true" | "yes" | "1" => Ok(TriState::Yes),
            "false" | "no" | "0" => Ok(TriState::No),
            other => Err(format!("invalid boolean value {:?}", other)),
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriState::Unset => f.write_str("unset"),
            TriState::Yes => f.write_str("true"),
            TriState::No => f.write_str("false"),
        }
    }
}
