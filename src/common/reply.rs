// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;

use super::DeviceRecord;

/// Success payload delivered to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Plain acknowledgement, serialized as `null`.
    Empty,
    /// Paired devices, or the discovery set so far.
    Devices(Vec<DeviceRecord>),
}

impl Reply {
    pub fn devices(&self) -> Option<&[DeviceRecord]> {
        match self {
            Reply::Devices(devices) => Some(devices),
            Reply::Empty => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Plain records and a unit variant cannot fail to serialize.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
