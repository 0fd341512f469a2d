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

use std::fmt;

use serde_json::Value;

use super::BluetoothError;

/// Kinds of request that may wait on an asynchronous outcome. Each kind owns
/// at most one ledger slot.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum OperationKind {
    Enable,
    Disable,
    Discoverability,
    Discovery,
    /// Discovery caller parked while the location permission is requested.
    PermissionGate,
}

impl OperationKind {
    /// Streaming kinds keep their slot open across partial deliveries.
    pub fn is_streaming(self) -> bool {
        matches!(self, OperationKind::Discovery)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Enable => "enable",
            OperationKind::Disable => "disable",
            OperationKind::Discoverability => "discoverability",
            OperationKind::Discovery => "discovery",
            OperationKind::PermissionGate => "permission",
        };
        f.write_str(name)
    }
}

/// A caller-facing operation, as requested over the plugin bridge.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Operation {
    IsSupported,
    IsEnabled,
    Enable,
    Disable,
    QueryPairedDevices,
    StartDiscovery,
    StopDiscovery,
    /// `None` means the bridge gave no usable duration and the configured
    /// default applies.
    EnableDiscoverability { duration: Option<i64> },
}

impl Operation {
    /// Map a bridge action name and its JSON arguments to an `Operation`.
    pub fn parse(action: &str, args: &[Value]) -> Result<Self, BluetoothError> {
        let op = match action {
            "isSupported" => Operation::IsSupported,
            "isEnabled" => Operation::IsEnabled,
            "enable" => Operation::Enable,
            "disable" => Operation::Disable,
            "queryPairedDevices" => Operation::QueryPairedDevices,
            "startDiscovery" => Operation::StartDiscovery,
            "stopDiscovery" => Operation::StopDiscovery,
            "enableDiscoverability" => Operation::EnableDiscoverability {
                duration: args.first().and_then(parse_duration),
            },
            other => return Err(BluetoothError::UnknownAction(other.to_owned())),
        };
        Ok(op)
    }

    /// Bridge action name of this operation.
    pub fn action(&self) -> &'static str {
        match self {
            Operation::IsSupported => "isSupported",
            Operation::IsEnabled => "isEnabled",
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::QueryPairedDevices => "queryPairedDevices",
            Operation::StartDiscovery => "startDiscovery",
            Operation::StopDiscovery => "stopDiscovery",
            Operation::EnableDiscoverability { .. } => "enableDiscoverability",
        }
    }
}

/// Durations arrive either as JSON numbers or as numeric strings.
fn parse_duration(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
