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
use thiserror::Error;

use super::OperationKind;

/// Library error type. Every variant is terminal for the operation that
/// produced it and carries a stable code (see [`BluetoothError::kind`]).
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum BluetoothError {
    /// The host has no Bluetooth radio, or the plugin was built without one.
    #[error("No Bluetooth device available")]
    NotSupported,
    /// The radio is present but currently switched off.
    #[error("Bluetooth device is disabled")]
    Disabled,
    /// The user or the OS refused the enable dialog.
    #[error("Unable to enable Bluetooth")]
    UnableToEnable,
    /// The radio refused to switch off after the user confirmed.
    #[error("Unable to disable Bluetooth")]
    UnableToDisable,
    /// The radio refused to begin a discovery session.
    #[error("Unable to start discovery")]
    StartFailed,
    /// The bonded-device set could not be read.
    #[error("Unable to query paired devices")]
    QueryFailed,
    /// The location-class permission required for discovery was denied.
    #[error("Permission was denied")]
    PermissionDenied,
    /// The user dismissed the discoverability dialog.
    #[error("User cancelled operation")]
    UserCancelled,
    /// The user answered "no" to the disable confirmation.
    #[error("User declined to disable Bluetooth")]
    UserDeclined,
    /// Reported synchronously, before anything is registered, when an
    /// argument is out of range.
    #[error("{0}")]
    InvalidArgument(String),
    /// A request of the same kind is still waiting for its outcome.
    #[error("{0} request is already pending")]
    AlreadyPending(OperationKind),
    /// The bridge asked for an action this plugin does not implement.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

impl BluetoothError {
    /// Stable, machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            BluetoothError::NotSupported => "NOT_SUPPORTED",
            BluetoothError::Disabled => "DISABLED",
            BluetoothError::UnableToEnable => "UNABLE_TO_ENABLE",
            BluetoothError::UnableToDisable => "UNABLE_TO_DISABLE",
            BluetoothError::StartFailed => "START_FAILED",
            BluetoothError::QueryFailed => "QUERY_FAILED",
            BluetoothError::PermissionDenied => "PERMISSION_DENIED",
            BluetoothError::UserCancelled => "USER_CANCELLED",
            BluetoothError::UserDeclined => "USER_DECLINED",
            BluetoothError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BluetoothError::AlreadyPending(_) => "ALREADY_PENDING",
            BluetoothError::UnknownAction(_) => "UNKNOWN_ACTION",
        }
    }

    /// Shape handed to the bridge for an error delivery.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Serializable form of a [`BluetoothError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
}
