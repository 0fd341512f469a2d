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

use std::sync::Arc;

use thiserror::Error;

use crate::api::RadioStack;
use crate::common::BluetoothError;

/// Why the gate refused an operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("radio not supported")]
    NotSupported,
    #[error("radio disabled")]
    Disabled,
}

impl From<GateError> for BluetoothError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::NotSupported => BluetoothError::NotSupported,
            GateError::Disabled => BluetoothError::Disabled,
        }
    }
}

/// Point-in-time view of the radio. Never cached: the radio can change
/// state at any moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityState {
    pub supported: bool,
    pub enabled: bool,
}

/// Answers "is there a radio" and "is it on". Pure queries against the
/// radio stack.
#[derive(Clone, Default)]
pub struct CapabilityGate {
    radio: Option<Arc<dyn RadioStack>>,
}

impl CapabilityGate {
    /// `None` models a host without an adapter, or one not yet initialized.
    pub fn new(radio: Option<Arc<dyn RadioStack>>) -> Self {
        CapabilityGate { radio }
    }

    pub fn check_supported(&self) -> bool {
        self.radio.is_some()
    }

    pub fn check_enabled(&self) -> bool {
        self.radio.as_ref().map_or(false, |radio| radio.is_on())
    }

    pub fn state(&self) -> CapabilityState {
        CapabilityState {
            supported: self.check_supported(),
            enabled: self.check_enabled(),
        }
    }

    /// The radio, if the gate lets `require_supported` through.
    pub fn require_supported(&self) -> Result<&Arc<dyn RadioStack>, GateError> {
        self.radio.as_ref().ok_or(GateError::NotSupported)
    }

    pub fn require_supported_and_enabled(&self) -> Result<&Arc<dyn RadioStack>, GateError> {
        let radio = self.require_supported()?;
        if radio.is_on() {
            Ok(radio)
        } else {
            Err(GateError::Disabled)
        }
    }
}
