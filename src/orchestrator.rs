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

use tracing::{debug, info, warn};

use crate::api::{CallbackHandle, ConfirmationPrompt, PermissionSubsystem, Platform, SystemDialogs};
use crate::capability::CapabilityGate;
use crate::common::{BluetoothError, Operation, OperationKind, Reply};
use crate::config::{PluginConfig, MAX_DISCOVERABLE_DURATION};
use crate::directory::{self, DeviceDirectory};
use crate::ledger::RequestLedger;

/// The caller-facing operations. Each one validates, consults the
/// capability gate, parks the caller in the ledger if the outcome arrives
/// later, and then triggers the external side effect.
///
/// No operation blocks: outcomes are always delivered through the caller's
/// handle, possibly before the method returns.
pub struct Orchestrator {
    gate: CapabilityGate,
    dialogs: Arc<dyn SystemDialogs>,
    permissions: Arc<dyn PermissionSubsystem>,
    prompt: Arc<dyn ConfirmationPrompt>,
    ledger: Arc<RequestLedger>,
    directory: Arc<DeviceDirectory>,
    config: PluginConfig,
}

impl Orchestrator {
    pub fn new(platform: Platform, config: PluginConfig) -> Self {
        Orchestrator {
            gate: CapabilityGate::new(platform.radio),
            dialogs: platform.dialogs,
            permissions: platform.permissions,
            prompt: platform.prompt,
            ledger: Arc::new(RequestLedger::new()),
            directory: Arc::new(DeviceDirectory::new()),
            config,
        }
    }

    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    pub fn ledger(&self) -> &Arc<RequestLedger> {
        &self.ledger
    }

    pub fn directory(&self) -> &Arc<DeviceDirectory> {
        &self.directory
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn execute(&self, operation: Operation, callback: CallbackHandle) {
        debug!("Executing {}.", operation.action());
        match operation {
            Operation::IsSupported => self.is_supported(callback),
            Operation::IsEnabled => self.is_enabled(callback),
            Operation::Enable => self.enable(callback),
            Operation::Disable => self.disable(callback),
            Operation::QueryPairedDevices => self.query_paired_devices(callback),
            Operation::StartDiscovery => self.start_discovery(false, callback),
            Operation::StopDiscovery => self.stop_discovery(callback),
            Operation::EnableDiscoverability { duration } => {
                self.enable_discoverability(duration, callback)
            }
        }
    }

    pub fn is_supported(&self, callback: CallbackHandle) {
        let outcome = self
            .gate
            .require_supported()
            .map(|_| Reply::Empty)
            .map_err(BluetoothError::from);
        callback.complete(outcome);
    }

    pub fn is_enabled(&self, callback: CallbackHandle) {
        let outcome = self
            .gate
            .require_supported_and_enabled()
            .map(|_| Reply::Empty)
            .map_err(BluetoothError::from);
        callback.complete(outcome);
    }

    /// Turn the radio on, asking the user through the OS dialog if needed.
    pub fn enable(&self, callback: CallbackHandle) {
        let radio = match self.gate.require_supported() {
            Ok(radio) => radio,
            Err(err) => return callback.on_error(err.into()),
        };
        if radio.is_on() {
            debug!("Radio already on.");
            return callback.on_success(Reply::Empty);
        }

        if let Err(err) = self.ledger.register(OperationKind::Enable, callback.clone()) {
            return callback.on_error(err.into());
        }
        info!("Requesting the user to turn Bluetooth on.");
        self.dialogs.request_enable(self.config.enable_request_code);
    }

    /// Turn the radio off once the user confirms.
    pub fn disable(&self, callback: CallbackHandle) {
        let radio = match self.gate.require_supported() {
            Ok(radio) => radio,
            Err(err) => return callback.on_error(err.into()),
        };
        if !radio.is_on() {
            debug!("Radio already off.");
            return callback.on_success(Reply::Empty);
        }

        if let Err(err) = self.ledger.register(OperationKind::Disable, callback.clone()) {
            return callback.on_error(err.into());
        }
        self.prompt.confirm(&self.config.disable_prompt);
    }

    /// Switch the radio off after the user said yes.
    pub(crate) fn turn_off(&self) -> Result<Reply, BluetoothError> {
        let radio = self.gate.require_supported()?;
        if radio.turn_off() {
            info!("Bluetooth turned off.");
            Ok(Reply::Empty)
        } else {
            warn!("Radio refused to turn off.");
            Err(BluetoothError::UnableToDisable)
        }
    }

    pub fn query_paired_devices(&self, callback: CallbackHandle) {
        let radio = match self.gate.require_supported() {
            Ok(radio) => radio,
            Err(err) => return callback.on_error(err.into()),
        };

        let outcome = match radio.bonded_devices() {
            Ok(raw) => Ok(Reply::Devices(directory::normalize_all(raw))),
            Err(err) => {
                warn!("Failed to read bonded devices: {}", err);
                Err(BluetoothError::QueryFailed)
            }
        };
        callback.complete(outcome);
    }

    /// Start a discovery session that streams the devices seen so far.
    ///
    /// Without the discovery permission the caller is parked while the
    /// permission is requested; once granted, the permission handler calls
    /// this again with `permission_granted` set.
    pub fn start_discovery(&self, permission_granted: bool, callback: CallbackHandle) {
        let radio = match self.gate.require_supported_and_enabled() {
            Ok(radio) => radio,
            Err(err) => return callback.on_error(err.into()),
        };

        let permission = &self.config.discovery_permission;
        if !permission_granted && !self.permissions.has_permission(permission) {
            if let Err(err) = self
                .ledger
                .register(OperationKind::PermissionGate, callback.clone())
            {
                return callback.on_error(err.into());
            }
            info!("Requesting {} before discovery.", permission);
            self.permissions
                .request_permission(self.config.location_permission_request_code, permission);
            return;
        }

        self.directory.reset();
        if let Some(previous) = self.ledger.supersede(OperationKind::Discovery, callback) {
            info!("Restarting discovery, dropping session of {:?}.", previous.age());
        }

        if !radio.begin_discovery() {
            warn!("Radio refused to start discovery.");
            self.ledger
                .resolve_once(OperationKind::Discovery, Err(BluetoothError::StartFailed));
            return;
        }
        info!("Discovery started.");
        self.ledger.resolve_streaming(
            OperationKind::Discovery,
            Reply::Devices(self.directory.snapshot()),
        );
    }

    /// End the discovery session. The session's stream is closed without a
    /// terminal delivery.
    pub fn stop_discovery(&self, callback: CallbackHandle) {
        let radio = match self.gate.require_supported() {
            Ok(radio) => radio,
            Err(err) => return callback.on_error(err.into()),
        };

        if !radio.cancel_discovery() {
            debug!("No discovery to cancel.");
        }
        self.ledger.clear(OperationKind::Discovery);
        self.ledger.clear(OperationKind::PermissionGate);
        self.directory.reset();
        callback.on_success(Reply::Empty);
    }

    /// Ask the user to make this device discoverable for `duration` seconds,
    /// or the configured default when `None`.
    pub fn enable_discoverability(&self, duration: Option<i64>, callback: CallbackHandle) {
        let duration =
            duration.unwrap_or_else(|| i64::from(self.config.default_discoverable_duration));
        let duration = match u32::try_from(duration) {
            Ok(d) if i64::from(d) <= MAX_DISCOVERABLE_DURATION => d,
            _ => {
                return callback.on_error(BluetoothError::InvalidArgument(String::from(
                    "Duration cannot be negative or greater than 1 hour",
                )))
            }
        };

        if let Err(err) = self.gate.require_supported() {
            return callback.on_error(err.into());
        }
        if let Err(err) = self
            .ledger
            .register(OperationKind::Discoverability, callback.clone())
        {
            return callback.on_error(err.into());
        }
        info!("Requesting discoverability for {}s.", duration);
        self.dialogs
            .request_discoverable(self.config.discoverability_request_code, duration);
    }
}
