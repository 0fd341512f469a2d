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

//! Routes asynchronous platform events back to the callers parked in the
//! request ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::common::{BluetoothError, OperationKind, RawDevice, Reply};
use crate::orchestrator::Orchestrator;

/// Activity result code for a dialog the user accepted.
pub const RESULT_OK: i32 = -1;
/// Activity result code for a dialog the user dismissed.
pub const RESULT_CANCELED: i32 = 0;
pub const PERMISSION_GRANTED: i32 = 0;
pub const PERMISSION_DENIED: i32 = -1;

/// An event delivered by the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A system dialog closed.
    ActivityResult { request_code: i32, result_code: i32 },
    /// The user answered a runtime permission request.
    PermissionResult {
        request_code: i32,
        grant_results: Vec<i32>,
    },
    /// The user answered the disable confirmation prompt.
    Confirmation { accepted: bool },
    /// The radio saw a device while discovering.
    DeviceFound(RawDevice),
}

pub struct BroadcastRouter {
    orchestrator: Arc<Orchestrator>,
    // Cleared by teardown.
    active: AtomicBool,
}

impl BroadcastRouter {
    /// Create a router and subscribe to device-found broadcasts.
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        if let Ok(radio) = orchestrator.gate().require_supported() {
            radio.subscribe();
        }
        BroadcastRouter {
            orchestrator,
            active: AtomicBool::new(true),
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn route(&self, event: HostEvent) {
        if !self.is_active() {
            debug!("Router torn down, dropped {:?}.", event);
            return;
        }
        match event {
            HostEvent::ActivityResult {
                request_code,
                result_code,
            } => self.on_activity_result(request_code, result_code),
            HostEvent::PermissionResult {
                request_code,
                grant_results,
            } => self.on_permission_result(request_code, &grant_results),
            HostEvent::Confirmation { accepted } => self.on_confirmation(accepted),
            HostEvent::DeviceFound(raw) => self.on_device_found(raw),
        }
    }

    pub fn on_activity_result(&self, request_code: i32, result_code: i32) {
        let config = self.orchestrator.config();
        let ledger = self.orchestrator.ledger();
        if request_code == config.enable_request_code {
            let outcome = if result_code == RESULT_OK {
                info!("Bluetooth turned on.");
                Ok(Reply::Empty)
            } else {
                Err(BluetoothError::UnableToEnable)
            };
            ledger.resolve_once(OperationKind::Enable, outcome);
        } else if request_code == config.discoverability_request_code {
            // On success the result code carries the granted duration.
            let outcome = if result_code == RESULT_CANCELED {
                Err(BluetoothError::UserCancelled)
            } else {
                info!("Discoverable for {}s.", result_code);
                Ok(Reply::Empty)
            };
            ledger.resolve_once(OperationKind::Discoverability, outcome);
        } else {
            debug!("Ignoring activity result for request {}.", request_code);
        }
    }

    pub fn on_permission_result(&self, request_code: i32, grant_results: &[i32]) {
        if request_code != self.orchestrator.config().location_permission_request_code {
            debug!("Ignoring permission result for request {}.", request_code);
            return;
        }

        let granted =
            !grant_results.is_empty() && grant_results.iter().all(|&r| r == PERMISSION_GRANTED);
        let ledger = self.orchestrator.ledger();
        if !granted {
            warn!("Discovery permission denied: {:?}", grant_results);
            ledger.resolve_once(
                OperationKind::PermissionGate,
                Err(BluetoothError::PermissionDenied),
            );
            return;
        }

        match ledger.take(OperationKind::PermissionGate) {
            Some(pending) => {
                info!("Discovery permission granted.");
                self.orchestrator.start_discovery(true, pending.into_handle());
            }
            None => debug!("Permission granted with no discovery waiting."),
        }
    }

    pub fn on_confirmation(&self, accepted: bool) {
        let Some(pending) = self.orchestrator.ledger().take(OperationKind::Disable) else {
            debug!("Confirmation answered with no disable waiting.");
            return;
        };

        let outcome = if accepted {
            self.orchestrator.turn_off()
        } else {
            info!("User declined to turn Bluetooth off.");
            Err(BluetoothError::UserDeclined)
        };
        pending.into_handle().complete(outcome);
    }

    /// Add a sighting to the active discovery session and stream the
    /// session's device set. Sightings outside a session are discarded.
    pub fn on_device_found(&self, raw: RawDevice) {
        let ledger = self.orchestrator.ledger();
        if !ledger.is_pending(OperationKind::Discovery) {
            trace!("No discovery session, discarded {:?}.", raw);
            return;
        }

        match self.orchestrator.directory().observe(raw) {
            Ok(snapshot) => {
                ledger.resolve_streaming(OperationKind::Discovery, Reply::Devices(snapshot));
            }
            Err(err) => warn!("Dropping discovered device: {}", err),
        }
    }

    /// Unsubscribe and drop every waiting caller without notifying it.
    /// Returns `false` if already torn down.
    pub fn teardown(&self) -> bool {
        if !self.active.swap(false, Ordering::SeqCst) {
            return false;
        }
        if let Ok(radio) = self.orchestrator.gate().require_supported() {
            radio.unsubscribe();
        }
        let cleared = self.orchestrator.ledger().clear_all();
        self.orchestrator.directory().reset();
        info!("Router torn down, {} pending requests dropped.", cleared);
        true
    }
}

impl Drop for BroadcastRouter {
    fn drop(&mut self) {
        self.teardown();
    }
}
