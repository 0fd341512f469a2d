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

//! The single-owner event loop. Client requests and host events are queued
//! as [`ProviderEvent`]s and processed one at a time on the engine thread.

use serde_json::Value;
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::CallbackHandle;
use crate::common::{Operation, RawDevice};
use crate::router::{BroadcastRouter, HostEvent};

pub enum ProviderEvent {
    Request {
        operation: Operation,
        callback: CallbackHandle,
    },
    Host(HostEvent),
    Stop,
}

pub struct Engine {
    // Receive events from providers.
    provider_rx: mpsc::UnboundedReceiver<ProviderEvent>,
    router: BroadcastRouter,
}

impl Engine {
    pub fn new(
        provider_rx: mpsc::UnboundedReceiver<ProviderEvent>,
        router: BroadcastRouter,
    ) -> Self {
        Self {
            provider_rx,
            router,
        }
    }

    pub fn router(&self) -> &BroadcastRouter {
        &self.router
    }

    /// Process events until stopped or every provider handle is dropped.
    pub fn run(&mut self) -> std::io::Result<()> {
        info!("Run Bluetooth plugin engine.");
        Builder::new_current_thread().build()?.block_on(async {
            self.poll_providers().await;
        });
        Ok(())
    }

    async fn poll_providers(&mut self) {
        while let Some(event) = self.provider_rx.recv().await {
            match event {
                ProviderEvent::Request { operation, callback } => {
                    if self.router.is_active() {
                        self.router.orchestrator().execute(operation, callback);
                    } else {
                        debug!("Router torn down, dropped {} request.", operation.action());
                    }
                }
                ProviderEvent::Host(event) => {
                    debug!("Received host event: {:?}.", event);
                    self.router.route(event);
                }
                ProviderEvent::Stop => {
                    info!("Engine stopped.");
                    break;
                }
            }
        }
        self.router.teardown();

        // Later sends fail; anything queued behind the stop is dropped unanswered.
        self.provider_rx.close();
        let mut dropped = 0;
        while self.provider_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Dropped {} events queued after stop.", dropped);
        }
    }
}

/// Caller-side handle: submits operations to the engine.
#[derive(Clone)]
pub struct ClientProvider {
    provider_event_tx: mpsc::UnboundedSender<ProviderEvent>,
}

impl ClientProvider {
    pub fn new(provider_event_tx: mpsc::UnboundedSender<ProviderEvent>) -> Self {
        Self { provider_event_tx }
    }

    pub fn execute(&self, operation: Operation, callback: CallbackHandle) {
        let event = ProviderEvent::Request {
            operation,
            callback,
        };
        if let Err(e) = self.provider_event_tx.send(event) {
            error!("Client provider send error: {}", e);
        }
    }

    /// Submit a bridge action by name. An unknown action is reported to
    /// `callback` right away.
    pub fn execute_action(&self, action: &str, args: &[Value], callback: CallbackHandle) {
        match Operation::parse(action, args) {
            Ok(operation) => self.execute(operation, callback),
            Err(err) => callback.on_error(err),
        }
    }

    pub fn stop(&self) {
        if self.provider_event_tx.send(ProviderEvent::Stop).is_err() {
            debug!("Engine already stopped.");
        }
    }
}

/// Host-side handle: forwards platform events to the engine.
#[derive(Clone)]
pub struct HostCallback {
    provider_event_tx: mpsc::UnboundedSender<ProviderEvent>,
}

impl HostCallback {
    pub fn new(provider_event_tx: mpsc::UnboundedSender<ProviderEvent>) -> Self {
        Self { provider_event_tx }
    }

    fn send(&self, event: HostEvent) {
        if let Err(e) = self.provider_event_tx.send(ProviderEvent::Host(event)) {
            error!("Host callback send error: {}", e);
        }
    }

    pub fn on_activity_result(&self, request_code: i32, result_code: i32) {
        self.send(HostEvent::ActivityResult {
            request_code,
            result_code,
        });
    }

    pub fn on_request_permission_result(&self, request_code: i32, grant_results: Vec<i32>) {
        self.send(HostEvent::PermissionResult {
            request_code,
            grant_results,
        });
    }

    pub fn on_confirmation(&self, accepted: bool) {
        self.send(HostEvent::Confirmation { accepted });
    }

    pub fn on_device_found(&self, device: RawDevice) {
        self.send(HostEvent::DeviceFound(device));
    }

    /// The host is going away: tear down and stop the engine.
    pub fn on_destroy(&self) {
        if self.provider_event_tx.send(ProviderEvent::Stop).is_err() {
            debug!("Engine already stopped.");
        }
    }
}
