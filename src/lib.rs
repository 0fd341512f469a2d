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

//! Bluetooth adapter control for a hybrid-app host: availability checks,
//! enable/disable, paired-device queries, streamed discovery and
//! discoverability, each completing through a caller-supplied callback.
//!
//! The host supplies its platform through the traits in [`api`] and feeds
//! platform events back through a [`HostCallback`]. Callers submit work
//! through a [`ClientProvider`]; both are drained by one [`Engine`] loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

pub mod api;
pub mod capability;
pub mod channel;
mod common;
pub mod config;
pub mod directory;
pub mod emulator;
pub mod engine;
pub mod ledger;
pub mod logging;
pub mod orchestrator;
pub mod router;

#[cfg(test)]
mod testing;

pub use common::{
    BluetoothError, DeviceRecord, DiscoveredSet, ErrorPayload, MalformedDevice,
    Operation, OperationKind, RawDevice, Reply,
};
pub use config::PluginConfig;
pub use engine::{ClientProvider, Engine, HostCallback, ProviderEvent};

use api::Platform;
use orchestrator::Orchestrator;
use router::BroadcastRouter;

pub struct BluetoothPlugin {
    pub engine: Engine,
    pub client_provider: ClientProvider,
    pub host_callback: HostCallback,
}

impl BluetoothPlugin {
    /// Wire a plugin to `platform`. The router subscribes to device-found
    /// broadcasts before this returns.
    pub fn new(platform: Platform, config: PluginConfig) -> Self {
        info!("Create Bluetooth plugin.");
        let (provider_tx, provider_rx) = mpsc::unbounded_channel::<ProviderEvent>();
        let orchestrator = Arc::new(Orchestrator::new(platform, config));
        Self {
            engine: Engine::new(provider_rx, BroadcastRouter::new(orchestrator)),
            client_provider: ClientProvider::new(provider_tx.clone()),
            host_callback: HostCallback::new(provider_tx),
        }
    }
}
