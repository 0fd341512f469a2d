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

use crate::common::{BluetoothError, RawDevice};

/// Concrete types implementing this trait wrap the platform's Bluetooth
/// adapter. A host without an adapter supplies no `RadioStack` at all, which
/// the capability gate reports as "not supported".
///
/// Every method must return promptly; results that the platform delivers
/// later (device-found broadcasts) are pushed back through
/// [`crate::HostCallback`].
pub trait RadioStack: Send + Sync {
    /// Whether the adapter is currently switched on.
    fn is_on(&self) -> bool;

    /// Switch the adapter off. Returns `false` if the platform refused.
    fn turn_off(&self) -> bool;

    /// Retrieve the bonded (paired) device set.
    fn bonded_devices(&self) -> Result<Vec<RawDevice>, BluetoothError>;

    /// Begin a live scan for nearby devices. Returns `false` if the platform
    /// refused to start one.
    fn begin_discovery(&self) -> bool;

    /// Stop a live scan. Returns `false` if no scan could be cancelled.
    fn cancel_discovery(&self) -> bool;

    /// Start delivering device-found broadcasts. Called once, before any
    /// operation can trigger them.
    fn subscribe(&self) {}

    /// Stop delivering device-found broadcasts. Called at most once.
    fn unsubscribe(&self) {}
}
