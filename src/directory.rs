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

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{trace, warn};

use crate::common::{DeviceRecord, DiscoveredSet, MalformedDevice, RawDevice};

/// Holds the device set of the active discovery session.
#[derive(Default)]
pub struct DeviceDirectory {
    active: Mutex<DiscoveredSet>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, DiscoveredSet> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget everything seen so far. Called when a session starts or ends.
    pub fn reset(&self) {
        self.active().clear();
    }

    /// Record a sighting in the active session and return the session's
    /// contents afterwards. A repeated address leaves the set unchanged.
    pub fn observe(&self, raw: RawDevice) -> Result<Vec<DeviceRecord>, MalformedDevice> {
        let record = DeviceRecord::try_from(raw)?;
        let mut active = self.active();
        if !active.insert(record) {
            trace!("Device already discovered in this session.");
        }
        Ok(active.snapshot())
    }

    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        self.active().snapshot()
    }

    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }
}

/// Normalize a batch of raw tuples, e.g. the bonded set. Malformed tuples are
/// dropped; repeated addresses keep their first record.
pub fn normalize_all(raw: Vec<RawDevice>) -> Vec<DeviceRecord> {
    raw.into_iter()
        .filter_map(|raw| match DeviceRecord::try_from(raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Skipping device: {}", err);
                None
            }
        })
        .collect::<DiscoveredSet>()
        .snapshot()
}
