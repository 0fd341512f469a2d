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

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device tuple exactly as the radio stack reports it, before any
/// validation. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDevice {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "mac")]
    pub address: Option<String>,
}

impl RawDevice {
    pub fn new(name: Option<&str>, address: &str) -> Self {
        RawDevice {
            name: name.map(String::from),
            address: Some(String::from(address)),
        }
    }
}

/// Reported when a raw device tuple cannot be turned into a `DeviceRecord`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("device record has no hardware address")]
pub struct MalformedDevice;

/// Normalized, immutable device value. Two records describe the same device
/// iff their addresses are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceRecord {
    name: Option<String>,
    #[serde(rename = "mac")]
    address: String,
}

impl DeviceRecord {
    /// Build a record, normalizing the address to trimmed upper-case so the
    /// same hardware address always compares equal.
    pub fn new(name: Option<String>, address: &str) -> Result<Self, MalformedDevice> {
        let address = address.trim();
        if address.is_empty() {
            return Err(MalformedDevice);
        }

        Ok(DeviceRecord {
            name: name.filter(|n| !n.is_empty()),
            address: address.to_ascii_uppercase(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl TryFrom<RawDevice> for DeviceRecord {
    type Error = MalformedDevice;

    fn try_from(raw: RawDevice) -> Result<Self, Self::Error> {
        let address = raw.address.ok_or(MalformedDevice)?;
        DeviceRecord::new(raw.name, &address)
    }
}

/// Insertion-ordered set of devices, deduplicated by address. The first
/// record seen for an address wins; later sightings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredSet {
    records: Vec<DeviceRecord>,
    seen: HashSet<String>,
}

impl DiscoveredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a device with the same address was already present.
    pub fn insert(&mut self, record: DeviceRecord) -> bool {
        if !self.seen.insert(record.address.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, address: &str) -> bool {
        self.seen.contains(&address.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.seen.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter()
    }

    /// Copy of the current contents, in insertion order.
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        self.records.clone()
    }
}

impl FromIterator<DeviceRecord> for DiscoveredSet {
    fn from_iter<I: IntoIterator<Item = DeviceRecord>>(iter: I) -> Self {
        let mut set = DiscoveredSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
