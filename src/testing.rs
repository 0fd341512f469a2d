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

//! Mock collaborators shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{ConfirmationPrompt, PermissionSubsystem, Platform, RadioStack, SystemDialogs};
use crate::common::{BluetoothError, RawDevice};
use crate::config::PromptText;

pub struct MockRadio {
    on: AtomicBool,
    turn_off_ok: AtomicBool,
    begin_ok: AtomicBool,
    bonded: Mutex<Result<Vec<RawDevice>, BluetoothError>>,
    pub turn_off_calls: AtomicUsize,
    pub begin_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub bonded_calls: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
    pub unsubscribe_calls: AtomicUsize,
}

impl MockRadio {
    pub fn new(on: bool) -> Self {
        MockRadio {
            on: AtomicBool::new(on),
            turn_off_ok: AtomicBool::new(true),
            begin_ok: AtomicBool::new(true),
            bonded: Mutex::new(Ok(Vec::new())),
            turn_off_calls: AtomicUsize::new(0),
            begin_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            bonded_calls: AtomicUsize::new(0),
            subscribe_calls: AtomicUsize::new(0),
            unsubscribe_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_on(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
    }

    pub fn set_turn_off_ok(&self, ok: bool) {
        self.turn_off_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_begin_ok(&self, ok: bool) {
        self.begin_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_bonded(&self, bonded: Result<Vec<RawDevice>, BluetoothError>) {
        *self.bonded.lock().unwrap() = bonded;
    }

    /// Whether any state-changing or querying call reached the radio.
    pub fn touched(&self) -> bool {
        self.turn_off_calls.load(Ordering::SeqCst)
            + self.begin_calls.load(Ordering::SeqCst)
            + self.cancel_calls.load(Ordering::SeqCst)
            + self.bonded_calls.load(Ordering::SeqCst)
            > 0
    }
}

impl RadioStack for MockRadio {
    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn turn_off(&self) -> bool {
        self.turn_off_calls.fetch_add(1, Ordering::SeqCst);
        let ok = self.turn_off_ok.load(Ordering::SeqCst);
        if ok {
            self.set_on(false);
        }
        ok
    }

    fn bonded_devices(&self) -> Result<Vec<RawDevice>, BluetoothError> {
        self.bonded_calls.fetch_add(1, Ordering::SeqCst);
        self.bonded.lock().unwrap().clone()
    }

    fn begin_discovery(&self) -> bool {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
        self.begin_ok.load(Ordering::SeqCst)
    }

    fn cancel_discovery(&self) -> bool {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn subscribe(&self) {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn unsubscribe(&self) {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockHost {
    granted: AtomicBool,
    pub enable_requests: Mutex<Vec<i32>>,
    pub discoverable_requests: Mutex<Vec<(i32, u32)>>,
    pub permission_requests: Mutex<Vec<(i32, String)>>,
    pub prompts: Mutex<Vec<PromptText>>,
}

impl MockHost {
    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn dialog_count(&self) -> usize {
        self.enable_requests.lock().unwrap().len()
            + self.discoverable_requests.lock().unwrap().len()
    }
}

impl SystemDialogs for MockHost {
    fn request_enable(&self, request_code: i32) {
        self.enable_requests.lock().unwrap().push(request_code);
    }

    fn request_discoverable(&self, request_code: i32, duration: u32) {
        self.discoverable_requests
            .lock()
            .unwrap()
            .push((request_code, duration));
    }
}

impl PermissionSubsystem for MockHost {
    fn has_permission(&self, _permission: &str) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_permission(&self, request_code: i32, permission: &str) {
        self.permission_requests
            .lock()
            .unwrap()
            .push((request_code, String::from(permission)));
    }
}

impl ConfirmationPrompt for MockHost {
    fn confirm(&self, prompt: &PromptText) {
        self.prompts.lock().unwrap().push(prompt.clone());
    }
}

/// Mocks wired into a `Platform`.
pub struct Fixture {
    pub radio: Arc<MockRadio>,
    pub host: Arc<MockHost>,
    pub platform: Platform,
}

impl Fixture {
    /// A platform with a radio that is switched `on` or off.
    pub fn with_radio(on: bool) -> Self {
        let radio = Arc::new(MockRadio::new(on));
        let host = Arc::new(MockHost::default());
        let platform = Platform {
            radio: Some(radio.clone()),
            dialogs: host.clone(),
            permissions: host.clone(),
            prompt: host.clone(),
        };
        Fixture {
            radio,
            host,
            platform,
        }
    }

    /// A platform without any radio.
    pub fn without_radio() -> Self {
        let mut fixture = Self::with_radio(false);
        fixture.platform.radio = None;
        fixture
    }
}
