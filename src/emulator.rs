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

//! In-process stand-ins for the platform collaborators. Dialogs and
//! broadcasts are answered from background threads after a short delay,
//! the way a real host would deliver them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, sleep};
use std::time::Duration;

use tracing::{debug, info};

use crate::api::{ConfirmationPrompt, PermissionSubsystem, Platform, RadioStack, SystemDialogs};
use crate::common::{BluetoothError, RawDevice};
use crate::config::PromptText;
use crate::engine::HostCallback;
use crate::router::{PERMISSION_DENIED, PERMISSION_GRANTED, RESULT_CANCELED, RESULT_OK};

/// Host callback attached after the plugin is created, since the emulated
/// collaborators must exist first.
#[derive(Clone, Default)]
pub struct HostLink {
    inner: Arc<Mutex<Option<HostCallback>>>,
}

impl HostLink {
    pub fn attach(&self, callback: HostCallback) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    fn with<F: FnOnce(&HostCallback)>(&self, f: F) {
        match self.inner.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(callback) => f(callback),
            None => debug!("No host callback attached, event dropped."),
        }
    }
}

pub struct EmulatedRadio {
    on: AtomicBool,
    subscribed: Arc<AtomicBool>,
    discovering: Arc<AtomicBool>,
    bonded: Vec<RawDevice>,
    nearby: Vec<RawDevice>,
    interval: Duration,
    link: HostLink,
}

impl EmulatedRadio {
    pub fn new(on: bool, bonded: Vec<RawDevice>, nearby: Vec<RawDevice>, link: HostLink) -> Self {
        EmulatedRadio {
            on: AtomicBool::new(on),
            subscribed: Arc::new(AtomicBool::new(false)),
            discovering: Arc::new(AtomicBool::new(false)),
            bonded,
            nearby,
            interval: Duration::from_millis(200),
            link,
        }
    }

    /// Delay between two device-found broadcasts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn set_on(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
    }
}

impl RadioStack for EmulatedRadio {
    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn turn_off(&self) -> bool {
        self.cancel_discovery();
        self.set_on(false);
        info!("Emulated radio turned off.");
        true
    }

    fn bonded_devices(&self) -> Result<Vec<RawDevice>, BluetoothError> {
        if !self.is_on() {
            return Err(BluetoothError::Disabled);
        }
        Ok(self.bonded.clone())
    }

    fn begin_discovery(&self) -> bool {
        if !self.is_on() {
            return false;
        }
        self.discovering.store(true, Ordering::SeqCst);

        let nearby = self.nearby.clone();
        let interval = self.interval;
        let discovering = self.discovering.clone();
        let subscribed = self.subscribed.clone();
        let link = self.link.clone();
        info!("Emulated discovery starts.");
        thread::spawn(move || {
            for device in nearby {
                sleep(interval);
                if !discovering.load(Ordering::SeqCst)
                    || !subscribed.load(Ordering::SeqCst)
                {
                    break;
                }
                debug!("Emulated radio found {:?}.", device);
                link.with(|host| host.on_device_found(device));
            }
        });
        true
    }

    fn cancel_discovery(&self) -> bool {
        self.discovering.swap(false, Ordering::SeqCst)
    }

    fn subscribe(&self) {
        self.subscribed.store(true, Ordering::SeqCst);
    }

    fn unsubscribe(&self) {
        self.subscribed.store(false, Ordering::SeqCst);
    }
}

/// Answers every dialog, permission request and prompt with a fixed
/// choice.
pub struct EmulatedHost {
    radio: Arc<EmulatedRadio>,
    link: HostLink,
    granted: Arc<AtomicBool>,
    accept: bool,
    delay: Duration,
}

impl EmulatedHost {
    /// A host whose user accepts (`accept`) or dismisses everything.
    pub fn new(radio: Arc<EmulatedRadio>, link: HostLink, accept: bool) -> Self {
        EmulatedHost {
            radio,
            link,
            granted: Arc::new(AtomicBool::new(false)),
            accept,
            delay: Duration::from_millis(50),
        }
    }

    fn answer<F>(&self, f: F)
    where
        F: FnOnce(&HostCallback) + Send + 'static,
    {
        let link = self.link.clone();
        let delay = self.delay;
        thread::spawn(move || {
            sleep(delay);
            link.with(f);
        });
    }
}

impl SystemDialogs for EmulatedHost {
    fn request_enable(&self, request_code: i32) {
        info!("Emulated user asked to turn Bluetooth on.");
        let result_code = if self.accept {
            self.radio.set_on(true);
            RESULT_OK
        } else {
            RESULT_CANCELED
        };
        self.answer(move |host| host.on_activity_result(request_code, result_code));
    }

    fn request_discoverable(&self, request_code: i32, duration: u32) {
        info!("Emulated user asked to be discoverable for {}s.", duration);
        let result_code = match i32::try_from(duration) {
            Ok(d) if self.accept && d > 0 => d,
            Ok(_) if self.accept => RESULT_OK,
            _ => RESULT_CANCELED,
        };
        self.answer(move |host| host.on_activity_result(request_code, result_code));
    }
}

impl PermissionSubsystem for EmulatedHost {
    fn has_permission(&self, _permission: &str) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_permission(&self, request_code: i32, permission: &str) {
        info!("Emulated user asked for {}.", permission);
        let grant = if self.accept {
            self.granted.store(true, Ordering::SeqCst);
            PERMISSION_GRANTED
        } else {
            PERMISSION_DENIED
        };
        self.answer(move |host| {
            host.on_request_permission_result(request_code, vec![grant])
        });
    }
}

impl ConfirmationPrompt for EmulatedHost {
    fn confirm(&self, prompt: &PromptText) {
        info!("Emulated prompt: {}", prompt.message);
        let accepted = self.accept;
        self.answer(move |host| host.on_confirmation(accepted));
    }
}

/// Wire the emulated collaborators into a `Platform`.
pub fn platform(radio: Arc<EmulatedRadio>, host: Arc<EmulatedHost>) -> Platform {
    Platform {
        radio: Some(radio),
        dialogs: host.clone(),
        permissions: host.clone(),
        prompt: host,
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::engine::ProviderEvent;
    use crate::router::HostEvent;

    fn nearby() -> Vec<RawDevice> {
        vec![
            RawDevice::new(Some("Pixel"), "AA:BB:CC:DD:EE:01"),
            RawDevice::new(Some("Buds"), "AA:BB:CC:DD:EE:02"),
        ]
    }

    #[test]
    fn discovery_broadcasts_nearby_devices() {
        let link = HostLink::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        link.attach(HostCallback::new(tx));
        let radio = EmulatedRadio::new(true, Vec::new(), nearby(), link)
            .with_interval(Duration::from_millis(1));
        radio.subscribe();

        assert!(radio.begin_discovery());
        for expected in nearby() {
            match rx.blocking_recv() {
                Some(ProviderEvent::Host(HostEvent::DeviceFound(device))) => {
                    assert_eq!(device, expected)
                }
                _ => panic!("expected a device-found event"),
            }
        }
        assert!(radio.cancel_discovery());
        assert!(!radio.cancel_discovery());
    }

    #[test]
    fn radio_off_refuses_work() {
        let radio = EmulatedRadio::new(false, nearby(), nearby(), HostLink::default());
        assert!(!radio.begin_discovery());
        assert_eq!(radio.bonded_devices(), Err(BluetoothError::Disabled));

        radio.set_on(true);
        assert_eq!(radio.bonded_devices().map(|d| d.len()), Ok(2));
        assert!(radio.turn_off());
        assert!(!radio.is_on());
    }

    #[test]
    fn declining_host_denies_permission() {
        let link = HostLink::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        link.attach(HostCallback::new(tx));
        let radio = Arc::new(EmulatedRadio::new(false, Vec::new(), Vec::new(), link.clone()));
        let host = EmulatedHost::new(radio.clone(), link, false);

        host.request_permission(6000, "location");
        match rx.blocking_recv() {
            Some(ProviderEvent::Host(HostEvent::PermissionResult {
                request_code,
                grant_results,
            })) => {
                assert_eq!(request_code, 6000);
                assert_eq!(grant_results, vec![PERMISSION_DENIED]);
            }
            _ => panic!("expected a permission result"),
        }
        assert!(!host.has_permission("location"));

        host.request_enable(5000);
        assert!(!radio.is_on());
    }
}
