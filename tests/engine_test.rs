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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use bluetooth_plugin::api::{
    ConfirmationPrompt, PermissionSubsystem, Platform, RadioStack,
    SystemDialogs,
};
use bluetooth_plugin::channel::{self, Delivery};
use bluetooth_plugin::config::PromptText;
use bluetooth_plugin::router::{PERMISSION_DENIED, RESULT_OK};
use bluetooth_plugin::{
    BluetoothError, BluetoothPlugin, DeviceRecord, PluginConfig, RawDevice, Reply,
};

#[derive(Debug, PartialEq, Eq)]
enum HostRequest {
    Enable(i32),
    Discoverable(i32, u32),
    Permission(i32),
    Confirm,
}

struct MockRadio {
    on: AtomicBool,
}

impl RadioStack for MockRadio {
    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn turn_off(&self) -> bool {
        self.on.store(false, Ordering::SeqCst);
        true
    }

    fn bonded_devices(&self) -> Result<Vec<RawDevice>, BluetoothError> {
        Ok(vec![RawDevice::new(Some("Headset"), "00:11:22:33:44:55")])
    }

    fn begin_discovery(&self) -> bool {
        true
    }

    fn cancel_discovery(&self) -> bool {
        true
    }
}

struct MockHost {
    granted: bool,
    host_request_tx: mpsc::Sender<HostRequest>,
}

impl MockHost {
    fn send(&self, request: HostRequest) {
        self.host_request_tx.send(request).unwrap();
    }
}

impl SystemDialogs for MockHost {
    fn request_enable(&self, request_code: i32) {
        self.send(HostRequest::Enable(request_code));
    }

    fn request_discoverable(&self, request_code: i32, duration: u32) {
        self.send(HostRequest::Discoverable(request_code, duration));
    }
}

impl PermissionSubsystem for MockHost {
    fn has_permission(&self, _permission: &str) -> bool {
        self.granted
    }

    fn request_permission(&self, request_code: i32, _permission: &str) {
        self.send(HostRequest::Permission(request_code));
    }
}

impl ConfirmationPrompt for MockHost {
    fn confirm(&self, _prompt: &PromptText) {
        self.send(HostRequest::Confirm);
    }
}

fn plugin(
    radio_on: bool,
    granted: bool,
) -> (BluetoothPlugin, mpsc::Receiver<HostRequest>, Arc<MockRadio>) {
    let (host_request_tx, host_request_rx) = mpsc::channel();
    let radio = Arc::new(MockRadio {
        on: AtomicBool::new(radio_on),
    });
    let host = Arc::new(MockHost {
        granted,
        host_request_tx,
    });
    let platform = Platform {
        radio: Some(radio.clone()),
        dialogs: host.clone(),
        permissions: host.clone(),
        prompt: host,
    };
    (
        BluetoothPlugin::new(platform, PluginConfig::default()),
        host_request_rx,
        radio,
    )
}

#[test]
fn test_enable_scenario() {
    let (mut plugin, host_request_rx, radio) = plugin(false, false);

    thread::scope(|scope| {
        let engine_thread = scope.spawn(|| plugin.engine.run());

        let (handle, mut rx) = channel::channel();
        plugin.client_provider.execute_action("enable", &[], handle);
        assert_eq!(host_request_rx.recv().unwrap(), HostRequest::Enable(5000));

        radio.on.store(true, Ordering::SeqCst);
        plugin.host_callback.on_activity_result(5000, RESULT_OK);
        assert_eq!(rx.blocking_recv(), Some(Delivery::Success(Reply::Empty)));
        assert_eq!(rx.blocking_recv(), None);

        // Already on: answered right away, no second dialog.
        let (handle, mut rx) = channel::channel();
        plugin.client_provider.execute_action("enable", &[], handle);
        assert_eq!(rx.blocking_recv(), Some(Delivery::Success(Reply::Empty)));
        assert_eq!(host_request_rx.try_recv(), Err(mpsc::TryRecvError::Empty));

        let (handle, mut rx) = channel::channel();
        plugin.client_provider.execute_action("isEnabled", &[], handle);
        assert_eq!(rx.blocking_recv(), Some(Delivery::Success(Reply::Empty)));

        plugin.client_provider.stop();
        engine_thread
            .join()
            .expect("Engine integration test crashed.")
            .unwrap();
    });
}

#[test]
fn test_permission_denied_scenario() {
    let (mut plugin, host_request_rx, _radio) = plugin(true, false);

    thread::scope(|scope| {
        let engine_thread = scope.spawn(|| plugin.engine.run());

        let (handle, mut rx) = channel::channel();
        plugin
            .client_provider
            .execute_action("startDiscovery", &[], handle);
        assert_eq!(host_request_rx.recv().unwrap(), HostRequest::Permission(6000));

        plugin
            .host_callback
            .on_request_permission_result(6000, vec![PERMISSION_DENIED]);
        assert_eq!(
            rx.blocking_recv(),
            Some(Delivery::Error(BluetoothError::PermissionDenied))
        );
        assert_eq!(rx.blocking_recv(), None);

        plugin.host_callback.on_destroy();
        engine_thread
            .join()
            .expect("Engine integration test crashed.")
            .unwrap();
    });
}

#[test]
fn test_discovery_deduplicates_by_address() {
    let (mut plugin, _host_request_rx, _radio) = plugin(true, true);

    thread::scope(|scope| {
        let engine_thread = scope.spawn(|| plugin.engine.run());

        let (handle, mut rx) = channel::channel();
        plugin
            .client_provider
            .execute_action("startDiscovery", &[], handle);
        assert_eq!(
            rx.blocking_recv(),
            Some(Delivery::Partial(Reply::Devices(Vec::new())))
        );

        let host = &plugin.host_callback;
        host.on_device_found(RawDevice::new(Some("Pixel"), "AA:BB:CC:DD:EE:01"));
        host.on_device_found(RawDevice::new(Some("Pixel2"), "AA:BB:CC:DD:EE:01"));

        let pixel =
            DeviceRecord::new(Some(String::from("Pixel")), "AA:BB:CC:DD:EE:01")
                .unwrap();
        for _ in 0..2 {
            let delivery = rx.blocking_recv().unwrap();
            assert_eq!(delivery, Delivery::Partial(Reply::Devices(vec![pixel.clone()])));
        }

        // Teardown closes the stream without a terminal delivery.
        host.on_destroy();
        assert_eq!(rx.blocking_recv(), None);
        engine_thread
            .join()
            .expect("Engine integration test crashed.")
            .unwrap();
    });
}

#[test]
fn test_discoverability_and_disable() {
    let (mut plugin, host_request_rx, radio) = plugin(true, true);

    thread::scope(|scope| {
        let engine_thread = scope.spawn(|| plugin.engine.run());

        let (handle, mut rx) = channel::channel();
        plugin.client_provider.execute_action(
            "enableDiscoverability",
            &[serde_json::json!(-1)],
            handle,
        );
        match rx.blocking_recv() {
            Some(Delivery::Error(err)) => {
                assert_eq!(err.kind(), "INVALID_ARGUMENT");
                assert_eq!(
                    err.to_string(),
                    "Duration cannot be negative or greater than 1 hour"
                );
            }
            other => panic!("unexpected delivery {:?}", other),
        }

        let (handle, mut rx) = channel::channel();
        plugin.client_provider.execute_action(
            "enableDiscoverability",
            &[serde_json::json!("120")],
            handle,
        );
        assert_eq!(
            host_request_rx.recv().unwrap(),
            HostRequest::Discoverable(5001, 120)
        );
        plugin.host_callback.on_activity_result(5001, 120);
        assert_eq!(rx.blocking_recv(), Some(Delivery::Success(Reply::Empty)));

        let (handle, mut rx) = channel::channel();
        plugin.client_provider.execute_action("disable", &[], handle);
        assert_eq!(host_request_rx.recv().unwrap(), HostRequest::Confirm);
        plugin.host_callback.on_confirmation(true);
        assert_eq!(rx.blocking_recv(), Some(Delivery::Success(Reply::Empty)));
        assert!(!radio.is_on());

        plugin.client_provider.stop();
        engine_thread
            .join()
            .expect("Engine integration test crashed.")
            .unwrap();
    });
}

#[test]
fn test_requests_after_destroy_are_not_stranded() {
    let (mut plugin, host_request_rx, _radio) = plugin(true, true);

    thread::scope(|scope| {
        let engine_thread = scope.spawn(|| plugin.engine.run());
        plugin.host_callback.on_destroy();
        engine_thread
            .join()
            .expect("Engine integration test crashed.")
            .unwrap();
    });

    let (handle, mut rx) = channel::channel();
    plugin.client_provider.execute_action("isSupported", &[], handle);
    assert_eq!(rx.blocking_recv(), None);

    let (handle, mut rx) = channel::channel();
    plugin
        .client_provider
        .execute_action("startDiscovery", &[], handle);
    plugin
        .host_callback
        .on_device_found(RawDevice::new(Some("Pixel"), "AA:BB:CC:DD:EE:01"));
    plugin.host_callback.on_destroy();
    plugin.engine.run().unwrap();

    assert_eq!(rx.blocking_recv(), None);
    assert!(host_request_rx.try_recv().is_err());
}
