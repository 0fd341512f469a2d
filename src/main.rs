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

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use serde_json::{json, Value};

use bluetooth_plugin::channel::{self, Delivery, ReplyReceiver};
use bluetooth_plugin::emulator::{self, EmulatedHost, EmulatedRadio, HostLink};
use bluetooth_plugin::{logging, BluetoothPlugin, PluginConfig, RawDevice};

#[derive(Parser, Debug)]
#[command(name = "bluetooth_plugin_demo")]
#[command(version, about = "Drive the Bluetooth plugin against an emulated radio")]
struct Args {
    /// JSON plugin configuration; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Have the emulated user dismiss every dialog and prompt
    #[arg(long)]
    decline: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<PluginConfig, anyhow::Error> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(PluginConfig::from_json_str(&json)?)
        }
        None => Ok(PluginConfig::default()),
    }
}

fn print_delivery(action: &str, delivery: &Delivery) {
    let line = match delivery {
        Delivery::Partial(reply) => json!({"action": action, "partial": reply.to_json()}),
        Delivery::Success(reply) => json!({"action": action, "success": reply.to_json()}),
        Delivery::Error(err) => json!({"action": action, "error": err.payload()}),
    };
    println!("{}", line);
}

/// Print deliveries until the terminal one.
fn await_outcome(action: &str, mut rx: ReplyReceiver) -> Result<(), anyhow::Error> {
    while let Some(delivery) = rx.blocking_recv() {
        print_delivery(action, &delivery);
        if delivery.is_terminal() {
            return Ok(());
        }
    }
    Err(anyhow!("{} ended without an outcome", action))
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    logging::init(&config.log);

    let link = HostLink::default();
    let radio = Arc::new(
        EmulatedRadio::new(
            false,
            vec![RawDevice::new(Some("Headset"), "00:11:22:33:44:55")],
            vec![
                RawDevice::new(Some("Pixel"), "aa:bb:cc:dd:ee:01"),
                RawDevice::new(Some("Pixel2"), "AA:BB:CC:DD:EE:01"),
                RawDevice::new(None, "AA:BB:CC:DD:EE:02"),
            ],
            link.clone(),
        )
        .with_interval(Duration::from_millis(100)),
    );
    let host = Arc::new(EmulatedHost::new(radio.clone(), link.clone(), !args.decline));

    let BluetoothPlugin {
        mut engine,
        client_provider,
        host_callback,
    } = BluetoothPlugin::new(emulator::platform(radio, host), config);
    link.attach(host_callback.clone());
    let engine_thread = thread::spawn(move || engine.run());

    for (action, args) in [
        ("isSupported", Vec::new()),
        ("enable", Vec::new()),
        ("isEnabled", Vec::new()),
        ("queryPairedDevices", Vec::new()),
    ] {
        let (handle, rx) = channel::channel();
        client_provider.execute_action(action, &args, handle);
        await_outcome(action, rx)?;
    }

    let (handle, mut discovery) = channel::channel();
    client_provider.execute_action("startDiscovery", &[], handle);
    // Opening snapshot plus one per broadcast.
    for _ in 0..4 {
        match discovery.blocking_recv() {
            Some(delivery) => print_delivery("startDiscovery", &delivery),
            None => break,
        }
    }
    let (handle, rx) = channel::channel();
    client_provider.execute_action("stopDiscovery", &[], handle);
    await_outcome("stopDiscovery", rx)?;

    for (action, args) in [
        ("enableDiscoverability", vec![Value::from(120)]),
        ("disable", Vec::new()),
    ] {
        let (handle, rx) = channel::channel();
        client_provider.execute_action(action, &args, handle);
        await_outcome(action, rx)?;
    }

    host_callback.on_destroy();
    engine_thread
        .join()
        .map_err(|_| anyhow!("engine thread panicked"))??;
    Ok(())
}
