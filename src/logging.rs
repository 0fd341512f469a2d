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

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogSettings;

/// Install a console subscriber. `RUST_LOG` takes precedence over the
/// configured level. Returns `false` if a global subscriber was already set.
pub fn init(settings: &LogSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(settings.show_target)
        .with_thread_ids(settings.show_thread_ids)
        .with_ansi(settings.ansi_colors);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("Logging initialized.");
    }
    installed
}
