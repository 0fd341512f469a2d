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

use std::sync::Arc;

use crate::common::{BluetoothError, Reply};

/// Caller side of an operation, as seen by the plugin.
///
/// For every non-streaming request exactly one of `on_success` or `on_error`
/// is invoked, once. Discovery invokes `on_partial` zero or more times and
/// may end with `on_error`; it never calls `on_success`.
pub trait ResultCallback: Send + Sync {
    fn on_success(&self, reply: Reply);

    /// Non-terminal delivery; the caller keeps listening.
    fn on_partial(&self, reply: Reply);

    fn on_error(&self, error: BluetoothError);
}

/// Shared handle to a caller, as stored in the request ledger.
pub type CallbackHandle = Arc<dyn ResultCallback>;

impl dyn ResultCallback {
    /// Deliver a terminal outcome.
    pub fn complete(&self, outcome: Result<Reply, BluetoothError>) {
        match outcome {
            Ok(reply) => self.on_success(reply),
            Err(error) => self.on_error(error),
        }
    }
}
