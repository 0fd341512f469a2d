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

//! Traits at the boundary of the plugin: the platform collaborators it
//! drives, and the caller handle it reports to.

use std::sync::Arc;

mod callback;
mod host;
mod radio;

pub use callback::{CallbackHandle, ResultCallback};
pub use host::{ConfirmationPrompt, PermissionSubsystem, SystemDialogs};
pub use radio::RadioStack;

/// The platform collaborators a plugin drives.
#[derive(Clone)]
pub struct Platform {
    /// `None` if the host has no Bluetooth adapter.
    pub radio: Option<Arc<dyn RadioStack>>,
    pub dialogs: Arc<dyn SystemDialogs>,
    pub permissions: Arc<dyn PermissionSubsystem>,
    pub prompt: Arc<dyn ConfirmationPrompt>,
}
