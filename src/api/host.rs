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

use crate::config::PromptText;

/// OS dialogs whose outcome arrives later as an activity result, tagged with
/// the request code given here.
pub trait SystemDialogs: Send + Sync {
    /// Show the "turn Bluetooth on" dialog.
    fn request_enable(&self, request_code: i32);

    /// Show the "make this device discoverable" dialog for `duration`
    /// seconds.
    fn request_discoverable(&self, request_code: i32, duration: u32);
}

/// Runtime permission checks and prompts.
pub trait PermissionSubsystem: Send + Sync {
    fn has_permission(&self, permission: &str) -> bool;

    /// Prompt for `permission`. The grant results arrive later, tagged with
    /// `request_code`.
    fn request_permission(&self, request_code: i32, permission: &str);
}

/// Yes/no prompt shown to the user. The chosen branch arrives later as a
/// confirmation answer.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, prompt: &PromptText);
}
