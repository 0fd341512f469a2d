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

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::CallbackHandle;
use crate::common::{BluetoothError, OperationKind, Reply};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0} request is already pending")]
    AlreadyPending(OperationKind),
}

impl From<LedgerError> for BluetoothError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AlreadyPending(kind) => {
                BluetoothError::AlreadyPending(kind)
            }
        }
    }
}

/// A caller waiting on the outcome of one operation kind.
pub struct PendingRequest {
    kind: OperationKind,
    handle: CallbackHandle,
    created_at: Instant,
}

impl PendingRequest {
    fn new(kind: OperationKind, handle: CallbackHandle) -> Self {
        PendingRequest {
            kind,
            handle,
            created_at: Instant::now(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn into_handle(self) -> CallbackHandle {
        self.handle
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("kind", &self.kind)
            .field("age", &self.age())
            .finish()
    }
}

/// Holds at most one outstanding request per [`OperationKind`].
///
/// Every mutation of the slot map happens under one mutex. Callbacks are
/// always invoked after the lock is released, so a callback may call back
/// into the ledger.
#[derive(Default)]
pub struct RequestLedger {
    slots: Mutex<HashMap<OperationKind, PendingRequest>>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<OperationKind, PendingRequest>> {
        // Callbacks never run under this lock; a poisoned map is consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Park `handle` until an outcome for `kind` arrives. Fails if another
    /// caller is already waiting on `kind`; that caller is left untouched.
    pub fn register(&self, kind: OperationKind, handle: CallbackHandle) -> Result<(), LedgerError> {
        let mut slots = self.slots();
        if slots.contains_key(&kind) {
            warn!("Rejected {} request, one is already pending.", kind);
            return Err(LedgerError::AlreadyPending(kind));
        }
        slots.insert(kind, PendingRequest::new(kind, handle));
        debug!("Registered {} request.", kind);
        Ok(())
    }

    /// Park `handle` for `kind`, replacing whichever caller was waiting. The
    /// previous request is returned without being invoked.
    pub fn supersede(&self, kind: OperationKind, handle: CallbackHandle) -> Option<PendingRequest> {
        let previous = self.slots().insert(kind, PendingRequest::new(kind, handle));
        if let Some(previous) = &previous {
            debug!("Superseded {} request after {:?}.", kind, previous.age());
        }
        previous
    }

    /// Deliver the terminal `outcome` to the caller waiting on `kind` and
    /// free the slot. Returns `false`, and does nothing else, if no caller
    /// is waiting.
    pub fn resolve_once(
        &self,
        kind: OperationKind,
        outcome: Result<Reply, BluetoothError>,
    ) -> bool {
        let pending = self.slots().remove(&kind);
        match pending {
            Some(pending) => {
                debug!(
                    "Resolving {} request after {:?}: {:?}",
                    kind,
                    pending.age(),
                    outcome
                );
                pending.handle.complete(outcome);
                true
            }
            None => {
                debug!("No pending {} request, dropped {:?}.", kind, outcome);
                false
            }
        }
    }

    /// Deliver a partial result to the caller streaming on `kind`, keeping
    /// the slot open. Only streaming kinds accept partial results.
    pub fn resolve_streaming(&self, kind: OperationKind, partial: Reply) -> bool {
        if !kind.is_streaming() {
            warn!("Refused partial result for non-streaming {} request.", kind);
            return false;
        }

        let handle = self.slots().get(&kind).map(|p| p.handle.clone());
        match handle {
            Some(handle) => {
                handle.on_partial(partial);
                true
            }
            None => {
                debug!("No pending {} request, dropped partial result.", kind);
                false
            }
        }
    }

    /// Remove the caller waiting on `kind` without invoking it.
    pub fn take(&self, kind: OperationKind) -> Option<PendingRequest> {
        self.slots().remove(&kind)
    }

    /// Drop the caller waiting on `kind` without invoking it.
    pub fn clear(&self, kind: OperationKind) -> bool {
        self.take(kind).is_some()
    }

    /// Drop every waiting caller without invoking any of them.
    pub fn clear_all(&self) -> usize {
        let drained: Vec<PendingRequest> =
            self.slots().drain().map(|(_, pending)| pending).collect();
        if !drained.is_empty() {
            debug!("Cleared pending requests: {:?}", drained);
        }
        drained.len()
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.slots().contains_key(&kind)
    }
}
