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

//! Channel-backed caller handle, for callers that would rather await or
//! poll their results than implement [`ResultCallback`].

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::Stream;
use tokio::sync::mpsc;
pub use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;

use crate::api::{CallbackHandle, ResultCallback};
use crate::common::{BluetoothError, Reply};

/// One delivery to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Partial(Reply),
    Success(Reply),
    Error(BluetoothError),
}

impl Delivery {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Delivery::Partial(_))
    }
}

/// Sending half; lives in the request ledger while the request is pending.
pub struct ReplySender {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl ReplySender {
    fn deliver(&self, delivery: Delivery) {
        if let Err(err) = self.tx.send(delivery) {
            debug!("Caller stopped listening, dropped {:?}.", err.0);
        }
    }
}

impl ResultCallback for ReplySender {
    fn on_success(&self, reply: Reply) {
        self.deliver(Delivery::Success(reply));
    }

    fn on_partial(&self, reply: Reply) {
        self.deliver(Delivery::Partial(reply));
    }

    fn on_error(&self, error: BluetoothError) {
        self.deliver(Delivery::Error(error));
    }
}

/// Receiving half. The stream ends once the plugin has dropped the sending
/// half: after a terminal delivery, or when a discovery session is
/// superseded, stopped or torn down.
pub struct ReplyReceiver {
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl ReplyReceiver {
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    /// Blocking variant for threads outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Delivery> {
        self.rx.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Result<Delivery, TryRecvError> {
        self.rx.try_recv()
    }

    /// Skip partial deliveries and wait for the terminal outcome, if any.
    pub async fn outcome(&mut self) -> Option<Result<Reply, BluetoothError>> {
        while let Some(delivery) = self.rx.recv().await {
            match delivery {
                Delivery::Partial(_) => continue,
                Delivery::Success(reply) => return Some(Ok(reply)),
                Delivery::Error(error) => return Some(Err(error)),
            }
        }
        None
    }
}

impl Stream for ReplyReceiver {
    type Item = Delivery;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Create a caller handle and the receiver observing it.
pub fn channel() -> (CallbackHandle, ReplyReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ReplySender { tx }), ReplyReceiver { rx })
}
