//! Await the result of a callback-style network task
//!
//! [`capture_core::CaptureNetworkService`] reports through a
//! [`NetworkCallback`] on the UI executor. Commands run in async code, so the
//! callback forwards its single outcome into a oneshot channel.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use capture_core::NetworkCallback;
use capture_domain::{CaptureError, Result};
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// [`NetworkCallback`] feeding a [`CallbackReceiver`]
pub struct ChannelCallback<T> {
    sender: Mutex<Option<oneshot::Sender<Result<T>>>>,
}

impl<T> ChannelCallback<T> {
    fn deliver(&self, outcome: Result<T>) {
        if let Some(sender) = self.sender.lock().take() {
            // The receiver may already be gone; the outcome is then unobserved.
            let _ = sender.send(outcome);
        }
    }
}

impl<T: Send> NetworkCallback<T> for ChannelCallback<T> {
    fn on_success(&self, result: T) {
        self.deliver(Ok(result));
    }

    fn on_failure(&self, error: CaptureError) {
        self.deliver(Err(error));
    }

    fn on_cancelled(&self) {
        self.deliver(Err(CaptureError::Cancelled));
    }
}

/// Resolves to the task outcome; cancellation becomes [`CaptureError::Cancelled`]
pub struct CallbackReceiver<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> Future for CallbackReceiver<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(CaptureError::Internal("network task dropped its callback".into()))
            })
        })
    }
}

/// Create a connected callback and receiver pair
pub fn callback_channel<T>() -> (ChannelCallback<T>, CallbackReceiver<T>) {
    let (sender, receiver) = oneshot::channel();
    (ChannelCallback { sender: Mutex::new(Some(sender)) }, CallbackReceiver { receiver })
}
