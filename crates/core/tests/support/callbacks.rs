//! Callback collector recording what was delivered and on which thread

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use capture_core::NetworkCallback;
use capture_domain::CaptureError;
use parking_lot::Mutex;

#[derive(Debug)]
pub enum Delivered<T> {
    Success(T),
    Failure(CaptureError),
    Cancelled,
}

/// Forwards each callback invocation to a channel, with the thread name.
pub struct ChannelCallback<T> {
    sender: Mutex<Sender<(Delivered<T>, Option<String>)>>,
}

pub type Deliveries<T> = Receiver<(Delivered<T>, Option<String>)>;

impl<T> ChannelCallback<T> {
    pub fn new() -> (Self, Deliveries<T>) {
        let (sender, receiver) = channel();
        (Self { sender: Mutex::new(sender) }, receiver)
    }

    fn send(&self, delivered: Delivered<T>) {
        let thread = std::thread::current().name().map(str::to_string);
        let _ = self.sender.lock().send((delivered, thread));
    }
}

impl<T: Send> NetworkCallback<T> for ChannelCallback<T> {
    fn on_success(&self, result: T) {
        self.send(Delivered::Success(result));
    }

    fn on_failure(&self, error: CaptureError) {
        self.send(Delivered::Failure(error));
    }

    fn on_cancelled(&self) {
        self.send(Delivered::Cancelled);
    }
}

/// Wait for the next delivery.
pub fn next<T>(deliveries: &Deliveries<T>) -> (Delivered<T>, Option<String>) {
    deliveries.recv_timeout(Duration::from_secs(5)).expect("callback delivered")
}

/// Assert nothing else is delivered within a short window.
pub fn assert_quiet<T: std::fmt::Debug>(deliveries: &Deliveries<T>) {
    if let Ok((extra, _)) = deliveries.recv_timeout(Duration::from_millis(150)) {
        panic!("unexpected extra delivery: {extra:?}");
    }
}
