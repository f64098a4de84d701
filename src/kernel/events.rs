//! Outward events published by the store for anything outside the kernel.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::notification::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    FileSelected { path: PathBuf, name: String },
    ShowNotification { message: String, severity: Severity },
}

pub struct Subscription<E> {
    rx: Receiver<E>,
}

impl<E> Subscription<E> {
    pub fn try_recv(&mut self) -> Result<E, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn drain(&mut self) -> Vec<E> {
        self.rx.try_iter().collect()
    }
}

/// Fan-out publisher. Subscribers whose receiving end was dropped are pruned
/// on the next publish.
pub struct EventBus<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<E> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&mut self, event: E) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
