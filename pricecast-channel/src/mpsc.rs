//! Bounded MPSC (Multi-Producer Single-Consumer) channel.
//!
//! A thin wrapper over `crossbeam-channel` for fan-in plumbing off the
//! async runtime, where several producer threads feed one consumer.

use crate::ChannelError;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::time::Duration;

/// Creates a new bounded MPSC channel pair.
///
/// # Arguments
/// * `capacity` - Maximum number of items the channel can hold
#[must_use]
pub fn channel<T: Send>(capacity: usize) -> (MpscSender<T>, MpscReceiver<T>) {
    let (sender, receiver) = bounded(capacity);
    (
        MpscSender { inner: sender },
        MpscReceiver { inner: receiver },
    )
}

/// Sender half of an MPSC channel. Cloneable.
#[derive(Clone)]
pub struct MpscSender<T> {
    inner: Sender<T>,
}

impl<T> MpscSender<T> {
    /// Non-blocking send.
    ///
    /// # Errors
    /// Returns the item wrapped in [`ChannelError`] if the channel is full
    /// or the receiver was dropped.
    #[inline]
    pub fn try_send(&self, item: T) -> Result<(), ChannelError<T>> {
        self.inner.try_send(item).map_err(|e| match e {
            TrySendError::Full(item) => ChannelError::Full(item),
            TrySendError::Disconnected(item) => ChannelError::Closed(item),
        })
    }

    /// Blocking send.
    ///
    /// # Errors
    /// Returns the item if the receiver was dropped.
    pub fn send(&self, item: T) -> Result<(), ChannelError<T>> {
        self.inner.send(item).map_err(|e| ChannelError::Closed(e.0))
    }

    /// Returns the number of items currently in the channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the channel is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Receiver half of an MPSC channel.
pub struct MpscReceiver<T> {
    inner: Receiver<T>,
}

impl<T> MpscReceiver<T> {
    /// Non-blocking receive.
    #[inline]
    pub fn try_recv(&self) -> Option<T> {
        self.inner.try_recv().ok()
    }

    /// Blocking receive. Returns `None` when all senders are gone.
    pub fn recv(&self) -> Option<T> {
        self.inner.recv().ok()
    }

    /// Receive with timeout.
    ///
    /// # Arguments
    /// * `timeout` - Maximum time to wait
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.inner.recv_timeout(timeout).ok()
    }

    /// Drains all currently available items.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(|| self.inner.try_recv().ok())
    }

    /// Returns the number of items currently in the channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the channel is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
