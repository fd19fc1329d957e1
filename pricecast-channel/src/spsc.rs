//! Lock-free SPSC (Single-Producer Single-Consumer) channel.
//!
//! A ring-buffer channel for exactly one producer and one consumer thread.
//! The consumer-side join buffer and the per-consumer event stream both run
//! on this primitive; neither side ever blocks.

use crate::ChannelError;
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Creates a new SPSC channel pair with the given capacity.
///
/// # Arguments
/// * `capacity` - Maximum number of items the channel can hold
#[must_use]
pub fn channel<T>(capacity: usize) -> (SpscSender<T>, SpscReceiver<T>) {
    let (producer, consumer) = RingBuffer::new(capacity);
    let closed = Arc::new(AtomicBool::new(false));

    (
        SpscSender {
            producer,
            closed: Arc::clone(&closed),
        },
        SpscReceiver { consumer, closed },
    )
}

/// Sender half of an SPSC channel.
pub struct SpscSender<T> {
    producer: Producer<T>,
    closed: Arc<AtomicBool>,
}

impl<T> SpscSender<T> {
    /// Non-blocking send.
    ///
    /// # Errors
    /// Returns the item wrapped in [`ChannelError`] if the channel is full
    /// or the receiver was dropped.
    #[inline(always)]
    pub fn send(&mut self, item: T) -> Result<(), ChannelError<T>> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(ChannelError::Closed(item));
        }
        self.producer.push(item).map_err(|e| match e {
            rtrb::PushError::Full(item) => ChannelError::Full(item),
        })
    }

    /// Checks if the receiver is still connected.
    #[inline(always)]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Relaxed)
    }

    /// Returns the capacity of the channel.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.producer.buffer().capacity()
    }
}

impl<T> Drop for SpscSender<T> {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Receiver half of an SPSC channel.
pub struct SpscReceiver<T> {
    consumer: Consumer<T>,
    closed: Arc<AtomicBool>,
}

impl<T> SpscReceiver<T> {
    /// Non-blocking receive.
    ///
    /// # Returns
    /// `Some(item)` if available, `None` if the channel is empty.
    #[inline(always)]
    pub fn recv(&mut self) -> Option<T> {
        self.consumer.pop().ok()
    }

    /// Receives with a spin count limit before giving up.
    ///
    /// Used by poll loops that want to burn a bounded number of cycles
    /// before yielding to the next channel.
    ///
    /// # Arguments
    /// * `spin_count` - Number of spins before returning `None`
    #[inline]
    pub fn recv_spin_limited(&mut self, spin_count: usize) -> Option<T> {
        for _ in 0..spin_count {
            if let Ok(item) = self.consumer.pop() {
                return Some(item);
            }
            std::hint::spin_loop();
        }
        None
    }

    /// Drains all currently available items.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(|| self.consumer.pop().ok())
    }

    /// Checks if the sender is still connected or items remain buffered.
    #[inline(always)]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Relaxed) || !self.is_empty()
    }

    /// Returns the number of items currently buffered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumer.slots()
    }

    /// Returns true if the channel is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for SpscReceiver<T> {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_send_recv() {
        let (mut tx, mut rx) = channel::<u64>(16);

        assert!(tx.send(42).is_ok());
        assert_eq!(rx.recv(), Some(42));
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_fifo_order() {
        let (mut tx, mut rx) = channel::<u64>(16);

        for i in 0..10 {
            assert!(tx.send(i).is_ok());
        }
        for i in 0..10 {
            assert_eq!(rx.recv(), Some(i));
        }
    }

    #[test]
    fn test_full_channel() {
        let (mut tx, mut rx) = channel::<u64>(4);

        for i in 0..4 {
            assert!(tx.send(i).is_ok());
        }
        assert_eq!(tx.send(100), Err(ChannelError::Full(100)));

        assert_eq!(rx.recv(), Some(0));
        assert!(tx.send(100).is_ok());
    }

    #[test]
    fn test_drain() {
        let (mut tx, mut rx) = channel::<u64>(16);

        for i in 0..5 {
            tx.send(i).unwrap();
        }

        let items: Vec<_> = rx.drain().collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_closed_after_receiver_drop() {
        let (mut tx, rx) = channel::<u64>(16);
        drop(rx);
        assert!(!tx.is_connected());
        assert_eq!(tx.send(1), Err(ChannelError::Closed(1)));
    }

    #[test]
    fn test_receiver_sees_buffered_after_sender_drop() {
        let (mut tx, mut rx) = channel::<u64>(16);
        tx.send(7).unwrap();
        drop(tx);

        assert!(rx.is_connected());
        assert_eq!(rx.recv(), Some(7));
        assert!(!rx.is_connected());
    }

    #[test]
    fn test_recv_spin_limited() {
        let (mut tx, mut rx) = channel::<u64>(16);

        assert_eq!(rx.recv_spin_limited(100), None);
        tx.send(42).unwrap();
        assert_eq!(rx.recv_spin_limited(100), Some(42));
    }
}
