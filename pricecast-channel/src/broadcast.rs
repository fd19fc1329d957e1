//! Buffered broadcast channel for one-to-many fan-out.
//!
//! A single sender feeds any number of receivers, each tracking its own
//! cursor into a bounded history ring. A receiver that falls more than
//! `capacity` items behind is lapped: it skips forward to the oldest
//! retained item, mirroring what a lossy feed does to a slow subscriber.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Creates a new broadcast channel with the given history capacity.
///
/// # Arguments
/// * `capacity` - Maximum number of items retained for slow receivers
#[must_use]
pub fn channel<T: Clone>(capacity: usize) -> BroadcastSender<T> {
    BroadcastSender {
        state: Arc::new(RwLock::new(BroadcastState {
            buffer: VecDeque::with_capacity(capacity),
            head_seq: 0,
            next_seq: 0,
            capacity,
            closed: false,
        })),
    }
}

struct BroadcastState<T> {
    /// Retained items; `buffer[0]` carries sequence `head_seq`.
    buffer: VecDeque<T>,
    head_seq: u64,
    next_seq: u64,
    capacity: usize,
    closed: bool,
}

/// Sender half of a broadcast channel.
pub struct BroadcastSender<T> {
    state: Arc<RwLock<BroadcastState<T>>>,
}

impl<T: Clone> BroadcastSender<T> {
    /// Broadcasts an item to all receivers.
    ///
    /// # Returns
    /// The sequence number assigned to the item.
    pub fn send(&self, item: T) -> u64 {
        let mut state = self.state.write();
        let seq = state.next_seq;

        if state.buffer.len() == state.capacity {
            state.buffer.pop_front();
            state.head_seq += 1;
        }
        state.buffer.push_back(item);
        state.next_seq += 1;
        seq
    }

    /// Creates a receiver that starts at the next sent item.
    #[must_use]
    pub fn subscribe(&self) -> BroadcastReceiver<T> {
        BroadcastReceiver {
            next_seq: self.state.read().next_seq,
            state: Arc::clone(&self.state),
        }
    }

    /// Creates a receiver that replays the retained history first.
    #[must_use]
    pub fn subscribe_from_start(&self) -> BroadcastReceiver<T> {
        BroadcastReceiver {
            next_seq: self.state.read().head_seq,
            state: Arc::clone(&self.state),
        }
    }

    /// Returns the number of items currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().buffer.len()
    }

    /// Returns true if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for BroadcastSender<T> {
    fn drop(&mut self) {
        self.state.write().closed = true;
    }
}

/// Receiver half of a broadcast channel.
pub struct BroadcastReceiver<T> {
    state: Arc<RwLock<BroadcastState<T>>>,
    next_seq: u64,
}

impl<T: Clone> BroadcastReceiver<T> {
    /// Receives the next item.
    ///
    /// A lapped receiver skips to the oldest retained item; the returned
    /// sequence exposes the jump so callers can count the loss.
    ///
    /// # Returns
    /// `Some((sequence, item))` if available, `None` if caught up.
    pub fn recv(&mut self) -> Option<(u64, T)> {
        let state = self.state.read();
        if self.next_seq >= state.next_seq {
            return None;
        }
        if self.next_seq < state.head_seq {
            self.next_seq = state.head_seq;
        }
        let index = (self.next_seq - state.head_seq) as usize;
        let item = state.buffer[index].clone();
        let seq = self.next_seq;
        self.next_seq += 1;
        Some((seq, item))
    }

    /// Receives all currently available items in order.
    pub fn recv_all(&mut self) -> Vec<(u64, T)> {
        let mut items = Vec::new();
        while let Some(pair) = self.recv() {
            items.push(pair);
        }
        items
    }

    /// Checks if the sender is still alive.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.state.read().closed
    }

    /// Returns how many items this receiver has not yet consumed.
    #[must_use]
    pub fn lag(&self) -> u64 {
        self.state.read().next_seq.saturating_sub(self.next_seq)
    }
}

impl<T> Clone for BroadcastReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            next_seq: self.next_seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_broadcast() {
        let tx = channel::<u64>(16);
        let mut rx1 = tx.subscribe();
        let mut rx2 = tx.subscribe();

        tx.send(42);

        assert_eq!(rx1.recv(), Some((0, 42)));
        assert_eq!(rx2.recv(), Some((0, 42)));
        assert_eq!(rx1.recv(), None);
    }

    #[test]
    fn test_order_preserved() {
        let tx = channel::<u64>(16);
        let mut rx = tx.subscribe();

        tx.send(1);
        tx.send(2);
        tx.send(3);

        assert_eq!(rx.recv_all(), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_late_subscriber() {
        let tx = channel::<u64>(16);

        tx.send(1);
        tx.send(2);

        let mut rx = tx.subscribe();
        tx.send(3);

        assert_eq!(rx.recv(), Some((2, 3)));
    }

    #[test]
    fn test_subscribe_from_start() {
        let tx = channel::<u64>(16);

        tx.send(1);
        tx.send(2);

        let mut rx = tx.subscribe_from_start();
        assert_eq!(rx.recv_all(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_lapped_receiver_skips_forward() {
        let tx = channel::<u64>(2);
        let mut rx = tx.subscribe();

        tx.send(1);
        tx.send(2);
        tx.send(3); // evicts item with seq 0

        // First recv jumps to the oldest retained item (seq 1).
        assert_eq!(rx.recv(), Some((1, 2)));
        assert_eq!(rx.recv(), Some((2, 3)));
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_lag() {
        let tx = channel::<u64>(16);
        let mut rx = tx.subscribe();

        tx.send(1);
        tx.send(2);
        tx.send(3);

        assert_eq!(rx.lag(), 3);
        rx.recv();
        assert_eq!(rx.lag(), 2);
    }

    #[test]
    fn test_disconnect() {
        let tx = channel::<u64>(16);
        let rx = tx.subscribe();

        assert!(rx.is_connected());
        drop(tx);
        assert!(!rx.is_connected());
    }
}
