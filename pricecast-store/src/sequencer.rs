//! Per-instrument sequence assignment.
//!
//! The sequencer lives inside the single writer, so its counters are plain
//! integers. Each slot's counter starts at zero and every assigned sequence
//! is strictly greater than all previously assigned ones for that slot.

/// Per-slot sequence counters, owned by the store writer.
pub(crate) struct Sequencer {
    /// Last assigned sequence per slot. Zero means nothing assigned yet.
    last: Box<[u64]>,
}

impl Sequencer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            last: vec![0; capacity].into_boxed_slice(),
        }
    }

    /// Assigns the next sequence for a slot (first assignment yields 1).
    #[inline(always)]
    pub(crate) fn next(&mut self, slot: usize) -> u64 {
        self.last[slot] += 1;
        self.last[slot]
    }

    /// Last sequence assigned or observed for a slot.
    #[inline(always)]
    pub(crate) fn current(&self, slot: usize) -> u64 {
        self.last[slot]
    }

    /// Advances the counter to an externally stamped sequence.
    ///
    /// # Returns
    /// `true` if the sequence was newer than the counter and was adopted.
    #[inline(always)]
    pub(crate) fn observe(&mut self, slot: usize, sequence: u64) -> bool {
        if sequence > self.last[slot] {
            self.last[slot] = sequence;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sequence_is_one() {
        let mut sequencer = Sequencer::new(4);
        assert_eq!(sequencer.next(0), 1);
        assert_eq!(sequencer.next(0), 2);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut sequencer = Sequencer::new(4);

        assert_eq!(sequencer.next(0), 1);
        assert_eq!(sequencer.next(1), 1);
        assert_eq!(sequencer.next(0), 2);
        assert_eq!(sequencer.current(1), 1);
    }

    #[test]
    fn test_observe_stale_rejected() {
        let mut sequencer = Sequencer::new(4);

        assert!(sequencer.observe(0, 5));
        assert!(!sequencer.observe(0, 5));
        assert!(!sequencer.observe(0, 3));
        assert_eq!(sequencer.next(0), 6);
    }
}
