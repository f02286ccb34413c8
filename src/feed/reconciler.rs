//! Feed reconciliation
//!
//! Folds the one-shot historical fetch and the live event stream into a single
//! list ordered newest first. Live records may arrive before the historical
//! batch; they are held back and merged when the batch lands.
//!
//! Ordering: descending timestamp, ties kept in arrival order. Records whose
//! content identity was already seen are dropped.
//!
//! Identity is `(sender, timestamp, message)` because the history call returns
//! no transaction hash or log index to match live logs against. Two identical
//! messages from one sender in the same second therefore show once.

use std::collections::HashSet;

use super::types::{RecordKey, WaveRecord};

/// Ordered, de-duplicated list of waves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    records: Vec<WaveRecord>,
    seen: HashSet<RecordKey>,
    /// Live records received before `initialize`
    pending: Vec<WaveRecord>,
    initialized: bool,
}

impl FeedState {
    /// Create an empty feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the historical batch as the baseline
    ///
    /// Anything appended earlier is merged after the batch, so it counts as a
    /// later arrival for tie-breaking. Calling this twice replaces the baseline
    /// but keeps records that only came in live.
    pub fn initialize(&mut self, batch: impl IntoIterator<Item = WaveRecord>) {
        let live = if self.initialized {
            std::mem::take(&mut self.records)
        } else {
            std::mem::take(&mut self.pending)
        };

        self.seen.clear();
        self.initialized = true;

        for record in batch {
            if self.seen.insert(record.key()) {
                self.records.push(record);
            }
        }
        // Stable: equal timestamps keep the contract's order.
        self.records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        for record in live {
            self.insert(record);
        }
    }

    /// Add one live record
    ///
    /// Returns false when the record was a duplicate.
    pub fn append(&mut self, record: WaveRecord) -> bool {
        if !self.initialized {
            let key = record.key();
            if self.pending.iter().any(|r| r.key() == key) {
                return false;
            }
            self.pending.push(record);
            return true;
        }
        self.insert(record)
    }

    fn insert(&mut self, record: WaveRecord) -> bool {
        if !self.seen.insert(record.key()) {
            return false;
        }
        // After every record at least as new, so ties stay in arrival order.
        let at = self
            .records
            .partition_point(|existing| existing.timestamp >= record.timestamp);
        self.records.insert(at, record);
        true
    }

    /// Drop everything, including buffered live records
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records newest first
    pub fn records(&self) -> &[WaveRecord] {
        &self.records
    }

    /// Whether the historical batch has been installed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of live records waiting for the historical batch
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn wave(byte: u8, ts: u64, message: &str) -> WaveRecord {
        WaveRecord::new(Address::repeat_byte(byte), ts, message)
    }

    fn timestamps(feed: &FeedState) -> Vec<i64> {
        feed.records().iter().map(|r| r.timestamp.timestamp()).collect()
    }

    #[test]
    fn test_initialize_sorts_newest_first() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(1, 50, "b"), wave(2, 100, "a"), wave(3, 75, "c")]);
        assert_eq!(timestamps(&feed), vec![100, 75, 50]);
    }

    #[test]
    fn test_batch_then_live_scenario() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(0xaa, 100, "hi"), wave(0xbb, 50, "yo")]);
        assert_eq!(
            feed.records(),
            &[wave(0xaa, 100, "hi"), wave(0xbb, 50, "yo")]
        );

        feed.append(wave(0xcc, 200, "new"));
        assert_eq!(
            feed.records(),
            &[wave(0xcc, 200, "new"), wave(0xaa, 100, "hi"), wave(0xbb, 50, "yo")]
        );
    }

    #[test]
    fn test_appends_stay_sorted() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(1, 10, "a"), wave(2, 30, "b")]);
        for (i, ts) in [25u64, 5, 40, 15, 35, 1].into_iter().enumerate() {
            feed.append(wave(3, ts, &format!("m{i}")));
            let ts = timestamps(&feed);
            assert!(ts.windows(2).all(|w| w[0] >= w[1]), "unsorted: {ts:?}");
        }
        assert_eq!(feed.len(), 8);
    }

    #[test]
    fn test_append_order_does_not_matter() {
        let base = vec![wave(1, 100, "hi"), wave(2, 50, "yo")];
        let a = wave(3, 75, "a");
        let b = wave(4, 120, "b");

        let mut first = FeedState::new();
        first.initialize(base.clone());
        first.append(a.clone());
        first.append(b.clone());

        let mut second = FeedState::new();
        second.initialize(base);
        second.append(b);
        second.append(a);

        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(1, 100, "first"), wave(2, 100, "second")]);
        feed.append(wave(3, 100, "third"));

        let messages: Vec<&str> = feed.records().iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_live_before_batch_is_buffered() {
        let mut feed = FeedState::new();
        assert!(feed.append(wave(0xcc, 200, "new")));
        assert!(feed.is_empty());
        assert_eq!(feed.pending_len(), 1);

        feed.initialize(vec![wave(0xaa, 100, "hi"), wave(0xbb, 50, "yo")]);
        assert_eq!(feed.pending_len(), 0);
        assert_eq!(timestamps(&feed), vec![200, 100, 50]);
    }

    #[test]
    fn test_duplicate_delivery_is_dropped() {
        let mut feed = FeedState::new();
        // Delivered live while the batch was in flight, then again in the batch.
        feed.append(wave(0xcc, 200, "new"));
        feed.initialize(vec![wave(0xcc, 200, "new"), wave(0xaa, 100, "hi")]);
        assert_eq!(feed.len(), 2);

        assert!(!feed.append(wave(0xaa, 100, "hi")));
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn test_duplicates_inside_batch() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(1, 10, "same"), wave(1, 10, "same")]);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_reinitialize_keeps_live_records() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(1, 10, "old")]);
        feed.append(wave(2, 20, "live"));

        feed.initialize(vec![wave(1, 10, "old"), wave(3, 15, "refetched")]);
        assert_eq!(timestamps(&feed), vec![20, 15, 10]);
    }

    #[test]
    fn test_identical_waves_in_one_second_show_once() {
        let mut feed = FeedState::new();
        feed.initialize(vec![wave(1, 10, "gm"), wave(1, 10, "gm")]);
        assert!(!feed.append(wave(1, 10, "gm")));
        assert_eq!(feed.len(), 1);

        // Any differing field is a distinct wave.
        assert!(feed.append(wave(1, 11, "gm")));
        assert!(feed.append(wave(2, 10, "gm")));
        assert!(feed.append(wave(1, 10, "gm!")));
        assert_eq!(feed.len(), 4);
    }

    fn permutations(items: &[WaveRecord]) -> Vec<Vec<WaveRecord>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut all = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                all.push(tail);
            }
        }
        all
    }

    #[test]
    fn test_every_arrival_order_is_sorted_and_complete() {
        let history = vec![wave(1, 100, "hi"), wave(2, 50, "yo"), wave(3, 75, "hey")];
        let live = vec![
            wave(4, 120, "a"),
            wave(5, 60, "b"),
            wave(6, 100, "tie"),
            wave(2, 50, "yo"),
            wave(7, 1, "c"),
        ];
        let mut expected: Vec<RecordKey> = history
            .iter()
            .chain(live.iter())
            .map(|r| r.key())
            .collect();
        expected.sort_by(|a, b| (a.timestamp, &a.message).cmp(&(b.timestamp, &b.message)));
        expected.dedup();

        for order in permutations(&live) {
            // Split each order at every point: some live records land before history.
            for split in 0..=order.len() {
                let mut feed = FeedState::new();
                for record in &order[..split] {
                    feed.append(record.clone());
                }
                feed.initialize(history.clone());
                for record in &order[split..] {
                    feed.append(record.clone());
                }

                let ts = timestamps(&feed);
                assert!(ts.windows(2).all(|w| w[0] >= w[1]), "unsorted: {ts:?}");

                let mut keys: Vec<RecordKey> = feed.records().iter().map(|r| r.key()).collect();
                keys.sort_by(|a, b| (a.timestamp, &a.message).cmp(&(b.timestamp, &b.message)));
                assert_eq!(keys, expected);
            }
        }
    }

    #[test]
    fn test_distinct_timestamps_ignore_arrival_order() {
        let live = vec![wave(1, 40, "a"), wave(2, 10, "b"), wave(3, 30, "c"), wave(4, 20, "d")];
        let mut reference = FeedState::new();
        reference.initialize(live.clone());

        for order in permutations(&live) {
            let mut feed = FeedState::new();
            feed.initialize(Vec::new());
            for record in order {
                feed.append(record);
            }
            assert_eq!(feed.records(), reference.records());
        }
    }

    #[test]
    fn test_reset() {
        let mut feed = FeedState::new();
        feed.append(wave(1, 1, "x"));
        feed.initialize(vec![wave(2, 2, "y")]);
        feed.reset();

        assert!(feed.is_empty());
        assert!(!feed.is_initialized());
        assert_eq!(feed.pending_len(), 0);
    }
}
