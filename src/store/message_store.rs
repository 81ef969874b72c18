//! Dual priority/regular FIFO message store (SPEC_FULL §4.1).

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::message::QueueMessage;

#[derive(Default)]
struct Sequences {
    priority: VecDeque<QueueMessage>,
    regular: VecDeque<QueueMessage>,
}

/// Two independent FIFO sequences of [`QueueMessage`], guarded by a single
/// logical lock so every mutating operation is linearizable.
///
/// Guarantee: after a successful [`MessageStore::put`] followed by any
/// [`MessageStore::get_next`] with `remove = true` and no intervening `put`,
/// if the two messages tie on priority class the earlier `put` returns
/// first. Priority messages always precede regular ones in `get_next`.
#[derive(Default)]
pub struct MessageStore {
    sequences: Mutex<Sequences>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `m` to the priority sequence if `message.high_priority`, else
    /// to the regular sequence. O(1).
    pub fn put(&self, mut m: QueueMessage) {
        m.mark_in_queue();
        let mut seqs = self.sequences.lock();
        if m.message.high_priority {
            seqs.priority.push_back(m);
        } else {
            seqs.regular.push_back(m);
        }
    }

    /// Re-insert `m` at the head of its class sequence (priority or regular,
    /// per `message.high_priority`), for put-back re-insertion
    /// (SPEC_FULL §4.4 put-back policy).
    pub fn put_front(&self, mut m: QueueMessage) {
        m.mark_in_queue();
        let mut seqs = self.sequences.lock();
        if m.message.high_priority {
            seqs.priority.push_front(m);
        } else {
            seqs.regular.push_front(m);
        }
    }

    /// Return (optionally removing) the next deliverable message: the head
    /// of the priority sequence (or tail if `from_end`), else the head of
    /// the regular sequence, else `None`.
    pub fn get_next(&self, remove: bool, from_end: bool) -> Option<QueueMessage> {
        let mut seqs = self.sequences.lock();
        Self::take_from(&mut seqs.priority, remove, from_end)
            .or_else(|| Self::take_from(&mut seqs.regular, remove, from_end))
    }

    /// As [`MessageStore::get_next`] but restricted to the priority sequence.
    pub fn get_priority_next(&self, remove: bool) -> Option<QueueMessage> {
        let mut seqs = self.sequences.lock();
        Self::take_from(&mut seqs.priority, remove, false)
    }

    /// As [`MessageStore::get_next`] but restricted to the regular sequence.
    pub fn get_regular_next(&self, remove: bool) -> Option<QueueMessage> {
        let mut seqs = self.sequences.lock();
        Self::take_from(&mut seqs.regular, remove, false)
    }

    fn take_from(seq: &mut VecDeque<QueueMessage>, remove: bool, from_end: bool) -> Option<QueueMessage> {
        if seq.is_empty() {
            return None;
        }
        if remove {
            if from_end {
                seq.pop_back().map(|mut m| {
                    m.mark_removed();
                    m
                })
            } else {
                seq.pop_front().map(|mut m| {
                    m.mark_removed();
                    m
                })
            }
        } else if from_end {
            seq.back().cloned()
        } else {
            seq.front().cloned()
        }
    }

    /// Scan both sequences for the first message matching `pred`, remove and
    /// return it.
    pub fn find_and_remove(&self, pred: impl Fn(&QueueMessage) -> bool) -> Option<QueueMessage> {
        let mut seqs = self.sequences.lock();
        if let Some(idx) = seqs.priority.iter().position(&pred) {
            let mut m = seqs.priority.remove(idx)?;
            m.mark_removed();
            return Some(m);
        }
        if let Some(idx) = seqs.regular.iter().position(&pred) {
            let mut m = seqs.regular.remove(idx)?;
            m.mark_removed();
            return Some(m);
        }
        None
    }

    /// Scan both sequences for every message matching `pred`, without mutating.
    pub fn find_all(&self, pred: impl Fn(&QueueMessage) -> bool) -> Vec<QueueMessage> {
        let seqs = self.sequences.lock();
        seqs.priority
            .iter()
            .chain(seqs.regular.iter())
            .filter(|m| pred(m))
            .cloned()
            .collect()
    }

    /// Total number of messages across both sequences.
    pub fn count_all(&self) -> usize {
        let seqs = self.sequences.lock();
        seqs.priority.len() + seqs.regular.len()
    }

    /// Number of messages in the priority sequence.
    pub fn count_priority(&self) -> usize {
        self.sequences.lock().priority.len()
    }

    /// Number of messages in the regular sequence.
    pub fn count_regular(&self) -> usize {
        self.sequences.lock().regular.len()
    }

    /// Atomically empty the priority sequence.
    pub fn clear_priority(&self) {
        self.sequences.lock().priority.clear();
    }

    /// Atomically empty the regular sequence.
    pub fn clear_regular(&self) {
        self.sequences.lock().regular.clear();
    }

    /// Atomically empty both sequences.
    pub fn clear_all(&self) {
        let mut seqs = self.sequences.lock();
        seqs.priority.clear();
        seqs.regular.clear();
    }

    /// A read-only snapshot of the regular sequence, for sync paths that
    /// tolerate racing with concurrent mutation. Callers must not mutate.
    pub fn get_unsafe(&self) -> Vec<QueueMessage> {
        self.sequences.lock().regular.iter().cloned().collect()
    }

    /// A read-only snapshot of the priority sequence, for sync paths that
    /// tolerate racing with concurrent mutation.
    pub fn get_unsafe_priority(&self) -> Vec<QueueMessage> {
        self.sequences.lock().priority.iter().cloned().collect()
    }

    /// Ordered snapshot of message ids currently resident in `priority` (if
    /// true) or the regular sequence (if false).
    pub fn get_message_id_list(&self, priority: bool) -> Vec<String> {
        let seqs = self.sequences.lock();
        let seq = if priority { &seqs.priority } else { &seqs.regular };
        seq.iter().filter_map(|m| m.message.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, MessageKind};
    use bytes::Bytes;

    fn msg(id: &str, high_priority: bool) -> QueueMessage {
        let mut message = Message::new(MessageKind::QueueMessage, "q", Bytes::new());
        message.id = Some(id.to_string());
        message.high_priority = high_priority;
        QueueMessage::new(message, None)
    }

    #[test]
    fn priority_precedes_regular() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put(msg("p1", true));
        let next = store.get_next(true, false).unwrap();
        assert_eq!(next.message.id.as_deref(), Some("p1"));
    }

    #[test]
    fn fifo_within_class() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put(msg("r2", false));
        assert_eq!(store.get_next(true, false).unwrap().message.id.as_deref(), Some("r1"));
        assert_eq!(store.get_next(true, false).unwrap().message.id.as_deref(), Some("r2"));
    }

    #[test]
    fn put_then_get_next_roundtrips_multiset() {
        let store = MessageStore::new();
        for i in 0..5 {
            store.put(msg(&format!("m{i}"), i % 2 == 0));
        }
        let mut seen = Vec::new();
        while let Some(m) = store.get_next(true, false) {
            seen.push(m.message.id.unwrap());
        }
        seen.sort();
        let mut expected: Vec<_> = (0..5).map(|i| format!("m{i}")).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn find_and_remove_scans_both_sequences() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put(msg("p1", true));
        let found = store.find_and_remove(|m| m.message.id.as_deref() == Some("r1"));
        assert!(found.is_some());
        assert_eq!(store.count_all(), 1);
    }

    #[test]
    fn put_front_reinserts_ahead_of_existing() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put_front(msg("r0", false));
        assert_eq!(store.get_next(true, false).unwrap().message.id.as_deref(), Some("r0"));
    }

    #[test]
    fn interleaved_put_and_get_next_preserves_multiset_and_ordering() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put(msg("p1", true));
        assert_eq!(store.get_next(true, false).unwrap().message.id.as_deref(), Some("p1"));
        store.put(msg("r2", false));
        store.put(msg("p2", true));
        let mut drained = Vec::new();
        while let Some(m) = store.get_next(true, false) {
            drained.push(m.message.id.unwrap());
        }
        assert_eq!(drained, vec!["p2", "r1", "r2"]);
    }

    #[test]
    fn put_front_at_delay_zero_leaves_other_same_class_order_intact() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put(msg("r2", false));
        store.put(msg("r3", false));
        // A put-back with putBackDelay=0 re-inserts at the class head
        // immediately; the messages already queued behind it keep their
        // relative order.
        store.put_front(msg("m1", false));
        let drained: Vec<_> = std::iter::from_fn(|| store.get_next(true, false))
            .map(|m| m.message.id.unwrap())
            .collect();
        assert_eq!(drained, vec!["m1", "r1", "r2", "r3"]);
    }

    #[test]
    fn clear_all_empties_both() {
        let store = MessageStore::new();
        store.put(msg("r1", false));
        store.put(msg("p1", true));
        store.clear_all();
        assert_eq!(store.count_all(), 0);
    }
}
