//! Per-recipient notification store.

use std::collections::VecDeque;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{Lane, ProcessorState};
use crate::domain::{Notification, RecipientKey};
use crate::observability::QueueSnapshot;

/// Pending notifications of one recipient.
#[derive(Debug)]
struct RecipientQueue {
    test: VecDeque<Notification>,
    main: VecDeque<Notification>,
    state: ProcessorState,
}

impl RecipientQueue {
    fn new() -> Self {
        Self {
            test: VecDeque::new(),
            main: VecDeque::new(),
            state: ProcessorState::Running,
        }
    }

    fn push(&mut self, lane: Lane, notification: Notification) {
        match lane {
            Lane::Test => self.test.push_back(notification),
            Lane::Main => self.main.push_back(notification),
        }
    }

    fn pop_front(&mut self) -> Option<Notification> {
        self.test.pop_front().or_else(|| self.main.pop_front())
    }
}

/// Recipient key -> pending test/main lists.
///
/// Design:
/// - An entry exists exactly while a processor owns the key. `append` tells
///   the caller when it created the entry; that caller (and only that one)
///   spawns the processor.
/// - `pop_next` removes the entry under the same shard lock that saw both
///   lists empty, so an enqueue racing with retirement either lands before
///   (and is popped) or after (and starts a new processor).
/// - DashMap shards the lock; keys in different shards never contend.
#[derive(Debug, Default)]
pub struct NotificationStore {
    queues: DashMap<RecipientKey, RecipientQueue>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the recipient's `lane`.
    ///
    /// Returns `true` when this call created the recipient's entry, i.e. the
    /// key had no processor and the caller must start one.
    pub fn append(&self, key: &RecipientKey, notification: Notification, lane: Lane) -> bool {
        match self.queues.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().push(lane, notification);
                false
            }
            Entry::Vacant(entry) => {
                let mut queue = RecipientQueue::new();
                queue.push(lane, notification);
                entry.insert(queue);
                true
            }
        }
    }

    /// Take the next notification: front of the test list, else front of the
    /// main list.
    ///
    /// When both are empty the recipient's entry is removed and `None` is
    /// returned; the calling processor must stop.
    pub fn pop_next(&self, key: &RecipientKey) -> Option<Notification> {
        let Entry::Occupied(mut entry) = self.queues.entry(key.clone()) else {
            return None;
        };
        if let Some(notification) = entry.get_mut().pop_front() {
            return Some(notification);
        }
        entry.remove();
        None
    }

    /// Mark the recipient's processor as past its settle delay.
    pub fn mark_draining(&self, key: &RecipientKey) {
        if let Some(mut queue) = self.queues.get_mut(key) {
            queue.state = ProcessorState::Draining;
        }
    }

    pub fn state(&self, key: &str) -> ProcessorState {
        self.queues
            .get(key)
            .map_or(ProcessorState::NotRunning, |q| q.state)
    }

    /// Drop the recipient's entry and everything pending in it.
    ///
    /// Only for a caller that got `true` from `append` but cannot start a
    /// processor; returns how many notifications were discarded.
    pub fn discard(&self, key: &RecipientKey) -> usize {
        self.queues
            .remove(key)
            .map_or(0, |(_, q)| q.test.len() + q.main.len())
    }

    /// Totals across all recipients. Not atomic across shards.
    pub fn snapshot(&self) -> QueueSnapshot {
        let mut snapshot = QueueSnapshot::default();
        for queue in self.queues.iter() {
            snapshot.active_recipients += 1;
            snapshot.pending_test += queue.test.len();
            snapshot.pending_main += queue.main.len();
        }
        snapshot
    }
}

#[cfg(test)]
impl NotificationStore {
    /// `(test, main)` lengths for one recipient.
    fn pending(&self, key: &str) -> (usize, usize) {
        self.queues
            .get(key)
            .map_or((0, 0), |q| (q.test.len(), q.main.len()))
    }

    fn active_recipients(&self) -> usize {
        self.queues.len()
    }

    fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SupportKind;

    fn note(message: &str) -> Notification {
        let mut n = Notification::sample(SupportKind::Normal, None);
        n.message = message.to_string();
        n
    }

    #[test]
    fn first_append_creates_entry() {
        let store = NotificationStore::new();
        let key = RecipientKey::new("a");

        assert!(store.append(&key, note("1"), Lane::Main));
        assert!(!store.append(&key, note("2"), Lane::Main));
        assert!(!store.append(&key, note("3"), Lane::Test));

        assert_eq!(store.pending("a"), (1, 2));
        assert_eq!(store.state("a"), ProcessorState::Running);
    }

    #[test]
    fn pop_prefers_test_lane_then_fifo() {
        let store = NotificationStore::new();
        let key = RecipientKey::new("a");
        store.append(&key, note("m1"), Lane::Main);
        store.append(&key, note("m2"), Lane::Main);
        store.append(&key, note("t1"), Lane::Test);
        store.append(&key, note("t2"), Lane::Test);

        let order: Vec<String> = std::iter::from_fn(|| store.pop_next(&key))
            .map(|n| n.message)
            .collect();
        assert_eq!(order, vec!["t1", "t2", "m1", "m2"]);
    }

    #[test]
    fn pop_on_empty_removes_entry() {
        let store = NotificationStore::new();
        let key = RecipientKey::new("a");
        store.append(&key, note("1"), Lane::Main);

        assert!(store.pop_next(&key).is_some());
        assert_eq!(store.active_recipients(), 1);

        assert!(store.pop_next(&key).is_none());
        assert!(store.is_empty());
        assert_eq!(store.state("a"), ProcessorState::NotRunning);

        // the next append starts over
        assert!(store.append(&key, note("2"), Lane::Main));
    }

    #[test]
    fn discard_drops_entry_so_next_append_starts_again() {
        let store = NotificationStore::new();
        let key = RecipientKey::new("a");
        assert!(store.append(&key, note("1"), Lane::Main));
        store.append(&key, note("t"), Lane::Test);

        assert_eq!(store.discard(&key), 2);
        assert!(store.is_empty());
        assert_eq!(store.discard(&key), 0);
        assert!(store.append(&key, note("2"), Lane::Main));
    }

    #[test]
    fn keys_are_independent() {
        let store = NotificationStore::new();
        let a = RecipientKey::new("a");
        let b = RecipientKey::new("b");
        assert!(store.append(&a, note("a1"), Lane::Main));
        assert!(store.append(&b, note("b1"), Lane::Test));

        store.mark_draining(&a);
        assert_eq!(store.state("a"), ProcessorState::Draining);
        assert_eq!(store.state("b"), ProcessorState::Running);

        let snap = store.snapshot();
        assert_eq!(snap.active_recipients, 2);
        assert_eq!(snap.pending_main, 1);
        assert_eq!(snap.pending_test, 1);
    }

    #[test]
    fn concurrent_appends_start_exactly_once() {
        let store = std::sync::Arc::new(NotificationStore::new());
        let key = RecipientKey::new("hot");

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                let key = key.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| store.append(&key, note(&format!("{t}-{i}")), Lane::Main))
                        .count()
                })
            })
            .collect();

        let starts: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(starts, 1);
        assert_eq!(store.pending("hot"), (0, 800));
    }
}
