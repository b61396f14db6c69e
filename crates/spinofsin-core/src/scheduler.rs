//! Generation-tagged timers on a virtual clock.
//!
//! Every deferred action in the game goes through a [`Scheduler`]. Entries are
//! tagged with the generation current when they were scheduled; bumping the
//! generation (on reset) makes every older entry stale, and stale entries are
//! dropped when they come due instead of running.
//!
//! Entries due at the same instant run in the order they were scheduled.
//! Keyed entries debounce: scheduling a key replaces any earlier entry with
//! the same key.
//!
//! # Example
//!
//! ```
//! use spinofsin_core::scheduler::Scheduler;
//! use std::time::Duration;
//!
//! let mut timers: Scheduler<&str, ()> = Scheduler::new();
//! timers.schedule(Duration::from_millis(10), "stale");
//! timers.bump_generation();
//! timers.schedule(Duration::from_millis(10), "fresh");
//!
//! let until = Duration::from_millis(20);
//! assert_eq!(timers.pop_due(until), Some("fresh"));
//! assert_eq!(timers.pop_due(until), None);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId {
    due: Duration,
    seq: u64,
}

impl TimerId {
    /// When the entry comes due.
    #[must_use]
    pub const fn due(self) -> Duration {
        self.due
    }
}

#[derive(Debug, Clone)]
struct Entry<T, K> {
    generation: u64,
    key: Option<K>,
    action: T,
}

/// Timer queue over a virtual clock.
#[derive(Debug, Clone)]
pub struct Scheduler<T, K> {
    now: Duration,
    generation: u64,
    next_seq: u64,
    queue: BTreeMap<TimerId, Entry<T, K>>,
    keyed: BTreeMap<K, TimerId>,
}

impl<T, K: Ord + Copy> Default for Scheduler<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Ord + Copy> Scheduler<T, K> {
    /// Creates an empty scheduler at time zero, generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            generation: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            keyed: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of entries waiting, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of waiting entries that will still run.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.queue
            .values()
            .filter(|entry| entry.generation == self.generation)
            .count()
    }

    /// Schedules `action` to run `delay` from now.
    pub fn schedule(&mut self, delay: Duration, action: T) -> TimerId {
        self.insert(delay, None, action)
    }

    /// Schedules `action` under `key`, replacing any entry already holding
    /// that key.
    pub fn schedule_keyed(&mut self, key: K, delay: Duration, action: T) -> TimerId {
        self.cancel_key(key);
        self.insert(delay, Some(key), action)
    }

    fn insert(&mut self, delay: Duration, key: Option<K>, action: T) -> TimerId {
        let id = TimerId {
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        if let Some(key) = key {
            self.keyed.insert(key, id);
        }
        self.queue.insert(
            id,
            Entry {
                generation: self.generation,
                key,
                action,
            },
        );
        id
    }

    /// Removes an entry. Returns its action if it was still waiting.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let entry = self.queue.remove(&id)?;
        if let Some(key) = entry.key {
            self.keyed.remove(&key);
        }
        Some(entry.action)
    }

    /// Removes the entry holding `key`, if any.
    pub fn cancel_key(&mut self, key: K) -> Option<T> {
        let id = self.keyed.remove(&key)?;
        self.queue.remove(&id).map(|entry| entry.action)
    }

    /// True if an entry holds `key`.
    #[must_use]
    pub fn has_key(&self, key: K) -> bool {
        self.keyed.contains_key(&key)
    }

    /// Invalidates every entry scheduled so far.
    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        tracing::debug!("timer generation now {}", self.generation);
        self.generation
    }

    /// Pops the earliest entry due at or before `until` and moves the clock
    /// to its due time. Stale entries are discarded along the way.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        loop {
            let (&id, _) = self.queue.first_key_value()?;
            if id.due > until {
                return None;
            }
            let entry = self.queue.remove(&id)?;
            if let Some(key) = entry.key {
                if self.keyed.get(&key) == Some(&id) {
                    self.keyed.remove(&key);
                }
            }
            self.now = self.now.max(id.due);
            if entry.generation == self.generation {
                return Some(entry.action);
            }
            tracing::trace!("dropping stale timer due at {:?}", id.due);
        }
    }

    /// Moves the clock forward to `until` without running anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
