//! Deadline queue for delayed and repeating level tasks
//!
//! Timers never run on their own: the owner advances the queue from its
//! tick and executes whatever comes due on the same thread. Cancelling a
//! timer (or all of them) simply drops its entry, so a torn-down level can
//! never see a stale callback.

use serde::{Deserialize, Serialize};

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    due: f64,
    period: Option<f64>,
    task: T,
}

/// Cancellable timers keyed on an internal clock (seconds)
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            entries: Vec::new(),
        }
    }

    /// Current clock value in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of timers still waiting
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `task` once, `delay` seconds from now
    pub fn schedule_once(&mut self, delay: f32, task: T) -> TimerId {
        self.push(delay, None, task)
    }

    /// Run `task` every `period` seconds, first firing one period from now
    pub fn schedule_repeating(&mut self, period: f32, task: T) -> TimerId {
        // A zero period would fire forever inside a single advance
        let period = f64::from(period).max(f64::EPSILON);
        self.push(period as f32, Some(period), task)
    }

    fn push(&mut self, delay: f32, period: Option<f64>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now + f64::from(delay.max(0.0)),
            period,
            task,
        });
        id
    }

    /// Drop a single timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every outstanding timer, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Seconds until `id` fires, if it is still pending
    pub fn remaining(&self, id: TimerId) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| (e.due - self.now).max(0.0))
    }
}

impl<T: Clone> Scheduler<T> {
    /// Advance the clock by `dt` and return every task that came due, in
    /// deadline order (ties broken by scheduling order).
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += f64::from(dt.max(0.0));

        let mut fired: Vec<(f64, TimerId, T)> = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());

        for mut entry in self.entries.drain(..) {
            match entry.period {
                None if entry.due <= self.now => fired.push((entry.due, entry.id, entry.task)),
                None => kept.push(entry),
                Some(period) => {
                    while entry.due <= self.now {
                        fired.push((entry.due, entry.id, entry.task.clone()));
                        entry.due += period;
                    }
                    kept.push(entry);
                }
            }
        }
        self.entries = kept;

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, task)| task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_once_fires_after_delay() {
        let mut sched = Scheduler::new();
        sched.schedule_once(1.0, "respawn");

        assert!(sched.advance(0.5).is_empty());
        assert_eq!(sched.advance(0.5), vec!["respawn"]);
        assert!(sched.is_empty());
        assert!(sched.advance(5.0).is_empty());
    }

    #[test]
    fn test_repeating_keeps_firing() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(10.0, "gravity");

        assert!(sched.advance(9.0).is_empty());
        assert_eq!(sched.advance(1.0), vec!["gravity"]);
        assert_eq!(sched.advance(25.0), vec!["gravity", "gravity"]);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_due_order_is_by_deadline_then_creation() {
        let mut sched = Scheduler::new();
        sched.schedule_once(2.0, 'c');
        sched.schedule_once(1.0, 'a');
        sched.schedule_once(1.0, 'b');

        assert_eq!(sched.advance(3.0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_cancel_single_and_all() {
        let mut sched = Scheduler::new();
        let a = sched.schedule_once(1.0, 1);
        sched.schedule_once(1.0, 2);
        sched.schedule_repeating(0.5, 3);

        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));
        assert_eq!(sched.cancel_all(), 2);
        assert!(sched.advance(10.0).is_empty());
    }

    #[test]
    fn test_remaining_time() {
        let mut sched = Scheduler::new();
        let id = sched.schedule_once(4.0, ());
        sched.advance(1.5);
        let left = sched.remaining(id).unwrap();
        assert!((left - 2.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn repeating_fire_count_matches_elapsed(steps in prop::collection::vec(0.0f32..3.0, 1..40)) {
            let mut sched = Scheduler::new();
            sched.schedule_repeating(1.0, ());
            let mut fired = 0usize;
            for dt in &steps {
                fired += sched.advance(*dt).len();
            }
            let expected = sched.now().floor() as usize;
            prop_assert_eq!(fired, expected);
        }
    }
}
