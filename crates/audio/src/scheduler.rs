//! Deterministic timer queue driven by the host's frame loop.
//!
//! Time only moves when the host calls [`Scheduler::pop_due`] /
//! [`Scheduler::finish`] with a later instant, so the same sequence of frame
//! deltas always fires the same timers in the same order.

use std::time::Duration;

/// Shortest interval a repeating timer may use.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    due: Duration,
    interval: Option<Duration>,
    /// Tie-breaker: timers due at the same instant fire in scheduling order.
    seq: u64,
    task: T,
}

/// One-shot and repeating timers over a virtual clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    timers: Vec<Timer<T>>,
    next_id: u64,
    next_seq: u64,
}

impl<T: Clone> Scheduler<T> {
    /// Empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            timers: Vec::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    /// Current clock time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Whether `id` is still pending.
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Fire `task` once, `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration, task: T) -> TimerId {
        self.insert(self.now + delay, None, task)
    }

    /// Fire `task` every `interval`, first at `now + interval`.
    pub fn schedule_repeating(&mut self, interval: Duration, task: T) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(self.now + interval, Some(interval), task)
    }

    fn insert(&mut self, due: Duration, interval: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.timers.push(Timer {
            id,
            due,
            interval,
            seq,
            task,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Remove a pending timer. Returns false if it was not pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Repeating timers are re-armed one interval later.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;

        let due = self.timers[index].due;
        self.now = self.now.max(due);

        match self.timers[index].interval {
            Some(interval) => {
                let seq = self.bump_seq();
                let timer = &mut self.timers[index];
                timer.due += interval;
                timer.seq = seq;
                Some((timer.id, timer.task.clone()))
            }
            None => {
                let timer = self.timers.remove(index);
                Some((timer.id, timer.task))
            }
        }
    }

    /// Move the clock forward to `until` once all due timers have fired.
    pub fn finish(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
