//! Deferred execution of simulated remote behavior
//!
//! The provider never sleeps on the caller's thread. Ringing, answering and
//! other remote reactions are handed to a [`Scheduler`]:
//! - [`ThreadScheduler`] runs each task on its own thread after a real delay
//! - [`ManualScheduler`] keeps a virtual clock that tests advance explicitly

use std::collections::BTreeMap;
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error};

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed
    fn schedule(&self, delay: Duration, task: Task);
}

// ============================================================================
// ThreadScheduler
// ============================================================================

/// Runs every task on a dedicated background thread
#[derive(Default)]
pub struct ThreadScheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until every task scheduled so far has run
    ///
    /// Tasks scheduled while waiting are waited for as well.
    pub fn join(&self) {
        loop {
            let handles = std::mem::take(&mut *self.handles.lock());
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if handle.join().is_err() {
                    error!("scheduled task panicked");
                }
            }
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let spawned = thread::Builder::new()
            .name("gibberish-task".to_string())
            .spawn(move || {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                task();
            });

        match spawned {
            Ok(handle) => {
                let mut handles = self.handles.lock();
                handles.retain(|h| !h.is_finished());
                handles.push(handle);
            }
            Err(e) => error!("failed to spawn scheduled task: {}", e),
        }
    }
}

impl fmt::Debug for ThreadScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadScheduler")
            .field("pending", &self.handles.lock().len())
            .finish()
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

#[derive(Default)]
struct Timeline {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Task>,
}

/// Virtual-time scheduler for deterministic tests
///
/// Nothing runs until the clock is advanced. Tasks that are due run in
/// due-time order, ties broken by scheduling order. A task may schedule
/// further tasks; those run in the same advance if they fall due within it.
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
/// use callkit_gibberish::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// scheduler.schedule(Duration::from_millis(10), Box::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// assert_eq!(scheduler.advance(Duration::from_millis(9)), 0);
/// assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    timeline: Mutex<Timeline>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time, measured from creation
    pub fn now(&self) -> Duration {
        self.timeline.lock().now
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.timeline.lock().queue.len()
    }

    /// Move the clock forward by `by`, running every task that falls due
    ///
    /// Returns the number of tasks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.timeline.lock().now = target;
        ran
    }

    /// Run tasks in order until none remain, moving the clock as needed
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(Duration::MAX) {
            task();
            ran += 1;
        }
        ran
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut timeline = self.timeline.lock();
        let (&(due, seq), _) = timeline.queue.first_key_value()?;
        if due > target {
            return None;
        }
        let task = timeline.queue.remove(&(due, seq))?;
        if due > timeline.now {
            timeline.now = due;
        }
        Some(task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut timeline = self.timeline.lock();
        let due = timeline.now.saturating_add(delay);
        let seq = timeline.next_seq;
        timeline.next_seq += 1;
        debug!(?due, seq, "task scheduled");
        timeline.queue.insert((due, seq), task);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeline = self.timeline.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &timeline.now)
            .field("pending", &timeline.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |label: &'static str| -> Task {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_tasks_run_in_due_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::from_millis(30), task("late"));
        scheduler.schedule(Duration::from_millis(10), task("early"));
        scheduler.schedule(Duration::from_millis(10), task("early-second"));

        assert_eq!(scheduler.advance(Duration::from_millis(20)), 2);
        assert_eq!(*log.lock(), vec!["early", "early-second"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.run_until_idle(), 1);
        assert_eq!(*log.lock(), vec!["early", "early-second", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_nested_scheduling_within_window() {
        let scheduler = Arc::new(ManualScheduler::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_scheduler = Arc::clone(&scheduler);
        let inner_hits = Arc::clone(&hits);
        scheduler.schedule(
            Duration::from_millis(5),
            Box::new(move || {
                let hits = Arc::clone(&inner_hits);
                inner_scheduler.schedule(
                    Duration::from_millis(5),
                    Box::new(move || {
                        hits.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_delay_waits_for_advance() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule(Duration::ZERO, task("now"));
        assert!(log.lock().is_empty());
        assert_eq!(scheduler.advance(Duration::ZERO), 1);
        assert_eq!(*log.lock(), vec!["now"]);
    }

    #[test]
    fn test_thread_scheduler_runs_tasks() {
        let scheduler = ThreadScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            scheduler.schedule(
                Duration::from_millis(1),
                Box::new(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        scheduler.join();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
