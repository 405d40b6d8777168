//! engine::progress
//!
//! Progress reporting and cooperative cancellation.
//!
//! # Architecture
//!
//! A command invocation reports against a fixed budget of units split
//! between its phases. Each phase receives a [`SubMonitor`] that scales
//! the phase's own task size onto its share of the parent budget, so
//! phases never need to know about each other.
//!
//! The response phase has no known size: the server may send two lines or
//! twenty thousand. [`ResponseProgress`] reports against a fixed number of
//! units by starting with a small number of lines per unit and doubling it
//! each time reported work passes the current half-way mark. Short streams
//! move the bar quickly; long ones approach the end without reaching it.
//!
//! Cancellation is cooperative: the engine polls
//! [`ProgressMonitor::is_cancelled`] at fixed checkpoints and before every
//! response line.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Receives progress and answers cancellation queries.
pub trait ProgressMonitor {
    /// Start a task of `total` units.
    fn begin_task(&self, name: &str, total: u32);

    /// Report `units` of completed work.
    fn worked(&self, units: u32);

    /// The task is finished.
    fn done(&self);

    /// Whether the caller asked to stop.
    fn is_cancelled(&self) -> bool;
}

/// Monitor that ignores everything and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl ProgressMonitor for NullMonitor {
    fn begin_task(&self, _name: &str, _total: u32) {}

    fn worked(&self, _units: u32) {}

    fn done(&self) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Child monitor owning a fixed number of parent ticks.
///
/// Work reported to the child is scaled onto `ticks` units of the parent.
/// [`done`](ProgressMonitor::done) reports whatever share is still
/// outstanding, so a phase consumes exactly its allocation however much of
/// its own task it completed.
#[derive(Debug)]
pub struct SubMonitor<'a, M: ProgressMonitor + ?Sized> {
    parent: &'a M,
    ticks: u32,
    total: Cell<u32>,
    worked: Cell<u32>,
    reported: Cell<u32>,
}

impl<'a, M: ProgressMonitor + ?Sized> SubMonitor<'a, M> {
    pub fn new(parent: &'a M, ticks: u32) -> Self {
        Self {
            parent,
            ticks,
            total: Cell::new(0),
            worked: Cell::new(0),
            reported: Cell::new(0),
        }
    }

    fn report_up_to(&self, target: u32) {
        let target = target.min(self.ticks);
        let reported = self.reported.get();
        if target > reported {
            self.parent.worked(target - reported);
            self.reported.set(target);
        }
    }
}

impl<M: ProgressMonitor + ?Sized> ProgressMonitor for SubMonitor<'_, M> {
    fn begin_task(&self, _name: &str, total: u32) {
        self.total.set(total);
        self.worked.set(0);
    }

    fn worked(&self, units: u32) {
        let total = self.total.get();
        if total == 0 {
            return;
        }
        let worked = self.worked.get().saturating_add(units).min(total);
        self.worked.set(worked);
        let scaled = u64::from(worked) * u64::from(self.ticks) / u64::from(total);
        self.report_up_to(scaled as u32);
    }

    fn done(&self) {
        self.report_up_to(self.ticks);
    }

    fn is_cancelled(&self) -> bool {
        self.parent.is_cancelled()
    }
}

/// Tuning of the response-phase progress estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTuning {
    /// Units the response phase reports against.
    pub total_work: u32,
    /// Response lines per unit at the start of the phase.
    pub initial_increment: u32,
}

impl Default for ProgressTuning {
    fn default() -> Self {
        Self {
            total_work: 300,
            initial_increment: 4,
        }
    }
}

/// Adaptive estimate of progress through a response stream of unknown length.
///
/// # Example
///
/// ```
/// use cvsclient::engine::progress::{ProgressTuning, ResponseProgress};
///
/// let mut progress = ResponseProgress::new(ProgressTuning::default());
/// let units: u32 = (0..4).map(|_| progress.tick()).sum();
/// assert_eq!(units, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ResponseProgress {
    total: u32,
    increment: u32,
    half_way: u32,
    countdown: u32,
    worked: u32,
}

impl ResponseProgress {
    pub fn new(tuning: ProgressTuning) -> Self {
        let increment = tuning.initial_increment.max(1);
        Self {
            total: tuning.total_work,
            increment,
            half_way: tuning.total_work / 2,
            countdown: increment,
            worked: 0,
        }
    }

    /// Account for one response line and return the units to report.
    pub fn tick(&mut self) -> u32 {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return 0;
        }

        self.countdown = self.increment;
        // The estimate never claims the phase is complete.
        if self.worked + 1 >= self.total {
            return 0;
        }

        self.worked += 1;
        if self.worked >= self.half_way {
            self.increment = self.increment.saturating_mul(2);
            self.half_way += (self.total - self.half_way) / 2;
            self.countdown = self.increment;
        }
        1
    }

    /// Units reported so far.
    pub fn worked(&self) -> u32 {
        self.worked
    }

    /// Response lines per unit at this point of the stream.
    pub fn increment(&self) -> u32 {
        self.increment
    }
}

/// Monitor that records what it is told, for tests and diagnostics.
///
/// Clones share state, so one clone can be handed to a command while another
/// cancels it or inspects the totals.
#[derive(Debug, Clone, Default)]
pub struct RecordingMonitor {
    inner: Arc<RecordingInner>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    tasks: Mutex<Vec<(String, u32)>>,
    worked: AtomicU32,
    done: AtomicUsize,
    cancel_checks: AtomicUsize,
    cancelled: AtomicBool,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Tasks begun, with their sizes.
    pub fn tasks(&self) -> Vec<(String, u32)> {
        self.inner.tasks.lock().unwrap().clone()
    }

    /// Total units reported.
    pub fn total_worked(&self) -> u32 {
        self.inner.worked.load(Ordering::SeqCst)
    }

    pub fn done_count(&self) -> usize {
        self.inner.done.load(Ordering::SeqCst)
    }

    /// How often cancellation was polled.
    pub fn cancel_checks(&self) -> usize {
        self.inner.cancel_checks.load(Ordering::SeqCst)
    }
}

impl ProgressMonitor for RecordingMonitor {
    fn begin_task(&self, name: &str, total: u32) {
        self.inner
            .tasks
            .lock()
            .unwrap()
            .push((name.to_string(), total));
    }

    fn worked(&self, units: u32) {
        self.inner.worked.fetch_add(units, Ordering::SeqCst);
    }

    fn done(&self) {
        self.inner.done.fetch_add(1, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancel_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}
