//! Debounced task driven by idle ticks.
//!
//! Scheduling replaces whatever was pending and restarts the countdown, so a
//! burst of inputs results in a single run after the burst settles. A
//! superseded task is dropped and never returned.

/// A single-slot debounced task.
#[derive(Debug, Clone)]
pub struct Deferred<T> {
    delay_ticks: u32,
    pending: Option<Pending<T>>,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    task: T,
    remaining: u32,
    generation: u64,
}

impl<T> Deferred<T> {
    /// `delay_ticks` is clamped to at least one tick.
    pub fn new(delay_ticks: u32) -> Self {
        Self {
            delay_ticks: delay_ticks.max(1),
            pending: None,
            generation: 0,
        }
    }

    pub fn delay_ticks(&self) -> u32 {
        self.delay_ticks
    }

    /// Schedule `task`, superseding any pending one. Returns `true` when an
    /// older task was discarded.
    pub fn schedule(&mut self, task: T) -> bool {
        self.generation += 1;
        let superseded = self.pending.is_some();
        self.pending = Some(Pending {
            task,
            remaining: self.delay_ticks,
            generation: self.generation,
        });
        superseded
    }

    /// Advance one idle tick; yields the task once its delay has elapsed.
    pub fn tick(&mut self) -> Option<T> {
        let pending = self.pending.as_mut()?;
        pending.remaining = pending.remaining.saturating_sub(1);
        if pending.remaining > 0 {
            return None;
        }
        self.pending.take().map(|p| p.task)
    }

    /// Take the pending task immediately, skipping the remaining delay.
    pub fn take_now(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.task)
    }

    /// Drop the pending task without running it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of tasks scheduled so far, including superseded ones.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the pending task, if any.
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.generation)
    }
}
