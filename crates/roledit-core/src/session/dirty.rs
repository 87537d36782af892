//! Derived "is the form modified" flag.
//!
//! Every change to the draft, the baseline or the pending-permissions flag
//! invalidates the flag; the comparison itself runs on a later idle tick so
//! that keystroke handlers never pay for a deep comparison. Only actual
//! transitions of the flag are reported.

use super::defer::Deferred;
use crate::role::{RoleDraft, is_changed};

/// Compute the dirty flag from scratch.
pub fn compute_dirty(
    baseline: Option<&RoleDraft>,
    draft: &RoleDraft,
    has_pending_permission_changes: bool,
) -> bool {
    has_pending_permission_changes || is_changed(baseline, draft)
}

#[derive(Debug, Clone)]
pub struct DirtyTracker {
    published: bool,
    recompute: Deferred<()>,
}

impl DirtyTracker {
    pub fn new(defer_ticks: u32) -> Self {
        Self {
            published: false,
            recompute: Deferred::new(defer_ticks),
        }
    }

    /// Last published value.
    pub fn is_dirty(&self) -> bool {
        self.published
    }

    /// Whether a recompute is waiting for an idle tick.
    pub fn is_stale(&self) -> bool {
        self.recompute.is_pending()
    }

    /// Schedule a recompute, superseding any pending one.
    pub fn invalidate(&mut self) {
        if self.recompute.schedule(()) {
            tracing::trace!("superseded pending dirty recompute");
        }
    }

    /// Advance one idle tick. Returns the new flag when it changed.
    pub fn tick(
        &mut self,
        baseline: Option<&RoleDraft>,
        draft: &RoleDraft,
        has_pending_permission_changes: bool,
    ) -> Option<bool> {
        self.recompute.tick()?;
        self.publish(compute_dirty(baseline, draft, has_pending_permission_changes))
    }

    /// Run a pending recompute immediately. Returns the new flag when it
    /// changed.
    pub fn flush(
        &mut self,
        baseline: Option<&RoleDraft>,
        draft: &RoleDraft,
        has_pending_permission_changes: bool,
    ) -> Option<bool> {
        self.recompute.take_now()?;
        self.publish(compute_dirty(baseline, draft, has_pending_permission_changes))
    }

    fn publish(&mut self, dirty: bool) -> Option<bool> {
        if dirty == self.published {
            tracing::trace!(dirty, "dirty flag unchanged");
            return None;
        }
        tracing::debug!(dirty, "dirty flag changed");
        self.published = dirty;
        Some(dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> RoleDraft {
        RoleDraft {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_recompute_waits_for_tick() {
        let mut tracker = DirtyTracker::new(1);
        tracker.invalidate();

        assert!(!tracker.is_dirty());
        assert!(tracker.is_stale());
        assert_eq!(tracker.tick(None, &named("Ops"), false), Some(true));
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_no_event_without_transition() {
        let mut tracker = DirtyTracker::new(1);
        tracker.invalidate();
        tracker.tick(None, &named("Ops"), false);

        tracker.invalidate();
        assert_eq!(tracker.tick(None, &named("Ops2"), false), None);
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_tick_without_invalidation_is_idle() {
        let mut tracker = DirtyTracker::new(1);
        assert_eq!(tracker.tick(None, &named("Ops"), false), None);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_burst_collapses_to_latest_state() {
        let mut tracker = DirtyTracker::new(3);
        tracker.invalidate();
        tracker.tick(None, &named("O"), false);
        tracker.invalidate();
        tracker.tick(None, &named("Op"), false);
        tracker.invalidate();

        assert_eq!(tracker.tick(None, &RoleDraft::new(), false), None);
        assert_eq!(tracker.tick(None, &RoleDraft::new(), false), None);
        assert_eq!(tracker.tick(None, &RoleDraft::new(), false), None);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_pending_override_forces_dirty() {
        let mut tracker = DirtyTracker::new(1);
        let baseline = named("Ops");
        tracker.invalidate();

        assert_eq!(tracker.flush(Some(&baseline), &baseline.clone(), true), Some(true));
        assert!(compute_dirty(Some(&baseline), &baseline, true));
        assert!(!compute_dirty(Some(&baseline), &baseline, false));
    }

    #[test]
    fn test_flush_only_runs_pending_recompute() {
        let mut tracker = DirtyTracker::new(5);
        assert_eq!(tracker.flush(None, &named("Ops"), false), None);

        tracker.invalidate();
        assert_eq!(tracker.flush(None, &named("Ops"), false), Some(true));
        assert!(!tracker.is_stale());
    }
}
