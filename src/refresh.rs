//! Refresh cadence and coordination.
//!
//! [`Scheduler`] is a countdown driving periodic refresh: the main loop
//! steps it once per wall-clock second and fires a refresh when it hits
//! zero. [`RefreshCoordinator`] decides which surfaces a refresh touches,
//! owns the selected-server state, and guards against stale responses
//! with per-surface sequence numbers.

/// Countdown state for the periodic refresh.
///
/// The scheduler never owns a timer; the main loop observes one-second
/// boundaries and calls [`Scheduler::step`]. Stopping is simply ceasing
/// to step and dropping the value, which guarantees nothing fires later.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval_secs: u32,
    remaining: u32,
    paused: bool,
}

impl Scheduler {
    /// Create a scheduler with the given interval. A zero interval is
    /// coerced to one second; the interval must stay positive.
    pub fn new(interval_secs: u32) -> Self {
        let interval_secs = interval_secs.max(1);
        Self { interval_secs, remaining: interval_secs, paused: false }
    }

    /// Advance by one second. Returns `true` when the countdown fires,
    /// at which point `remaining` resets to the full interval.
    ///
    /// While paused this is still called but neither decrements nor
    /// fires: pausing freezes progress rather than deferring it.
    pub fn step(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.interval_secs;
            true
        } else {
            false
        }
    }

    /// Change the interval. Resets `remaining` to the new interval as
    /// well, so a mid-countdown change never produces a one-off short or
    /// long cycle. Zero is ignored.
    pub fn set_interval(&mut self, interval_secs: u32) {
        if interval_secs == 0 {
            return;
        }
        self.interval_secs = interval_secs;
        self.remaining = interval_secs;
    }

    /// Restart the countdown from the full interval (manual refresh).
    pub fn reset(&mut self) {
        self.remaining = self.interval_secs;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    /// Seconds until the next fire. Shown in the header every frame,
    /// frozen (not decrementing) while paused.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// A refreshable view surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Server list and activity chart.
    Summary,
    /// Per-server activity table.
    Detail,
}

/// One refresh to dispatch: which surface, under which sequence number,
/// optionally filtered to one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub surface: Surface,
    pub seq: u64,
    pub server: Option<String>,
}

/// Plans refreshes and filters their responses.
///
/// Responses are applied last-write-wins by completion order: every
/// issued request gets a monotonically increasing sequence number, and
/// only the latest issued sequence for a surface may be applied. A slow
/// response that arrives after a newer one has rendered is discarded.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    selected: Option<String>,
    next_seq: u64,
    latest_summary: Option<u64>,
    latest_detail: Option<u64>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently selected server, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Issue a request for one surface, scoped to the current selection.
    pub fn request(&mut self, surface: Surface) -> RefreshRequest {
        self.next_seq += 1;
        let seq = self.next_seq;
        match surface {
            Surface::Summary => self.latest_summary = Some(seq),
            Surface::Detail => self.latest_detail = Some(seq),
        }
        RefreshRequest { surface, seq, server: self.selected.clone() }
    }

    /// Plan one countdown fire: always the summary surface, plus the
    /// detail surface iff a server is selected OR the activity view is
    /// visible. Both flags are independent and either alone suffices: a
    /// visible-but-unselected aggregate view and a selected-but-hidden
    /// view both refresh.
    pub fn plan_tick(&mut self, detail_visible: bool) -> Vec<RefreshRequest> {
        let mut requests = vec![self.request(Surface::Summary)];
        if self.selected.is_some() || detail_visible {
            requests.push(self.request(Surface::Detail));
        }
        requests
    }

    /// Change the selection and refresh immediately, without waiting for
    /// the countdown. Selecting `None` returns to the all-servers view.
    pub fn select(&mut self, server: Option<String>) -> Vec<RefreshRequest> {
        self.selected = server;
        vec![self.request(Surface::Detail), self.request(Surface::Summary)]
    }

    /// Whether a response for `surface` under `seq` is still the latest
    /// issued and may be applied.
    pub fn is_current(&self, surface: Surface, seq: u64) -> bool {
        match surface {
            Surface::Summary => self.latest_summary == Some(seq),
            Surface::Detail => self.latest_detail == Some(seq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_fires_once_after_interval() {
        let mut sched = Scheduler::new(5);
        let mut fires = 0;
        for _ in 0..5 {
            if sched.step() {
                fires += 1;
            }
        }
        assert_eq!(fires, 1);
        assert_eq!(sched.remaining(), 5);
    }

    #[test]
    fn test_scheduler_pause_freezes_remaining() {
        let mut sched = Scheduler::new(5);
        assert!(!sched.step());
        assert!(!sched.step());
        assert_eq!(sched.remaining(), 3);

        sched.pause();
        for _ in 0..10 {
            assert!(!sched.step());
        }
        assert_eq!(sched.remaining(), 3);

        sched.resume();
        assert!(!sched.step());
        assert!(!sched.step());
        assert!(sched.step());
        assert_eq!(sched.remaining(), 5);
    }

    #[test]
    fn test_scheduler_set_interval_resets_remaining() {
        let mut sched = Scheduler::new(30);
        sched.step();
        sched.step();
        assert_eq!(sched.remaining(), 28);

        sched.set_interval(10);
        assert_eq!(sched.interval_secs(), 10);
        assert_eq!(sched.remaining(), 10);
    }

    #[test]
    fn test_scheduler_ignores_zero_interval() {
        let mut sched = Scheduler::new(30);
        sched.set_interval(0);
        assert_eq!(sched.interval_secs(), 30);

        let sched = Scheduler::new(0);
        assert_eq!(sched.interval_secs(), 1);
    }

    #[test]
    fn test_scheduler_reset() {
        let mut sched = Scheduler::new(5);
        sched.step();
        sched.step();
        sched.reset();
        assert_eq!(sched.remaining(), 5);
    }

    #[test]
    fn test_scheduler_fires_repeatedly() {
        let mut sched = Scheduler::new(2);
        let mut fires = 0;
        for _ in 0..6 {
            if sched.step() {
                fires += 1;
            }
        }
        assert_eq!(fires, 3);
    }

    #[test]
    fn test_plan_tick_always_includes_summary() {
        let mut coord = RefreshCoordinator::new();
        let requests = coord.plan_tick(false);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].surface, Surface::Summary);
        assert_eq!(requests[0].server, None);
    }

    #[test]
    fn test_plan_tick_detail_on_selection_or_visibility() {
        // Visible but unselected
        let mut coord = RefreshCoordinator::new();
        let requests = coord.plan_tick(true);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].surface, Surface::Detail);
        assert_eq!(requests[1].server, None);

        // Selected but hidden
        let mut coord = RefreshCoordinator::new();
        coord.select(Some("play.example.net".to_string()));
        let requests = coord.plan_tick(false);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].server.as_deref(), Some("play.example.net"));

        // Both
        let requests = coord.plan_tick(true);
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn test_select_refreshes_immediately() {
        let mut coord = RefreshCoordinator::new();
        let requests = coord.select(Some("mc.other.org".to_string()));

        assert_eq!(requests.len(), 2);
        assert!(requests.iter().any(|r| r.surface == Surface::Detail));
        assert!(requests.iter().any(|r| r.surface == Surface::Summary));
        assert!(requests.iter().all(|r| r.server.as_deref() == Some("mc.other.org")));
        assert_eq!(coord.selected(), Some("mc.other.org"));

        // Clearing the selection also refreshes, unscoped
        let requests = coord.select(None);
        assert!(requests.iter().all(|r| r.server.is_none()));
        assert_eq!(coord.selected(), None);
    }

    #[test]
    fn test_stale_response_is_not_current() {
        let mut coord = RefreshCoordinator::new();
        let first = coord.request(Surface::Summary);
        let second = coord.request(Surface::Summary);

        // The later-issued request completes first and is applied
        assert!(coord.is_current(Surface::Summary, second.seq));
        // The earlier one arrives afterwards and must be discarded
        assert!(!coord.is_current(Surface::Summary, first.seq));
    }

    #[test]
    fn test_sequence_guard_is_per_surface() {
        let mut coord = RefreshCoordinator::new();
        let summary = coord.request(Surface::Summary);
        let detail = coord.request(Surface::Detail);

        assert!(coord.is_current(Surface::Summary, summary.seq));
        assert!(coord.is_current(Surface::Detail, detail.seq));
        assert!(!coord.is_current(Surface::Summary, detail.seq));
    }
}
