//! Application state and refresh orchestration.

use std::time::Instant;

use crate::data::align::{align, AlignedSeries};
use crate::data::record::{ActivityRecord, ActivitySnapshot};
use crate::refresh::{RefreshCoordinator, RefreshRequest, Scheduler, Surface};
use crate::source::worker::{Outcome, Payload, RegistryAction};
use crate::ui::chart::ChartView;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Registered servers with their latest status.
    Servers,
    /// Activity chart and recent samples.
    Activity,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Servers => View::Activity,
            View::Activity => View::Servers,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Servers => "Servers",
            View::Activity => "Activity",
        }
    }
}

/// What keystrokes currently mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a new server address; Enter submits, Esc cancels.
    AddServer(String),
    /// Confirming removal of the named server; y confirms, n/Esc cancels.
    ConfirmRemove(String),
}

/// Main application state.
///
/// Owned exclusively by the main loop; every mutation happens from a
/// callback body on that loop (key events, completed fetch outcomes,
/// one-second scheduler steps), never from a background context.
pub struct App {
    pub running: bool,
    pub view: View,
    pub show_help: bool,
    pub input: InputMode,
    pub theme: Theme,

    pub scheduler: Scheduler,
    pub coordinator: RefreshCoordinator,

    /// Latest applied summary samples, by server in first-seen order.
    pub snapshot: ActivitySnapshot,
    /// Derived from `snapshot`; rebuilt whole on every applied refresh.
    pub aligned: AlignedSeries,
    /// Built chart; replaced, never patched.
    pub chart: ChartView,
    /// Latest applied detail rows, newest first.
    pub detail_rows: Vec<ActivityRecord>,

    /// Row cursor in the servers table.
    pub server_cursor: usize,
    /// Axis slot under inspection in the activity view.
    pub inspect_slot: Option<usize>,

    pub load_error: Option<String>,
    backend: String,
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app with the given backend description and refresh
    /// interval.
    pub fn new(backend: String, interval_secs: u32, theme: Theme) -> Self {
        Self {
            running: true,
            view: View::Servers,
            show_help: false,
            input: InputMode::Normal,
            theme,
            scheduler: Scheduler::new(interval_secs),
            coordinator: RefreshCoordinator::new(),
            snapshot: ActivitySnapshot::new(),
            aligned: AlignedSeries::default(),
            chart: ChartView::default(),
            detail_rows: Vec::new(),
            server_cursor: 0,
            inspect_slot: None,
            load_error: None,
            backend,
            status_message: Some(("Loading...".to_string(), Instant::now())),
        }
    }

    /// The backend base URL, for the header.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Whether the activity view is currently visible. Together with the
    /// selection this gates the detail refresh: either alone suffices.
    pub fn detail_visible(&self) -> bool {
        self.view == View::Activity
    }

    /// Advance the countdown by one second; on fire, plan the refreshes.
    pub fn on_second(&mut self) -> Vec<RefreshRequest> {
        if self.scheduler.step() {
            let detail_visible = self.detail_visible();
            self.coordinator.plan_tick(detail_visible)
        } else {
            Vec::new()
        }
    }

    /// Refresh immediately and restart the countdown.
    pub fn refresh_now(&mut self) -> Vec<RefreshRequest> {
        self.scheduler.reset();
        let detail_visible = self.detail_visible();
        self.coordinator.plan_tick(detail_visible)
    }

    /// Change the selection and refresh without waiting for the
    /// countdown. Selecting a server also switches to the activity view.
    pub fn select_server(&mut self, server: Option<String>) -> Vec<RefreshRequest> {
        if server.is_some() {
            self.view = View::Activity;
        }
        self.inspect_slot = None;
        let requests = self.coordinator.select(server);
        // Retitle right away so the header matches while fetches run.
        self.chart = ChartView::build(&self.aligned, &self.chart_title());
        requests
    }

    /// Server name under the table cursor, if any.
    pub fn server_at_cursor(&self) -> Option<String> {
        self.snapshot.get_index(self.server_cursor).map(|(name, _)| name.clone())
    }

    /// Apply a completed fetch outcome. May yield follow-up requests
    /// (a registry change triggers an immediate summary refresh).
    pub fn apply(&mut self, outcome: Outcome) -> Vec<RefreshRequest> {
        match outcome {
            Outcome::Refresh { surface, seq, result } => {
                if !self.coordinator.is_current(surface, seq) {
                    // A newer request was issued for this surface; this
                    // response lost the race and is discarded.
                    tracing::debug!(?surface, seq, "discarding stale refresh response");
                    return Vec::new();
                }
                match result {
                    Ok(Payload::Summary(snapshot)) => {
                        self.load_error = None;
                        self.apply_summary(snapshot);
                    }
                    Ok(Payload::Detail(rows)) => {
                        self.load_error = None;
                        self.detail_rows = rows;
                    }
                    Err(error) => {
                        self.load_error = Some(error.to_string());
                    }
                }
                Vec::new()
            }
            Outcome::Registry { action, server, result } => match result {
                Ok(()) => {
                    let verb = match action {
                        RegistryAction::Added => "Added",
                        RegistryAction::Removed => "Removed",
                    };
                    self.set_status(format!("{} {}", verb, server));
                    if action == RegistryAction::Removed
                        && self.coordinator.selected() == Some(server.as_str())
                    {
                        return self.select_server(None);
                    }
                    vec![self.coordinator.request(Surface::Summary)]
                }
                Err(error) => {
                    let verb = match action {
                        RegistryAction::Added => "Add",
                        RegistryAction::Removed => "Remove",
                    };
                    self.set_status(format!("{} {} failed: {}", verb, server, error));
                    Vec::new()
                }
            },
        }
    }

    fn apply_summary(&mut self, snapshot: ActivitySnapshot) {
        self.snapshot = snapshot;
        self.aligned = align(&self.snapshot);
        self.chart = ChartView::build(&self.aligned, &self.chart_title());

        // Clamp cursors; the server set and axis may have shrunk.
        if self.server_cursor >= self.snapshot.len() {
            self.server_cursor = self.snapshot.len().saturating_sub(1);
        }
        let axis_len = self.aligned.axis().len();
        self.inspect_slot = match self.inspect_slot {
            Some(_) if axis_len == 0 => None,
            Some(slot) => Some(slot.min(axis_len - 1)),
            None => None,
        };
    }

    /// Chart title for the current selection.
    pub fn chart_title(&self) -> String {
        match self.coordinator.selected() {
            Some(server) => format!("Online players: {}", server),
            None => "Online players: All servers".to_string(),
        }
    }

    /// Move the servers-table cursor down by n rows.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.snapshot.len().saturating_sub(1);
        self.server_cursor = (self.server_cursor + n).min(max);
    }

    /// Move the servers-table cursor up by n rows.
    pub fn select_prev_n(&mut self, n: usize) {
        self.server_cursor = self.server_cursor.saturating_sub(n);
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_first(&mut self) {
        self.server_cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.server_cursor = self.snapshot.len().saturating_sub(1);
    }

    /// Move the inspection cursor one axis slot left (starts at the
    /// newest slot).
    pub fn inspect_left(&mut self) {
        let axis_len = self.aligned.axis().len();
        if axis_len == 0 {
            return;
        }
        self.inspect_slot = Some(match self.inspect_slot {
            None => axis_len - 1,
            Some(slot) => slot.saturating_sub(1),
        });
    }

    /// Move the inspection cursor one axis slot right.
    pub fn inspect_right(&mut self) {
        let axis_len = self.aligned.axis().len();
        if axis_len == 0 {
            return;
        }
        self.inspect_slot = Some(match self.inspect_slot {
            None => axis_len - 1,
            Some(slot) => (slot + 1).min(axis_len - 1),
        });
    }

    pub fn clear_inspect(&mut self) {
        self.inspect_slot = None;
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.view = self.view.next();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn status_message(&self) -> Option<&str> {
        if let Some((message, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(message);
            }
        }
        None
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
