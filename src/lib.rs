//! # playerwatch
//!
//! A terminal client for monitoring game server activity. It polls an
//! activity backend over HTTP for per-server online-status samples and
//! renders them as a multi-series time chart alongside refreshable
//! tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         Main loop                             │
//! │  ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌────────────┐  │
//! │  │ refresh │──▶│   app    │──▶│   data   │──▶│     ui     │  │
//! │  │(cadence)│   │ (state)  │   │ (align)  │   │ (rendering)│  │
//! │  └─────────┘   └────┬─────┘   └──────────┘   └────────────┘  │
//! │                     │ ▲                                       │
//! │            commands ▼ │ outcomes                              │
//! │                ┌────────────┐                                 │
//! │                │   source   │◀── activity backend (HTTP)      │
//! │                └────────────┘                                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`refresh`]**: the poll scheduler (pausable per-second countdown)
//!   and the refresh coordinator (what to fetch on each fire, selection
//!   state, stale-response sequence guard)
//! - **[`data`]**: wire types with lenient decoding, and the series
//!   aligner that merges per-server sample streams onto a shared time
//!   axis with explicit gaps
//! - **[`source`]**: the backend HTTP client and the background fetch
//!   worker bridging async HTTP to the synchronous TUI loop
//! - **[`app`]**: owned application state, mutated only from the main
//!   loop
//! - **[`ui`]**: ratatui rendering - chart, tables, chrome, theme
//!
//! ## Concurrency model
//!
//! All state lives on the main loop. Fetches run as tasks on a tokio
//! runtime and report back over channels; completions are applied in
//! arrival order, and a per-surface sequence number discards responses
//! that lost a race to a newer request. There are no locks and no
//! background work after the loop exits.

pub mod app;
pub mod data;
pub mod events;
pub mod refresh;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, InputMode, View};
pub use data::{align, AlignedSeries, ActivityRecord, ActivitySnapshot, EntitySeries};
pub use refresh::{RefreshCoordinator, RefreshRequest, Scheduler, Surface};
pub use source::{
    ActivityClient, ClientError, FetchCommand, FetchLimits, FetchWorker, Outcome, Payload,
    RegistryAction,
};
pub use ui::{ChartView, Theme};
