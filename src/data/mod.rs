//! Data models and processing for activity samples.
//!
//! ## Submodules
//!
//! - [`record`]: wire types for backend payloads and lenient decoding
//! - [`align`]: merging per-server sample streams onto a shared time axis
//!
//! ## Data Flow
//!
//! ```text
//! backend JSON
//!      |
//!      v
//! record::decode_snapshot()   (malformed records dropped individually)
//!      |
//!      v
//! align::align()              (shared axis, per-server gaps, lookup)
//!      |
//!      v
//! ui::chart::ChartView::build()
//! ```

pub mod align;
pub mod record;

pub use align::{align, AlignedSeries, EntitySeries};
pub use record::{decode_snapshot, flatten_recent, latest, ActivityRecord, ActivitySnapshot};
