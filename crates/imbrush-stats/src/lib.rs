//! imbrush-stats - Binning model for histogram widgets
//!
//! Per-attribute bin statistics and strategies:
//!
//! - **GlobalStats**: immutable binning snapshots supplied by an external
//!   aggregation service (equal-width histogram buckets or categorical
//!   count-by buckets with an optional `_other` long-tail aggregate)
//! - **HistogramModel**: widget-facing state per attribute (orientation,
//!   position, local counts) with queue-and-drain change notifications
//! - **Stacked shaping**: render-ready local/global stacked bars

pub mod binning;
pub mod model;
pub mod stacked;

pub use binning::*;
pub use model::*;
pub use stacked::*;
