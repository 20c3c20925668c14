//! imbrush-core - Histogram brushing engine
//!
//! Translates drag gestures over histogram/spark-line bins into
//! declarative filter predicates, and keeps those predicates in two-way
//! sync with a shared, externally owned collection of active filters.
//!
//! # Key Components
//!
//! - **Synthesis**: pure bin-window-to-predicate translation
//!   (`filter_for_bin`, `filter_for_bin_range`) and its inverse for
//!   externally edited expressions (`fields_from_expr`)
//! - **Brush**: the drag state machine - redraw, translate-with-clamp,
//!   click-to-clear (`DragGesture`)
//! - **Sync**: pull-before-push reconciliation with the shared filter
//!   collection (`FilterCollection`, `HistogramsPanel::sync_filters`)
//! - **Highlight**: debounced hover queries against a mask service
//!
//! All mutation happens on the caller's thread in response to discrete
//! events; synthesis is pure over the current stats snapshot.

pub mod brush;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod panel;
pub mod sync;
pub mod synth;

pub use brush::DragGesture;
pub use error::{SynthError, SynthResult};
pub use filter::{FilterFields, FilterShape, HistFilter};
pub use highlight::{
    EvalMaskService, HighlightQuery, HoverDebouncer, MaskError, MaskResponse, MaskService,
    HOVER_DEBOUNCE,
};
pub use panel::HistogramsPanel;
pub use sync::{
    DefaultFormatter, FilterChange, FilterCollection, FilterQuery, FilterRecord, QueryFormatter,
    HISTOGRAM_CONTROL_TYPE,
};
pub use synth::{fields_from_expr, filter_for_bin, filter_for_bin_range};
