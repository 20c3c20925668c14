//! Hover highlight pipeline
//!
//! Hovering a bin previews the elements its predicate would match. Hover
//! events arrive in bursts, so queries are debounced with a 100 ms
//! trailing window and only the latest query in a burst survives
//! (last-query-wins, no queue). Highlight computation is a side channel:
//! its failures are reported and never touch filter state.
//!
//! The debouncer takes explicit `Instant`s instead of reading a clock, so
//! the temporal behavior is deterministic under test.

use imbrush_query::{evaluate_mask, selected_indices, EvalContext, QueryExpr};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Trailing debounce window for hover queries
pub const HOVER_DEBOUNCE: Duration = Duration::from_millis(100);

/// A highlight request for one bin's predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightQuery {
    pub attribute: String,
    pub ast: QueryExpr,
}

/// Trailing debouncer over highlight queries
#[derive(Debug, Default)]
pub struct HoverDebouncer {
    pending: Option<(Instant, HighlightQuery)>,
}

impl HoverDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a query at `now`, superseding any pending one
    pub fn submit(&mut self, query: HighlightQuery, now: Instant) {
        self.pending = Some((now, query));
    }

    /// Cancel the pending query, if any (hover ended before it fired)
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Emit the pending query once the quiescent window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<HighlightQuery> {
        match &self.pending {
            Some((submitted, _)) if now.duration_since(*submitted) >= HOVER_DEBOUNCE => {
                self.pending.take().map(|(_, query)| query)
            }
            _ => None,
        }
    }
}

/// Result of a mask computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskResponse {
    pub success: bool,
    /// Indices of matching elements
    pub computed_mask: Vec<usize>,
}

/// Mask computation errors
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("mask computation failed: {0}")]
    Computation(String),
}

/// External mask-computation collaborator
pub trait MaskService {
    fn compute_mask(&self, query: &HighlightQuery) -> Result<MaskResponse, MaskError>;
}

/// Default mask service evaluating predicates over an in-memory dataset
pub struct EvalMaskService<C: EvalContext> {
    context: C,
}

impl<C: EvalContext> EvalMaskService<C> {
    pub fn new(context: C) -> Self {
        Self { context }
    }
}

impl<C: EvalContext> MaskService for EvalMaskService<C> {
    fn compute_mask(&self, query: &HighlightQuery) -> Result<MaskResponse, MaskError> {
        let mask = evaluate_mask(&query.ast, &self.context)
            .map_err(|e| MaskError::Computation(e.to_string()))?;
        Ok(MaskResponse {
            success: true,
            computed_mask: selected_indices(&mask),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imbrush_query::LiteralValue;

    fn query(bin: &str) -> HighlightQuery {
        HighlightQuery {
            attribute: "category".to_string(),
            ast: QueryExpr::field_eq("category", bin.into()),
        }
    }

    #[test]
    fn test_burst_collapses_to_final_query() {
        let mut debouncer = HoverDebouncer::new();
        let t0 = Instant::now();

        debouncer.submit(query("a"), t0);
        debouncer.submit(query("b"), t0 + Duration::from_millis(30));
        debouncer.submit(query("c"), t0 + Duration::from_millis(60));

        // Still inside the window measured from the last submission.
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(100)), None);

        let fired = debouncer.poll(t0 + Duration::from_millis(160));
        assert_eq!(fired, Some(query("c")));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(300)), None);
    }

    #[test]
    fn test_cancel_before_window_emits_nothing() {
        let mut debouncer = HoverDebouncer::new();
        let t0 = Instant::now();

        debouncer.submit(query("a"), t0);
        debouncer.cancel();
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_fires_exactly_at_window() {
        let mut debouncer = HoverDebouncer::new();
        let t0 = Instant::now();

        debouncer.submit(query("a"), t0);
        assert!(debouncer.poll(t0 + HOVER_DEBOUNCE).is_some());
    }

    struct OneColumn {
        values: Vec<&'static str>,
    }

    impl EvalContext for OneColumn {
        fn num_rows(&self) -> usize {
            self.values.len()
        }

        fn value(&self, attribute: &str, row: usize) -> Option<LiteralValue> {
            if attribute == "category" {
                self.values.get(row).map(|&v| LiteralValue::from(v))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_eval_mask_service() {
        let service = EvalMaskService::new(OneColumn {
            values: vec!["a", "b", "a"],
        });
        let response = service.compute_mask(&query("a")).unwrap();
        assert!(response.success);
        assert_eq!(response.computed_mask, vec![0, 2]);
    }
}
