//! Local histogram filter records
//!
//! A `HistFilter` is the engine-owned record of one attribute's active bin
//! selection: the committed bin window, the structured predicate summary,
//! and the synthesized AST. The summary is a tagged variant - exactly one
//! of range / equals / not-in can be active, which rules out the mixed
//! states a bag of optional fields would allow.

use imbrush_query::{LiteralValue, QueryExpr};
use imbrush_stats::ElementType;
use serde::{Deserialize, Serialize};

/// Structured summary of a filter predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterShape {
    /// Inclusive-exclusive range over the attribute. One-sided ranges
    /// arise from externally edited `>` / `<` predicates.
    Range {
        start: Option<LiteralValue>,
        stop: Option<LiteralValue>,
    },
    /// One or more discrete values
    Equals(Vec<LiteralValue>),
    /// Complement of an explicit value set
    NotIn(Vec<LiteralValue>),
}

impl FilterShape {
    /// Create a two-sided range
    pub fn range(start: LiteralValue, stop: LiteralValue) -> Self {
        FilterShape::Range {
            start: Some(start),
            stop: Some(stop),
        }
    }

    /// Create a single-value equality
    pub fn equals_one(value: LiteralValue) -> Self {
        FilterShape::Equals(vec![value])
    }

    pub fn is_range(&self) -> bool {
        matches!(self, FilterShape::Range { .. })
    }
}

/// Partial predicate fields decoded from an external expression.
///
/// The inverse of synthesis: an externally edited query decodes into
/// whichever of these fields its shape supports, and nothing more.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterFields {
    pub start: Option<LiteralValue>,
    pub stop: Option<LiteralValue>,
    pub equals: Option<Vec<LiteralValue>>,
}

impl FilterFields {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && self.equals.is_none()
    }

    /// Collapse into a shape, if any field was decoded
    pub fn into_shape(self) -> Option<FilterShape> {
        if let Some(equals) = self.equals {
            return Some(FilterShape::Equals(equals));
        }
        if self.start.is_some() || self.stop.is_some() {
            return Some(FilterShape::Range {
                start: self.start,
                stop: self.stop,
            });
        }
        None
    }
}

/// Engine-owned filter record for one attribute's bin selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistFilter {
    /// Attribute the selection filters
    pub attribute: String,
    /// Graph element type the attribute belongs to
    pub element_type: ElementType,
    /// Structured predicate summary, when the selection is representable
    /// as a single range / equality / complement
    pub shape: Option<FilterShape>,
    /// Synthesized predicate. `None` is the explicit "no predicate" case:
    /// every candidate bin in the window was empty or missing.
    pub ast: Option<QueryExpr>,
    /// First selected bin, inclusive
    pub first_bin: usize,
    /// Last selected bin, inclusive
    pub last_bin: usize,
    /// Whether the originating drag has finished
    pub completed: bool,
}

impl HistFilter {
    pub fn new(attribute: impl Into<String>, element_type: ElementType, first_bin: usize, last_bin: usize) -> Self {
        Self {
            attribute: attribute.into(),
            element_type,
            shape: None,
            ast: None,
            first_bin,
            last_bin,
            completed: false,
        }
    }

    /// Whether a bin position falls inside the selected window
    pub fn contains_bin(&self, bin: usize) -> bool {
        self.first_bin <= bin && bin <= self.last_bin
    }

    /// Merge externally decoded fields, with already-set local fields
    /// taking precedence. Only fields not already present are filled in.
    pub fn apply_fields(&mut self, fields: FilterFields) {
        match &mut self.shape {
            None => {
                self.shape = fields.into_shape();
            }
            Some(FilterShape::Range { start, stop }) => {
                if start.is_none() {
                    *start = fields.start;
                }
                if stop.is_none() {
                    *stop = fields.stop;
                }
            }
            // Equals / NotIn carry every field they have; nothing to fill.
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_into_shape() {
        let fields = FilterFields {
            equals: Some(vec!["a".into()]),
            ..FilterFields::default()
        };
        assert_eq!(fields.into_shape(), Some(FilterShape::Equals(vec!["a".into()])));

        let fields = FilterFields {
            start: Some(10.0.into()),
            ..FilterFields::default()
        };
        assert_eq!(
            fields.into_shape(),
            Some(FilterShape::Range {
                start: Some(10.0.into()),
                stop: None,
            })
        );

        assert_eq!(FilterFields::default().into_shape(), None);
    }

    #[test]
    fn test_apply_fields_set_fields_win() {
        let mut filter = HistFilter::new("degree", ElementType::Point, 0, 2);
        filter.shape = Some(FilterShape::Range {
            start: Some(10.0.into()),
            stop: None,
        });

        filter.apply_fields(FilterFields {
            start: Some(99.0.into()),
            stop: Some(50.0.into()),
            equals: None,
        });

        assert_eq!(
            filter.shape,
            Some(FilterShape::Range {
                start: Some(10.0.into()),
                stop: Some(50.0.into()),
            })
        );
    }

    #[test]
    fn test_apply_fields_fills_missing_shape() {
        let mut filter = HistFilter::new("category", ElementType::Point, 1, 1);
        filter.apply_fields(FilterFields {
            equals: Some(vec!["b".into()]),
            ..FilterFields::default()
        });
        assert_eq!(filter.shape, Some(FilterShape::Equals(vec!["b".into()])));
    }

    #[test]
    fn test_apply_fields_keeps_equals() {
        let mut filter = HistFilter::new("category", ElementType::Point, 0, 1);
        filter.shape = Some(FilterShape::Equals(vec!["a".into()]));
        filter.apply_fields(FilterFields {
            equals: Some(vec!["zzz".into()]),
            ..FilterFields::default()
        });
        assert_eq!(filter.shape, Some(FilterShape::Equals(vec!["a".into()])));
    }

    #[test]
    fn test_filter_serde_round_trip() {
        let mut filter = HistFilter::new("degree", ElementType::Point, 2, 4);
        filter.shape = Some(FilterShape::range(20.0.into(), 50.0.into()));
        filter.ast = Some(QueryExpr::between("degree", 20.0.into(), 50.0.into()));
        filter.completed = true;

        let json = serde_json::to_string(&filter).unwrap();
        let back: HistFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(filter, back);
    }

    #[test]
    fn test_contains_bin() {
        let filter = HistFilter::new("degree", ElementType::Point, 3, 5);
        assert!(filter.contains_bin(3));
        assert!(filter.contains_bin(5));
        assert!(!filter.contains_bin(6));
    }
}
