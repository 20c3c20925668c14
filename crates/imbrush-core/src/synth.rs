//! Filter synthesis
//!
//! Pure translation between bin selections and predicates:
//!
//! - `filter_for_bin` / `filter_for_bin_range`: a bin index (or inclusive
//!   index window) becomes a `HistFilter` with a structured summary and a
//!   predicate AST
//! - `fields_from_expr`: the inverse, decoding an externally edited
//!   predicate back into range/equality fields
//!
//! Synthesis only reads the current `GlobalStats` snapshot; replaying the
//! same window against the same snapshot produces a structurally
//! identical predicate.

use crate::error::{SynthError, SynthResult};
use crate::filter::{FilterFields, FilterShape, HistFilter};
use imbrush_query::{BinaryOp, LiteralValue, QueryExpr};
use imbrush_stats::{BinDescriptor, BinningStrategy, GlobalStats, HistogramModel, OTHER_BIN_KEY};

/// Synthesize the predicate for a single bin
pub fn filter_for_bin(
    model: &HistogramModel,
    stats: &GlobalStats,
    bin: usize,
) -> SynthResult<HistFilter> {
    let mut filter = HistFilter::new(model.attribute.clone(), model.element_type, bin, bin);

    match model.binning_strategy(stats) {
        BinningStrategy::CountBy => {
            let key = stats.bin_key(bin).ok_or_else(|| SynthError::BinOutOfRange {
                attribute: model.attribute.clone(),
                bin,
            })?;
            if key == OTHER_BIN_KEY && stats.other.is_some() {
                let keys = stats.declared_keys();
                filter.ast = Some(QueryExpr::not(QueryExpr::in_list(
                    &model.attribute,
                    keys.clone(),
                )));
                filter.shape = Some(FilterShape::NotIn(keys));
            } else if let Some(descriptor) = stats.descriptor(bin) {
                apply_descriptor(&mut filter, &model.attribute, descriptor);
            } else {
                let value = stats.key_literal(key);
                filter.ast = Some(QueryExpr::field_eq(&model.attribute, value.clone()));
                filter.shape = Some(FilterShape::equals_one(value));
            }
        }

        BinningStrategy::Histogram => {
            // Descriptors override the positional arithmetic, e.g. a last
            // bin that absorbs the domain remainder.
            if let Some(descriptor) = stats.descriptor(bin) {
                apply_descriptor(&mut filter, &model.attribute, descriptor);
            } else {
                let (min_value, bin_width) = numeric_bounds(model, stats)?;
                let start = min_value + bin_width * bin as f64;
                let stop = start + bin_width;
                filter.ast = Some(QueryExpr::between(
                    &model.attribute,
                    start.into(),
                    stop.into(),
                ));
                filter.shape = Some(FilterShape::range(start.into(), stop.into()));
            }
        }
    }

    Ok(filter)
}

/// Synthesize the predicate for an inclusive bin window.
///
/// `first > last` is a caller contract violation and fails fast;
/// `first == last` degenerates to `filter_for_bin`.
pub fn filter_for_bin_range(
    model: &HistogramModel,
    stats: &GlobalStats,
    first: usize,
    last: usize,
) -> SynthResult<HistFilter> {
    if first > last {
        return Err(SynthError::InvalidBinRange { first, last });
    }
    if first == last {
        return filter_for_bin(model, stats, first);
    }

    let mut filter = HistFilter::new(model.attribute.clone(), model.element_type, first, last);

    match model.binning_strategy(stats) {
        BinningStrategy::Histogram => {
            let (min_value, bin_width) = numeric_bounds(model, stats)?;
            let start = min_value + bin_width * first as f64;
            let stop = min_value + bin_width * last as f64 + bin_width;
            filter.ast = Some(QueryExpr::between(
                &model.attribute,
                start.into(),
                stop.into(),
            ));
            filter.shape = Some(FilterShape::range(start.into(), stop.into()));
        }

        BinningStrategy::CountBy => synthesize_count_by_range(&mut filter, model, stats, first, last),
    }

    Ok(filter)
}

/// A run of positionally adjacent range descriptors
struct Span {
    min: LiteralValue,
    max: LiteralValue,
    last_position: usize,
}

fn synthesize_count_by_range(
    filter: &mut HistFilter,
    model: &HistogramModel,
    stats: &GlobalStats,
    first: usize,
    last: usize,
) {
    let attribute = &model.attribute;
    let mut discrete: Vec<LiteralValue> = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut other_selected = false;

    for position in first..=last {
        let key = match stats.bin_key(position) {
            Some(key) => key,
            // Rendered windows can extend past the declared buckets;
            // empty positions contribute no term.
            None => continue,
        };
        if key == OTHER_BIN_KEY {
            other_selected = true;
            continue;
        }
        match stats.descriptor(position) {
            Some(BinDescriptor::Range { min, max }) => match spans.last_mut() {
                // Merge only positionally adjacent runs; a gap starts a
                // fresh span.
                Some(span) if span.last_position + 1 == position => {
                    span.max = max.clone();
                    span.last_position = position;
                }
                _ => spans.push(Span {
                    min: min.clone(),
                    max: max.clone(),
                    last_position: position,
                }),
            },
            Some(BinDescriptor::Singular { representative }) => {
                discrete.push(representative.clone());
            }
            None => discrete.push(stats.key_literal(key)),
        }
    }

    let mut ast: Option<QueryExpr> = None;
    if discrete.len() > 1 {
        ast = Some(QueryExpr::in_list(attribute, discrete.clone()));
        filter.shape = Some(FilterShape::Equals(discrete.clone()));
    } else if let Some(value) = discrete.first() {
        ast = Some(QueryExpr::field_eq(attribute, value.clone()));
        filter.shape = Some(FilterShape::Equals(vec![value.clone()]));
    }

    let range_predicates: Vec<QueryExpr> = spans
        .iter()
        .map(|span| QueryExpr::between(attribute, span.min.clone(), span.max.clone()))
        .collect();

    // Fold from the rightmost accumulated term leftward so a replayed
    // selection associates its OR terms identically.
    for predicate in &range_predicates {
        ast = Some(match ast {
            None => predicate.clone(),
            Some(acc) => QueryExpr::or(predicate.clone(), acc),
        });
    }

    if other_selected {
        let keys = stats.declared_keys();
        let mut other_ast = QueryExpr::not(QueryExpr::in_list(attribute, keys.clone()));
        for predicate in &range_predicates {
            other_ast = QueryExpr::and(QueryExpr::not(predicate.clone()), other_ast);
        }
        ast = Some(match ast {
            None => other_ast,
            Some(acc) => QueryExpr::or(other_ast, acc),
        });
        if discrete.is_empty() && spans.is_empty() {
            filter.shape = Some(FilterShape::NotIn(keys));
        }
    } else if spans.len() == 1 && discrete.is_empty() {
        // A single merged span stays representable as a plain range.
        let span = &spans[0];
        filter.shape = Some(FilterShape::range(span.min.clone(), span.max.clone()));
    }

    filter.ast = ast;
}

fn apply_descriptor(filter: &mut HistFilter, attribute: &str, descriptor: &BinDescriptor) {
    match descriptor {
        BinDescriptor::Singular { representative } => {
            filter.ast = Some(QueryExpr::field_eq(attribute, representative.clone()));
            filter.shape = Some(FilterShape::equals_one(representative.clone()));
        }
        BinDescriptor::Range { min, max } => {
            filter.ast = Some(QueryExpr::between(attribute, min.clone(), max.clone()));
            filter.shape = Some(FilterShape::range(min.clone(), max.clone()));
        }
    }
}

fn numeric_bounds(model: &HistogramModel, stats: &GlobalStats) -> SynthResult<(f64, f64)> {
    match (stats.min_value, stats.bin_width) {
        (Some(min_value), Some(bin_width)) => Ok((min_value, bin_width)),
        _ => Err(SynthError::NonNumericStats {
            attribute: model.attribute.clone(),
        }),
    }
}

/// Decode an externally edited predicate into partial filter fields.
///
/// Only the shapes synthesis itself emits are recognized; anything else
/// leaves every field unset rather than guessing.
pub fn fields_from_expr(expr: &QueryExpr) -> FilterFields {
    let mut fields = FilterFields::default();

    match expr {
        QueryExpr::Between { start, stop, .. } => {
            if let QueryExpr::Literal(lit) = start.as_ref() {
                fields.start = Some(lit.clone());
            }
            if let QueryExpr::Literal(lit) = stop.as_ref() {
                fields.stop = Some(lit.clone());
            }
        }

        QueryExpr::Binary { op, left, right } => match op {
            BinaryOp::In => {
                if let QueryExpr::List(values) = right.as_ref() {
                    fields.equals = Some(values.clone());
                }
            }
            BinaryOp::Eq => {
                if let QueryExpr::Literal(lit) = right.as_ref() {
                    fields.equals = Some(vec![lit.clone()]);
                } else if let QueryExpr::Literal(lit) = left.as_ref() {
                    fields.equals = Some(vec![lit.clone()]);
                }
            }
            BinaryOp::Gt | BinaryOp::Ge => {
                if let QueryExpr::Literal(lit) = right.as_ref() {
                    fields.start = Some(lit.clone());
                } else if let QueryExpr::Literal(lit) = left.as_ref() {
                    fields.stop = Some(lit.clone());
                }
            }
            BinaryOp::Lt | BinaryOp::Le => {
                if let QueryExpr::Literal(lit) = right.as_ref() {
                    fields.stop = Some(lit.clone());
                } else if let QueryExpr::Literal(lit) = left.as_ref() {
                    fields.start = Some(lit.clone());
                }
            }
            _ => {}
        },

        _ => {}
    }

    fields
}
