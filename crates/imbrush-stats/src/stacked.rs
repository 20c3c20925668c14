//! Stacked-bar shaping
//!
//! Transforms local and global bin counts into the stacked segment layout
//! the rendering layer draws: a local segment overlaid on the global one,
//! with the roles flipped when the local count exceeds the global (which
//! happens when global aggregates lag slightly behind local data).
//!
//! Pure data shaping - no scales, no drawing.

use crate::binning::{BinDescriptor, BinningStrategy, GlobalStats, OTHER_BIN_KEY};
use crate::model::HistogramModel;
use serde::{Deserialize, Serialize};

/// Role of one stacked segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Locally selected count
    Local,
    /// Global count, drawn above the local segment
    Global,
    /// Global count when it is the smaller of the two
    GlobalSmaller,
    /// Local count when it exceeds the global
    LocalBigger,
}

/// One segment of a stacked bar, in amount coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedSegment {
    pub kind: SegmentKind,
    pub y0: f64,
    pub y1: f64,
    /// The underlying count the segment represents
    pub value: f64,
}

/// A render-ready stacked bar for one bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedBin {
    /// Bin position
    pub bin: usize,
    /// Display label
    pub name: String,
    pub local: f64,
    pub total: f64,
    pub segments: [StackedSegment; 2],
}

fn stack(bin: usize, name: String, local: u64, total: u64, local_sum: u64, total_sum: u64, distribution: bool) -> StackedBin {
    let (local, total) = if distribution {
        let norm = |v: u64, sum: u64| if sum == 0 { 0.0 } else { v as f64 / sum as f64 };
        (norm(local, local_sum), norm(total, total_sum))
    } else {
        (local as f64, total as f64)
    };

    let segments = if distribution && local > total {
        [
            StackedSegment { kind: SegmentKind::GlobalSmaller, y0: 0.0, y1: total, value: total },
            StackedSegment { kind: SegmentKind::LocalBigger, y0: total, y1: local, value: local },
        ]
    } else {
        [
            StackedSegment { kind: SegmentKind::Local, y0: 0.0, y1: local, value: local },
            // Global aggregates can lag slightly behind local counts
            StackedSegment { kind: SegmentKind::Global, y0: local, y1: total.max(local), value: total },
        ]
    };

    StackedBin { bin, name, local, total, segments }
}

/// Shape local + global counts into stacked bars.
///
/// `limit` caps the number of CountBy bins emitted (histogram bins are
/// never capped). When `distribution` is set, counts are normalized to
/// fractions of their respective totals.
pub fn to_stacked_bins(
    model: &HistogramModel,
    stats: &GlobalStats,
    distribution: bool,
    limit: Option<usize>,
) -> Vec<StackedBin> {
    let local = model.local();
    let local_sum = local.num_values;
    let total_sum = stats.num_values;

    match model.binning_strategy(stats) {
        BinningStrategy::CountBy => {
            let count = match limit {
                Some(limit) => stats.bins.len().min(limit),
                None => stats.bins.len(),
            };
            (0..count)
                .map(|bin| {
                    let name = count_by_name(stats, bin);
                    let local_count = local.count_for(bin, stats);
                    let total = stats.bin_count(bin).unwrap_or(0);
                    stack(bin, name, local_count, total, local_sum, total_sum, distribution)
                })
                .collect()
        }
        BinningStrategy::Histogram => (0..stats.num_bins)
            .map(|bin| {
                let name = histogram_name(stats, bin);
                let local_count = local.count_for(bin, stats);
                let total = stats.counts.get(bin).copied().unwrap_or(0);
                stack(bin, name, local_count, total, local_sum, total_sum, distribution)
            })
            .collect(),
    }
}

fn count_by_name(stats: &GlobalStats, bin: usize) -> String {
    let key = stats.bin_key(bin).unwrap_or("");
    if key == OTHER_BIN_KEY {
        if let Some(other) = stats.other {
            return format!("(Another {} values)", other.num_values);
        }
    }
    match stats.descriptor(bin) {
        Some(BinDescriptor::Singular { representative }) => representative.to_string(),
        Some(BinDescriptor::Range { min, max }) => format!("{} : {}", min, max),
        None => key.to_string(),
    }
}

fn histogram_name(stats: &GlobalStats, bin: usize) -> String {
    match stats.descriptor(bin) {
        Some(BinDescriptor::Singular { representative }) => representative.to_string(),
        Some(BinDescriptor::Range { min, max }) => format!("{} : {}", min, max),
        None => {
            let (min_value, bin_width) = match (stats.min_value, stats.bin_width) {
                (Some(min), Some(width)) => (min, width),
                _ => return format!("bin {}", bin),
            };
            let start = min_value + bin_width * bin as f64;
            format!("{} : {}", start, start + bin_width)
        }
    }
}
