//! Per-attribute histogram model
//!
//! Tracks the widget-facing state of one binned attribute: orientation,
//! panel position, and the locally observed bin counts. Mutations enqueue
//! change notifications that the rendering layer drains; the model never
//! depends on any view framework.

use crate::binning::{BinningStrategy, GlobalStats, Orientation};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Graph element type an attribute belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Point,
    Edge,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::Point => write!(f, "point"),
            ElementType::Edge => write!(f, "edge"),
        }
    }
}

/// Locally observed bin counts (e.g. for the current selection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocalCounts {
    /// Counts addressed by bin position (Histogram)
    Indexed(Vec<u64>),
    /// Counts addressed by bucket key (CountBy)
    Keyed(HashMap<String, u64>),
}

impl Default for LocalCounts {
    fn default() -> Self {
        LocalCounts::Indexed(Vec::new())
    }
}

/// Local data for one attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalBins {
    /// Strategy observed locally, if the local aggregation declared one
    pub strategy: Option<BinningStrategy>,
    /// The counts themselves
    pub counts: LocalCounts,
    /// Total number of locally observed values
    pub num_values: u64,
}

impl LocalBins {
    /// Count for a bin position, resolving keyed counts through the stats
    pub fn count_for(&self, position: usize, stats: &GlobalStats) -> u64 {
        match &self.counts {
            LocalCounts::Indexed(counts) => counts.get(position).copied().unwrap_or(0),
            LocalCounts::Keyed(by_key) => stats
                .bin_key(position)
                .and_then(|key| by_key.get(key).copied())
                .unwrap_or(0),
        }
    }
}

/// Change notification emitted by a model mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelChange {
    OrientationChanged(Orientation),
    PositionChanged(usize),
    DataChanged,
}

/// Widget-facing state of one binned attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramModel {
    /// Attribute the widget bins
    pub attribute: String,
    /// Graph element type the attribute belongs to
    pub element_type: ElementType,
    orientation: Orientation,
    position: usize,
    local: LocalBins,
    #[serde(skip)]
    changes: VecDeque<ModelChange>,
}

impl HistogramModel {
    /// Create a model in the compact spark-line orientation
    pub fn new(attribute: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            attribute: attribute.into(),
            element_type,
            orientation: Orientation::SparkLine,
            position: 0,
            local: LocalBins::default(),
            changes: VecDeque::new(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.changes.push_back(ModelChange::OrientationChanged(orientation));
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        if self.position != position {
            self.position = position;
            self.changes.push_back(ModelChange::PositionChanged(position));
        }
    }

    pub fn local(&self) -> &LocalBins {
        &self.local
    }

    pub fn set_local(&mut self, local: LocalBins) {
        self.local = local;
        self.changes.push_back(ModelChange::DataChanged);
    }

    /// Drain pending change notifications
    pub fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.drain(..).collect()
    }

    /// Resolve the active binning strategy.
    ///
    /// CountBy wins if either the local data or the global stats declare
    /// it; everything else falls back to equal-width histogram bins.
    pub fn binning_strategy(&self, stats: &GlobalStats) -> BinningStrategy {
        if let Some(strategy) = self.local.strategy {
            return strategy;
        }
        stats.strategy.unwrap_or(BinningStrategy::Histogram)
    }

    pub fn is_count_by(&self, stats: &GlobalStats) -> bool {
        self.binning_strategy(stats) == BinningStrategy::CountBy
    }

    /// Number of effectively rendered bins.
    ///
    /// Categorical domains can have far more distinct values than fit on
    /// screen; CountBy clamps to the orientation's maximum so a drag can
    /// never span more bins than are rendered.
    pub fn effective_bin_count(&self, stats: &GlobalStats) -> usize {
        match self.binning_strategy(stats) {
            BinningStrategy::Histogram => stats.num_bins,
            BinningStrategy::CountBy => {
                let distinct = stats.bins.len();
                self.orientation
                    .max_count_by_bins()
                    .min(stats.num_bins.max(distinct))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::{DataType, MAX_EXPANDED_BINS, MAX_SPARKLINE_BINS};

    fn count_by_stats(n: usize) -> GlobalStats {
        let bins = (0..n).map(|i| (format!("k{}", i), 1)).collect();
        GlobalStats::count_by(bins, DataType::Text)
    }

    #[test]
    fn test_strategy_prefers_local_declaration() {
        let model = {
            let mut m = HistogramModel::new("degree", ElementType::Point);
            m.set_local(LocalBins {
                strategy: Some(BinningStrategy::CountBy),
                ..LocalBins::default()
            });
            m
        };
        let stats = GlobalStats::histogram(5, 0.0, 10.0);
        assert_eq!(model.binning_strategy(&stats), BinningStrategy::CountBy);
    }

    #[test]
    fn test_strategy_falls_back_to_global() {
        let model = HistogramModel::new("degree", ElementType::Point);
        let stats = count_by_stats(3);
        assert_eq!(model.binning_strategy(&stats), BinningStrategy::CountBy);
    }

    #[test]
    fn test_histogram_bin_count_unmodified() {
        let model = HistogramModel::new("degree", ElementType::Point);
        let stats = GlobalStats::histogram(120, 0.0, 1.0);
        assert_eq!(model.effective_bin_count(&stats), 120);
    }

    #[test]
    fn test_count_by_bin_count_clamps_per_orientation() {
        let mut model = HistogramModel::new("category", ElementType::Point);
        let stats = count_by_stats(200);

        assert_eq!(model.effective_bin_count(&stats), MAX_SPARKLINE_BINS);

        model.set_orientation(Orientation::Expanded);
        assert_eq!(model.effective_bin_count(&stats), MAX_EXPANDED_BINS);

        let small = count_by_stats(4);
        assert_eq!(model.effective_bin_count(&small), 4);
    }

    #[test]
    fn test_change_notifications_drain() {
        let mut model = HistogramModel::new("category", ElementType::Edge);
        model.set_orientation(Orientation::Expanded);
        model.set_orientation(Orientation::Expanded); // no-op
        model.set_position(3);

        let changes = model.take_changes();
        assert_eq!(
            changes,
            vec![
                ModelChange::OrientationChanged(Orientation::Expanded),
                ModelChange::PositionChanged(3),
            ]
        );
        assert!(model.take_changes().is_empty());
    }

    #[test]
    fn test_local_count_resolution() {
        let stats = count_by_stats(2);
        let mut by_key = HashMap::new();
        by_key.insert("k1".to_string(), 7);
        let local = LocalBins {
            strategy: None,
            counts: LocalCounts::Keyed(by_key),
            num_values: 7,
        };
        assert_eq!(local.count_for(1, &stats), 7);
        assert_eq!(local.count_for(0, &stats), 0);
    }
}
