//! Bin statistics and strategies
//!
//! Per-attribute binning metadata supplied by an external aggregation
//! service:
//!
//! - **Histogram**: equal-width numeric buckets over `[min_value, max_value]`
//! - **CountBy**: one bucket per distinct value, insertion order = display
//!   order, optionally with an `_other` bucket aggregating the long tail
//!
//! Snapshots are immutable; every computation re-reads whatever snapshot is
//! current, so there is no staleness protocol.

use imbrush_query::LiteralValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Key of the aggregated long-tail bucket in CountBy stats
pub const OTHER_BIN_KEY: &str = "_other";

/// Maximum bins rendered for a CountBy attribute in spark-line orientation
pub const MAX_SPARKLINE_BINS: usize = 30;

/// Maximum bins rendered for a CountBy attribute in expanded orientation
pub const MAX_EXPANDED_BINS: usize = MAX_SPARKLINE_BINS - 1;

/// How an attribute's domain is bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinningStrategy {
    /// Equal-width numeric buckets
    Histogram,
    /// Discrete buckets, one per distinct value
    CountBy,
}

/// Rendered orientation of a histogram widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// Compact horizontal strip
    SparkLine,
    /// Expanded vertical chart
    Expanded,
}

impl Orientation {
    /// Upper bound on rendered CountBy bins for this orientation
    pub fn max_count_by_bins(&self) -> usize {
        match self {
            Orientation::SparkLine => MAX_SPARKLINE_BINS,
            Orientation::Expanded => MAX_EXPANDED_BINS,
        }
    }
}

/// Data type of the binned attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float,
    Integer,
    Text,
    Bool,
}

/// Extra metadata a bin may carry beyond its positional index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BinDescriptor {
    /// A single discrete value occupies the bin
    Singular { representative: LiteralValue },
    /// The bin spans a sub-range of the domain
    Range { min: LiteralValue, max: LiteralValue },
}

/// Metadata of the aggregated `_other` bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherBin {
    /// How many distinct values were folded into the bucket
    pub num_values: u64,
}

/// Immutable per-attribute binning snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Binning strategy declared by the aggregation service, if any
    pub strategy: Option<BinningStrategy>,
    /// Declared bin count
    pub num_bins: usize,
    /// Total number of values observed
    pub num_values: u64,
    /// Lower bound of the domain (numeric attributes)
    pub min_value: Option<f64>,
    /// Upper bound of the domain (numeric attributes)
    pub max_value: Option<f64>,
    /// Bucket width (Histogram only)
    pub bin_width: Option<f64>,
    /// CountBy buckets as (key, count), insertion order = display order
    pub bins: Vec<(String, u64)>,
    /// Per-position global counts (Histogram)
    pub counts: Vec<u64>,
    /// Descriptors keyed by bin position
    pub bin_values: BTreeMap<usize, BinDescriptor>,
    /// Metadata of the `_other` bucket, when present
    pub other: Option<OtherBin>,
    /// Data type of the attribute
    pub data_type: DataType,
}

impl GlobalStats {
    /// Create histogram stats with equal-width buckets
    pub fn histogram(num_bins: usize, min_value: f64, bin_width: f64) -> Self {
        Self {
            strategy: Some(BinningStrategy::Histogram),
            num_bins,
            num_values: 0,
            min_value: Some(min_value),
            max_value: Some(min_value + bin_width * num_bins as f64),
            bin_width: Some(bin_width),
            bins: Vec::new(),
            counts: Vec::new(),
            bin_values: BTreeMap::new(),
            other: None,
            data_type: DataType::Float,
        }
    }

    /// Create CountBy stats from ordered (key, count) buckets
    pub fn count_by(bins: Vec<(String, u64)>, data_type: DataType) -> Self {
        let num_values = bins.iter().map(|(_, count)| count).sum();
        Self {
            strategy: Some(BinningStrategy::CountBy),
            num_bins: bins.len(),
            num_values,
            min_value: None,
            max_value: None,
            bin_width: None,
            bins,
            counts: Vec::new(),
            bin_values: BTreeMap::new(),
            other: None,
            data_type,
        }
    }

    /// Attach per-position global counts (Histogram)
    pub fn with_counts(mut self, counts: Vec<u64>) -> Self {
        self.num_values = counts.iter().sum();
        self.counts = counts;
        self
    }

    /// Attach a descriptor to a bin position
    pub fn with_bin_value(mut self, position: usize, descriptor: BinDescriptor) -> Self {
        self.bin_values.insert(position, descriptor);
        self
    }

    /// Attach `_other` bucket metadata
    pub fn with_other(mut self, num_values: u64) -> Self {
        self.other = Some(OtherBin { num_values });
        self
    }

    /// Mark the domain as numeric
    pub fn with_numeric_bounds(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = Some(min_value);
        self.max_value = Some(max_value);
        self
    }

    /// Bucket key at a display position (CountBy)
    pub fn bin_key(&self, position: usize) -> Option<&str> {
        self.bins.get(position).map(|(key, _)| key.as_str())
    }

    /// Bucket count at a display position (CountBy)
    pub fn bin_count(&self, position: usize) -> Option<u64> {
        self.bins.get(position).map(|(_, count)| *count)
    }

    /// Descriptor for a bin position, if any
    pub fn descriptor(&self, position: usize) -> Option<&BinDescriptor> {
        self.bin_values.get(&position)
    }

    /// Whether both numeric bounds are declared
    pub fn is_numeric(&self) -> bool {
        self.min_value.is_some() && self.max_value.is_some()
    }

    /// All declared bucket keys except `_other`, as literals.
    /// Keys coerce to numbers when the domain is numeric.
    pub fn declared_keys(&self) -> Vec<LiteralValue> {
        self.bins
            .iter()
            .filter(|(key, _)| key != OTHER_BIN_KEY)
            .map(|(key, _)| self.key_literal(key))
            .collect()
    }

    /// Coerce a bucket key into a literal of the domain's kind
    pub fn key_literal(&self, key: &str) -> LiteralValue {
        if self.is_numeric() {
            if let Ok(n) = key.parse::<f64>() {
                return LiteralValue::Number(n);
            }
        }
        LiteralValue::Text(key.to_string())
    }
}

/// External data-description service seam.
///
/// Snapshots are refreshed out of band; callers re-read on every
/// computation.
pub trait StatsProvider {
    /// Current stats for an attribute in the given orientation
    fn global_stats(&self, attribute: &str, orientation: Orientation) -> Option<&GlobalStats>;
}

/// In-memory stats snapshot keyed by attribute and orientation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    spark_lines: HashMap<String, GlobalStats>,
    histograms: HashMap<String, GlobalStats>,
}

impl StatsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register stats for one orientation of an attribute
    pub fn insert(&mut self, attribute: impl Into<String>, orientation: Orientation, stats: GlobalStats) {
        let map = match orientation {
            Orientation::SparkLine => &mut self.spark_lines,
            Orientation::Expanded => &mut self.histograms,
        };
        map.insert(attribute.into(), stats);
    }

    /// Register the same stats for both orientations
    pub fn insert_both(&mut self, attribute: &str, stats: GlobalStats) {
        self.spark_lines.insert(attribute.to_string(), stats.clone());
        self.histograms.insert(attribute.to_string(), stats);
    }
}

impl StatsProvider for StatsSnapshot {
    fn global_stats(&self, attribute: &str, orientation: Orientation) -> Option<&GlobalStats> {
        match orientation {
            Orientation::SparkLine => self.spark_lines.get(attribute),
            Orientation::Expanded => self.histograms.get(attribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_stats() {
        let stats = GlobalStats::histogram(5, 0.0, 10.0);
        assert_eq!(stats.num_bins, 5);
        assert_eq!(stats.max_value, Some(50.0));
        assert!(stats.is_numeric());
    }

    #[test]
    fn test_count_by_keys() {
        let stats = GlobalStats::count_by(
            vec![
                ("a".to_string(), 5),
                ("b".to_string(), 3),
                (OTHER_BIN_KEY.to_string(), 2),
            ],
            DataType::Text,
        )
        .with_other(7);

        assert_eq!(stats.bin_key(1), Some("b"));
        assert_eq!(stats.bin_count(0), Some(5));
        assert_eq!(stats.num_values, 10);
        assert_eq!(
            stats.declared_keys(),
            vec![LiteralValue::from("a"), LiteralValue::from("b")]
        );
    }

    #[test]
    fn test_key_literal_coerces_numeric_domains() {
        let stats = GlobalStats::count_by(
            vec![("10".to_string(), 1), ("20".to_string(), 1)],
            DataType::Integer,
        )
        .with_numeric_bounds(10.0, 20.0);

        assert_eq!(stats.key_literal("10"), LiteralValue::Number(10.0));

        let textual =
            GlobalStats::count_by(vec![("10".to_string(), 1)], DataType::Text);
        assert_eq!(textual.key_literal("10"), LiteralValue::from("10"));
    }

    #[test]
    fn test_stats_serde_round_trip() {
        let stats = GlobalStats::count_by(
            vec![("a".to_string(), 5), (OTHER_BIN_KEY.to_string(), 2)],
            DataType::Text,
        )
        .with_other(7)
        .with_bin_value(
            0,
            BinDescriptor::Singular {
                representative: LiteralValue::from("a"),
            },
        );

        let json = serde_json::to_string(&stats).unwrap();
        let back: GlobalStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, back);
    }

    #[test]
    fn test_snapshot_lookup_by_orientation() {
        let mut snapshot = StatsSnapshot::new();
        snapshot.insert("degree", Orientation::SparkLine, GlobalStats::histogram(5, 0.0, 10.0));

        assert!(snapshot
            .global_stats("degree", Orientation::SparkLine)
            .is_some());
        assert!(snapshot
            .global_stats("degree", Orientation::Expanded)
            .is_none());
    }
}
