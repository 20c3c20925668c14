//! External filter collection seam
//!
//! The engine shares one collection of active filters with other UI
//! surfaces. Records are opaque beyond the fields declared here; the
//! engine marks its own records with `control_type = "histogram"` and
//! never touches an attribute's records of any other control type. Writes
//! back to an existing record touch only the query field - other surfaces
//! may have customized everything else.

use imbrush_query::QueryExpr;
use imbrush_stats::DataType;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Control type the engine stamps on records it owns
pub const HISTOGRAM_CONTROL_TYPE: &str = "histogram";

/// The query carried by an external filter record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    /// Structured predicate, when one exists
    pub ast: Option<QueryExpr>,
    /// Display text for the predicate, from the formatter seam
    pub input_string: Option<String>,
}

/// An entry in the shared filter collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRecord {
    pub id: String,
    pub attribute: String,
    pub control_type: String,
    pub data_type: DataType,
    pub query: FilterQuery,
    /// RFC3339 timestamp of the last query write
    pub modified_at: Option<String>,
}

impl FilterRecord {
    /// Create a histogram-owned record
    pub fn histogram(attribute: impl Into<String>, data_type: DataType, query: FilterQuery) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            attribute: attribute.into(),
            control_type: HISTOGRAM_CONTROL_TYPE.to_string(),
            data_type,
            query,
            modified_at: None,
        }
    }
}

/// Change notification emitted by the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterChange {
    Inserted { attribute: String, control_type: String },
    Removed { attribute: String, control_type: String },
    QueryChanged { attribute: String, control_type: String },
}

/// The externally owned collection of active filters.
///
/// Other UI surfaces mutate the same collection; the engine never assumes
/// exclusive ownership and re-reads before writing.
pub trait FilterCollection {
    /// Find the record for an (attribute, control type) pair
    fn find(&self, attribute: &str, control_type: &str) -> Option<&FilterRecord>;

    /// Insert a new record
    fn insert(&mut self, record: FilterRecord);

    /// Remove a record, returning it if present
    fn remove(&mut self, attribute: &str, control_type: &str) -> Option<FilterRecord>;

    /// Overwrite a record's query field only. Returns false if the record
    /// does not exist.
    fn set_query(&mut self, attribute: &str, control_type: &str, query: FilterQuery) -> bool;

    /// Drain pending change notifications
    fn take_events(&mut self) -> Vec<FilterChange>;
}

/// In-memory filter collection
#[derive(Debug, Default)]
pub struct InMemoryFilterCollection {
    records: Vec<FilterRecord>,
    events: VecDeque<FilterChange>,
}

impl InMemoryFilterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FilterRecord] {
        &self.records
    }

    fn position(&self, attribute: &str, control_type: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.attribute == attribute && r.control_type == control_type)
    }
}

impl FilterCollection for InMemoryFilterCollection {
    fn find(&self, attribute: &str, control_type: &str) -> Option<&FilterRecord> {
        self.position(attribute, control_type)
            .map(|i| &self.records[i])
    }

    fn insert(&mut self, record: FilterRecord) {
        self.events.push_back(FilterChange::Inserted {
            attribute: record.attribute.clone(),
            control_type: record.control_type.clone(),
        });
        self.records.push(record);
    }

    fn remove(&mut self, attribute: &str, control_type: &str) -> Option<FilterRecord> {
        let index = self.position(attribute, control_type)?;
        self.events.push_back(FilterChange::Removed {
            attribute: attribute.to_string(),
            control_type: control_type.to_string(),
        });
        Some(self.records.remove(index))
    }

    fn set_query(&mut self, attribute: &str, control_type: &str, query: FilterQuery) -> bool {
        let Some(index) = self.position(attribute, control_type) else {
            return false;
        };
        let record = &mut self.records[index];
        record.query = query;
        record.modified_at = Some(chrono::Utc::now().to_rfc3339());
        self.events.push_back(FilterChange::QueryChanged {
            attribute: attribute.to_string(),
            control_type: control_type.to_string(),
        });
        true
    }

    fn take_events(&mut self) -> Vec<FilterChange> {
        self.events.drain(..).collect()
    }
}

/// Predicate-to-text formatter seam.
///
/// Display text generation is owned by the expression layer; the engine
/// only threads the result into the record's query.
pub trait QueryFormatter {
    fn print(&self, expr: &QueryExpr) -> String;
}

/// Default formatter backed by the query crate's printer
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl QueryFormatter for DefaultFormatter {
    fn print(&self, expr: &QueryExpr) -> String {
        imbrush_query::print(expr)
    }
}
