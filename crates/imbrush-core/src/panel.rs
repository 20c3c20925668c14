//! Histogram panel orchestration
//!
//! `HistogramsPanel` owns the ordered collection of histogram widgets and
//! the per-attribute filter records, and wires the pieces together:
//!
//! - drag gestures run through the `DragGesture` state machine, with each
//!   move synchronously re-synthesizing and pushing the filter
//! - hover events feed the debounced highlight pipeline
//! - `sync_filters` reconciles with the shared filter collection, pulling
//!   external edits before pushing local state
//!
//! Rendering subscribes to model change notifications; the panel never
//! calls into a view layer.

use crate::brush::DragGesture;
use crate::error::{SynthError, SynthResult};
use crate::filter::HistFilter;
use crate::highlight::{HighlightQuery, HoverDebouncer, MaskResponse, MaskService};
use crate::sync::{
    FilterCollection, FilterQuery, FilterRecord, QueryFormatter, HISTOGRAM_CONTROL_TYPE,
};
use crate::synth::{fields_from_expr, filter_for_bin, filter_for_bin_range};
use imbrush_stats::{DataType, GlobalStats, HistogramModel, Orientation, StatsProvider};
use std::collections::HashMap;
use std::time::Instant;

/// Owns histogram widgets and their filter state for one panel
#[derive(Default)]
pub struct HistogramsPanel {
    /// Widget models in display order
    histograms: Vec<HistogramModel>,
    /// Active filter per attribute
    histogram_filters: HashMap<String, HistFilter>,
    hover: HoverDebouncer,
}

impl HistogramsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget at the end of the panel. An existing widget for the
    /// same attribute is replaced in place, keeping its position.
    pub fn add_histogram(&mut self, mut model: HistogramModel) {
        if let Some(index) = self
            .histograms
            .iter()
            .position(|m| m.attribute == model.attribute)
        {
            model.set_position(index);
            self.histograms[index] = model;
        } else {
            model.set_position(self.histograms.len());
            self.histograms.push(model);
        }
    }

    /// Remove a widget, clearing any filter it owns
    pub fn remove_histogram(
        &mut self,
        collection: &mut impl FilterCollection,
        attribute: &str,
    ) -> bool {
        let Some(index) = self.histograms.iter().position(|m| m.attribute == attribute) else {
            return false;
        };
        self.histograms.remove(index);
        self.reindex_positions();
        self.clear_filter(collection, attribute);
        true
    }

    /// Move the widget at `from` to display position `to`, preserving the
    /// relative order of everything else
    pub fn move_histogram(&mut self, from: usize, to: usize) -> bool {
        if from >= self.histograms.len() || to >= self.histograms.len() {
            return false;
        }
        if from != to {
            let model = self.histograms.remove(from);
            self.histograms.insert(to, model);
            self.reindex_positions();
        }
        true
    }

    fn reindex_positions(&mut self) {
        for (position, model) in self.histograms.iter_mut().enumerate() {
            model.set_position(position);
        }
    }

    pub fn histograms(&self) -> &[HistogramModel] {
        &self.histograms
    }

    pub fn histogram(&self, attribute: &str) -> Option<&HistogramModel> {
        self.histograms.iter().find(|m| m.attribute == attribute)
    }

    pub fn histogram_mut(&mut self, attribute: &str) -> Option<&mut HistogramModel> {
        self.histograms.iter_mut().find(|m| m.attribute == attribute)
    }

    /// Switch a widget between spark-line and expanded orientation
    pub fn set_orientation(&mut self, attribute: &str, orientation: Orientation) -> bool {
        match self.histogram_mut(attribute) {
            Some(model) => {
                model.set_orientation(orientation);
                true
            }
            None => false,
        }
    }

    pub fn filter(&self, attribute: &str) -> Option<&HistFilter> {
        self.histogram_filters.get(attribute)
    }

    pub fn filters(&self) -> impl Iterator<Item = &HistFilter> {
        self.histogram_filters.values()
    }

    /// Synthesize the predicate for one bin of a widget
    pub fn query_for_bin(
        &self,
        provider: &impl StatsProvider,
        attribute: &str,
        bin: usize,
    ) -> SynthResult<HistFilter> {
        let (model, stats) = self.model_and_stats(provider, attribute)?;
        filter_for_bin(model, stats, bin)
    }

    /// Synthesize the predicate for an inclusive bin window of a widget
    pub fn query_for_bin_range(
        &self,
        provider: &impl StatsProvider,
        attribute: &str,
        first_bin: usize,
        last_bin: usize,
    ) -> SynthResult<HistFilter> {
        let (model, stats) = self.model_and_stats(provider, attribute)?;
        filter_for_bin_range(model, stats, first_bin, last_bin)
    }

    /// Begin a drag at `bin`. The returned gesture must be threaded
    /// through `on_drag_update` and `on_drag_end`.
    pub fn on_drag_start(
        &mut self,
        provider: &impl StatsProvider,
        attribute: &str,
        bin: usize,
    ) -> SynthResult<DragGesture> {
        let (model, stats) = self.model_and_stats(provider, attribute)?;
        let num_bins = model.effective_bin_count(stats);
        let committed = self
            .histogram_filters
            .get(attribute)
            .map(|f| (f.first_bin, f.last_bin));
        let gesture = DragGesture::begin(attribute, bin, num_bins, committed);

        let filter = filter_for_bin(model, stats, bin)?;
        self.store_filter(filter);
        Ok(gesture)
    }

    /// Handle a pointer move during a drag. Synchronously re-synthesizes
    /// the window's predicate and pushes it into the collection.
    pub fn on_drag_update(
        &mut self,
        provider: &impl StatsProvider,
        collection: &mut impl FilterCollection,
        formatter: &dyn QueryFormatter,
        gesture: &mut DragGesture,
        bin: usize,
    ) -> SynthResult<()> {
        let (first_bin, last_bin) = gesture.window_for(bin);
        let attribute = gesture.attribute().to_string();

        let (model, stats) = self.model_and_stats(provider, &attribute)?;
        let filter = filter_for_bin_range(model, stats, first_bin, last_bin)?;
        self.store_filter(filter);
        self.update_filters_from_histogram_filters(provider, collection, formatter);
        Ok(())
    }

    /// Finish a drag: commit the selection, or clear it when the gesture
    /// was a click inside the committed window.
    pub fn on_drag_end(
        &mut self,
        provider: &impl StatsProvider,
        collection: &mut impl FilterCollection,
        formatter: &dyn QueryFormatter,
        gesture: DragGesture,
    ) {
        let attribute = gesture.attribute();
        if let Some(filter) = self.histogram_filters.get_mut(attribute) {
            filter.completed = true;
        }

        if gesture.ended_as_click() {
            tracing::debug!("click inside committed selection on '{}', clearing", attribute);
            self.clear_filter(collection, attribute);
        }

        self.update_filters_from_histogram_filters(provider, collection, formatter);
    }

    /// Delete the filter for an attribute, locally and in the collection
    pub fn clear_filter(&mut self, collection: &mut impl FilterCollection, attribute: &str) -> bool {
        collection.remove(attribute, HISTOGRAM_CONTROL_TYPE);
        self.histogram_filters.remove(attribute).is_some()
    }

    /// Submit a hover over `bin` at `now`. Queries are debounced and only
    /// the latest hover in a burst fires.
    pub fn on_hover(
        &mut self,
        provider: &impl StatsProvider,
        attribute: &str,
        bin: usize,
        now: Instant,
    ) -> SynthResult<()> {
        let filter = self.query_for_bin(provider, attribute, bin)?;
        if let Some(ast) = filter.ast {
            self.hover.submit(
                HighlightQuery {
                    attribute: attribute.to_string(),
                    ast,
                },
                now,
            );
        }
        Ok(())
    }

    /// The hover left the widget before the debounce fired
    pub fn cancel_hover(&mut self) {
        self.hover.cancel();
    }

    /// Drive the highlight pipeline. Returns the computed mask when a
    /// debounced query fired and the service succeeded; failures are
    /// reported and leave filter state untouched.
    pub fn poll_highlight(
        &mut self,
        now: Instant,
        service: &impl MaskService,
    ) -> Option<MaskResponse> {
        let query = self.hover.poll(now)?;
        match service.compute_mask(&query) {
            Ok(response) if response.success => Some(response),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    "highlight mask computation failed for '{}': {}",
                    query.attribute,
                    e
                );
                None
            }
        }
    }

    /// Reconcile with the shared collection: pull external edits to
    /// quiescence, then push local state.
    pub fn sync_filters(
        &mut self,
        provider: &impl StatsProvider,
        collection: &mut impl FilterCollection,
        formatter: &dyn QueryFormatter,
    ) {
        let events = collection.take_events();
        if !events.is_empty() {
            tracing::debug!("processing {} filter change event(s)", events.len());
        }
        self.update_histogram_filters_from_collection(collection);
        self.update_filters_from_histogram_filters(provider, collection, formatter);
    }

    /// Push: re-synthesize every local filter from its bin indices and
    /// write it into the collection. Existing records only get their
    /// query overwritten; everything else on them is left alone.
    pub fn update_filters_from_histogram_filters(
        &mut self,
        provider: &impl StatsProvider,
        collection: &mut impl FilterCollection,
        formatter: &dyn QueryFormatter,
    ) {
        let attributes: Vec<String> = self.histogram_filters.keys().cloned().collect();
        for attribute in attributes {
            let (first_bin, last_bin) = match self.histogram_filters.get(&attribute) {
                Some(filter) => (filter.first_bin, filter.last_bin),
                None => continue,
            };
            let Some(model) = self.histograms.iter().find(|m| m.attribute == attribute) else {
                tracing::warn!("no histogram widget for filtered attribute '{}'", attribute);
                continue;
            };
            let Some(stats) = provider.global_stats(&model.attribute, model.orientation()) else {
                tracing::warn!("no global stats for filtered attribute '{}'", attribute);
                continue;
            };

            // Always from bin indices, never from the cached AST, so a
            // refreshed stats snapshot is reflected in the predicate.
            let fresh = match filter_for_bin_range(model, stats, first_bin, last_bin) {
                Ok(filter) => filter,
                Err(e) => {
                    tracing::warn!("failed to re-synthesize filter for '{}': {}", attribute, e);
                    continue;
                }
            };
            let Some(ast) = fresh.ast.clone() else {
                // Explicit no-predicate case: nothing to push.
                continue;
            };
            let data_type = if fresh.shape.as_ref().map(|s| s.is_range()).unwrap_or(false) {
                DataType::Float
            } else {
                stats.data_type
            };

            if let Some(local) = self.histogram_filters.get_mut(&attribute) {
                local.shape = fresh.shape.clone();
                local.ast = fresh.ast.clone();
            }

            let query = FilterQuery {
                ast: Some(ast.clone()),
                input_string: Some(formatter.print(&ast)),
            };
            if collection.find(&attribute, HISTOGRAM_CONTROL_TYPE).is_some() {
                collection.set_query(&attribute, HISTOGRAM_CONTROL_TYPE, query);
            } else {
                collection.insert(FilterRecord::histogram(attribute.clone(), data_type, query));
            }
        }
    }

    /// Pull: drop local filters whose external record disappeared, and
    /// fill unset local fields from externally edited expressions.
    pub fn update_histogram_filters_from_collection(
        &mut self,
        collection: &mut impl FilterCollection,
    ) {
        let attributes: Vec<String> = self.histogram_filters.keys().cloned().collect();
        for attribute in attributes {
            match collection.find(&attribute, HISTOGRAM_CONTROL_TYPE) {
                None => {
                    tracing::warn!(
                        "filter for '{}' was removed externally, dropping local selection",
                        attribute
                    );
                    self.histogram_filters.remove(&attribute);
                }
                Some(record) => {
                    if let Some(ast) = &record.query.ast {
                        let fields = fields_from_expr(ast);
                        if let Some(local) = self.histogram_filters.get_mut(&attribute) {
                            local.apply_fields(fields);
                        }
                    }
                }
            }
        }
    }

    fn model_and_stats<'a, P: StatsProvider>(
        &self,
        provider: &'a P,
        attribute: &str,
    ) -> SynthResult<(&HistogramModel, &'a GlobalStats)> {
        let model = self
            .histogram(attribute)
            .ok_or_else(|| SynthError::UnknownAttribute {
                attribute: attribute.to_string(),
            })?;
        let stats = provider
            .global_stats(attribute, model.orientation())
            .ok_or_else(|| SynthError::MissingStats {
                attribute: attribute.to_string(),
            })?;
        Ok((model, stats))
    }

    fn store_filter(&mut self, filter: HistFilter) {
        // Selections over empty bins carry no predicate and are not
        // stored; a previous real selection stays in place.
        if filter.ast.is_some() {
            self.histogram_filters.insert(filter.attribute.clone(), filter);
        }
    }
}
