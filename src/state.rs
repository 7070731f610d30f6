use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::aggregate::{summarize, Summary};
use crate::data::filter::{filtered_indices, FilterCriteria, LengthRange, Selection};
use crate::data::model::{Complaint, ComplaintDataset};

// ---------------------------------------------------------------------------
// DimensionSelector: "select all" or pick individually
// ---------------------------------------------------------------------------

/// Selector for one categorical dimension.
///
/// With `select_all` on, the selection is the whole domain and individual
/// picks are ignored (but kept, so switching back restores them).
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSelector<T> {
    pub label: &'static str,
    domain: Vec<T>,
    pub select_all: bool,
    picks: Vec<T>,
}

impl<T: Ord + Clone> DimensionSelector<T> {
    pub fn new(label: &'static str, domain: &[T]) -> Self {
        let mut domain = domain.to_vec();
        domain.sort();
        domain.dedup();
        Self {
            label,
            domain,
            select_all: false,
            picks: Vec::new(),
        }
    }

    /// Sorted distinct values offered to the user.
    pub fn domain(&self) -> &[T] {
        &self.domain
    }

    /// Individual picks, in the order they were made.
    pub fn picks(&self) -> &[T] {
        &self.picks
    }

    pub fn is_picked(&self, value: &T) -> bool {
        self.picks.contains(value)
    }

    /// Pick or un-pick a value. Values outside the domain are ignored.
    pub fn toggle(&mut self, value: &T) {
        if let Some(pos) = self.picks.iter().position(|p| p == value) {
            self.picks.remove(pos);
        } else if self.domain.binary_search(value).is_ok() {
            self.picks.push(value.clone());
        }
    }

    pub fn clear_picks(&mut self) {
        self.picks.clear();
    }

    /// Values accepted by the filter engine.
    pub fn selection(&self) -> Selection<T> {
        if self.select_all {
            // Sorted domain order, not first-appearance order in the file.
            self.domain.iter().cloned().collect()
        } else {
            self.picks.iter().cloned().collect()
        }
    }
}

// ---------------------------------------------------------------------------
// RangeSelector: inclusive description-length window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelector {
    pub min: i64,
    pub max: i64,
    lo: i64,
    hi: i64,
}

impl RangeSelector {
    /// Defaults to the full `(min, max)` span; `(0, 0)` for an empty dataset.
    pub fn new(bounds: Option<(i64, i64)>) -> Self {
        let (min, max) = bounds.unwrap_or((0, 0));
        Self {
            min,
            max,
            lo: min,
            hi: max,
        }
    }

    pub fn lo(&self) -> i64 {
        self.lo
    }

    pub fn hi(&self) -> i64 {
        self.hi
    }

    /// Clamped into bounds; drags `hi` along if needed.
    pub fn set_lo(&mut self, value: i64) {
        self.lo = value.clamp(self.min, self.max);
        self.hi = self.hi.max(self.lo);
    }

    /// Clamped into bounds; drags `lo` along if needed.
    pub fn set_hi(&mut self, value: i64) {
        self.hi = value.clamp(self.min, self.max);
        self.lo = self.lo.min(self.hi);
    }

    pub fn range(&self) -> LengthRange {
        LengthRange::new(self.lo, self.hi)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file has been loaded).
    pub dataset: Option<ComplaintDataset>,

    pub stores: DimensionSelector<String>,
    pub regions: DimensionSelector<String>,
    pub statuses: DimensionSelector<String>,
    pub years: DimensionSelector<i32>,
    pub length: RangeSelector,

    /// Store colours, shared by every chart.
    pub color_map: Option<ColorMap>,

    /// Indices of complaints passing the current filters.
    pub visible_indices: Vec<usize>,

    /// Metrics and chart data for the current filters.
    pub summary: Option<Summary>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            stores: DimensionSelector::new("Stores", &[]),
            regions: DimensionSelector::new("States", &[]),
            statuses: DimensionSelector::new("Statuses", &[]),
            years: DimensionSelector::new("Years", &[]),
            length: RangeSelector::new(None),
            color_map: None,
            visible_indices: Vec::new(),
            summary: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset: fresh selectors, colours and summary.
    pub fn set_dataset(&mut self, dataset: ComplaintDataset) {
        self.stores = DimensionSelector::new("Stores", &dataset.stores);
        self.regions = DimensionSelector::new("States", &dataset.states);
        self.statuses = DimensionSelector::new("Statuses", &dataset.statuses);
        self.years = DimensionSelector::new("Years", &dataset.years);
        self.length = RangeSelector::new(dataset.length_bounds());

        let stale = self
            .color_map
            .as_ref()
            .map_or(true, |cm| !cm.is_for(&dataset.stores));
        if stale {
            let color_map = ColorMap::new(&dataset.stores);
            log::debug!("Assigned colours to {} stores", color_map.len());
            self.color_map = Some(color_map);
        }

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Current selections combined into filter criteria.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            stores: self.stores.selection(),
            regions: self.regions.selection(),
            statuses: self.statuses.selection(),
            years: self.years.selection(),
            length: self.length.range(),
        }
    }

    /// Recompute the filtered view and every aggregate from scratch.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let criteria = self.criteria();
        self.visible_indices = filtered_indices(ds, &criteria);

        let records: Vec<&Complaint> = self
            .visible_indices
            .iter()
            .map(|&i| &ds.records[i])
            .collect();
        let summary = summarize(&records, &criteria.stores, self.config.histogram_bins);
        log::debug!(
            "Filters matched {} of {} complaints",
            summary.matching,
            ds.len()
        );
        self.summary = Some(summary);
    }
}
