use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::Selection;
use super::model::Complaint;

/// Label of the single metric shown when no store is selected.
pub const FALLBACK_METRIC_LABEL: &str = "Total";

// ---------------------------------------------------------------------------
// Per-store metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMetric {
    pub label: String,
    pub count: usize,
}

/// One metric per selected store, in selection order. Stores without matches
/// count 0. With no store selected a single zero-valued fallback is returned.
pub fn store_metrics(records: &[&Complaint], stores: &Selection<String>) -> Vec<StoreMetric> {
    if stores.is_empty() {
        return vec![StoreMetric {
            label: FALLBACK_METRIC_LABEL.to_string(),
            count: 0,
        }];
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for rec in records {
        *counts.entry(rec.store.as_str()).or_default() += 1;
    }

    stores
        .iter()
        .map(|store| StoreMetric {
            label: store.clone(),
            count: counts.get(store.as_str()).copied().unwrap_or(0),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grouped counts: (key, store) → rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount<K> {
    pub key: K,
    pub store: String,
    pub count: usize,
}

/// Row counts grouped by a key and the store, sorted by key then store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCounts<K> {
    pub rows: Vec<GroupCount<K>>,
}

impl<K: Ord + Clone> GroupedCounts<K> {
    pub fn count_by<F>(records: &[&Complaint], key: F) -> Self
    where
        F: Fn(&Complaint) -> K,
    {
        let mut groups: BTreeMap<(K, &str), usize> = BTreeMap::new();
        for rec in records {
            *groups.entry((key(*rec), rec.store.as_str())).or_default() += 1;
        }
        let rows = groups
            .into_iter()
            .map(|((key, store), count)| GroupCount {
                key,
                store: store.to_string(),
                count,
            })
            .collect();
        GroupedCounts { rows }
    }

    /// Distinct keys in ascending order.
    pub fn categories(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.rows.iter().map(|r| r.key.clone()).collect();
        keys.dedup();
        keys
    }

    /// Count for one (key, store) pair; 0 when the group is absent.
    ///
    /// `rows` is sorted by (key, store), so this is a binary search.
    pub fn count(&self, key: &K, store: &str) -> usize {
        self.rows
            .binary_search_by(|r| (&r.key, r.store.as_str()).cmp(&(key, store)))
            .map(|i| self.rows[i].count)
            .unwrap_or(0)
    }

    /// One series per store, each sorted by key.
    pub fn series_by_store(&self) -> BTreeMap<String, Vec<(K, usize)>> {
        let mut series: BTreeMap<String, Vec<(K, usize)>> = BTreeMap::new();
        for row in &self.rows {
            series
                .entry(row.store.clone())
                .or_default()
                .push((row.key.clone(), row.count));
        }
        series
    }
}

/// Complaints per (month, store), chronological.
pub fn time_series(records: &[&Complaint]) -> GroupedCounts<NaiveDate> {
    GroupedCounts::count_by(records, Complaint::month)
}

/// Complaints per (region, store).
pub fn by_region(records: &[&Complaint]) -> GroupedCounts<String> {
    GroupedCounts::count_by(records, |c| c.state.clone())
}

/// Complaints per (status, store).
pub fn by_status(records: &[&Complaint]) -> GroupedCounts<String> {
    GroupedCounts::count_by(records, |c| c.status.clone())
}

// ---------------------------------------------------------------------------
// Histogram of description length, one per store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    /// store → count per bin; every vector has the same length.
    pub counts: BTreeMap<String, Vec<usize>>,
}

impl Histogram {
    /// Equal-width bins spanning the min..max length of `records`.
    /// Returns `None` for an empty view or zero bins.
    pub fn build(records: &[&Complaint], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let min = records.iter().map(|r| r.description_len).min()? as f64;
        let max = records.iter().map(|r| r.description_len).max()? as f64;
        // A single distinct length still gets a unit-wide span.
        let span = if max > min { max - min } else { 1.0 };
        let bin_width = span / bins as f64;

        let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let edge = |i: usize| min + i as f64 * bin_width;
        for rec in records {
            let value = rec.description_len as f64;
            let mut idx = (((value - min) / bin_width).floor() as usize).min(bins - 1);
            // Division rounding can land a value on an edge one bin off;
            // bins are half-open [lo, hi) except the last.
            if idx > 0 && value < edge(idx) {
                idx -= 1;
            } else if idx < bins - 1 && value >= edge(idx + 1) {
                idx += 1;
            }
            counts
                .entry(rec.store.clone())
                .or_insert_with(|| vec![0; bins])[idx] += 1;
        }

        Some(Histogram {
            start: min,
            bin_width,
            counts,
        })
    }

    pub fn bins(&self) -> usize {
        self.counts.values().next().map_or(0, Vec::len)
    }

    /// Lower and upper edge of bin `i`.
    pub fn edges(&self, i: usize) -> (f64, f64) {
        (
            self.start + i as f64 * self.bin_width,
            self.start + (i + 1) as f64 * self.bin_width,
        )
    }

    pub fn center(&self, i: usize) -> f64 {
        let (lo, hi) = self.edges(i);
        (lo + hi) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Summary: everything the central panel renders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Charts {
    pub time_series: GroupedCounts<NaiveDate>,
    pub regional: GroupedCounts<String>,
    pub status: GroupedCounts<String>,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub metrics: Vec<StoreMetric>,
    pub matching: usize,
    /// `None` when nothing matched the filters.
    pub charts: Option<Charts>,
}

/// Recompute metrics and all four charts from the filtered view.
pub fn summarize(records: &[&Complaint], stores: &Selection<String>, bins: usize) -> Summary {
    let metrics = store_metrics(records, stores);
    let charts = Histogram::build(records, bins).map(|histogram| Charts {
        time_series: time_series(records),
        regional: by_region(records),
        status: by_status(records),
        histogram,
    });

    Summary {
        metrics,
        matching: records.len(),
        charts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::tests::{accept_all, ten_records};
    use crate::data::filter::{filtered_indices, FilterCriteria, LengthRange};
    use crate::data::model::tests::complaint;

    fn view(ds: &crate::data::model::ComplaintDataset) -> Vec<&Complaint> {
        ds.records.iter().collect()
    }

    fn total<K>(counts: &GroupedCounts<K>) -> usize {
        counts.rows.iter().map(|r| r.count).sum()
    }

    fn stores(values: &[&str]) -> Selection<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn metrics_follow_selection_order_with_zero_fill() {
        let ds = ten_records();
        let records = view(&ds);
        let metrics = store_metrics(&records, &stores(&["B", "Z", "A"]));
        let pairs: Vec<(&str, usize)> = metrics.iter().map(|m| (m.label.as_str(), m.count)).collect();
        assert_eq!(pairs, vec![("B", 7), ("Z", 0), ("A", 3)]);
    }

    #[test]
    fn metrics_sum_to_view_size_when_all_present_stores_selected() {
        let ds = ten_records();
        let records = view(&ds);
        let total: usize = store_metrics(&records, &stores(&["A", "B"]))
            .iter()
            .map(|m| m.count)
            .sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn no_store_selected_yields_fallback_metric() {
        let ds = ten_records();
        let criteria = FilterCriteria {
            stores: Selection::default(),
            ..accept_all(&ds)
        };
        let records: Vec<&Complaint> = filtered_indices(&ds, &criteria)
            .into_iter()
            .map(|i| &ds.records[i])
            .collect();
        let summary = summarize(&records, &criteria.stores, 50);
        assert_eq!(
            summary.metrics,
            vec![StoreMetric {
                label: FALLBACK_METRIC_LABEL.to_string(),
                count: 0
            }]
        );
        assert_eq!(summary.matching, 0);
        assert!(summary.charts.is_none());
    }

    #[test]
    fn narrow_selection_summary() {
        let ds = ten_records();
        let criteria = FilterCriteria {
            stores: stores(&["A"]),
            regions: stores(&["SP"]),
            statuses: stores(&["Open"]),
            years: [2023].into_iter().collect(),
            length: LengthRange::new(0, 100),
        };
        let records: Vec<&Complaint> = filtered_indices(&ds, &criteria)
            .into_iter()
            .map(|i| &ds.records[i])
            .collect();
        let summary = summarize(&records, &criteria.stores, 50);
        assert_eq!(summary.matching, 3);
        assert_eq!(
            summary.metrics,
            vec![StoreMetric {
                label: "A".into(),
                count: 3
            }]
        );
        assert!(summary.charts.is_some());
    }

    #[test]
    fn grouped_counts_preserve_row_count() {
        let ds = ten_records();
        let records = view(&ds);
        assert_eq!(total(&time_series(&records)), 10);
        assert_eq!(total(&by_region(&records)), 10);
        assert_eq!(total(&by_status(&records)), 10);
    }

    #[test]
    fn region_groups_are_sorted_and_zero_filled() {
        let ds = ten_records();
        let records = view(&ds);
        let regional = by_region(&records);
        assert_eq!(regional.categories(), vec!["BA", "MG", "RJ", "SP"]);
        assert_eq!(regional.count(&"SP".to_string(), "A"), 3);
        assert_eq!(regional.count(&"SP".to_string(), "B"), 2);
        assert_eq!(regional.count(&"RJ".to_string(), "A"), 0);
        let series = regional.series_by_store();
        assert_eq!(series["A"], vec![("SP".to_string(), 3)]);
    }

    #[test]
    fn count_lookup_agrees_with_rows() {
        let ds = ten_records();
        let records = view(&ds);
        for counts in [by_region(&records), by_status(&records)] {
            for category in counts.categories() {
                for store in ["A", "B", "Z"] {
                    let expected = counts
                        .rows
                        .iter()
                        .filter(|r| r.key == category && r.store == store)
                        .map(|r| r.count)
                        .sum::<usize>();
                    assert_eq!(counts.count(&category, store), expected, "{category}/{store}");
                }
            }
        }
        let statuses = by_status(&records);
        assert_eq!(statuses.count(&"Closed".to_string(), "B"), 4);
        assert_eq!(statuses.count(&"Open".to_string(), "B"), 3);
        assert_eq!(statuses.count(&"Missing".to_string(), "A"), 0);
    }

    #[test]
    fn time_series_truncates_to_month_and_sorts() {
        let mut late = complaint("A", "SP", "Open", 2023, 10);
        late.time = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        let mut early = complaint("A", "SP", "Open", 2023, 10);
        early.time = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        let mut same_month = complaint("A", "SP", "Open", 2023, 10);
        same_month.time = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();

        let records = vec![&late, &early, &same_month];
        let ts = time_series(&records);
        let months: Vec<(NaiveDate, usize)> = ts.rows.iter().map(|r| (r.key, r.count)).collect();
        assert_eq!(
            months,
            vec![
                (NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(), 2),
            ]
        );
    }

    #[test]
    fn histogram_bins_cover_range_and_keep_counts() {
        let ds = ten_records();
        let records = view(&ds);
        let hist = Histogram::build(&records, 50).unwrap();
        assert_eq!(hist.bins(), 50);
        assert_eq!(hist.start, 50.0);
        assert!((hist.edges(49).1 - 340.0).abs() < 1e-9);
        // minimum lands in the first bin, maximum in the last
        assert_eq!(hist.counts["A"][0], 1);
        assert_eq!(hist.counts["B"][49], 1);
        assert_eq!(hist.counts["A"].iter().sum::<usize>(), 3);
        assert_eq!(hist.counts["B"].iter().sum::<usize>(), 7);
    }

    #[test]
    fn histogram_edge_values_land_in_their_own_bin() {
        let recs: Vec<Complaint> = [0, 17, 34]
            .into_iter()
            .map(|len| complaint("A", "SP", "Open", 2023, len))
            .collect();
        let view: Vec<&Complaint> = recs.iter().collect();
        let hist = Histogram::build(&view, 50).unwrap();
        let counts = &hist.counts["A"];
        assert_eq!(counts[0], 1);
        assert_eq!(counts[25], 1, "17 belongs to [17, 17.68)");
        assert_eq!(counts[49], 1);
        assert_eq!(counts.iter().sum::<usize>(), 3);

        for rec in &recs {
            let value = rec.description_len as f64;
            let bin = (0..hist.bins())
                .find(|&i| {
                    let (lo, hi) = hist.edges(i);
                    lo <= value && (value < hi || i == hist.bins() - 1)
                })
                .unwrap();
            assert_eq!(counts[bin], 1, "value {value} not counted in bin {bin}");
        }
    }

    #[test]
    fn histogram_counts_every_integer_in_its_own_bin() {
        let recs: Vec<Complaint> = (0..=800)
            .map(|len| complaint("A", "SP", "Open", 2023, len))
            .collect();
        let view: Vec<&Complaint> = recs.iter().collect();
        let hist = Histogram::build(&view, 50).unwrap();
        let mut expected = vec![0; 50];
        for rec in &recs {
            let value = rec.description_len as f64;
            let bin = (0..50)
                .find(|&i| {
                    let (lo, hi) = hist.edges(i);
                    lo <= value && (value < hi || i == 49)
                })
                .unwrap();
            expected[bin] += 1;
        }
        assert_eq!(hist.counts["A"], expected);
    }

    #[test]
    fn histogram_with_single_length() {
        let a = complaint("A", "SP", "Open", 2023, 42);
        let b = complaint("B", "SP", "Open", 2023, 42);
        let hist = Histogram::build(&[&a, &b], 50).unwrap();
        assert_eq!(hist.counts["A"][0], 1);
        assert_eq!(hist.counts["B"][0], 1);
        assert!((hist.edges(50).0 - 43.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_of_nothing() {
        assert!(Histogram::build(&[], 50).is_none());
        let a = complaint("A", "SP", "Open", 2023, 42);
        assert!(Histogram::build(&[&a], 0).is_none());
    }
}
