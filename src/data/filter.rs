use std::collections::BTreeSet;

use super::model::{Complaint, ComplaintDataset};

// ---------------------------------------------------------------------------
// Selection: accepted values for one categorical dimension
// ---------------------------------------------------------------------------

/// Set of accepted values, remembering the order they were chosen in.
///
/// An empty selection accepts nothing. It is not the same as "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T: Ord> {
    ordered: Vec<T>,
    members: BTreeSet<T>,
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Self {
            ordered: Vec::new(),
            members: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Clone> FromIterator<T> for Selection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut selection = Selection::default();
        for value in iter {
            if selection.members.insert(value.clone()) {
                selection.ordered.push(value);
            }
        }
        selection
    }
}

impl<T: Ord> Selection<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }

    /// Values in the order they were selected.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.ordered.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LengthRange: inclusive description-length window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRange {
    pub lo: i64,
    pub hi: i64,
}

impl LengthRange {
    /// Bounds given in the wrong order are swapped.
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.lo <= value && value <= self.hi
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria: everything the user chose, combined with AND
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub stores: Selection<String>,
    pub regions: Selection<String>,
    pub statuses: Selection<String>,
    pub years: Selection<i32>,
    pub length: LengthRange,
}

impl FilterCriteria {
    /// Whether one complaint passes all five predicates.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.stores.contains(&complaint.store)
            && self.regions.contains(&complaint.state)
            && self.statuses.contains(&complaint.status)
            && self.years.contains(&complaint.year)
            && self.length.contains(complaint.description_len)
    }
}

/// Return indices of complaints that pass all filters, in dataset order.
pub fn filtered_indices(dataset: &ComplaintDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, c)| criteria.matches(c))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::model::tests::complaint;

    /// 3 complaints for store A (SP, Open, 2023, lengths 50..=80), 7 for B.
    pub(crate) fn ten_records() -> ComplaintDataset {
        let mut records = vec![
            complaint("A", "SP", "Open", 2023, 50),
            complaint("A", "SP", "Open", 2023, 65),
            complaint("A", "SP", "Open", 2023, 80),
        ];
        for (i, state) in ["RJ", "MG", "SP", "RJ", "BA", "SP", "MG"].iter().enumerate() {
            let status = if i % 2 == 0 { "Closed" } else { "Open" };
            records.push(complaint("B", state, status, 2022 + (i as i32 % 2), 100 + 40 * i as i64));
        }
        ComplaintDataset::from_records(records)
    }

    /// Criteria accepting every record of `dataset`.
    pub(crate) fn accept_all(dataset: &ComplaintDataset) -> FilterCriteria {
        let (lo, hi) = dataset.length_bounds().unwrap_or((0, 0));
        FilterCriteria {
            stores: dataset.stores.iter().cloned().collect(),
            regions: dataset.states.iter().cloned().collect(),
            statuses: dataset.statuses.iter().cloned().collect(),
            years: dataset.years.iter().copied().collect(),
            length: LengthRange::new(lo, hi),
        }
    }

    fn sel<T: Ord + Clone>(values: &[T]) -> Selection<T> {
        values.iter().cloned().collect()
    }

    fn strings(values: &[&str]) -> Selection<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selection_keeps_first_occurrence_order() {
        let s = sel(&[3, 1, 3, 2, 1]);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert!(s.contains(&2));
        assert!(!s.contains(&4));
    }

    #[test]
    fn length_range_is_inclusive_and_ordered() {
        let r = LengthRange::new(80, 50);
        assert_eq!(r, LengthRange { lo: 50, hi: 80 });
        assert!(r.contains(50));
        assert!(r.contains(80));
        assert!(!r.contains(81));
    }

    #[test]
    fn narrow_selection_returns_store_a() {
        let ds = ten_records();
        let criteria = FilterCriteria {
            stores: strings(&["A"]),
            regions: strings(&["SP"]),
            statuses: strings(&["Open"]),
            years: sel(&[2023]),
            length: LengthRange::new(0, 100),
        };
        let idx = filtered_indices(&ds, &criteria);
        assert_eq!(idx, vec![0, 1, 2]);
        assert!(idx.iter().all(|&i| ds.records[i].store == "A"));
    }

    #[test]
    fn any_empty_selection_empties_the_result() {
        let ds = ten_records();
        let all = accept_all(&ds);
        assert_eq!(filtered_indices(&ds, &all).len(), 10);

        let mut no_stores = all.clone();
        no_stores.stores = Selection::default();
        assert!(filtered_indices(&ds, &no_stores).is_empty());

        let mut no_regions = all.clone();
        no_regions.regions = Selection::default();
        assert!(filtered_indices(&ds, &no_regions).is_empty());

        let mut no_statuses = all.clone();
        no_statuses.statuses = Selection::default();
        assert!(filtered_indices(&ds, &no_statuses).is_empty());

        let mut no_years = all;
        no_years.years = Selection::default();
        assert!(filtered_indices(&ds, &no_years).is_empty());
    }

    #[test]
    fn range_outside_every_length_matches_nothing() {
        let ds = ten_records();
        let mut criteria = accept_all(&ds);
        criteria.length = LengthRange::new(1000, 2000);
        assert!(filtered_indices(&ds, &criteria).is_empty());
    }

    #[test]
    fn every_returned_record_satisfies_every_predicate() {
        let ds = ten_records();
        let criteria = FilterCriteria {
            stores: strings(&["B", "A"]),
            regions: strings(&["SP", "RJ"]),
            statuses: strings(&["Open", "Closed"]),
            years: sel(&[2022, 2023]),
            length: LengthRange::new(60, 260),
        };
        let idx = filtered_indices(&ds, &criteria);
        assert!(!idx.is_empty());
        for i in idx {
            let c = &ds.records[i];
            assert!(criteria.stores.contains(&c.store));
            assert!(criteria.regions.contains(&c.state));
            assert!(criteria.statuses.contains(&c.status));
            assert!(criteria.years.contains(&c.year));
            assert!(criteria.length.contains(c.description_len));
        }
    }
}
