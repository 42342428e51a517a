//! Memoized selectors over the pledger store and the current selection.
//!
//! Every input lives in [`PledgeState`] behind a version counter that bumps
//! on each write. A selector caches its last output keyed by the versions it
//! read plus the stamps of the selectors it builds on, so unchanged inputs
//! hand back the same `Arc` without recomputing.

use std::sync::Arc;

use crate::filter::FilterCriteria;
use crate::grouping::{self, DistrictSlice, GroupedView, StateSlice};
use crate::pledger::PledgerStore;

/// Current UI selection. No state means "all states"; no districts means
/// "all districts".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_state: Option<String>,
    pub selected_districts: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PledgeState {
    pledgers: Option<Arc<PledgerStore>>,
    pledgers_version: u64,
    selection: SelectionState,
    state_version: u64,
    districts_version: u64,
    filter: FilterCriteria,
    filter_version: u64,
}

impl PledgeState {
    pub fn new(filter: FilterCriteria) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn set_pledgers(&mut self, store: PledgerStore) {
        self.pledgers = Some(Arc::new(store));
        self.pledgers_version += 1;
    }

    /// Selecting a different state drops any district selection.
    pub fn select_state(&mut self, state: Option<String>) {
        let state = state.filter(|s| !s.is_empty());
        if self.selection.selected_state == state {
            return;
        }
        self.selection.selected_state = state;
        self.state_version += 1;
        if !self.selection.selected_districts.is_empty() {
            self.selection.selected_districts.clear();
            self.districts_version += 1;
        }
    }

    pub fn select_districts(&mut self, districts: Vec<String>) {
        if self.selection.selected_districts == districts {
            return;
        }
        self.selection.selected_districts = districts;
        self.districts_version += 1;
    }

    pub fn set_filter(&mut self, filter: FilterCriteria) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.filter_version += 1;
    }
}

/// Single-entry cache. `stamp` changes whenever the cached value is replaced
/// so downstream memos can key on it.
#[derive(Debug)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    stamp: u64,
    recomputes: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            stamp: 0,
            recomputes: 0,
        }
    }
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> (u64, V) {
        if let Some((cached_key, value)) = &self.entry
            && *cached_key == key
        {
            return (self.stamp, value.clone());
        }
        let value = compute();
        self.entry = Some((key, value.clone()));
        self.stamp += 1;
        self.recomputes += 1;
        (self.stamp, value)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

#[derive(Debug, Default)]
pub struct Selectors {
    filtered: Memo<u64, Option<Arc<PledgerStore>>>,
    total: Memo<u64, Option<usize>>,
    on_ballot: Memo<(u64, u64), Option<usize>>,
    grouped: Memo<(u64, u64), Option<Arc<GroupedView>>>,
    by_state: Memo<(u64, u64), Option<Arc<StateSlice>>>,
    by_district: Memo<(u64, u64, u64), Option<Arc<DistrictSlice>>>,
}

impl Selectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.filtered.invalidate();
        self.total.invalidate();
        self.on_ballot.invalidate();
        self.grouped.invalidate();
        self.by_state.invalidate();
        self.by_district.invalidate();
    }

    fn filtered_stamped(&mut self, state: &PledgeState) -> (u64, Option<Arc<PledgerStore>>) {
        self.filtered
            .get_or_compute(state.pledgers_version, || state.pledgers.clone())
    }

    pub fn filtered_pledgers(&mut self, state: &PledgeState) -> Option<Arc<PledgerStore>> {
        self.filtered_stamped(state).1
    }

    pub fn total_pledged(&mut self, state: &PledgeState) -> Option<usize> {
        self.total
            .get_or_compute(state.pledgers_version, || {
                state.pledgers.as_deref().map(grouping::total_pledged)
            })
            .1
    }

    pub fn pledged_on_ballot(&mut self, state: &PledgeState) -> Option<usize> {
        self.on_ballot
            .get_or_compute((state.pledgers_version, state.filter_version), || {
                state
                    .pledgers
                    .as_deref()
                    .map(|store| grouping::pledged_on_ballot(store, &state.filter))
            })
            .1
    }

    fn grouped_stamped(&mut self, state: &PledgeState) -> (u64, Option<Arc<GroupedView>>) {
        let (filtered_stamp, filtered) = self.filtered_stamped(state);
        self.grouped
            .get_or_compute((filtered_stamp, state.filter_version), || {
                filtered.map(|store| {
                    Arc::new(grouping::group_by_state_and_district(&store, &state.filter))
                })
            })
    }

    pub fn group_by_state_and_district(&mut self, state: &PledgeState) -> Option<Arc<GroupedView>> {
        self.grouped_stamped(state).1
    }

    fn by_state_stamped(&mut self, state: &PledgeState) -> (u64, Option<Arc<StateSlice>>) {
        let (grouped_stamp, grouped) = self.grouped_stamped(state);
        self.by_state
            .get_or_compute((grouped_stamp, state.state_version), || {
                grouped.map(|grouped| {
                    Arc::new(grouping::pledgers_by_state(
                        &grouped,
                        state.selection.selected_state.as_deref(),
                    ))
                })
            })
    }

    pub fn pledgers_by_state(&mut self, state: &PledgeState) -> Option<Arc<StateSlice>> {
        self.by_state_stamped(state).1
    }

    pub fn pledgers_by_district(&mut self, state: &PledgeState) -> Option<Arc<DistrictSlice>> {
        let (by_state_stamp, by_state) = self.by_state_stamped(state);
        self.by_district
            .get_or_compute(
                (by_state_stamp, state.state_version, state.districts_version),
                || {
                    by_state.map(|by_state| {
                        Arc::new(grouping::pledgers_by_district(
                            &by_state,
                            state.selection.selected_state.as_deref(),
                            &state.selection.selected_districts,
                        ))
                    })
                },
            )
            .1
    }

    pub fn grouped_recomputes(&self) -> u64 {
        self.grouped.recomputes()
    }

    pub fn by_state_recomputes(&self) -> u64 {
        self.by_state.recomputes()
    }

    pub fn by_district_recomputes(&self) -> u64 {
        self.by_district.recomputes()
    }
}
