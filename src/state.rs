use std::collections::BTreeSet;
use std::sync::Arc;

use crate::color::ShiftColors;
use crate::data::dashboard::Dashboard;
use crate::data::error::{DashboardError, DataError};
use crate::data::filter::{self, Selection, StudentFilter};
use crate::data::model::EnrollmentTable;
use crate::data::source::DatasetCache;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the current table came from.
    pub source_label: String,

    /// Loaded table, or the terminal load failure.
    pub table: Result<Arc<EnrollmentTable>, DataError>,

    /// Current filter selection (empty sets mean "everything").
    pub selection: Selection,

    /// Result of the latest render pass.
    pub dashboard: Result<Dashboard, DashboardError>,

    /// Stable colour per shift.
    pub shift_colors: ShiftColors,

    /// Length of the ranked student table.
    pub top_n: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state from a cache, loading the dataset if needed.
    pub fn new(cache: &DatasetCache, top_n: usize) -> Self {
        let mut state = AppState {
            source_label: cache.source_label(),
            table: Err(DataError::Unavailable {
                source_label: cache.source_label(),
                reason: "não carregado".to_string(),
            }),
            selection: Selection::default(),
            dashboard: Err(DashboardError::EmptySelection),
            shift_colors: ShiftColors::new(&BTreeSet::new()),
            top_n,
            status_message: None,
        };
        state.set_table(cache.source_label(), cache.get());
        state
    }

    /// Ingest a load result, reset filters and recompute.
    pub fn set_table(&mut self, label: String, table: Result<Arc<EnrollmentTable>, DataError>) {
        self.source_label = label;
        self.selection = Selection::default();
        match &table {
            Ok(t) => {
                self.shift_colors = ShiftColors::new(&t.shifts);
                self.status_message = None;
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
            }
        }
        self.table = table;
        self.refilter();
    }

    /// Recompute the dashboard after a filter change.
    pub fn refilter(&mut self) {
        self.dashboard = match &self.table {
            Ok(table) => {
                self.selection.normalize(table);
                let subset = filter::apply_table(table, &self.selection);
                Dashboard::compute(&subset, self.top_n)
            }
            Err(e) => Err(DashboardError::Unavailable(e.clone())),
        };
    }

    pub fn set_student(&mut self, label: &str) {
        self.selection.student = StudentFilter::from_label(label);
        self.refilter();
    }

    /// Toggle a period. Starting from "everything", the click removes only
    /// that period.
    pub fn toggle_period(&mut self, period: &str) {
        if let Ok(table) = &self.table {
            toggle(&mut self.selection.periods, &table.periods, period);
            self.refilter();
        }
    }

    pub fn toggle_shift(&mut self, shift: &str) {
        if let Ok(table) = &self.table {
            toggle(&mut self.selection.shifts, &table.shifts, shift);
            self.refilter();
        }
    }

    pub fn select_all_periods(&mut self) {
        self.selection.periods.clear();
        self.refilter();
    }

    pub fn select_all_shifts(&mut self) {
        self.selection.shifts.clear();
        self.refilter();
    }

    pub fn period_selected(&self, period: &str) -> bool {
        self.selection.periods.is_empty() || self.selection.periods.contains(period)
    }

    pub fn shift_selected(&self, shift: &str) -> bool {
        self.selection.shifts.is_empty() || self.selection.shifts.contains(shift)
    }

    /// Rows in the loaded table.
    pub fn total_rows(&self) -> usize {
        self.table.as_ref().map(|t| t.len()).unwrap_or(0)
    }

    /// Rows passing the current filters.
    pub fn visible_rows(&self) -> usize {
        self.dashboard.as_ref().map(|d| d.rows).unwrap_or(0)
    }
}

fn toggle(selected: &mut BTreeSet<String>, all: &BTreeSet<String>, value: &str) {
    if selected.is_empty() {
        selected.clone_from(all);
    }
    if !selected.remove(value) {
        selected.insert(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::DataSource;

    struct Fixture;

    impl DataSource for Fixture {
        fn label(&self) -> String {
            "fixture".into()
        }

        fn fetch(&self) -> anyhow::Result<Vec<u8>> {
            Ok(b"Nome;Matr\xedcula;Turno;Per\xedodo;Ingresso;Ingressante;Total;AP;RP;TR\n\
                Ana;1;Diurno;2023-01;2023.1;1;4;3;1;0\n\
                Bruno;2;Noturno;2023-02;2023.1;0;4;4;0;0\n"
                .to_vec())
        }
    }

    #[test]
    fn loads_and_computes_on_start() {
        let state = AppState::new(&DatasetCache::new(Fixture), 10);
        assert_eq!(state.total_rows(), 2);
        assert_eq!(state.visible_rows(), 2);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggling_from_everything_removes_one() {
        let mut state = AppState::new(&DatasetCache::new(Fixture), 10);
        state.toggle_shift("Noturno");
        assert!(state.shift_selected("Diurno"));
        assert!(!state.shift_selected("Noturno"));
        assert_eq!(state.visible_rows(), 1);

        state.toggle_shift("Noturno");
        assert!(state.selection.shifts.is_empty());
        assert_eq!(state.visible_rows(), 2);
    }

    #[test]
    fn unknown_student_gives_empty_state() {
        let mut state = AppState::new(&DatasetCache::new(Fixture), 10);
        state.set_student("Zé");
        assert_eq!(state.dashboard, Err(DashboardError::EmptySelection));
        state.set_student(StudentFilter::ALL_LABEL);
        assert!(state.dashboard.is_ok());
    }

    #[test]
    fn load_failure_blocks_metrics() {
        let mut state = AppState::new(&DatasetCache::new(Fixture), 10);
        let err = DataError::Unavailable {
            source_label: "x".into(),
            reason: "offline".into(),
        };
        state.set_table("x".into(), Err(err.clone()));
        assert_eq!(state.dashboard, Err(DashboardError::Unavailable(err)));
        assert_eq!(state.total_rows(), 0);
    }
}
