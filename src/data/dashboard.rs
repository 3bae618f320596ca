use serde::Serialize;

use super::error::DashboardError;
use super::metrics::{self, ShiftSummary, StudentSummary};
use super::model::Subset;
use super::series::{self, EnrollmentPoint, EntrantPoint, StatusPoint};

/// Default length of the ranked student table.
pub const DEFAULT_TOP_N: usize = 10;

/// Everything one render pass needs, computed from a filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Rows in the filtered subset.
    pub rows: usize,
    pub shifts: Vec<ShiftSummary>,
    pub top_students: Vec<StudentSummary>,
    /// Every student, ordered by name.
    pub students: Vec<StudentSummary>,
    pub enrollment: Vec<EnrollmentPoint>,
    pub new_entrants: Vec<EntrantPoint>,
    pub status: Vec<StatusPoint>,
}

impl Dashboard {
    /// Compute all metrics, or [`DashboardError::EmptySelection`] when no
    /// shift is present, so no ratio is ever taken over an empty selection.
    pub fn compute(subset: &Subset<'_>, top_n: usize) -> Result<Self, DashboardError> {
        if subset.shifts().is_empty() {
            return Err(DashboardError::EmptySelection);
        }

        Ok(Dashboard {
            rows: subset.len(),
            shifts: metrics::shift_summaries(subset),
            top_students: metrics::top_students(subset, top_n),
            students: metrics::student_summaries(subset),
            enrollment: series::enrollment_series(subset),
            new_entrants: series::new_entrants_series(subset),
            status: series::status_series(subset),
        })
    }

    /// Shift names in display order.
    pub fn shift_names(&self) -> impl Iterator<Item = &str> {
        self.shifts.iter().map(|s| s.shift.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{self, Selection, StudentFilter};
    use crate::data::model::{EnrollmentRecord, EnrollmentTable};

    fn table() -> EnrollmentTable {
        let rows = [
            ("A", "1", "Diurno", "2023-01", 4, 3, 1, 0),
            ("B", "2", "Diurno", "2023-01", 4, 4, 0, 0),
            ("C", "3", "Noturno", "2023-02", 5, 2, 2, 1),
        ];
        EnrollmentTable::from_records(
            rows.iter()
                .map(|&(name, reg, shift, period, total, ap, rp, tr)| EnrollmentRecord {
                    name: Some(name.into()),
                    registration: Some(reg.into()),
                    shift: Some(shift.into()),
                    period: Some(period.into()),
                    term: crate::data::loader::parse_period(period),
                    new_entrant: reg == "3",
                    total: Some(total),
                    approved: Some(ap),
                    failed: Some(rp),
                    withdrawn: Some(tr),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn computes_every_section() {
        let table = table();
        let subset = filter::apply_table(&table, &Selection::default());
        let dashboard = Dashboard::compute(&subset, DEFAULT_TOP_N).unwrap();

        assert_eq!(dashboard.rows, 3);
        assert_eq!(dashboard.shift_names().collect::<Vec<_>>(), ["Diurno", "Noturno"]);
        assert_eq!(dashboard.top_students[0].name, "B");
        assert_eq!(dashboard.students.len(), 3);
        assert_eq!(dashboard.enrollment.len(), 2);
        assert_eq!(dashboard.new_entrants.len(), 1);
        assert_eq!(dashboard.status.len(), 6);
    }

    #[test]
    fn unknown_student_is_empty_selection() {
        let table = table();
        let selection = Selection {
            student: StudentFilter::Named("Zé".into()),
            ..Default::default()
        };
        let subset = filter::apply_table(&table, &selection);
        assert_eq!(
            Dashboard::compute(&subset, DEFAULT_TOP_N),
            Err(DashboardError::EmptySelection)
        );
    }

    #[test]
    fn rows_without_shift_are_empty_selection() {
        let records = vec![EnrollmentRecord {
            name: Some("A".into()),
            total: Some(1),
            ..Default::default()
        }];
        let subset: Subset<'_> = records.iter().collect();
        assert_eq!(
            Dashboard::compute(&subset, DEFAULT_TOP_N),
            Err(DashboardError::EmptySelection)
        );
    }

    #[test]
    fn serializes_to_json() {
        let table = table();
        let subset = filter::apply_table(&table, &Selection::default());
        let dashboard = Dashboard::compute(&subset, 1).unwrap();
        let json = serde_json::to_value(&dashboard).unwrap();

        assert_eq!(json["top_students"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["enrollment"][0]["term"], "2023-01");
        assert_eq!(json["students"][0]["approved"], 3);
        assert_eq!(json["status"][0]["status"], "Approved");
    }
}
