use std::collections::BTreeSet;

use super::model::{EnrollmentRecord, EnrollmentTable, Subset};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Which student the dashboard is focused on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StudentFilter {
    #[default]
    All,
    /// Exact `Nome` match.
    Named(String),
}

impl StudentFilter {
    /// Label of the "every student" choice.
    pub const ALL_LABEL: &'static str = "Todos";

    /// Parse a user-facing choice; the sentinel or an empty value means all.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == Self::ALL_LABEL {
            StudentFilter::All
        } else {
            StudentFilter::Named(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StudentFilter::All => Self::ALL_LABEL,
            StudentFilter::Named(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, StudentFilter::All)
    }

    pub fn matches(&self, record: &EnrollmentRecord) -> bool {
        match self {
            StudentFilter::All => true,
            StudentFilter::Named(name) => record.name.as_deref() == Some(name.as_str()),
        }
    }
}

/// Current selection. An empty period or shift set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub student: StudentFilter,
    /// Allowed raw `Período` labels.
    pub periods: BTreeSet<String>,
    /// Allowed `Turno` values.
    pub shifts: BTreeSet<String>,
}

impl Selection {
    /// Collapse sets that list every available value to "no restriction",
    /// so a full selection and an empty one behave the same.
    pub fn normalize(&mut self, table: &EnrollmentTable) {
        if self.periods == table.periods {
            self.periods.clear();
        }
        if self.shifts == table.shifts {
            self.shifts.clear();
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.student.is_all() && self.periods.is_empty() && self.shifts.is_empty()
    }

    pub fn matches(&self, record: &EnrollmentRecord) -> bool {
        self.student.matches(record)
            && allowed(&self.periods, record.period.as_deref())
            && allowed(&self.shifts, record.shift.as_deref())
    }
}

fn allowed(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    value.is_some_and(|v| selected.contains(v))
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Keep the rows that pass every active filter. Accepts a table's rows or an
/// existing subset, so filters compose.
pub fn apply<'a, I>(rows: I, selection: &Selection) -> Subset<'a>
where
    I: IntoIterator<Item = &'a EnrollmentRecord>,
{
    rows.into_iter().filter(|r| selection.matches(r)).collect()
}

/// Filter the full table.
pub fn apply_table<'a>(table: &'a EnrollmentTable, selection: &Selection) -> Subset<'a> {
    let subset = apply(&table.records, selection);
    log::debug!("Filter kept {} of {} rows", subset.len(), table.len());
    subset
}

/// Student choices for a picker: the sentinel followed by every name.
pub fn student_choices(table: &EnrollmentTable) -> Vec<String> {
    std::iter::once(StudentFilter::ALL_LABEL.to_string())
        .chain(table.students.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, period: &str, shift: &str) -> EnrollmentRecord {
        EnrollmentRecord {
            name: Some(name.into()),
            registration: Some(format!("{name}-id")),
            period: Some(period.into()),
            shift: Some(shift.into()),
            ..Default::default()
        }
    }

    fn table() -> EnrollmentTable {
        EnrollmentTable::from_records(vec![
            row("Ana", "2023-01", "Diurno"),
            row("Bruno", "2023-01", "Noturno"),
            row("Ana", "2023-02", "Diurno"),
            row("Carla", "2023-02", "Noturno"),
            EnrollmentRecord {
                name: Some("Davi".into()),
                shift: Some("Diurno".into()),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn default_selection_keeps_everything() {
        let table = table();
        let subset = apply_table(&table, &Selection::default());
        assert_eq!(subset.len(), table.len());
    }

    #[test]
    fn student_filter_is_exact() {
        let table = table();
        let selection = Selection {
            student: StudentFilter::Named("Ana".into()),
            ..Default::default()
        };
        let subset = apply_table(&table, &selection);
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|r| r.name.as_deref() == Some("Ana")));

        let partial = Selection {
            student: StudentFilter::Named("An".into()),
            ..Default::default()
        };
        assert!(apply_table(&table, &partial).is_empty());
    }

    #[test]
    fn refiltering_is_idempotent() {
        let table = table();
        let selection = Selection {
            student: StudentFilter::Named("Ana".into()),
            ..Default::default()
        };
        let once = apply_table(&table, &selection);
        let twice = apply(once.iter(), &selection);
        let a: Vec<_> = once.iter().map(|r| r as *const _).collect();
        let b: Vec<_> = twice.iter().map(|r| r as *const _).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn period_and_shift_sets_restrict() {
        let table = table();
        let selection = Selection {
            periods: ["2023-02".to_string()].into(),
            shifts: ["Noturno".to_string()].into(),
            ..Default::default()
        };
        let subset = apply_table(&table, &selection);
        let names: Vec<_> = subset.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, ["Carla"]);
    }

    #[test]
    fn restricted_period_excludes_missing_period() {
        let table = table();
        let selection = Selection {
            periods: ["2023-01".to_string()].into(),
            ..Default::default()
        };
        let subset = apply_table(&table, &selection);
        assert!(subset.iter().all(|r| r.name.as_deref() != Some("Davi")));
    }

    #[test]
    fn full_selection_normalizes_to_unrestricted() {
        let table = table();
        let mut selection = Selection {
            periods: table.periods.clone(),
            shifts: table.shifts.clone(),
            ..Default::default()
        };
        selection.normalize(&table);
        assert!(selection.is_unrestricted());
        assert_eq!(apply_table(&table, &selection).len(), table.len());
    }

    #[test]
    fn student_label_round_trip() {
        assert_eq!(StudentFilter::from_label("Todos"), StudentFilter::All);
        assert_eq!(StudentFilter::from_label("  "), StudentFilter::All);
        assert_eq!(StudentFilter::from_label("Ana").label(), "Ana");
    }

    #[test]
    fn choices_start_with_sentinel() {
        let choices = student_choices(&table());
        assert_eq!(choices.first().map(String::as_str), Some("Todos"));
        assert_eq!(choices.len(), 5);
    }
}
