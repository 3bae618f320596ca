use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::{OutcomeTotals, Subset, YearMonth};

// Chart series. Terms are carried as `YearMonth` so ordering stays
// chronological; renderers use the `YYYY-MM` label as a category, never as a
// continuous axis. Rows whose period could not be parsed are left out.

/// Distinct students for one shift in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentPoint {
    pub shift: String,
    pub term: YearMonth,
    pub students: usize,
}

/// Distinct new entrants in one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrantPoint {
    pub term: YearMonth,
    pub students: usize,
}

/// Outcome category of a subject enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StatusKind {
    Approved,
    Failed,
    Withdrawn,
}

impl StatusKind {
    pub const ALL: [StatusKind; 3] = [
        StatusKind::Approved,
        StatusKind::Failed,
        StatusKind::Withdrawn,
    ];

    /// Source column code.
    pub fn code(self) -> &'static str {
        match self {
            StatusKind::Approved => "AP",
            StatusKind::Failed => "RP",
            StatusKind::Withdrawn => "TR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Approved => "Aprovado",
            StatusKind::Failed => "Reprovado",
            StatusKind::Withdrawn => "Trancado",
        }
    }

    pub fn count_in(self, totals: &OutcomeTotals) -> u64 {
        match self {
            StatusKind::Approved => totals.approved,
            StatusKind::Failed => totals.failed,
            StatusKind::Withdrawn => totals.withdrawn,
        }
    }
}

/// Summed outcome count of one kind in one term (long form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusPoint {
    pub term: YearMonth,
    pub status: StatusKind,
    pub count: u64,
}

/// Distinct students per (shift, term), ascending by term then shift.
pub fn enrollment_series(subset: &Subset<'_>) -> Vec<EnrollmentPoint> {
    let mut groups: BTreeMap<(YearMonth, &str), BTreeSet<&str>> = BTreeMap::new();
    for record in subset.iter() {
        let (Some(term), Some(shift)) = (record.term, record.shift.as_deref()) else {
            continue;
        };
        let regs = groups.entry((term, shift)).or_default();
        if let Some(reg) = record.registration.as_deref() {
            regs.insert(reg);
        }
    }
    groups
        .into_iter()
        .map(|((term, shift), regs)| EnrollmentPoint {
            shift: shift.to_string(),
            term,
            students: regs.len(),
        })
        .collect()
}

/// Distinct students flagged as new entrants, per term ascending.
pub fn new_entrants_series(subset: &Subset<'_>) -> Vec<EntrantPoint> {
    let mut groups: BTreeMap<YearMonth, BTreeSet<&str>> = BTreeMap::new();
    for record in subset.iter().filter(|r| r.new_entrant) {
        let Some(term) = record.term else {
            continue;
        };
        let regs = groups.entry(term).or_default();
        if let Some(reg) = record.registration.as_deref() {
            regs.insert(reg);
        }
    }
    groups
        .into_iter()
        .map(|(term, regs)| EntrantPoint {
            term,
            students: regs.len(),
        })
        .collect()
}

/// AP / RP / TR sums per term, melted to one point per (term, kind).
pub fn status_series(subset: &Subset<'_>) -> Vec<StatusPoint> {
    let mut per_term: BTreeMap<YearMonth, OutcomeTotals> = BTreeMap::new();
    for record in subset.iter() {
        if let Some(term) = record.term {
            per_term.entry(term).or_default().add_record(record);
        }
    }
    per_term
        .into_iter()
        .flat_map(|(term, totals)| {
            StatusKind::ALL.into_iter().map(move |status| StatusPoint {
                term,
                status,
                count: status.count_in(&totals),
            })
        })
        .collect()
}

/// Distinct term labels appearing in a series, in order.
pub fn term_labels<'a>(terms: impl IntoIterator<Item = &'a YearMonth>) -> Vec<YearMonth> {
    terms
        .into_iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
