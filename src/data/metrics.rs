use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::{OutcomeTotals, Subset};

/// Per-shift results, keyed by `Turno` and sorted by it.
pub type ShiftMap<T> = BTreeMap<String, T>;

// ---------------------------------------------------------------------------
// Total arithmetic
// ---------------------------------------------------------------------------

/// Division that never yields NaN or infinity: `x/0` and `0/0` are `0.0`.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// `numerator / denominator * 100`, guarded like [`safe_ratio`].
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    safe_ratio(numerator as f64, denominator as f64) * 100.0
}

// ---------------------------------------------------------------------------
// Per-shift metrics
// ---------------------------------------------------------------------------

/// Unique `Matrícula` count per shift.
pub fn distinct_students_by_shift(subset: &Subset<'_>) -> ShiftMap<usize> {
    let mut students: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in subset.iter() {
        let Some(shift) = record.shift.as_deref() else {
            continue;
        };
        let entry = students.entry(shift).or_default();
        if let Some(reg) = record.registration.as_deref() {
            entry.insert(reg);
        }
    }
    students
        .into_iter()
        .map(|(shift, regs)| (shift.to_string(), regs.len()))
        .collect()
}

/// Mean over terms of the distinct students enrolled in each term, per shift.
/// A shift whose rows carry no period averages to `0.0`.
pub fn mean_enrollment_per_term(subset: &Subset<'_>) -> ShiftMap<f64> {
    let mut per_term: BTreeMap<&str, BTreeMap<&str, BTreeSet<&str>>> = BTreeMap::new();
    for record in subset.iter() {
        let Some(shift) = record.shift.as_deref() else {
            continue;
        };
        let terms = per_term.entry(shift).or_default();
        let Some(period) = record.period.as_deref() else {
            continue;
        };
        let regs = terms.entry(period).or_default();
        if let Some(reg) = record.registration.as_deref() {
            regs.insert(reg);
        }
    }

    per_term
        .into_iter()
        .map(|(shift, terms)| {
            let students: usize = terms.values().map(BTreeSet::len).sum();
            (
                shift.to_string(),
                safe_ratio(students as f64, terms.len() as f64),
            )
        })
        .collect()
}

/// Raw row count per shift ("total historical enrollments").
pub fn record_count_by_shift(subset: &Subset<'_>) -> ShiftMap<usize> {
    let mut counts = ShiftMap::new();
    for shift in subset.iter().filter_map(|r| r.shift.as_deref()) {
        *counts.entry(shift.to_string()).or_insert(0) += 1;
    }
    counts
}

/// `sum(AP) / sum(Total) * 100` per shift; `0.0` when nothing was enrolled.
pub fn approval_rate_by_shift(subset: &Subset<'_>) -> ShiftMap<f64> {
    outcomes_by_shift(subset)
        .into_iter()
        .map(|(shift, totals)| (shift, percentage(totals.approved, totals.total)))
        .collect()
}

fn outcomes_by_shift(subset: &Subset<'_>) -> ShiftMap<OutcomeTotals> {
    let mut totals = ShiftMap::<OutcomeTotals>::new();
    for record in subset.iter() {
        if let Some(shift) = &record.shift {
            totals.entry(shift.clone()).or_default().add_record(record);
        }
    }
    totals
}

/// Every per-shift figure the metric cards show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftSummary {
    pub shift: String,
    pub distinct_students: usize,
    pub mean_students_per_term: f64,
    pub records: usize,
    pub approval_rate: f64,
}

/// Combine the per-shift maps, one entry per shift present in the subset.
pub fn shift_summaries(subset: &Subset<'_>) -> Vec<ShiftSummary> {
    let distinct = distinct_students_by_shift(subset);
    let means = mean_enrollment_per_term(subset);
    let records = record_count_by_shift(subset);
    let approval = approval_rate_by_shift(subset);

    records
        .into_iter()
        .map(|(shift, records)| ShiftSummary {
            distinct_students: distinct.get(&shift).copied().unwrap_or(0),
            mean_students_per_term: means.get(&shift).copied().unwrap_or(0.0),
            approval_rate: approval.get(&shift).copied().unwrap_or(0.0),
            records,
            shift,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-student metrics
// ---------------------------------------------------------------------------

/// One student's rolled-up outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub name: String,
    /// First non-missing `Turno` in row order.
    pub shift: Option<String>,
    /// First non-missing `Ingresso` in row order.
    pub entry_term: Option<String>,
    #[serde(flatten)]
    pub totals: OutcomeTotals,
    /// `approved / total * 100`, `0.0` when `total` is zero.
    pub approval_pct: f64,
}

/// Group the subset by `Nome`, ordered by name. Rows without a name are
/// skipped.
pub fn student_summaries(subset: &Subset<'_>) -> Vec<StudentSummary> {
    let mut groups: BTreeMap<&str, StudentSummary> = BTreeMap::new();
    for record in subset.iter() {
        let Some(name) = record.name.as_deref() else {
            continue;
        };
        let summary = groups.entry(name).or_insert_with(|| StudentSummary {
            name: name.to_string(),
            shift: None,
            entry_term: None,
            totals: OutcomeTotals::default(),
            approval_pct: 0.0,
        });
        if summary.shift.is_none() {
            summary.shift.clone_from(&record.shift);
        }
        if summary.entry_term.is_none() {
            summary.entry_term.clone_from(&record.entry_term);
        }
        summary.totals.add_record(record);
    }

    groups
        .into_values()
        .map(|mut summary| {
            summary.approval_pct = percentage(summary.totals.approved, summary.totals.total);
            summary
        })
        .collect()
}

/// The `n` best students: highest `% Aprov` first, then most enrollments.
/// Remaining ties keep name order.
pub fn top_students(subset: &Subset<'_>, n: usize) -> Vec<StudentSummary> {
    let mut students = student_summaries(subset);
    students.sort_by(|a, b| {
        b.approval_pct
            .total_cmp(&a.approval_pct)
            .then_with(|| b.totals.total.cmp(&a.totals.total))
    });
    students.truncate(n);
    students
}
