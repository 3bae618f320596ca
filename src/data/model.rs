use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// YearMonth – month-granularity academic term
// ---------------------------------------------------------------------------

/// A normalized academic term. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build a term, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Fixed `YYYY-MM` label used as a categorical chart axis.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// EnrollmentRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One student's enrollment in one term and shift.
///
/// Text columns are `None` when the cell was empty. Count columns are `None`
/// when the cell was empty or not a non-negative integer; they count as zero
/// in every sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentRecord {
    /// `Nome`
    pub name: Option<String>,
    /// `Matrícula`
    pub registration: Option<String>,
    /// `Turno`
    pub shift: Option<String>,
    /// `Período` exactly as it appears in the source (filter key).
    pub period: Option<String>,
    /// `Período` normalized to a month, `None` when unparseable.
    pub term: Option<YearMonth>,
    /// `Ingresso`
    pub entry_term: Option<String>,
    /// `Ingressante`
    pub new_entrant: bool,
    /// `Total`
    pub total: Option<u32>,
    /// `AP`
    pub approved: Option<u32>,
    /// `RP`
    pub failed: Option<u32>,
    /// `TR`
    pub withdrawn: Option<u32>,
}

// ---------------------------------------------------------------------------
// OutcomeTotals – summed outcome counts
// ---------------------------------------------------------------------------

/// Sums of `Total` / `AP` / `RP` / `TR` over a group of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTotals {
    pub total: u64,
    pub approved: u64,
    pub failed: u64,
    pub withdrawn: u64,
}

impl OutcomeTotals {
    pub fn add_record(&mut self, record: &EnrollmentRecord) {
        fn count(v: Option<u32>) -> u64 {
            u64::from(v.unwrap_or(0))
        }
        self.total += count(record.total);
        self.approved += count(record.approved);
        self.failed += count(record.failed);
        self.withdrawn += count(record.withdrawn);
    }
}

impl<'a> FromIterator<&'a EnrollmentRecord> for OutcomeTotals {
    fn from_iter<I: IntoIterator<Item = &'a EnrollmentRecord>>(iter: I) -> Self {
        let mut totals = OutcomeTotals::default();
        for record in iter {
            totals.add_record(record);
        }
        totals
    }
}

// ---------------------------------------------------------------------------
// EnrollmentTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable loaded dataset with pre-computed filter choices.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentTable {
    pub records: Vec<EnrollmentRecord>,
    /// Distinct non-missing `Nome` values, sorted.
    pub students: BTreeSet<String>,
    /// Distinct non-missing raw `Período` labels, sorted.
    pub periods: BTreeSet<String>,
    /// Distinct non-missing `Turno` values, sorted.
    pub shifts: BTreeSet<String>,
}

impl EnrollmentTable {
    /// Build the filter choice indices from the loaded records.
    pub fn from_records(records: Vec<EnrollmentRecord>) -> Self {
        let mut students = BTreeSet::new();
        let mut periods = BTreeSet::new();
        let mut shifts = BTreeSet::new();

        for record in &records {
            if let Some(name) = &record.name {
                students.insert(name.clone());
            }
            if let Some(period) = &record.period {
                periods.insert(period.clone());
            }
            if let Some(shift) = &record.shift {
                shifts.insert(shift.clone());
            }
        }

        EnrollmentTable {
            records,
            students,
            periods,
            shifts,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Subset – the working rows after filtering
// ---------------------------------------------------------------------------

/// A borrowed view over the rows that passed a filter.
#[derive(Debug, Clone, Default)]
pub struct Subset<'a> {
    rows: Vec<&'a EnrollmentRecord>,
}

impl<'a> Subset<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a EnrollmentRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct shifts present in the subset, sorted.
    pub fn shifts(&self) -> BTreeSet<&'a str> {
        self.iter().filter_map(|r| r.shift.as_deref()).collect()
    }
}

impl<'a> FromIterator<&'a EnrollmentRecord> for Subset<'a> {
    fn from_iter<I: IntoIterator<Item = &'a EnrollmentRecord>>(iter: I) -> Self {
        Subset {
            rows: iter.into_iter().collect(),
        }
    }
}
