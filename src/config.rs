use clap::{Parser, Subcommand};

use crate::data::dashboard::DEFAULT_TOP_N;
use crate::data::filter::{Selection, StudentFilter};
use crate::data::source::{DEFAULT_SOURCE_URL, SourceLocation};
use crate::report::ReportFormat;

#[derive(Parser, Debug)]
#[command(name = "campus-panel")]
#[command(about = "Academic enrollment dashboard", long_about = None)]
pub struct Cli {
    /// Dataset location: a local path or an http(s) URL
    #[arg(long, env = "CAMPUS_PANEL_SOURCE", default_value = DEFAULT_SOURCE_URL, global = true)]
    pub source: String,

    /// Number of students in the ranked table
    #[arg(long, env = "CAMPUS_PANEL_TOP", default_value_t = DEFAULT_TOP_N, global = true)]
    pub top: usize,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the dashboard window (default)
    Dashboard,
    /// Print the dashboard for one selection
    Report {
        /// Student name, or "Todos" for everyone
        #[arg(long, default_value = StudentFilter::ALL_LABEL)]
        student: String,
        /// Allowed period (repeatable); none means every period
        #[arg(long = "term")]
        terms: Vec<String>,
        /// Allowed shift (repeatable); none means every shift
        #[arg(long = "shift")]
        shifts: Vec<String>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
    },
}

impl Cli {
    pub fn source_location(&self) -> SourceLocation {
        SourceLocation::parse(&self.source)
    }
}

/// Build a selection from `report` arguments.
pub fn selection_from_args(student: &str, terms: Vec<String>, shifts: Vec<String>) -> Selection {
    Selection {
        student: StudentFilter::from_label(student),
        periods: terms.into_iter().collect(),
        shifts: shifts.into_iter().collect(),
    }
}
