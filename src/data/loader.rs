use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::model::{EnrollmentRecord, EnrollmentTable, YearMonth};

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Nome",
    "Matrícula",
    "Turno",
    "Período",
    "Ingresso",
    "Ingressante",
    "Total",
    "AP",
    "RP",
    "TR",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an enrollment table from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – `;`-separated, cp1252 encoded (UTF-8 with BOM also accepted)
pub fn load_file(path: &Path) -> Result<EnrollmentTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_bytes(&bytes)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Decode raw source bytes and parse them into a table.
pub fn parse_bytes(bytes: &[u8]) -> Result<EnrollmentTable> {
    let text = decode_legacy(bytes);
    parse_text(&text)
}

/// Decode bytes as Windows-1252 so accented names survive. A UTF-8 BOM
/// switches decoding to UTF-8.
pub fn decode_legacy(bytes: &[u8]) -> Cow<'_, str> {
    let (text, encoding, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    if encoding != encoding_rs::WINDOWS_1252 {
        log::debug!("BOM detected, decoding source as {}", encoding.name());
    }
    text
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    #[serde(rename = "Nome")]
    name: Option<String>,
    #[serde(rename = "Matrícula")]
    registration: Option<String>,
    #[serde(rename = "Turno")]
    shift: Option<String>,
    #[serde(rename = "Período")]
    period: Option<String>,
    #[serde(rename = "Ingresso")]
    entry_term: Option<String>,
    #[serde(rename = "Ingressante")]
    new_entrant: Option<String>,
    #[serde(rename = "Total")]
    total: Option<String>,
    #[serde(rename = "AP")]
    approved: Option<String>,
    #[serde(rename = "RP")]
    failed: Option<String>,
    #[serde(rename = "TR")]
    withdrawn: Option<String>,
}

/// Tally of cells coerced to a missing value while parsing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Coercions {
    periods: usize,
    counts: usize,
}

/// Parse decoded `;`-separated text. Malformed periods and counts become
/// missing values, as do trailing cells absent from a short row. A missing
/// header column fails.
pub fn parse_text(text: &str) -> Result<EnrollmentTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    let mut coercions = Coercions::default();
    let mut records = Vec::new();

    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        records.push(normalize_row(raw, &mut coercions));
    }

    if coercions.periods > 0 || coercions.counts > 0 {
        log::warn!(
            "Coerced {} unparseable periods and {} malformed counts to missing values",
            coercions.periods,
            coercions.counts
        );
    }
    log::info!("Parsed {} enrollment rows", records.len());

    Ok(EnrollmentTable::from_records(records))
}

fn normalize_row(raw: RawRow, coercions: &mut Coercions) -> EnrollmentRecord {
    let period = non_empty(raw.period);
    let term = period.as_deref().and_then(parse_period);
    if period.is_some() && term.is_none() {
        coercions.periods += 1;
    }

    let mut count = |cell: Option<String>| {
        let cell = non_empty(cell)?;
        let parsed = parse_count(&cell);
        if parsed.is_none() {
            coercions.counts += 1;
        }
        parsed
    };

    EnrollmentRecord {
        name: non_empty(raw.name),
        registration: non_empty(raw.registration),
        shift: non_empty(raw.shift),
        term,
        period,
        entry_term: non_empty(raw.entry_term),
        new_entrant: raw.new_entrant.as_deref().is_some_and(parse_flag),
        total: count(raw.total),
        approved: count(raw.approved),
        failed: count(raw.failed),
        withdrawn: count(raw.withdrawn),
    }
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Normalize a `Período` cell to its month. Returns `None` for anything that
/// is not a recognizable date.
pub fn parse_period(raw: &str) -> Option<YearMonth> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.into());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.date().into());
        }
    }

    // Month-only forms: pin the day so chrono can build a date.
    let month_only = [
        (format!("{s}-01"), "%Y-%m-%d"),
        (format!("{s}/01"), "%Y/%m/%d"),
        (format!("01/{s}"), "%d/%m/%Y"),
    ];
    month_only
        .iter()
        .find_map(|(candidate, fmt)| NaiveDate::parse_from_str(candidate, fmt).ok())
        .map(YearMonth::from)
}

/// Parse a non-negative whole count. Accepts `4`, `4.0` and `4,0`.
pub fn parse_count(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let f = s.replace(',', ".").parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

/// Interpret an `Ingressante` cell. Anything unrecognized is `false`.
pub fn parse_flag(raw: &str) -> bool {
    let s = raw.trim().to_lowercase();
    matches!(s.as_str(), "1" | "1.0" | "true" | "sim" | "s" | "yes" | "y" | "x")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Nome;Matrícula;Turno;Período;Ingresso;Ingressante;Total;AP;RP;TR";

    fn encode_cp1252(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn parses_cp1252_semicolon_file() {
        let text = format!(
            "{HEADER}\nJoão Araújo;2023001;Diurno;2023-01;2023.1;1;4;3;1;0\n\
             Márcia Lopes;2023002;Noturno;2023-02-15;2022.2;0;5;5;0;0\n"
        );
        let table = parse_bytes(&encode_cp1252(&text)).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.records[0];
        assert_eq!(first.name.as_deref(), Some("João Araújo"));
        assert_eq!(first.registration.as_deref(), Some("2023001"));
        assert_eq!(first.term, YearMonth::new(2023, 1));
        assert!(first.new_entrant);
        assert_eq!(first.total, Some(4));
        assert_eq!(table.records[1].term, YearMonth::new(2023, 2));
        assert!(!table.records[1].new_entrant);
        assert!(table.students.contains("Márcia Lopes"));
    }

    #[test]
    fn utf8_with_bom_is_accepted() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(format!("{HEADER}\nÍcaro;1;Diurno;2023-01;x;0;1;1;0;0\n").as_bytes());
        let table = parse_bytes(&bytes).unwrap();
        assert_eq!(table.records[0].name.as_deref(), Some("Ícaro"));
    }

    #[test]
    fn malformed_cells_become_missing() {
        let text = format!("{HEADER}\nAna;1;Diurno;semestre;x;0;abc;;-1;2\n");
        let table = parse_text(&text).unwrap();
        let row = &table.records[0];

        assert_eq!(row.period.as_deref(), Some("semestre"));
        assert_eq!(row.term, None);
        assert_eq!(row.total, None);
        assert_eq!(row.approved, None);
        assert_eq!(row.failed, None);
        assert_eq!(row.withdrawn, Some(2));
    }

    #[test]
    fn utf8_without_bom_fails_header_check() {
        let text = format!("{HEADER}\nAna;1;Diurno;2023-01;x;0;1;1;0;0\n");
        let err = parse_bytes(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Matrícula"));
    }

    #[test]
    fn short_row_becomes_missing_cells() {
        let text = format!(
            "{HEADER}\nAna;1;Diurno;2023-01;2023.1;1;4;3;1;0\n\
             Bia;2;Noturno;2023-01;2023.1;1;4;4;0\n\
             Caio;3;Noturno\n"
        );
        let table = parse_text(&text).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].withdrawn, Some(0));
        let bia = &table.records[1];
        assert_eq!(bia.failed, Some(0));
        assert_eq!(bia.withdrawn, None);
        let caio = &table.records[2];
        assert_eq!(caio.shift.as_deref(), Some("Noturno"));
        assert_eq!(caio.period, None);
        assert!(!caio.new_entrant);
        assert_eq!(caio.total, None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let text = "Nome;Turno\nAna;Diurno\n";
        let err = parse_text(text).unwrap_err();
        assert!(err.to_string().contains("Matrícula"));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let text = format!("Curso;{HEADER}\nFísica;Ana;1;Diurno;2023-01;x;0;1;1;0;0\n");
        let table = parse_text(&text).unwrap();
        assert_eq!(table.records[0].name.as_deref(), Some("Ana"));
    }

    #[test]
    fn period_formats() {
        let jan = YearMonth::new(2023, 1);
        assert_eq!(parse_period("2023-01"), jan);
        assert_eq!(parse_period(" 2023/01 "), jan);
        assert_eq!(parse_period("2023-01-31"), jan);
        assert_eq!(parse_period("2023/01/05"), jan);
        assert_eq!(parse_period("15/01/2023"), jan);
        assert_eq!(parse_period("01/2023"), jan);
        assert_eq!(parse_period("2023-01-02 10:30:00"), jan);
        assert_eq!(parse_period("2023.1"), None);
        assert_eq!(parse_period("2023-13"), None);
        assert_eq!(parse_period(""), None);
    }

    #[test]
    fn count_formats() {
        assert_eq!(parse_count("4"), Some(4));
        assert_eq!(parse_count("4.0"), Some(4));
        assert_eq!(parse_count("4,0"), Some(4));
        assert_eq!(parse_count("4.5"), None);
        assert_eq!(parse_count("-2"), None);
        assert_eq!(parse_count("NaN"), None);
    }

    #[test]
    fn flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("Sim"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("não"));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("data.parquet")).unwrap_err();
        assert!(err.to_string().contains(".parquet"));
    }
}
