use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};

use super::error::DataError;
use super::loader;
use super::model::EnrollmentTable;

/// Published location of the enrollment dataset.
pub const DEFAULT_SOURCE_URL: &str =
    "https://drive.google.com/uc?export=download&id=1_urzrUF2XmxmoAkcGmNvY0OG-Y5csMmk";

// ---------------------------------------------------------------------------
// DataSource – where the raw bytes come from
// ---------------------------------------------------------------------------

/// Anything that can produce the raw bytes of the dataset.
pub trait DataSource: Send + Sync {
    /// Human-readable location, used in messages.
    fn label(&self) -> String;

    fn fetch(&self) -> Result<Vec<u8>>;
}

/// A local file path or an `http(s)://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(String),
}

impl SourceLocation {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            SourceLocation::Remote(trimmed.to_string())
        } else {
            SourceLocation::Local(PathBuf::from(trimmed))
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::Remote(DEFAULT_SOURCE_URL.to_string())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Remote(url) => write!(f, "{url}"),
        }
    }
}

impl DataSource for SourceLocation {
    fn label(&self) -> String {
        self.to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            SourceLocation::Local(path) => {
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))
            }
            SourceLocation::Remote(url) => {
                log::info!("Downloading enrollment dataset from {url}");
                let response = ureq::get(url)
                    .call()
                    .with_context(|| format!("downloading {url}"))?;
                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut bytes)
                    .context("reading response body")?;
                Ok(bytes)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – load once, share read-only
// ---------------------------------------------------------------------------

/// Holds the dataset for the lifetime of the process.
///
/// The first [`DatasetCache::get`] fetches and parses; every later call
/// returns the same table. A failed load is remembered and returned again,
/// never retried.
pub struct DatasetCache {
    source: Box<dyn DataSource>,
    cell: OnceLock<Result<Arc<EnrollmentTable>, DataError>>,
}

impl DatasetCache {
    pub fn new(source: impl DataSource + 'static) -> Self {
        DatasetCache {
            source: Box::new(source),
            cell: OnceLock::new(),
        }
    }

    pub fn source_label(&self) -> String {
        self.source.label()
    }

    pub fn get(&self) -> Result<Arc<EnrollmentTable>, DataError> {
        self.cell.get_or_init(|| self.load()).clone()
    }

    fn load(&self) -> Result<Arc<EnrollmentTable>, DataError> {
        let label = self.source.label();
        let table = self
            .source
            .fetch()
            .and_then(|bytes| loader::parse_bytes(&bytes))
            .map_err(|e| {
                log::error!("Failed to load dataset from {label}: {e:#}");
                DataError::unavailable(label.clone(), &e)
            })?;
        log::info!("Loaded {} enrollment rows from {label}", table.len());
        Ok(Arc::new(table))
    }
}

impl fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetCache")
            .field("source", &self.source.label())
            .field("loaded", &self.cell.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingSource {
        body: &'static [u8],
        calls: Arc<AtomicUsize>,
    }

    impl DataSource for CountingSource {
        fn label(&self) -> String {
            "memory".to_string()
        }

        fn fetch(&self) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.body.is_empty() {
                anyhow::bail!("connection refused");
            }
            Ok(self.body.to_vec())
        }
    }

    // cp1252: 0xED is 'í'.
    const BODY: &[u8] = b"Nome;Matr\xedcula;Turno;Per\xedodo;Ingresso;Ingressante;Total;AP;RP;TR\n\
                          Ana;1;Diurno;2023-01;2023.1;1;4;3;1;0\n";

    #[test]
    fn location_parsing() {
        assert_eq!(
            SourceLocation::parse("https://example.org/data.csv"),
            SourceLocation::Remote("https://example.org/data.csv".into())
        );
        assert_eq!(
            SourceLocation::parse("dados.csv"),
            SourceLocation::Local(PathBuf::from("dados.csv"))
        );
    }

    #[test]
    fn loads_once_and_reuses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingSource {
            body: BODY,
            calls: calls.clone(),
        });

        let first = cache.get().unwrap();
        let second = cache.get().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn failure_is_terminal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingSource {
            body: b"",
            calls: calls.clone(),
        });

        let err = cache.get().unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
        assert_eq!(cache.get().unwrap_err(), err);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn utf8_source_without_bom_is_unavailable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = DatasetCache::new(CountingSource {
            body: "Nome;Matrícula;Turno;Período;Ingresso;Ingressante;Total;AP;RP;TR\n".as_bytes(),
            calls,
        });
        let DataError::Unavailable { reason, .. } = cache.get().unwrap_err();
        assert!(reason.contains("Matrícula"));
    }

    #[test]
    fn missing_local_file_is_unavailable() {
        let cache = DatasetCache::new(SourceLocation::Local(PathBuf::from(
            "/nonexistent/enrollment.csv",
        )));
        let DataError::Unavailable { source_label, reason } = cache.get().unwrap_err();
        assert_eq!(source_label, "/nonexistent/enrollment.csv");
        assert!(reason.contains("reading"));
    }
}
