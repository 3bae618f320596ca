use thiserror::Error;

/// Failure to obtain the dataset. Fatal for the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The source could not be fetched, decoded or parsed.
    #[error("dados indisponíveis em {source_label}: {reason}")]
    Unavailable { source_label: String, reason: String },
}

impl DataError {
    /// Wrap a context-chained failure, keeping the full chain as text.
    pub fn unavailable(source_label: impl Into<String>, err: &anyhow::Error) -> Self {
        DataError::Unavailable {
            source_label: source_label.into(),
            reason: format!("{err:#}"),
        }
    }
}

/// Why a render pass produced no metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error(transparent)]
    Unavailable(#[from] DataError),

    /// The current filters leave no shift to report on.
    #[error("Nenhum dado encontrado para os filtros selecionados.")]
    EmptySelection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn unavailable_keeps_context_chain() {
        let err = std::fs::read("/definitely/not/here.csv")
            .context("reading enrollment file")
            .unwrap_err();
        let data_err = DataError::unavailable("here.csv", &err);
        let text = data_err.to_string();
        assert!(text.starts_with("dados indisponíveis em here.csv: reading enrollment file"));
    }

    #[test]
    fn empty_selection_message() {
        assert_eq!(
            DashboardError::EmptySelection.to_string(),
            "Nenhum dado encontrado para os filtros selecionados."
        );
    }
}
