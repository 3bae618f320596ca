use std::fmt::Write;

use crate::data::dashboard::Dashboard;
use crate::data::error::DashboardError;
use crate::data::filter::Selection;
use crate::data::series::StatusKind;

/// Output flavour of the `report` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

/// Render a computed dashboard (or its empty state) in the chosen format.
pub fn render(
    format: ReportFormat,
    selection: &Selection,
    result: &Result<Dashboard, DashboardError>,
) -> anyhow::Result<String> {
    match format {
        ReportFormat::Markdown => Ok(build_markdown(selection, result)),
        ReportFormat::Json => build_json(result),
    }
}

fn build_json(result: &Result<Dashboard, DashboardError>) -> anyhow::Result<String> {
    let value = match result {
        Ok(dashboard) => serde_json::to_value(dashboard)?,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn selection_label(selection: &Selection) -> String {
    if selection.is_unrestricted() {
        return "nenhum".to_string();
    }
    fn set_label(set: &std::collections::BTreeSet<String>) -> String {
        if set.is_empty() {
            "todos".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }
    format!(
        "aluno: {} | períodos: {} | turnos: {}",
        selection.student.label(),
        set_label(&selection.periods),
        set_label(&selection.shifts)
    )
}

pub fn build_markdown(selection: &Selection, result: &Result<Dashboard, DashboardError>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Dashboard Acadêmico");
    let _ = writeln!(output, "Filtros: {}", selection_label(selection));
    let _ = writeln!(output);

    let dashboard = match result {
        Ok(dashboard) => dashboard,
        Err(e) => {
            let _ = writeln!(output, "> {e}");
            return output;
        }
    };

    if selection.student.is_all() {
        write_shift_cards(&mut output, dashboard);
    } else {
        let _ = writeln!(output, "## Resumo: {}", selection.student.label());
        for shift in &dashboard.shifts {
            let _ = writeln!(output, "- Matrículas ({}): {}", shift.shift, shift.records);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Melhores Alunos");
    if dashboard.top_students.is_empty() {
        let _ = writeln!(output, "Nenhum aluno no filtro atual.");
    } else {
        let _ = writeln!(output, "| Nome | Turno | Matr | Aprov | Reprov | % Aprov |");
        let _ = writeln!(output, "|---|---|---:|---:|---:|---:|");
        for s in &dashboard.top_students {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {:.1}% |",
                s.name,
                s.shift.as_deref().unwrap_or("-"),
                s.totals.total,
                s.totals.approved,
                s.totals.failed,
                s.approval_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Matrículas por Turno e Período");
    for point in &dashboard.enrollment {
        let _ = writeln!(output, "- {} {}: {}", point.term, point.shift, point.students);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Evolução de Ingressantes");
    if dashboard.new_entrants.is_empty() {
        let _ = writeln!(output, "Sem dados de ingressantes para o filtro atual.");
    } else {
        for point in &dashboard.new_entrants {
            let _ = writeln!(output, "- {}: {}", point.term, point.students);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Status Acadêmico");
    for point in &dashboard.status {
        let _ = writeln!(output, "- {} {}: {}", point.term, point.status.code(), point.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Relação Geral de Alunos");
    let _ = writeln!(output, "| Nome | Ingresso | Turno | Matr | Aprov | Reprov | Tranc | % Aprov |");
    let _ = writeln!(output, "|---|---|---|---:|---:|---:|---:|---:|");
    for s in &dashboard.students {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} | {:.1}% |",
            s.name,
            s.entry_term.as_deref().unwrap_or("-"),
            s.shift.as_deref().unwrap_or("-"),
            s.totals.total,
            StatusKind::Approved.count_in(&s.totals),
            StatusKind::Failed.count_in(&s.totals),
            StatusKind::Withdrawn.count_in(&s.totals),
            s.approval_pct
        );
    }

    output
}

fn write_shift_cards(output: &mut String, dashboard: &Dashboard) {
    let _ = writeln!(output, "## Total de Alunos");
    for s in &dashboard.shifts {
        let _ = writeln!(output, "- {}: {}", s.shift, s.distinct_students);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Média de Matrículas por Período");
    for s in &dashboard.shifts {
        let _ = writeln!(output, "- {}: {:.1}", s.shift, s.mean_students_per_term);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Total Geral de Matrículas");
    for s in &dashboard.shifts {
        let _ = writeln!(output, "- {}: {}", s.shift, s.records);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Nível de Aprovação");
    for s in &dashboard.shifts {
        let _ = writeln!(output, "- {}: {:.1}%", s.shift, s.approval_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::StudentFilter;
    use crate::data::model::{EnrollmentRecord, Subset};

    fn records() -> Vec<EnrollmentRecord> {
        ["A", "B"]
            .iter()
            .zip([3, 4])
            .map(|(name, ap)| EnrollmentRecord {
                name: Some(name.to_string()),
                registration: Some(format!("mat-{name}")),
                shift: Some("Diurno".into()),
                period: Some("2023-01".into()),
                term: crate::data::loader::parse_period("2023-01"),
                total: Some(4),
                approved: Some(ap),
                failed: Some(4 - ap),
                withdrawn: Some(0),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn markdown_contains_cards_and_ranking() {
        let rows = records();
        let subset: Subset<'_> = rows.iter().collect();
        let result = Dashboard::compute(&subset, 10);
        let text = build_markdown(&Selection::default(), &result);

        assert!(text.contains("- Diurno: 87.5%"));
        assert!(text.contains("- Diurno: 2.0"));
        let b = text.find("| B | Diurno").unwrap();
        let a = text.find("| A | Diurno").unwrap();
        assert!(b < a);
        assert!(text.contains("Sem dados de ingressantes"));
    }

    #[test]
    fn single_student_layout() {
        let rows = records();
        let selection = Selection {
            student: StudentFilter::Named("A".into()),
            ..Default::default()
        };
        let subset = crate::data::filter::apply(&rows, &selection);
        let text = build_markdown(&selection, &Dashboard::compute(&subset, 10));
        assert!(text.contains("## Resumo: A"));
        assert!(text.contains("- Matrículas (Diurno): 1"));
        assert!(!text.contains("## Total de Alunos"));
    }

    #[test]
    fn empty_state_is_reported() {
        let text = build_markdown(&Selection::default(), &Err(DashboardError::EmptySelection));
        assert!(text.contains("Nenhum dado encontrado para os filtros selecionados."));
        assert!(!text.contains("Melhores Alunos"));

        let json = render(
            ReportFormat::Json,
            &Selection::default(),
            &Err(DashboardError::EmptySelection),
        )
        .unwrap();
        assert!(json.contains("\"error\""));
    }
}
