use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{StyleHint, severity};
use crate::data::metrics::StudentSummary;
use crate::data::series::StatusKind;

const ROW_HEIGHT: f32 = 20.0;

/// Paint the hint's background over the whole cell, then the text.
fn styled_cell(ui: &mut Ui, text: String, hint: StyleHint) {
    if let Some(fill) = hint.background() {
        ui.painter().rect_filled(ui.max_rect(), 0.0, fill);
        ui.label(egui::RichText::new(text).color(egui::Color32::BLACK));
    } else {
        ui.label(text);
    }
}

fn count_cell(ui: &mut Ui, status: StatusKind, value: u64) {
    styled_cell(ui, value.to_string(), severity(status, value));
}

/// "Melhores Alunos": the ranked top-N table.
pub fn top_students_table(ui: &mut Ui, students: &[StudentSummary]) {
    let headers = ["Nome", "Turno", "Matr", "Aprov", "Reprov", "% Aprov"];

    TableBuilder::new(ui)
        .id_salt("top_students")
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::remainder().at_least(180.0))
        .column(Column::auto().at_least(80.0))
        .columns(Column::auto().at_least(60.0), 4)
        .header(ROW_HEIGHT, |mut header| {
            for title in headers {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for s in students {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.label(&s.name);
                    });
                    row.col(|ui| {
                        ui.label(s.shift.as_deref().unwrap_or("-"));
                    });
                    row.col(|ui| {
                        ui.label(s.totals.total.to_string());
                    });
                    row.col(|ui| count_cell(ui, StatusKind::Approved, s.totals.approved));
                    row.col(|ui| count_cell(ui, StatusKind::Failed, s.totals.failed));
                    row.col(|ui| {
                        ui.label(format!("{:.1}%", s.approval_pct));
                    });
                });
            }
        });
}

/// Plain text cells of one listing row, in header order.
fn listing_cells(s: &StudentSummary) -> [String; 8] {
    [
        s.name.clone(),
        s.entry_term.clone().unwrap_or_else(|| "-".to_string()),
        s.shift.clone().unwrap_or_else(|| "-".to_string()),
        s.totals.total.to_string(),
        s.totals.approved.to_string(),
        s.totals.failed.to_string(),
        s.totals.withdrawn.to_string(),
        format!("{:.1}%", s.approval_pct),
    ]
}

/// "Relação Geral de Alunos": every student, by name. Unstyled.
pub fn student_listing_table(ui: &mut Ui, students: &[StudentSummary]) {
    let headers = ["Nome", "Ingresso", "Turno", "Matr", "Aprov", "Reprov", "Tranc", "% Aprov"];

    TableBuilder::new(ui)
        .id_salt("student_listing")
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::remainder().at_least(180.0))
        .columns(Column::auto().at_least(70.0), 2)
        .columns(Column::auto().at_least(55.0), 5)
        .header(ROW_HEIGHT, |mut header| {
            for title in headers {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, students.len(), |mut row| {
                for cell in listing_cells(&students[row.index()]) {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OutcomeTotals;

    #[test]
    fn listing_cells_follow_headers() {
        let summary = StudentSummary {
            name: "Ana".into(),
            shift: Some("Diurno".into()),
            entry_term: None,
            totals: OutcomeTotals {
                total: 8,
                approved: 7,
                failed: 1,
                withdrawn: 0,
            },
            approval_pct: 87.5,
        };
        assert_eq!(
            listing_cells(&summary),
            ["Ana", "-", "Diurno", "8", "7", "1", "0", "87.5%"].map(String::from)
        );
    }
}
