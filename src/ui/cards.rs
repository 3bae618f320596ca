use eframe::egui::{self, Color32, RichText, Stroke, Ui};

use crate::data::dashboard::Dashboard;
use crate::data::metrics::ShiftSummary;

const CARD_FILL: Color32 = Color32::from_rgb(0xf0, 0xf0, 0xf0);
const CARD_BORDER: Color32 = Color32::from_rgb(0x11, 0x23, 0x33);

/// One titled value box.
fn card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style())
        .fill(CARD_FILL)
        .stroke(Stroke::new(1.0, CARD_BORDER))
        .show(ui, |ui: &mut Ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(title).size(14.0).color(Color32::from_gray(0x33)));
                ui.label(RichText::new(value).size(22.0).strong().color(Color32::BLACK));
            });
        });
}

/// A heading followed by one card per shift.
fn card_row(
    ui: &mut Ui,
    heading: &str,
    shifts: &[ShiftSummary],
    value: impl Fn(&ShiftSummary) -> (String, String),
) {
    ui.heading(heading);
    ui.columns(shifts.len().max(1), |columns: &mut [Ui]| {
        for (column, shift) in columns.iter_mut().zip(shifts) {
            let (title, text) = value(shift);
            card(column, &title, &text);
        }
    });
    ui.add_space(8.0);
}

/// Per-shift metric cards. A single student only gets their record counts.
pub fn metric_cards(ui: &mut Ui, dashboard: &Dashboard, student: Option<&str>) {
    let shifts = &dashboard.shifts;

    if let Some(name) = student {
        card_row(ui, &format!("Resumo: {name}"), shifts, |s| {
            (format!("Matrículas ({})", s.shift), s.records.to_string())
        });
        return;
    }

    card_row(ui, "Total de Alunos", shifts, |s| {
        (s.shift.clone(), s.distinct_students.to_string())
    });
    card_row(ui, "Média de Matrículas por Período", shifts, |s| {
        (s.shift.clone(), format!("{:.1}", s.mean_students_per_term))
    });
    card_row(ui, "Total Geral de Matrículas (Soma de todos períodos)", shifts, |s| {
        (s.shift.clone(), s.records.to_string())
    });
    card_row(ui, "Nível de Aprovação (% Total)", shifts, |s| {
        (s.shift.clone(), format!("{:.1}%", s.approval_rate))
    });
}
