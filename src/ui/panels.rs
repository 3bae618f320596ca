use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{StudentFilter, student_choices};
use crate::data::source::{DatasetCache, SourceLocation};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Ciências da Natureza/UFPI");
    ui.separator();

    let table = match &state.table {
        Ok(table) => Arc::clone(table),
        Err(_) => {
            ui.label("Nenhum conjunto de dados carregado.");
            return;
        }
    };

    ui.strong("Filtros");
    ui.add_space(4.0);

    // ---- Student picker ----
    ui.label("Selecione um aluno");
    let current = state.selection.student.label().to_string();
    let mut picked: Option<String> = None;
    egui::ComboBox::from_id_salt("student_filter")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in student_choices(&table) {
                if ui.selectable_label(current == choice, &choice).clicked() {
                    picked = Some(choice);
                }
            }
        });
    if let Some(choice) = picked {
        state.set_student(&choice);
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Period checkboxes ----
            let header = selection_header(
                "Períodos",
                state.selection.periods.len(),
                table.periods.len(),
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("periods")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Todos").clicked() {
                        state.select_all_periods();
                    }
                    for period in &table.periods {
                        let mut checked = state.period_selected(period);
                        if ui.checkbox(&mut checked, period.as_str()).changed() {
                            state.toggle_period(period);
                        }
                    }
                });

            // ---- Shift checkboxes ----
            let header =
                selection_header("Turnos", state.selection.shifts.len(), table.shifts.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("shifts")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Todos").clicked() {
                        state.select_all_shifts();
                    }
                    for shift in &table.shifts {
                        let text = RichText::new(shift).color(state.shift_colors.color_for(shift));
                        let mut checked = state.shift_selected(shift);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_shift(shift);
                        }
                    }
                });
        });
}

/// `"Períodos  (3/5)"`; an empty selection counts as every value.
fn selection_header(title: &str, selected: usize, total: usize) -> String {
    let shown = if selected == 0 { total } else { selected };
    format!("{title}  ({shown}/{total})")
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.table.is_ok() {
            ui.label(format!(
                "{} linhas carregadas de {}, {} visíveis",
                state.total_rows(),
                state.source_label,
                state.visible_rows()
            ));
        }

        if !state.selection.student.is_all() {
            ui.separator();
            if ui.button("Todos os alunos").clicked() {
                state.set_student(StudentFilter::ALL_LABEL);
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Open a local dataset. The file gets its own cache; the original source
/// stays as it was loaded.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir dados de matrícula")
        .add_filter("Arquivos separados por ponto e vírgula", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        let cache = DatasetCache::new(SourceLocation::Local(path));
        let label = cache.source_label();
        let result = cache.get();
        if let Ok(table) = &result {
            log::info!(
                "Loaded {} rows with {} students from {label}",
                table.len(),
                table.students.len()
            );
        }
        state.set_table(label, result);
    }
}
