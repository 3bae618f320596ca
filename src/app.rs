use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::error::DashboardError;
use crate::state::AppState;
use crate::ui::{cards, charts, panels, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CampusPanelApp {
    pub state: AppState,
}

impl CampusPanelApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CampusPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| match &self.state.dashboard {
            Err(DashboardError::Unavailable(e)) => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading(
                        RichText::new(format!("Erro ao carregar dados: {e}")).color(Color32::RED),
                    );
                });
            }
            Err(DashboardError::EmptySelection) => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading(
                        RichText::new(DashboardError::EmptySelection.to_string())
                            .color(Color32::from_rgb(0xb8, 0x86, 0x0b)),
                    );
                });
            }
            Ok(dashboard) => {
                let student = self.state.selection.student.clone();
                let colors = &self.state.shift_colors;
                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui: &mut Ui| {
                        let name = (!student.is_all()).then(|| student.label());
                        cards::metric_cards(ui, dashboard, name);
                        ui.separator();

                        ui.heading("Melhores Alunos");
                        tables::top_students_table(ui, &dashboard.top_students);
                        ui.separator();

                        ui.heading("Gráficos");
                        charts::enrollment_chart(ui, dashboard, colors);
                        ui.columns(2, |columns: &mut [Ui]| {
                            charts::new_entrants_chart(&mut columns[0], dashboard);
                            charts::shift_distribution_chart(&mut columns[1], dashboard, colors);
                        });
                        charts::status_chart(ui, dashboard);
                        ui.separator();

                        ui.heading("Relação Geral de Alunos");
                        tables::student_listing_table(ui, &dashboard.students);
                    });
            }
        });
    }
}
