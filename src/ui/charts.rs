use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::{ShiftColors, status_color};
use crate::data::dashboard::Dashboard;
use crate::data::metrics;
use crate::data::model::YearMonth;
use crate::data::series::{self, StatusKind};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Categorical term axis
// ---------------------------------------------------------------------------

/// Terms become bar slots `0, 1, 2, …` so missing months leave no gaps.
struct TermAxis {
    labels: Vec<YearMonth>,
    slots: BTreeMap<YearMonth, usize>,
}

impl TermAxis {
    fn new<'a>(terms: impl IntoIterator<Item = &'a YearMonth>) -> Self {
        let labels = series::term_labels(terms);
        let slots = labels.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        TermAxis { labels, slots }
    }

    fn slot(&self, term: &YearMonth) -> f64 {
        self.slots.get(term).copied().unwrap_or(0) as f64
    }

    /// Tick formatter: a label on whole slots, nothing in between.
    fn formatter(&self) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
        let labels: Vec<String> = self.labels.iter().map(YearMonth::label).collect();
        move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let value = mark.value;
            if value < 0.0 || value.fract().abs() > f64::EPSILON {
                return String::new();
            }
            labels.get(value as usize).cloned().unwrap_or_default()
        }
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// "Matrículas por Turno e Período": grouped bars, one colour per shift.
pub fn enrollment_chart(ui: &mut Ui, dashboard: &Dashboard, colors: &ShiftColors) {
    ui.strong("Matrículas por Turno e Período");
    let axis = TermAxis::new(dashboard.enrollment.iter().map(|p| &p.term));

    let shifts: Vec<&str> = dashboard.shift_names().collect();
    let group_width = 0.8;
    let bar_width = group_width / shifts.len().max(1) as f64;

    let charts: Vec<BarChart> = shifts
        .iter()
        .enumerate()
        .map(|(i, shift)| {
            let offset = -group_width / 2.0 + bar_width * (i as f64 + 0.5);
            let bars = dashboard
                .enrollment
                .iter()
                .filter(|p| p.shift == *shift)
                .map(|p| {
                    Bar::new(axis.slot(&p.term) + offset, p.students as f64)
                        .width(bar_width)
                        .name(format!("{} {}", p.term, p.shift))
                })
                .collect();
            BarChart::new(bars).name(*shift).color(colors.color_for(shift))
        })
        .collect();

    Plot::new("enrollment_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Qtd Alunos")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_y(0.0)
        .x_axis_formatter(axis.formatter())
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// "Evolução de Ingressantes": filled line over terms.
pub fn new_entrants_chart(ui: &mut Ui, dashboard: &Dashboard) {
    ui.strong("Evolução de Ingressantes");
    if dashboard.new_entrants.is_empty() {
        ui.label("Sem dados de ingressantes para o filtro atual.");
        return;
    }

    let axis = TermAxis::new(dashboard.new_entrants.iter().map(|p| &p.term));
    let points: PlotPoints = dashboard
        .new_entrants
        .iter()
        .map(|p| [axis.slot(&p.term), p.students as f64])
        .collect();

    Plot::new("new_entrants_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Qtd Alunos")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_y(0.0)
        .x_axis_formatter(axis.formatter())
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Ingressantes")
                    .color(Color32::from_rgb(0x1f, 0x77, 0xb4))
                    .fill(0.0)
                    .width(2.0),
            );
        });
}

/// "Distribuição por Turno": distinct students per shift.
pub fn shift_distribution_chart(ui: &mut Ui, dashboard: &Dashboard, colors: &ShiftColors) {
    ui.strong("Distribuição por Turno");
    let total: usize = dashboard.shifts.iter().map(|s| s.distinct_students).sum();

    let charts: Vec<BarChart> = dashboard
        .shifts
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let share = metrics::percentage(s.distinct_students as u64, total as u64);
            let bar = Bar::new(i as f64, s.distinct_students as f64)
                .width(0.6)
                .name(format!("{} ({share:.1}%)", s.shift));
            BarChart::new(vec![bar])
                .name(&s.shift)
                .color(colors.color_for(&s.shift))
                .horizontal()
        })
        .collect();

    let names: Vec<String> = dashboard.shifts.iter().map(|s| s.shift.clone()).collect();
    Plot::new("shift_distribution_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_x(0.0)
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value < 0.0 || mark.value.fract().abs() > f64::EPSILON {
                return String::new();
            }
            names.get(mark.value as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// "Status Acadêmico": AP / RP / TR stacked per term.
pub fn status_chart(ui: &mut Ui, dashboard: &Dashboard) {
    ui.strong("Status Acadêmico Absoluto (Aprov/Reprov/Tranc)");
    let axis = TermAxis::new(dashboard.status.iter().map(|p| &p.term));

    let mut charts: Vec<BarChart> = Vec::with_capacity(StatusKind::ALL.len());
    for status in StatusKind::ALL {
        let bars = dashboard
            .status
            .iter()
            .filter(|p| p.status == status)
            .map(|p| {
                Bar::new(axis.slot(&p.term), p.count as f64)
                    .width(0.6)
                    .name(format!("{} {}", p.term, status.label()))
            })
            .collect();
        let refs: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(status.code())
            .color(status_color(status))
            .stack_on(&refs);
        charts.push(chart);
    }

    Plot::new("status_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Quantidade")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_y(0.0)
        .x_axis_formatter(axis.formatter())
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
