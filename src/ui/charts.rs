use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::ColorMap;
use crate::data::aggregate::{GroupedCounts, Histogram, StoreMetric, Summary};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 300.0;
/// Share of a category slot covered by its cluster of bars.
const CLUSTER_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Metrics row followed by the four charts, or a warning when nothing matches.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(summary), Some(color_map)) = (&state.summary, &state.color_map) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view complaints  (File → Open…)");
        });
        return;
    };

    ui.heading("Complaints monitoring");
    ui.separator();

    ui.strong("Summary of applied filters");
    metrics_row(ui, &summary.metrics);
    ui.add_space(8.0);

    charts(ui, summary, color_map, state.config.histogram_opacity);
}

fn charts(ui: &mut Ui, summary: &Summary, color_map: &ColorMap, opacity: f32) {
    let Some(charts) = &summary.charts else {
        ui.label(
            RichText::new("No complaints found with the selected filters.")
                .color(Color32::from_rgb(230, 160, 0)),
        );
        return;
    };

    ui.strong("1. Complaints over time");
    time_series_chart(ui, &charts.time_series, color_map);

    ui.strong("2. Complaints by state");
    grouped_bar_chart(ui, "by_state", &charts.regional, color_map);

    ui.strong("3. Complaints by status");
    grouped_bar_chart(ui, "by_status", &charts.status, color_map);

    ui.strong("4. Description length distribution");
    histogram_chart(ui, &charts.histogram, color_map, opacity);
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// One column per metric.
fn metrics_row(ui: &mut Ui, metrics: &[StoreMetric]) {
    if metrics.is_empty() {
        return;
    }
    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (col, metric) in cols.iter_mut().zip(metrics) {
            col.label(&metric.label);
            col.label(RichText::new(metric.count.to_string()).size(26.0).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn month_to_x(month: NaiveDate) -> f64 {
    month.num_days_from_ce() as f64
}

fn x_to_month_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// One line per store over months.
fn time_series_chart(ui: &mut Ui, counts: &GroupedCounts<NaiveDate>, color_map: &ColorMap) {
    Plot::new("time_series")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Complaints")
        .x_axis_formatter(|mark, _range| x_to_month_label(mark.value))
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (store, series) in counts.series_by_store() {
                let points: PlotPoints = series
                    .iter()
                    .map(|&(month, n)| [month_to_x(month), n as f64])
                    .collect();
                let line = Line::new(points)
                    .name(&store)
                    .color(color_map.color_for(&store))
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}

/// Clustered bars: one cluster per category, one bar per store inside it.
fn grouped_bar_chart(ui: &mut Ui, id: &str, counts: &GroupedCounts<String>, color_map: &ColorMap) {
    let categories = counts.categories();
    let series = counts.series_by_store();
    let bar_width = CLUSTER_WIDTH / series.len().max(1) as f64;

    let labels = categories.clone();
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("Complaints")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (si, store) in series.keys().enumerate() {
                let offset = -CLUSTER_WIDTH / 2.0 + bar_width * (si as f64 + 0.5);
                let bars: Vec<Bar> = categories
                    .iter()
                    .enumerate()
                    .map(|(ci, category)| {
                        Bar::new(ci as f64 + offset, counts.count(category, store) as f64)
                            .width(bar_width)
                            .name(category)
                    })
                    .collect();
                let chart = BarChart::new(bars)
                    .name(store)
                    .color(color_map.color_for(store));
                plot_ui.bar_chart(chart);
            }
        });
}

/// Overlaid per-store histograms, translucent so overlaps stay visible.
fn histogram_chart(ui: &mut Ui, histogram: &Histogram, color_map: &ColorMap, opacity: f32) {
    Plot::new("length_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(format!("Description length ({} bins)", histogram.bins()))
        .y_axis_label("Complaints")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (store, bins) in &histogram.counts {
                let bars: Vec<Bar> = bins
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| **n > 0)
                    .map(|(i, &n)| {
                        let (lo, hi) = histogram.edges(i);
                        Bar::new(histogram.center(i), n as f64)
                            .width(histogram.bin_width)
                            .name(format!("{lo:.0}–{hi:.0}"))
                    })
                    .collect();
                let chart = BarChart::new(bars)
                    .name(store)
                    .color(color_map.color_for(store).gamma_multiply(opacity));
                plot_ui.bar_chart(chart);
            }
        });
}
