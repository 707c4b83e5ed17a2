use driver_signature::{ComparisonResult, metrics::format_lap_time};
use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::{DRIVER_A_COLOR, DRIVER_B_COLOR, charts};

pub(crate) fn show_comparison(ui: &mut Ui, result: &ComparisonResult) {
    ui.label(RichText::new(result.session.to_string()).strong());
    ui.label(format!(
        "Laps analyzed: {} {} of {} valid, {} {} of {} valid",
        result.driver_a,
        result.fingerprint_a.analyzed_laps,
        result.fingerprint_a.valid_laps,
        result.driver_b,
        result.fingerprint_b.analyzed_laps,
        result.fingerprint_b.valid_laps,
    ));
    ui.add_space(8.);

    ui.heading("📊 Driving Style Metrics");
    show_metrics_table(ui, result);
    ui.small(format!(
        "Cornering consistency measured {}",
        result.fingerprint_a.cornering_mode.description()
    ));
    ui.add_space(8.);

    ui.columns(2, |columns| {
        columns[0].label(RichText::new("Style Comparison").strong());
        charts::show_radar(
            &mut columns[0],
            &result.radar,
            &result.driver_a,
            &result.driver_b,
        );
        columns[1].label(RichText::new("Metric Values").strong());
        charts::show_bar_chart(&mut columns[1], &result.bars);
    });
    ui.add_space(8.);

    ui.heading("⏱️ Lap Times");
    show_lap_times(ui, result);
    ui.add_space(8.);

    ui.heading("🔍 Key Insights");
    for insight in &result.insights {
        ui.label(format!("• {}", insight.summary));
    }
}

fn show_metrics_table(ui: &mut Ui, result: &ComparisonResult) {
    TableBuilder::new(ui)
        .id_salt("metrics_table")
        .vscroll(false)
        .striped(true)
        .column(Column::auto().at_least(180.))
        .columns(Column::auto().at_least(80.), 3)
        .column(Column::remainder())
        .header(20., |mut header| {
            header.col(|ui| {
                ui.strong("Metric");
            });
            header.col(|ui| {
                ui.label(RichText::new(&result.driver_a).strong().color(DRIVER_A_COLOR));
            });
            header.col(|ui| {
                ui.label(RichText::new(&result.driver_b).strong().color(DRIVER_B_COLOR));
            });
            header.col(|ui| {
                ui.strong("Delta");
            });
            header.col(|ui| {
                ui.strong("Unit");
            });
        })
        .body(|mut body| {
            for row in &result.rows {
                body.row(18., |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(row.metric.display_name());
                    });
                    table_row.col(|ui| {
                        ui.monospace(format!("{:.2}", row.value_a));
                    });
                    table_row.col(|ui| {
                        ui.monospace(format!("{:.2}", row.value_b));
                    });
                    table_row.col(|ui| {
                        ui.monospace(format!("{:+.2}", row.delta));
                    });
                    table_row.col(|ui| {
                        ui.label(row.metric.unit());
                    });
                });
            }
        });
}

fn show_lap_times(ui: &mut Ui, result: &ComparisonResult) {
    let laps = &result.lap_times;
    egui::Grid::new("lap_times_grid")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui| {
            ui.label("");
            ui.label(RichText::new(&result.driver_a).color(DRIVER_A_COLOR));
            ui.label(RichText::new(&result.driver_b).color(DRIVER_B_COLOR));
            ui.label("Delta");
            ui.end_row();

            ui.label("Fastest lap");
            ui.monospace(format!(
                "{} (lap {})",
                format_lap_time(laps.fastest_a_s),
                laps.fastest_lap_a
            ));
            ui.monospace(format!(
                "{} (lap {})",
                format_lap_time(laps.fastest_b_s),
                laps.fastest_lap_b
            ));
            ui.monospace(format!("{:+.3}s", laps.fastest_delta_s));
            ui.end_row();

            ui.label("Average lap");
            ui.monospace(format_lap_time(laps.mean_a_s));
            ui.monospace(format_lap_time(laps.mean_b_s));
            ui.monospace(format!("{:+.3}s", laps.mean_delta_s));
            ui.end_row();
        });
}

pub(crate) fn show_footer(ui: &mut Ui) {
    ui.add_space(16.);
    ui.separator();
    ui.label(
        RichText::new(
            "Unofficial tool, not associated with Formula 1 companies. F1, FORMULA ONE, \
             FORMULA 1 and related marks are trade marks of Formula One Licensing B.V.",
        )
        .small()
        .color(Color32::GRAY),
    );
}
