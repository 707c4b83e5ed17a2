use std::f32::consts::{FRAC_PI_2, TAU};

use driver_signature::comparison::{BarSeries, RadarAxis};
use egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Plot};

use super::{DRIVER_A_COLOR, DRIVER_B_COLOR};

const RADAR_RINGS: usize = 4;
const BAR_WIDTH: f64 = 0.35;

/// Grouped bars of the raw metric values, one group per metric
pub(crate) fn show_bar_chart(ui: &mut Ui, bars: &[BarSeries]) {
    let charts: Vec<BarChart> = bars
        .iter()
        .zip([DRIVER_A_COLOR, DRIVER_B_COLOR])
        .enumerate()
        .map(|(series_index, (series, color))| {
            let offset = (series_index as f64 - 0.5) * BAR_WIDTH;
            let driver_bars = series
                .values
                .iter()
                .enumerate()
                .map(|(metric_index, (metric, value))| {
                    Bar::new(metric_index as f64 + offset, *value)
                        .width(BAR_WIDTH)
                        .name(format!("{} {}", series.driver, metric.display_name()))
                })
                .collect();
            BarChart::new(series.driver.as_str(), driver_bars).color(color)
        })
        .collect();

    Plot::new("style_bars")
        .legend(Legend::default())
        .height(260.)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });

    if let Some(series) = bars.first() {
        ui.horizontal(|ui| {
            for (index, (metric, _)) in series.values.iter().enumerate() {
                ui.small(format!("{}: {}", index, metric.display_name()));
            }
        });
    }
}

/// Radar of the normalized metrics. Every spoke runs from 0 at the center to 1 at the rim.
pub(crate) fn show_radar(ui: &mut Ui, axes: &[RadarAxis], driver_a: &str, driver_b: &str) {
    if axes.len() < 3 {
        return;
    }
    let side = ui.available_width().min(360.);
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(side), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 5.0, Color32::from_gray(25));

    let center = rect.center();
    let radius = side * 0.32;
    let spoke = |index: usize, value: f64| -> Pos2 {
        let angle = index as f32 / axes.len() as f32 * TAU - FRAC_PI_2;
        center + Vec2::angled(angle) * radius * value.clamp(0., 1.) as f32
    };

    for ring in 1..=RADAR_RINGS {
        painter.circle_stroke(
            center,
            radius * ring as f32 / RADAR_RINGS as f32,
            Stroke::new(1.0, Color32::from_gray(70)),
        );
    }
    for (index, axis) in axes.iter().enumerate() {
        let tip = spoke(index, 1.);
        painter.line_segment([center, tip], Stroke::new(1.0, Color32::from_gray(90)));
        let label_pos = center + (tip - center) * 1.12;
        let anchor = match label_pos.x - center.x {
            dx if dx > 1. => Align2::LEFT_CENTER,
            dx if dx < -1. => Align2::RIGHT_CENTER,
            _ if label_pos.y < center.y => Align2::CENTER_BOTTOM,
            _ => Align2::CENTER_TOP,
        };
        painter.text(
            label_pos,
            anchor,
            axis.metric.display_name(),
            FontId::proportional(12.),
            Color32::WHITE,
        );
    }

    for (values, color) in [
        (axes.iter().map(|axis| axis.a).collect::<Vec<_>>(), DRIVER_A_COLOR),
        (axes.iter().map(|axis| axis.b).collect::<Vec<_>>(), DRIVER_B_COLOR),
    ] {
        let points: Vec<Pos2> = values
            .iter()
            .enumerate()
            .map(|(index, value)| spoke(index, *value))
            .collect();
        // outline only, the shape can be concave
        painter.add(Shape::closed_line(points.clone(), Stroke::new(2.0, color)));
        for point in points {
            painter.circle_filled(point, 3.0, color);
        }
    }

    for (row, (driver, color)) in [(driver_a, DRIVER_A_COLOR), (driver_b, DRIVER_B_COLOR)]
        .into_iter()
        .enumerate()
    {
        let pos = rect.left_top() + Vec2::new(10., 10. + row as f32 * 16.);
        painter.circle_filled(pos + Vec2::new(4., 0.), 4.0, color);
        painter.text(
            pos + Vec2::new(14., 0.),
            Align2::LEFT_CENTER,
            driver,
            FontId::proportional(12.),
            Color32::WHITE,
        );
    }
}
