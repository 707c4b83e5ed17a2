use std::fmt::Write;

use crate::metrics::format_lap_time;

use super::ComparisonResult;

/// Renders a comparison as a plain-text report for the terminal
pub fn render_text(result: &ComparisonResult) -> String {
    let mut out = String::new();
    let (a, b) = (&result.driver_a, &result.driver_b);

    let _ = writeln!(out, "Driver comparison: {} vs {}", a, b);
    let _ = writeln!(out, "{}", result.session);
    let _ = writeln!(
        out,
        "Laps analyzed: {} {}/{}, {} {}/{}",
        a,
        result.fingerprint_a.analyzed_laps,
        result.fingerprint_a.valid_laps,
        b,
        result.fingerprint_b.analyzed_laps,
        result.fingerprint_b.valid_laps
    );
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<24} {:>10} {:>10} {:>10}  {}",
        "Metric", a, b, "Delta", "Unit"
    );
    for row in &result.rows {
        let _ = writeln!(
            out,
            "{:<24} {:>10.2} {:>10.2} {:>+10.2}  {}",
            row.metric.display_name(),
            row.value_a,
            row.value_b,
            row.delta,
            row.metric.unit()
        );
    }
    let _ = writeln!(
        out,
        "Cornering consistency measured {}",
        result.fingerprint_a.cornering_mode.description()
    );
    let _ = writeln!(out);

    let laps = &result.lap_times;
    let _ = writeln!(
        out,
        "Fastest lap: {} {} (lap {}), {} {} (lap {}), delta {:+.3}s",
        a,
        format_lap_time(laps.fastest_a_s),
        laps.fastest_lap_a,
        b,
        format_lap_time(laps.fastest_b_s),
        laps.fastest_lap_b,
        laps.fastest_delta_s
    );
    let _ = writeln!(
        out,
        "Average lap: {} {}, {} {}, delta {:+.3}s",
        a,
        format_lap_time(laps.mean_a_s),
        b,
        format_lap_time(laps.mean_b_s),
        laps.mean_delta_s
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Key insights:");
    for insight in &result.insights {
        let _ = writeln!(out, "- {}", insight.summary);
    }
    out
}
