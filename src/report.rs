use std::fmt::Write;

use crate::analysis::{Analysis, SessionOverview};
use crate::models::{DistancePoint, KpiDelta, SessionKpis, StrokeSummary};

fn or_na(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn signed(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:+.precision$}"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn write_kpis(output: &mut String, kpis: &SessionKpis) {
    let _ = writeln!(output, "- Total distance: {:.0} m", kpis.total_distance_m);
    let _ = writeln!(
        output,
        "- Mean heart rate: {} bpm",
        or_na(kpis.mean_heart_rate, 0)
    );
    let _ = writeln!(
        output,
        "- Max heart rate: {} bpm",
        or_na(kpis.max_heart_rate.map(f64::from), 0)
    );
    let _ = writeln!(output, "- Mean SWOLF: {}", or_na(kpis.mean_efficiency, 1));
    let _ = writeln!(
        output,
        "- Rest: {:.1} s over {} breaks",
        kpis.total_rest_seconds, kpis.rest_count
    );
}

pub fn write_delta(output: &mut String, delta: &KpiDelta) {
    let _ = writeln!(output, "- Distance: {} m", signed(delta.total_distance_m, 0));
    let _ = writeln!(
        output,
        "- Mean heart rate: {} bpm",
        signed(delta.mean_heart_rate, 0)
    );
    let _ = writeln!(
        output,
        "- Max heart rate: {} bpm",
        signed(delta.max_heart_rate, 0)
    );
    let _ = writeln!(output, "- Mean SWOLF: {}", signed(delta.mean_efficiency, 1));
    let _ = writeln!(
        output,
        "- Rest time: {} s",
        signed(delta.total_rest_seconds, 1)
    );
    let _ = writeln!(
        output,
        "- Breaks: {}",
        signed(delta.rest_count.map(|c| c as f64), 0)
    );
}

pub fn write_strokes(output: &mut String, strokes: &[StrokeSummary]) {
    if strokes.is_empty() {
        let _ = writeln!(output, "No lengths recorded.");
        return;
    }

    let _ = writeln!(
        output,
        "| Stroke | Lengths | Distance (m) | Pace (s) | SWOLF | Strokes | Rest after (s) |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|");
    for summary in strokes {
        let _ = writeln!(
            output,
            "| {} | {} | {:.0} | {} | {} | {} | {:.2} |",
            summary.stroke,
            summary.lengths,
            summary.total_distance_m,
            or_na(summary.mean_pace_seconds, 2),
            or_na(summary.mean_efficiency, 2),
            or_na(summary.mean_stroke_count, 2),
            summary.mean_rest_after_seconds
        );
    }
}

pub fn write_evolution(output: &mut String, points: &[DistancePoint]) {
    if points.is_empty() {
        let _ = writeln!(output, "No lengths recorded.");
        return;
    }

    for point in points {
        let _ = writeln!(
            output,
            "- {} @ {:.0} m: {} s ({} samples)",
            point.stroke,
            point.cumulative_distance_m,
            or_na(point.mean_pace_seconds, 2),
            point.samples
        );
    }
}

fn write_session(output: &mut String, heading: &str, overview: &SessionOverview) {
    let started = overview
        .started_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown start".to_string());
    let _ = writeln!(output, "## {heading}: {} ({started})", overview.name);
    write_kpis(output, &overview.kpis);
    let _ = writeln!(output);
    write_strokes(output, &overview.strokes);
}

pub fn build_report(analysis: &Analysis) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Swim Session Report");
    let _ = writeln!(
        output,
        "Generated from {} ({} records across all exports)",
        analysis.data_dir.display(),
        analysis.combined_records
    );
    let _ = writeln!(output);

    match analysis.latest() {
        Some(latest) => write_session(&mut output, "Latest session", latest),
        None => {
            let _ = writeln!(output, "## Latest session");
            let _ = writeln!(output, "No dated session exports found.");
        }
    }

    let _ = writeln!(output);
    match analysis.previous() {
        Some(previous) => write_session(&mut output, "Previous session", previous),
        None => {
            let _ = writeln!(output, "## Previous session");
            let _ = writeln!(output, "No earlier session to compare against.");
        }
    }

    if let Some(delta) = &analysis.delta {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Change since previous session");
        write_delta(&mut output, delta);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## All sessions by stroke");
    write_strokes(&mut output, &analysis.combined_strokes);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pace by cumulative distance");
    write_evolution(&mut output, &analysis.evolution);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrokeStyle;

    #[test]
    fn undefined_values_render_as_na() {
        let mut output = String::new();
        write_kpis(
            &mut output,
            &SessionKpis {
                total_distance_m: 500.0,
                mean_heart_rate: None,
                max_heart_rate: None,
                mean_efficiency: Some(37.26),
                total_rest_seconds: 90.0,
                rest_count: 3,
            },
        );
        assert!(output.contains("Total distance: 500 m"));
        assert!(output.contains("Mean heart rate: n/a bpm"));
        assert!(output.contains("Mean SWOLF: 37.3"));
        assert!(output.contains("90.0 s over 3 breaks"));
    }

    #[test]
    fn delta_values_carry_a_sign() {
        let mut output = String::new();
        write_delta(
            &mut output,
            &KpiDelta {
                total_distance_m: Some(100.0),
                mean_heart_rate: Some(-4.0),
                max_heart_rate: None,
                mean_efficiency: Some(0.5),
                total_rest_seconds: Some(-12.5),
                rest_count: Some(1),
            },
        );
        assert!(output.contains("Distance: +100 m"));
        assert!(output.contains("Mean heart rate: -4 bpm"));
        assert!(output.contains("Max heart rate: n/a bpm"));
        assert!(output.contains("Rest time: -12.5 s"));
    }

    #[test]
    fn stroke_table_lists_each_stroke() {
        let mut output = String::new();
        write_strokes(
            &mut output,
            &[StrokeSummary {
                stroke: StrokeStyle::Freestyle,
                lengths: 4,
                total_distance_m: 200.0,
                mean_pace_seconds: Some(49.5),
                mean_efficiency: Some(36.0),
                mean_stroke_count: None,
                mean_rest_after_seconds: 7.5,
            }],
        );
        assert!(output.contains("| FR | 4 | 200 | 49.50 | 36.00 | n/a | 7.50 |"));
    }
}
