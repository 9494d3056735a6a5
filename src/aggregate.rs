use std::collections::HashMap;

use crate::models::{
    DistancePoint, EfficiencySpread, HeartRatePoint, LengthRecord, RestBin, Session,
    SessionKpis, StrokeStyle, StrokeSummary,
};

/// Mean of the values, `None` when there are none.
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_active(record: &LengthRecord) -> bool {
    !record.is_rest() && record.raw.distance_m > 0.0
}

/// Session KPIs. Heart rate, efficiency and rest only count rows where the
/// metric is above zero.
pub fn summarize(records: &[LengthRecord]) -> SessionKpis {
    let total_distance_m: f64 = records.iter().map(|r| r.raw.distance_m).sum();
    let mean_heart_rate = mean(
        records
            .iter()
            .filter(|r| r.raw.avg_heart_rate > 0)
            .map(|r| f64::from(r.raw.avg_heart_rate)),
    );
    let max_heart_rate = records
        .iter()
        .map(|r| r.raw.max_heart_rate)
        .filter(|bpm| *bpm > 0)
        .max();
    let mean_efficiency = mean(
        records
            .iter()
            .filter(|r| r.raw.efficiency_score > 0)
            .map(|r| f64::from(r.raw.efficiency_score)),
    );
    let rests = rest_intervals(records);

    SessionKpis {
        total_distance_m,
        mean_heart_rate,
        max_heart_rate,
        mean_efficiency,
        total_rest_seconds: rests.iter().sum(),
        rest_count: rests.len(),
    }
}

/// Rest seconds shifted back one row, so the rest that follows length `i` is
/// attributed to length `i`. The last row gets `0.0`.
pub fn attribute_rest(records: &[LengthRecord]) -> Vec<f64> {
    records
        .iter()
        .skip(1)
        .map(|r| r.rest_seconds)
        .chain(std::iter::once(0.0))
        .take(records.len())
        .collect()
}

#[derive(Default)]
struct StrokeAccumulator {
    lengths: usize,
    distance: f64,
    paces: Vec<f64>,
    efficiencies: Vec<f64>,
    stroke_counts: Vec<f64>,
    rest_after: Vec<f64>,
}

fn accumulate_strokes(
    groups: &mut HashMap<StrokeStyle, StrokeAccumulator>,
    records: &[LengthRecord],
) {
    let rest_after = attribute_rest(records);
    for (record, rest) in records.iter().zip(rest_after) {
        if record.is_rest() {
            continue;
        }
        let entry = groups.entry(record.raw.stroke_style.clone()).or_default();
        entry.lengths += 1;
        entry.distance += record.raw.distance_m;
        entry.paces.extend(record.pace_seconds);
        if record.raw.efficiency_score > 0 {
            entry.efficiencies.push(f64::from(record.raw.efficiency_score));
        }
        entry.stroke_counts.push(f64::from(record.raw.stroke_count));
        entry.rest_after.push(rest);
    }
}

/// Per-stroke means and distance totals. `REST` rows never form a group.
pub fn group_by_stroke(records: &[LengthRecord]) -> Vec<StrokeSummary> {
    let mut groups = HashMap::new();
    accumulate_strokes(&mut groups, records);
    summarize_strokes(groups)
}

/// Per-stroke table over several sessions. Rest is attributed within each
/// session, so a session's first row never lands on another session's last
/// length.
pub fn group_sessions_by_stroke(sessions: &[Session]) -> Vec<StrokeSummary> {
    let mut groups = HashMap::new();
    for session in sessions {
        accumulate_strokes(&mut groups, &session.records);
    }
    summarize_strokes(groups)
}

fn summarize_strokes(groups: HashMap<StrokeStyle, StrokeAccumulator>) -> Vec<StrokeSummary> {
    let mut summaries: Vec<StrokeSummary> = groups
        .into_iter()
        .map(|(stroke, acc)| StrokeSummary {
            stroke,
            lengths: acc.lengths,
            total_distance_m: round2(acc.distance),
            mean_pace_seconds: mean(acc.paces).map(round2),
            mean_efficiency: mean(acc.efficiencies).map(round2),
            mean_stroke_count: mean(acc.stroke_counts).map(round2),
            mean_rest_after_seconds: mean(acc.rest_after).map(round2).unwrap_or(0.0),
        })
        .collect();

    summaries.sort_by(|a, b| a.stroke.cmp(&b.stroke));
    summaries
}

/// Pace against cumulative distance per stroke, for the evolution curve.
///
/// Only active lengths are used. With records from several sessions this
/// averages the pace seen at the same cumulative distance across them.
pub fn group_by_stroke_and_distance(records: &[LengthRecord]) -> Vec<DistancePoint> {
    // Keyed at decimetre resolution so 33.33 m pools keep distinct points.
    let mut groups: HashMap<(StrokeStyle, i64), (Vec<f64>, f64, usize)> = HashMap::new();

    for record in records.iter().filter(|r| is_active(r)) {
        let key = (
            record.raw.stroke_style.clone(),
            (record.raw.cumulative_distance_m * 10.0).round() as i64,
        );
        let entry = groups.entry(key).or_insert_with(|| (Vec::new(), 0.0, 0));
        entry.0.extend(record.pace_seconds);
        entry.1 += record.raw.distance_m;
        entry.2 += 1;
    }

    let mut points: Vec<DistancePoint> = groups
        .into_iter()
        .map(|((stroke, decimetres), (paces, distance, samples))| DistancePoint {
            stroke,
            cumulative_distance_m: decimetres as f64 / 10.0,
            mean_pace_seconds: mean(paces).map(round2),
            mean_distance_m: round2(distance / samples as f64),
            samples,
        })
        .collect();

    points.sort_by(|a, b| {
        a.stroke.cmp(&b.stroke).then(
            a.cumulative_distance_m
                .partial_cmp(&b.cumulative_distance_m)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    points
}

/// Heart rate along the session for rows where it was measured.
pub fn heart_rate_series(records: &[LengthRecord]) -> Vec<HeartRatePoint> {
    records
        .iter()
        .filter(|r| r.raw.avg_heart_rate > 0)
        .map(|r| HeartRatePoint {
            cumulative_distance_m: r.raw.cumulative_distance_m,
            avg_heart_rate: r.raw.avg_heart_rate,
            max_heart_rate: r.raw.max_heart_rate,
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// SWOLF spread per stroke over scored lengths.
pub fn efficiency_spread(records: &[LengthRecord]) -> Vec<EfficiencySpread> {
    let mut groups: HashMap<StrokeStyle, Vec<f64>> = HashMap::new();
    for record in records
        .iter()
        .filter(|r| !r.is_rest() && r.raw.efficiency_score > 0)
    {
        groups
            .entry(record.raw.stroke_style.clone())
            .or_default()
            .push(f64::from(record.raw.efficiency_score));
    }

    let mut spreads: Vec<EfficiencySpread> = groups
        .into_iter()
        .map(|(stroke, mut scores)| {
            scores.sort_by(|a, b| a.total_cmp(b));
            EfficiencySpread {
                stroke,
                samples: scores.len(),
                min: scores[0],
                lower_quartile: quantile(&scores, 0.25),
                median: quantile(&scores, 0.5),
                upper_quartile: quantile(&scores, 0.75),
                max: scores[scores.len() - 1],
            }
        })
        .collect();

    spreads.sort_by(|a, b| a.stroke.cmp(&b.stroke));
    spreads
}

/// Every non-zero rest duration, in row order.
pub fn rest_intervals(records: &[LengthRecord]) -> Vec<f64> {
    records
        .iter()
        .map(|r| r.rest_seconds)
        .filter(|seconds| *seconds > 0.0)
        .collect()
}

/// Equal-width histogram of non-zero rest durations.
pub fn rest_histogram(records: &[LengthRecord], bins: usize) -> Vec<RestBin> {
    let rests = rest_intervals(records);
    if rests.is_empty() || bins == 0 {
        return Vec::new();
    }

    let low = rests.iter().copied().fold(f64::INFINITY, f64::min);
    let high = rests.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if high <= low {
        return vec![RestBin {
            lower_seconds: low,
            upper_seconds: high,
            count: rests.len(),
        }];
    }

    let width = (high - low) / bins as f64;
    let mut histogram: Vec<RestBin> = (0..bins)
        .map(|i| RestBin {
            lower_seconds: low + width * i as f64,
            upper_seconds: if i + 1 == bins {
                high
            } else {
                low + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for seconds in rests {
        let slot = (((seconds - low) / width) as usize).min(bins - 1);
        histogram[slot].count += 1;
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;

    fn record(stroke: &str, distance: f64, cumulative: f64) -> LengthRecord {
        LengthRecord {
            raw: RawRecord {
                length_index: 0,
                distance_m: distance,
                cumulative_distance_m: cumulative,
                length_m: 25.0,
                stroke_style: StrokeStyle::from_code(stroke),
                pace_raw: None,
                rest_time_raw: None,
                avg_heart_rate: 0,
                max_heart_rate: 0,
                efficiency_score: 0,
                stroke_count: 0,
            },
            pace_seconds: None,
            rest_seconds: 0.0,
        }
    }

    fn swim(stroke: &str, cumulative: f64, pace: f64, swolf: u32, strokes: u32) -> LengthRecord {
        let mut r = record(stroke, 50.0, cumulative);
        r.pace_seconds = Some(pace);
        r.raw.efficiency_score = swolf;
        r.raw.stroke_count = strokes;
        r
    }

    fn rest(cumulative: f64, seconds: f64) -> LengthRecord {
        let mut r = record("REST", 0.0, cumulative);
        r.rest_seconds = seconds;
        r
    }

    #[test]
    fn rest_rows_never_form_a_stroke_group() {
        let records = vec![
            record("FR", 50.0, 50.0),
            record("REST", 0.0, 50.0),
            record("FR", 50.0, 100.0),
        ];
        let groups = group_by_stroke(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].stroke, StrokeStyle::Freestyle);
        assert_eq!(groups[0].total_distance_m, 100.0);
        assert!(groups.iter().all(|g| !g.stroke.is_rest()));
    }

    #[test]
    fn stroke_means_are_rounded_to_two_decimals() {
        let records = vec![
            swim("BR", 50.0, 60.0, 40, 10),
            swim("BR", 100.0, 61.0, 41, 11),
            swim("BR", 150.0, 61.0, 0, 11),
        ];
        let groups = group_by_stroke(&records);
        let br = &groups[0];
        assert_eq!(br.lengths, 3);
        assert_eq!(br.mean_pace_seconds, Some(60.67));
        assert_eq!(br.mean_efficiency, Some(40.5));
        assert_eq!(br.mean_stroke_count, Some(10.67));
    }

    #[test]
    fn rest_is_attributed_to_the_preceding_length() {
        let records = vec![
            swim("FR", 50.0, 50.0, 35, 20),
            rest(50.0, 30.0),
            swim("FR", 100.0, 52.0, 36, 21),
            rest(100.0, 10.0),
        ];
        assert_eq!(attribute_rest(&records), vec![30.0, 0.0, 10.0, 0.0]);
        let groups = group_by_stroke(&records);
        assert_eq!(groups[0].mean_rest_after_seconds, 20.0);
    }

    #[test]
    fn rest_does_not_cross_session_boundaries() {
        let first = Session {
            source: "FORM_2024-11-01_073000.csv".into(),
            started_at: None,
            records: vec![swim("FR", 50.0, 50.0, 35, 20)],
        };
        let second = Session {
            source: "FORM_2024-11-07_122351.csv".into(),
            started_at: None,
            records: vec![rest(0.0, 40.0), swim("FR", 50.0, 52.0, 36, 21), rest(50.0, 10.0)],
        };

        let groups = group_sessions_by_stroke(&[first, second]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].lengths, 2);
        assert_eq!(groups[0].mean_rest_after_seconds, 5.0);
    }

    #[test]
    fn attribute_rest_on_empty_input() {
        assert!(attribute_rest(&[]).is_empty());
    }

    #[test]
    fn summary_without_heart_rate_is_undefined() {
        let records = vec![record("FR", 50.0, 50.0), record("FR", 50.0, 100.0)];
        let kpis = summarize(&records);
        assert_eq!(kpis.total_distance_m, 100.0);
        assert_eq!(kpis.mean_heart_rate, None);
        assert_eq!(kpis.max_heart_rate, None);
        assert_eq!(kpis.mean_efficiency, None);
        assert_eq!(kpis.total_rest_seconds, 0.0);
        assert_eq!(kpis.rest_count, 0);
    }

    #[test]
    fn summary_ignores_zero_readings() {
        let mut a = swim("FR", 50.0, 50.0, 36, 20);
        a.raw.avg_heart_rate = 120;
        a.raw.max_heart_rate = 131;
        let mut b = swim("FR", 100.0, 52.0, 0, 20);
        b.raw.avg_heart_rate = 0;
        b.raw.max_heart_rate = 0;
        let mut c = swim("FR", 150.0, 51.0, 40, 20);
        c.raw.avg_heart_rate = 130;
        c.raw.max_heart_rate = 140;
        let records = vec![a, rest(50.0, 25.0), b, rest(100.0, 0.0), c];

        let kpis = summarize(&records);
        assert_eq!(kpis.total_distance_m, 150.0);
        assert_eq!(kpis.mean_heart_rate, Some(125.0));
        assert_eq!(kpis.max_heart_rate, Some(140));
        assert_eq!(kpis.mean_efficiency, Some(38.0));
        assert_eq!(kpis.total_rest_seconds, 25.0);
        assert_eq!(kpis.rest_count, 1);
    }

    #[test]
    fn evolution_averages_pace_at_each_distance() {
        let records = vec![
            swim("FR", 50.0, 50.0, 0, 0),
            rest(50.0, 20.0),
            swim("FR", 100.0, 54.0, 0, 0),
            swim("FR", 50.0, 48.0, 0, 0),
            swim("BK", 50.0, 60.0, 0, 0),
        ];
        let points = group_by_stroke_and_distance(&records);
        assert_eq!(points.len(), 3);
        let fr_50 = &points[0];
        assert_eq!(fr_50.stroke, StrokeStyle::Freestyle);
        assert_eq!(fr_50.cumulative_distance_m, 50.0);
        assert_eq!(fr_50.mean_pace_seconds, Some(49.0));
        assert_eq!(fr_50.samples, 2);
        assert_eq!(points[1].cumulative_distance_m, 100.0);
        assert_eq!(points[2].stroke, StrokeStyle::Backstroke);
        assert!(points.iter().all(|p| !p.stroke.is_rest()));
    }

    #[test]
    fn heart_rate_series_skips_unmeasured_rows() {
        let mut a = record("FR", 50.0, 50.0);
        a.raw.avg_heart_rate = 118;
        a.raw.max_heart_rate = 125;
        let b = record("FR", 50.0, 100.0);
        let series = heart_rate_series(&[a, b]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].avg_heart_rate, 118);
    }

    #[test]
    fn efficiency_spread_uses_linear_quartiles() {
        let records: Vec<LengthRecord> = [30, 40, 50, 60, 0]
            .iter()
            .enumerate()
            .map(|(i, swolf)| swim("FR", 50.0 * (i + 1) as f64, 50.0, *swolf, 18))
            .collect();
        let spread = efficiency_spread(&records);
        assert_eq!(spread.len(), 1);
        let fr = &spread[0];
        assert_eq!(fr.samples, 4);
        assert_eq!(fr.min, 30.0);
        assert_eq!(fr.lower_quartile, 37.5);
        assert_eq!(fr.median, 45.0);
        assert_eq!(fr.upper_quartile, 52.5);
        assert_eq!(fr.max, 60.0);
    }

    #[test]
    fn rest_histogram_covers_every_rest() {
        let records = vec![rest(0.0, 10.0), rest(0.0, 20.0), rest(0.0, 30.0), rest(0.0, 0.0)];
        let bins = rest_histogram(&records, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 2);
        assert_eq!(bins[1].upper_seconds, 30.0);
        assert!(rest_histogram(&[], 10).is_empty());
    }

    #[test]
    fn rest_histogram_with_one_value_has_one_bin() {
        let records = vec![rest(0.0, 15.0), rest(0.0, 15.0)];
        let bins = rest_histogram(&records, 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }
}
