use crate::models::{KpiDelta, SessionKpis};

fn difference(latest: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(latest? - previous?)
}

/// `latest - previous` for each KPI, unrounded.
///
/// Without a previous session every field is `None`.
pub fn delta(latest: &SessionKpis, previous: Option<&SessionKpis>) -> KpiDelta {
    let Some(previous) = previous else {
        return KpiDelta {
            total_distance_m: None,
            mean_heart_rate: None,
            max_heart_rate: None,
            mean_efficiency: None,
            total_rest_seconds: None,
            rest_count: None,
        };
    };

    KpiDelta {
        total_distance_m: Some(latest.total_distance_m - previous.total_distance_m),
        mean_heart_rate: difference(latest.mean_heart_rate, previous.mean_heart_rate),
        max_heart_rate: difference(
            latest.max_heart_rate.map(f64::from),
            previous.max_heart_rate.map(f64::from),
        ),
        mean_efficiency: difference(latest.mean_efficiency, previous.mean_efficiency),
        total_rest_seconds: Some(latest.total_rest_seconds - previous.total_rest_seconds),
        rest_count: Some(latest.rest_count as i64 - previous.rest_count as i64),
    }
}
