use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum StrokeStyle {
    Freestyle,
    Breaststroke,
    Backstroke,
    Butterfly,
    Medley,
    Rest,
    Other(String),
}

impl StrokeStyle {
    /// Maps an export stroke code (`FR`, `BR`, `BK`, `FL`, `IM`, `REST`).
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "FR" | "FREE" | "FREESTYLE" => StrokeStyle::Freestyle,
            "BR" | "BREAST" | "BREASTSTROKE" => StrokeStyle::Breaststroke,
            "BK" | "BA" | "BACK" | "BACKSTROKE" => StrokeStyle::Backstroke,
            "FL" | "FLY" | "BF" | "BUTTERFLY" => StrokeStyle::Butterfly,
            "IM" | "MIXED" | "MEDLEY" => StrokeStyle::Medley,
            "REST" => StrokeStyle::Rest,
            _ => StrokeStyle::Other(code.trim().to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            StrokeStyle::Freestyle => "FR",
            StrokeStyle::Breaststroke => "BR",
            StrokeStyle::Backstroke => "BK",
            StrokeStyle::Butterfly => "FL",
            StrokeStyle::Medley => "IM",
            StrokeStyle::Rest => "REST",
            StrokeStyle::Other(code) => code,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, StrokeStyle::Rest)
    }
}

impl fmt::Display for StrokeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<StrokeStyle> for String {
    fn from(stroke: StrokeStyle) -> Self {
        stroke.code().to_string()
    }
}

/// One row of a session export, typed but not yet augmented.
#[derive(Debug, Clone, Serialize)]
pub struct RawRecord {
    pub length_index: usize,
    pub distance_m: f64,
    pub cumulative_distance_m: f64,
    pub length_m: f64,
    pub stroke_style: StrokeStyle,
    pub pace_raw: Option<String>,
    pub rest_time_raw: Option<String>,
    pub avg_heart_rate: u32,
    pub max_heart_rate: u32,
    pub efficiency_score: u32,
    pub stroke_count: u32,
}

/// A raw row plus the derived duration columns.
#[derive(Debug, Clone, Serialize)]
pub struct LengthRecord {
    #[serde(flatten)]
    pub raw: RawRecord,
    pub pace_seconds: Option<f64>,
    pub rest_seconds: f64,
}

impl LengthRecord {
    pub fn is_rest(&self) -> bool {
        self.raw.stroke_style.is_rest()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub source: PathBuf,
    pub started_at: Option<NaiveDateTime>,
    pub records: Vec<LengthRecord>,
}

impl Session {
    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Session-level scalars. `None` means no row qualified for the metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionKpis {
    pub total_distance_m: f64,
    pub mean_heart_rate: Option<f64>,
    pub max_heart_rate: Option<u32>,
    pub mean_efficiency: Option<f64>,
    pub total_rest_seconds: f64,
    pub rest_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeSummary {
    pub stroke: StrokeStyle,
    pub lengths: usize,
    pub total_distance_m: f64,
    pub mean_pace_seconds: Option<f64>,
    pub mean_efficiency: Option<f64>,
    pub mean_stroke_count: Option<f64>,
    pub mean_rest_after_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistancePoint {
    pub stroke: StrokeStyle,
    pub cumulative_distance_m: f64,
    pub mean_pace_seconds: Option<f64>,
    pub mean_distance_m: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRatePoint {
    pub cumulative_distance_m: f64,
    pub avg_heart_rate: u32,
    pub max_heart_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencySpread {
    pub stroke: StrokeStyle,
    pub samples: usize,
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestBin {
    pub lower_seconds: f64,
    pub upper_seconds: f64,
    pub count: usize,
}

/// `latest - previous` per KPI. `None` when either side is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiDelta {
    pub total_distance_m: Option<f64>,
    pub mean_heart_rate: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub mean_efficiency: Option<f64>,
    pub total_rest_seconds: Option<f64>,
    pub rest_count: Option<i64>,
}
