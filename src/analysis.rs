//! One analysis run: load the selected sessions, derive every table, compare
//! the two most recent.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::aggregate;
use crate::config::AnalysisConfig;
use crate::delta;
use crate::models::{
    DistancePoint, EfficiencySpread, HeartRatePoint, KpiDelta, LengthRecord, RestBin, Session,
    SessionKpis, StrokeSummary,
};
use crate::repository::SessionRepository;

pub const REST_HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub name: String,
    pub started_at: Option<NaiveDateTime>,
    pub records: usize,
    pub kpis: SessionKpis,
    pub strokes: Vec<StrokeSummary>,
    pub heart_rate: Vec<HeartRatePoint>,
    pub efficiency: Vec<EfficiencySpread>,
    pub rest_histogram: Vec<RestBin>,
}

impl SessionOverview {
    pub fn from_session(session: &Session) -> Self {
        let records = &session.records;
        Self {
            name: session.name(),
            started_at: session.started_at,
            records: records.len(),
            kpis: aggregate::summarize(records),
            strokes: aggregate::group_by_stroke(records),
            heart_rate: aggregate::heart_rate_series(records),
            efficiency: aggregate::efficiency_spread(records),
            rest_histogram: aggregate::rest_histogram(records, REST_HISTOGRAM_BINS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub data_dir: PathBuf,
    /// Most recent first; `None` where fewer sessions exist than requested.
    pub recent: Vec<Option<SessionOverview>>,
    /// Latest against the one before it, when there is a latest session.
    pub delta: Option<KpiDelta>,
    pub combined_records: usize,
    pub combined_strokes: Vec<StrokeSummary>,
    pub evolution: Vec<DistancePoint>,
}

impl Analysis {
    pub fn latest(&self) -> Option<&SessionOverview> {
        self.recent.first().and_then(Option::as_ref)
    }

    pub fn previous(&self) -> Option<&SessionOverview> {
        self.recent.get(1).and_then(Option::as_ref)
    }
}

pub fn run(config: &AnalysisConfig) -> Analysis {
    let repository = SessionRepository::new(&config.data_dir);

    let recent: Vec<Option<SessionOverview>> = repository
        .latest_n(config.sessions)
        .iter()
        .map(|slot| slot.as_ref().map(SessionOverview::from_session))
        .collect();

    let latest = recent.first().and_then(Option::as_ref);
    let previous = recent.get(1).and_then(Option::as_ref);
    let delta = latest.map(|latest| delta::delta(&latest.kpis, previous.map(|p| &p.kpis)));

    let sessions = repository.load_all();
    let combined: Vec<LengthRecord> = sessions
        .iter()
        .flat_map(|session| session.records.iter().cloned())
        .collect();
    tracing::debug!(
        dir = %config.data_dir.display(),
        sessions = sessions.len(),
        records = combined.len(),
        "combined all session exports"
    );

    Analysis {
        data_dir: config.data_dir.clone(),
        recent,
        delta,
        combined_records: combined.len(),
        combined_strokes: aggregate::group_sessions_by_stroke(&sessions),
        evolution: aggregate::group_by_stroke_and_distance(&combined),
    }
}
