//! Ingestion and metric derivation for per-session swim workout exports.
//!
//! Exports are loaded into typed records ([`loader`]), selected and combined
//! per directory ([`repository`]), reduced to per-stroke tables and session
//! KPIs ([`aggregate`]) and compared session over session ([`delta`]).

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod delta;
pub mod duration;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
pub mod repository;

pub use analysis::{Analysis, SessionOverview};
pub use config::AnalysisConfig;
pub use error::{DurationParseError, Result, SwimError};
pub use models::{KpiDelta, LengthRecord, RawRecord, Session, SessionKpis, StrokeStyle};
pub use repository::{SessionFile, SessionRepository};
