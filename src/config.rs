use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "DATA";
pub const DEFAULT_SESSIONS: usize = 2;
pub const MAX_SESSIONS: usize = 100;

/// Options for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub sessions: usize,
}

impl AnalysisConfig {
    pub fn new(data_dir: impl Into<PathBuf>, sessions: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            sessions: sessions.clamp(1, MAX_SESSIONS),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, DEFAULT_SESSIONS)
    }
}
