//! Finds session exports in a directory and orders them by the timestamp in
//! their file name (`<prefix>_<YYYY-MM-DD>_<HHMMSS>.csv`).

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::config::MAX_SESSIONS;
use crate::error::Result;
use crate::loader;
use crate::models::{LengthRecord, Session};

const EXPORT_EXTENSION: &str = "csv";

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.+_(\d{4}-\d{2}-\d{2})_(\d{6})\.(?i:csv)$")
            .expect("session filename pattern is valid")
    })
}

/// Extracts the session start from a file name, `None` when it does not
/// follow the naming convention.
pub fn parse_session_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let captures = filename_pattern().captures(file_name)?;
    let date = NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(&captures[2], "%H%M%S").unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

/// An export found on disk, not yet loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    pub path: PathBuf,
    pub started_at: Option<NaiveDateTime>,
}

impl SessionFile {
    pub fn from_path(path: PathBuf) -> Self {
        let started_at = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_session_timestamp);
        Self { path, started_at }
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn load(&self) -> Result<Session> {
        let records = loader::load_records(&self.path)?;
        Ok(Session {
            source: self.path.clone(),
            started_at: self.started_at,
            records,
        })
    }
}

/// Newest first; identical timestamps fall back to file name order.
fn newest_first(a: &SessionFile, b: &SessionFile) -> Ordering {
    b.started_at
        .cmp(&a.started_at)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Read-only view over one directory of session exports.
pub struct SessionRepository {
    data_dir: PathBuf,
}

impl SessionRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Lazily yields every export in the directory, named or not.
    ///
    /// A missing or unreadable directory yields nothing.
    pub fn discover(&self) -> impl Iterator<Item = SessionFile> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::warn!(dir = %self.data_dir.display(), error = %err, "cannot read session directory");
                None
            }
        };

        entries
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXPORT_EXTENSION))
            })
            .map(SessionFile::from_path)
    }

    /// Exports that carry a timestamp, newest first.
    pub fn chronological(&self) -> Vec<SessionFile> {
        let mut files: Vec<SessionFile> = self
            .discover()
            .filter(|file| file.started_at.is_some())
            .collect();
        files.sort_by(newest_first);
        files
    }

    /// Loads the `n` most recent sessions, newest first.
    ///
    /// Slots past the available sessions are `None`. An export that fails to
    /// load is skipped with a warning and the next dated one takes its place.
    /// At most `MAX_SESSIONS` slots are returned.
    pub fn latest_n(&self, n: usize) -> Vec<Option<Session>> {
        let n = n.min(MAX_SESSIONS);
        let files = self.chronological();
        let mut slots = Vec::with_capacity(n);
        for file in &files {
            if slots.len() == n {
                break;
            }
            match file.load() {
                Ok(session) => slots.push(Some(session)),
                Err(err) => {
                    tracing::warn!(path = %file.path.display(), error = %err, "skipping session export");
                }
            }
        }

        if slots.len() < n {
            tracing::warn!(
                dir = %self.data_dir.display(),
                requested = n,
                available = slots.len(),
                "fewer sessions than requested"
            );
            slots.resize_with(n, || None);
        }

        slots
    }

    /// Loads every export in discovery order. Files that fail to load are
    /// skipped with a warning.
    pub fn load_all(&self) -> Vec<Session> {
        self.discover()
            .filter_map(|file| match file.load() {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(path = %file.path.display(), error = %err, "skipping session export");
                    None
                }
            })
            .collect()
    }

    /// Concatenates the records of every export in discovery order.
    ///
    /// Cumulative distance stays relative to each record's own session, so
    /// anything keyed on it across sessions assumes the sessions share an axis.
    pub fn combine_all(&self) -> Vec<LengthRecord> {
        self.load_all()
            .into_iter()
            .flat_map(|session| session.records)
            .collect()
    }
}
