use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::session::SessionContext;
use crate::stats::record::{StatsRecord, VisitorRecord};
use crate::utils::time;

pub const DEFAULT_STATS_FILE: &str = "app_stats.json";

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("failed to access stats file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stats file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a mutating call. The counters are returned even when they
/// could not be written back.
#[derive(Debug)]
pub struct Recorded {
    pub stats: StatsRecord,
    pub save_error: Option<StatsError>,
}

/// File-backed statistics. Every mutation is a whole-record
/// load-modify-save performed under `lock`, so threads sharing one store
/// never lose increments. Separate processes writing the same file can.
pub struct StatsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StatsStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored record, or the zeroed default when the file is missing or
    /// unreadable. Never fails.
    pub fn load(&self) -> StatsRecord {
        match self.read() {
            Ok(record) => record,
            Err(StatsError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stats file yet, starting from zero");
                StatsRecord::default()
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable stats");
                StatsRecord::default()
            }
        }
    }

    /// Read-only view for display.
    pub fn query(&self) -> StatsRecord {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load()
    }

    /// Counts one page visit. Only the first call per session mutates;
    /// later calls return the current record untouched.
    pub fn record_visit(&self, session: &mut SessionContext, now: &NaiveDateTime) -> Recorded {
        if session.visit_recorded {
            return Recorded { stats: self.query(), save_error: None };
        }
        session.visit_recorded = true;

        let stamp = time::timestamp(now);
        let visitor_id = session.visitor_id.clone();

        self.update(|stats| {
            stats.total_visits += 1;
            *stats.daily_visits.entry(time::date_key(now)).or_insert(0) += 1;
            *stats.hourly_visits.entry(time::hour_key(now)).or_insert(0) += 1;
            stats.last_visit = stamp.clone();

            if !stats.visitor_ips.contains_key(&visitor_id) {
                stats.visitor_ips.insert(
                    visitor_id.clone(),
                    VisitorRecord { first_visit: stamp.clone(), visit_count: 0, last_visit: String::new() },
                );
                stats.unique_visitors += 1;
            }
            if let Some(visitor) = stats.visitor_ips.get_mut(&visitor_id) {
                visitor.visit_count += 1;
                visitor.last_visit = stamp.clone();
            }

            info!(visitor = %visitor_id, total = stats.total_visits, "visit recorded");
        })
    }

    /// Counts one successful factorization of `number`.
    pub fn record_calculation(&self, number: u64) -> Recorded {
        self.update(|stats| {
            stats.calculation_count += 1;
            *stats.most_calculated_numbers.entry(number.to_string()).or_insert(0) += 1;
            debug!(number, total = stats.calculation_count, "calculation recorded");
        })
    }

    fn update<F>(&self, mutate: F) -> Recorded
    where
        F: FnOnce(&mut StatsRecord),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut stats = self.load();
        mutate(&mut stats);

        let save_error = self.save(&stats).err();
        if let Some(e) = &save_error {
            warn!(error = %e, "stats not saved");
        }
        Recorded { stats, save_error }
    }

    fn read(&self) -> Result<StatsRecord, StatsError> {
        let text = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, stats: &StatsRecord) -> Result<(), StatsError> {
        let json = serde_json::to_string_pretty(stats)?;

        // write-then-rename: readers never observe a half-written file
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|source| self.io_error(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            self.io_error(source)
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StatsError {
        StatsError::Io { path: self.path.clone(), source }
    }
}
