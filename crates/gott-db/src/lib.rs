//! Storage layer for gott.
//!
//! Intervals are kept in a single JSON file holding one array. The file is
//! read once when the [`Store`] is opened and written back as a whole by
//! [`Store::save`].
//!
//! # Invariants
//!
//! - Every stored interval has an ID, and IDs are unique. IDs are assigned
//!   when an interval is first stored and never regenerated on reload.
//! - At most one stored interval is open (has no end). This is checked by
//!   scanning the collection on every mutation that could open one.
//!
//! # File format
//!
//! Timestamps are RFC 3339 with the local offset
//! (e.g. `2024-01-15T10:30:00+01:00`); durations are whole milliseconds in
//! `duration_ms`. A missing or empty file is an empty store. Anything else
//! that does not parse, or that breaks an invariant, is reported as
//! [`StoreError::Corrupt`] rather than discarded.
//!
//! # Concurrency
//!
//! The store is not shared between threads or processes. Two processes
//! saving the same file race, and the last save wins.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, SubsecRound};
use thiserror::Error;
use uuid::Uuid;

use gott_core::{Filter, FilterError, Interval, IntervalId, ReconcilePlan};

/// Length of generated interval IDs, in hex characters.
const ID_LEN: usize = 8;

/// The current time, truncated to whole seconds.
///
/// Edit documents carry at most second precision, so stored times never hold
/// more.
pub fn now() -> DateTime<Local> {
    Local::now().trunc_subsecs(0)
}

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An interval is already running.
    #[error("already tracking interval {id}; stop or cancel it first")]
    AlreadyTracking { id: String },
    /// An interval with this ID is already stored.
    #[error("interval {id} already exists")]
    AlreadyExists { id: String },
    /// No stored interval has this ID.
    #[error("interval {id:?} not found")]
    NotFound { id: String },
    /// The store holds no intervals.
    #[error("no intervals recorded yet")]
    Empty,
    /// The store file exists but cannot be trusted.
    #[error("corrupt store {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
    /// Reading or writing the store file failed.
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The collection could not be encoded as JSON.
    #[error("failed to serialize store")]
    Serialize(#[source] serde_json::Error),
}

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// IDs assigned to newly added intervals.
    pub added: Vec<IntervalId>,
    pub updated: usize,
    pub removed: usize,
}

/// The interval collection.
///
/// See the [crate documentation](crate) for the invariants it maintains.
#[derive(Debug, Default)]
pub struct Store {
    path: Option<PathBuf>,
    intervals: Vec<Interval>,
}

impl Store {
    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let intervals = match fs::read_to_string(path) {
            Ok(content) => parse_intervals(&content, path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "store file not found, starting empty");
                Vec::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    action: "read",
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        tracing::debug!(path = ?path, count = intervals.len(), "loaded store");

        Ok(Self {
            path: Some(path.to_path_buf()),
            intervals,
        })
    }

    /// Creates an empty store without a backing file.
    ///
    /// Useful for testing. [`Store::save`] does nothing.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the whole collection back to the backing file.
    ///
    /// The JSON is written to a sibling temporary file first and renamed over
    /// the store, so a failed write leaves the previous contents intact.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |action, source| StoreError::Io {
            action,
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_err("create directory for", e))?;
        }
        let json = serde_json::to_string_pretty(&self.intervals).map_err(StoreError::Serialize)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| io_err("write", e))?;
        fs::rename(&staging, path).map_err(|e| io_err("replace", e))?;

        tracing::debug!(path = ?path, count = self.intervals.len(), "saved store");
        Ok(())
    }

    /// All intervals in stored order.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of stored intervals.
    pub fn count(&self) -> usize {
        self.intervals.len()
    }

    pub fn get(&self, id: &str) -> Option<&Interval> {
        self.intervals.iter().find(|i| i.id_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Intervals matching filter arguments, relative to the current date.
    pub fn filter<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<Interval>, FilterError> {
        self.filter_at(args, Local::now().date_naive())
    }

    /// Intervals matching filter arguments, relative to `today`, in stored
    /// order.
    pub fn filter_at<S: AsRef<str>>(
        &self,
        args: &[S],
        today: NaiveDate,
    ) -> Result<Vec<Interval>, FilterError> {
        let filter = Filter::from_args(args, today)?;
        Ok(self.matching(&filter).cloned().collect())
    }

    /// Intervals accepted by `filter`, in stored order.
    pub fn matching<'a>(&'a self, filter: &'a Filter) -> impl Iterator<Item = &'a Interval> + 'a {
        self.intervals.iter().filter(|i| filter.matches(i))
    }

    /// The running interval, if any.
    pub fn current(&self) -> Option<&Interval> {
        self.intervals.iter().find(|i| i.is_open())
    }

    /// The running interval, for re-annotation.
    pub fn current_mut(&mut self) -> Option<&mut Interval> {
        self.intervals.iter_mut().find(|i| i.is_open())
    }

    /// Starts tracking `interval` now.
    pub fn start(&mut self, interval: Interval) -> Result<&Interval, StoreError> {
        self.start_at(interval, now())
    }

    /// Starts tracking `interval`, beginning at `now` unless it already has a
    /// begin time.
    pub fn start_at(
        &mut self,
        mut interval: Interval,
        now: DateTime<Local>,
    ) -> Result<&Interval, StoreError> {
        if let Some(current) = self.current() {
            return Err(StoreError::AlreadyTracking {
                id: current.id_str().to_string(),
            });
        }

        let id = self.fresh_id();
        tracing::info!(id = %id, "started interval");
        interval.id = Some(id);
        interval.begin.get_or_insert(now);
        interval.end = None;
        self.intervals.push(interval);
        Ok(&self.intervals[self.intervals.len() - 1])
    }

    /// Stops the running interval now. Does nothing if none is running.
    pub fn stop(&mut self) -> Option<Interval> {
        self.stop_at(now())
    }

    /// Stops the running interval at `now` and returns it.
    pub fn stop_at(&mut self, now: DateTime<Local>) -> Option<Interval> {
        let current = self.current_mut()?;
        current.end = Some(now);
        tracing::info!(id = %current.id_str(), "stopped interval");
        Some(current.clone())
    }

    /// Discards the running interval and returns it. Does nothing if none is
    /// running.
    pub fn cancel(&mut self) -> Option<Interval> {
        let index = self.intervals.iter().position(Interval::is_open)?;
        let removed = self.intervals.remove(index);
        tracing::info!(id = %removed.id_str(), "cancelled interval");
        Some(removed)
    }

    /// Stores a closed interval and returns its ID.
    ///
    /// An interval without an ID gets a fresh one; without a begin time it
    /// begins now; without an end it ends when it begins.
    pub fn append(&mut self, mut interval: Interval) -> Result<IntervalId, StoreError> {
        let id = match interval.id.take() {
            Some(id) if self.contains(id.as_str()) => {
                return Err(StoreError::AlreadyExists { id: id.to_string() });
            }
            Some(id) => id,
            None => self.fresh_id(),
        };
        let begin = *interval.begin.get_or_insert_with(now);
        interval.end.get_or_insert(begin);
        interval.id = Some(id.clone());

        tracing::debug!(id = %id, "appended interval");
        self.intervals.push(interval);
        Ok(id)
    }

    /// Replaces the stored interval with the same ID.
    ///
    /// A missing begin time keeps the stored one. Fails if no interval has
    /// this ID, or if the update would leave two intervals running.
    pub fn apply(&mut self, mut interval: Interval) -> Result<(), StoreError> {
        let id = interval.id_str().to_string();
        let Some(index) = self.intervals.iter().position(|i| i.id_str() == id) else {
            return Err(StoreError::NotFound { id });
        };

        if interval.is_open() {
            let other_open = self
                .intervals
                .iter()
                .find(|i| i.is_open() && i.id_str() != id);
            if let Some(other) = other_open {
                return Err(StoreError::AlreadyTracking {
                    id: other.id_str().to_string(),
                });
            }
        }

        if interval.begin.is_none() {
            interval.begin = self.intervals[index].begin;
        }
        tracing::debug!(id = %id, "updated interval");
        self.intervals[index] = interval;
        Ok(())
    }

    /// Removes the interval with this ID. Returns whether one was removed.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.intervals.len();
        self.intervals.retain(|i| i.id_str() != id);
        let removed = self.intervals.len() != before;
        if removed {
            tracing::debug!(id, "removed interval");
        }
        removed
    }

    /// The interval with the latest begin time.
    pub fn latest(&self) -> Result<&Interval, StoreError> {
        self.intervals
            .iter()
            .max_by_key(|i| i.begin)
            .ok_or(StoreError::Empty)
    }

    /// Applies an edit plan: updates, then additions, then removals.
    ///
    /// Either every change is applied or, on error, none is.
    pub fn reconcile(&mut self, plan: ReconcilePlan) -> Result<ReconcileSummary, StoreError> {
        let mut staged = Self {
            path: None,
            intervals: self.intervals.clone(),
        };
        let mut summary = ReconcileSummary::default();

        for interval in plan.updates {
            staged.apply(interval)?;
            summary.updated += 1;
        }
        for interval in plan.appends {
            summary.added.push(staged.append(interval)?);
        }
        for id in &plan.removals {
            if staged.remove_by_id(id.as_str()) {
                summary.removed += 1;
            }
        }

        self.intervals = staged.intervals;
        tracing::info!(
            added = summary.added.len(),
            updated = summary.updated,
            removed = summary.removed,
            "reconciled edits"
        );
        Ok(summary)
    }

    /// Generates an ID not used by any stored interval.
    fn fresh_id(&self) -> IntervalId {
        loop {
            let candidate: String = Uuid::new_v4().simple().to_string()[..ID_LEN].to_string();
            if let Ok(id) = IntervalId::new(candidate) {
                if !self.contains(id.as_str()) {
                    return id;
                }
            }
        }
    }
}

fn parse_intervals(content: &str, path: &Path) -> Result<Vec<Interval>, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let intervals: Vec<Interval> =
        serde_json::from_str(content).map_err(|e| corrupt(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut open = 0;
    for (n, interval) in intervals.iter().enumerate() {
        let Some(id) = &interval.id else {
            return Err(corrupt(format!("entry {n} has no id")));
        };
        if !seen.insert(id.as_str()) {
            return Err(corrupt(format!("duplicate id {id}")));
        }
        if interval.begin.is_none() {
            return Err(corrupt(format!("interval {id} has no begin time")));
        }
        if interval.is_open() {
            open += 1;
        }
    }
    if open > 1 {
        return Err(corrupt(format!("{open} intervals are running, expected at most one")));
    }

    Ok(intervals)
}
