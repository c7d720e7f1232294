//! Time series of project counts.
//!
//! Each scan appends one snapshot (the per-project counts) under an RFC 3339
//! timestamp. The history is stored as a JSON object mapping timestamps to
//! snapshots and feeds the chart series.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

use crate::error::TodoscanError;
use crate::query::aggregate::ProjectCount;
use crate::Result;

/// Current local time as an RFC 3339 timestamp with offset.
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339()
}

/// Parse an RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|e| TodoscanError::InvalidTimestamp {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// A named sequence of `(timestamp, value)` points in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub title: String,
    pub points: Vec<(String, u64)>,
}

/// All snapshots, keyed by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    snapshots: BTreeMap<String, Vec<ProjectCount>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a snapshot, replacing any snapshot with the same timestamp.
    pub fn insert(&mut self, timestamp: &str, counts: Vec<ProjectCount>) -> Result<()> {
        parse_timestamp(timestamp)?;
        self.snapshots.insert(timestamp.to_string(), counts);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot recorded under `timestamp`.
    pub fn get(&self, timestamp: &str) -> Option<&[ProjectCount]> {
        self.snapshots.get(timestamp).map(Vec::as_slice)
    }

    /// Snapshots ordered by instant (not by timestamp text, so differing
    /// offsets still sort correctly).
    pub fn chronological(&self) -> Result<Vec<(&str, &[ProjectCount])>> {
        let mut entries = self
            .snapshots
            .iter()
            .map(|(ts, counts)| Ok((parse_timestamp(ts)?, ts.as_str(), counts.as_slice())))
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        Ok(entries.into_iter().map(|(_, ts, counts)| (ts, counts)).collect())
    }

    /// `timestamp -> project -> total`.
    pub fn totals_by_timestamp(&self) -> BTreeMap<String, BTreeMap<String, u64>> {
        self.snapshots
            .iter()
            .map(|(ts, counts)| {
                let totals = counts.iter().map(|c| (c.name.clone(), c.total)).collect();
                (ts.clone(), totals)
            })
            .collect()
    }

    /// Every marker kind that appears in any snapshot.
    pub fn kinds(&self) -> BTreeSet<String> {
        self.snapshots
            .values()
            .flatten()
            .flat_map(|c| c.kinds.keys().cloned())
            .collect()
    }

    /// One series per project, with points only where the project appears.
    pub fn project_series(&self) -> Result<Vec<Series>> {
        let mut by_project: BTreeMap<&str, Vec<(String, u64)>> = BTreeMap::new();
        for (ts, counts) in self.chronological()? {
            for count in counts {
                by_project
                    .entry(count.name.as_str())
                    .or_default()
                    .push((ts.to_string(), count.total));
            }
        }
        Ok(by_project
            .into_iter()
            .map(|(name, points)| Series {
                title: name.to_string(),
                points,
            })
            .collect())
    }

    /// One series per kind: the kind's count summed over all projects.
    pub fn kind_series(&self) -> Result<Vec<Series>> {
        let snapshots = self.chronological()?;
        Ok(self
            .kinds()
            .into_iter()
            .map(|kind| {
                let points = snapshots
                    .iter()
                    .map(|(ts, counts)| {
                        let sum: u64 = counts
                            .iter()
                            .map(|c| c.kinds.get(&kind).copied().unwrap_or(0))
                            .sum();
                        (ts.to_string(), sum)
                    })
                    .collect();
                Series {
                    title: kind,
                    points,
                }
            })
            .collect())
    }

    /// Sum of every project's total per snapshot.
    pub fn total_series(&self, title: &str) -> Result<Series> {
        let points = self
            .chronological()?
            .into_iter()
            .map(|(ts, counts)| (ts.to_string(), counts.iter().map(|c| c.total).sum::<u64>()))
            .collect();
        Ok(Series {
            title: title.to_string(),
            points,
        })
    }
}

/// Persistence for a [`History`].
pub trait HistoryStore {
    /// Load the whole history; a store that doesn't exist yet is empty.
    fn load(&self) -> Result<History>;

    /// Replace the stored history.
    fn save(&mut self, history: &History) -> Result<()>;

    /// Record a snapshot and persist the result.
    fn append_snapshot(&mut self, timestamp: &str, counts: Vec<ProjectCount>) -> Result<History> {
        let mut history = self.load()?;
        history.insert(timestamp, counts)?;
        self.save(&history)?;
        Ok(history)
    }
}

/// History kept as pretty-printed JSON in a file.
#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryFile {
    fn load(&self) -> Result<History> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no history yet");
            return Ok(History::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| TodoscanError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        if content.trim().is_empty() {
            return Ok(History::new());
        }
        serde_json::from_str(&content).map_err(|e| TodoscanError::History {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&mut self, history: &History) -> Result<()> {
        let json = serde_json::to_string_pretty(history).map_err(|e| TodoscanError::History {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TodoscanError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.path, json).map_err(|e| TodoscanError::FileWrite {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), snapshots = history.len(), "saved history");
        Ok(())
    }
}

/// In-memory history store.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    history: History,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn load(&self) -> Result<History> {
        Ok(self.history.clone())
    }

    fn save(&mut self, history: &History) -> Result<()> {
        self.history = history.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn count(name: &str, todo: u64, bug: u64) -> ProjectCount {
        ProjectCount {
            name: name.to_string(),
            total: todo + bug,
            kinds: [("TODO".to_string(), todo), ("BUG".to_string(), bug)]
                .into_iter()
                .collect(),
        }
    }

    const T1: &str = "2024-03-01T10:00:00+00:00";
    const T2: &str = "2024-03-02T10:00:00+00:00";

    #[test]
    fn test_append_and_totals() {
        let mut store = MemoryHistory::new();
        store
            .append_snapshot(T1, vec![count("Alpha", 3, 1), count("unassigned", 1, 0)])
            .unwrap();
        let history = store.append_snapshot(T2, vec![count("Alpha", 2, 0)]).unwrap();

        assert_eq!(history.len(), 2);
        let totals = history.totals_by_timestamp();
        assert_eq!(totals[T1]["Alpha"], 4);
        assert_eq!(totals[T1]["unassigned"], 1);
        assert_eq!(totals[T2]["Alpha"], 2);
        assert!(!totals[T2].contains_key("unassigned"));
    }

    #[test]
    fn test_same_timestamp_replaces() {
        let mut store = MemoryHistory::new();
        store.append_snapshot(T1, vec![count("Alpha", 3, 1)]).unwrap();
        let history = store.append_snapshot(T1, vec![count("Alpha", 1, 0)]).unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history.get(T1).unwrap()[0].total, 1);
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut store = MemoryHistory::new();
        let err = store.append_snapshot("yesterday", vec![]).unwrap_err();
        assert!(matches!(err, TodoscanError::InvalidTimestamp { .. }));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_series() {
        let mut history = History::new();
        history
            .insert(T2, vec![count("Alpha", 2, 0), count("Beta", 0, 5)])
            .unwrap();
        history.insert(T1, vec![count("Alpha", 3, 1)]).unwrap();

        let projects = history.project_series().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].title, "Alpha");
        assert_eq!(
            projects[0].points,
            vec![(T1.to_string(), 4), (T2.to_string(), 2)]
        );
        assert_eq!(projects[1].points, vec![(T2.to_string(), 5)]);

        let kinds = history.kind_series().unwrap();
        let titles: Vec<&str> = kinds.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["BUG", "TODO"]);
        assert_eq!(kinds[0].points, vec![(T1.to_string(), 1), (T2.to_string(), 5)]);
        assert_eq!(kinds[1].points, vec![(T1.to_string(), 3), (T2.to_string(), 2)]);

        let total = history.total_series("Total").unwrap();
        assert_eq!(total.points, vec![(T1.to_string(), 4), (T2.to_string(), 7)]);
    }

    #[test]
    fn test_chronological_uses_instants() {
        let mut history = History::new();
        // textually later, but an hour earlier in absolute time
        history.insert("2024-03-01T10:30:00+02:00", vec![]).unwrap();
        history.insert("2024-03-01T09:00:00+00:00", vec![]).unwrap();

        let order: Vec<&str> = history
            .chronological()
            .unwrap()
            .into_iter()
            .map(|(ts, _)| ts)
            .collect();
        assert_eq!(
            order,
            vec!["2024-03-01T10:30:00+02:00", "2024-03-01T09:00:00+00:00"]
        );
    }

    #[test]
    fn test_json_file_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("metadata/todo_history.json");
        let mut store = JsonHistoryFile::new(&path);

        assert!(store.load().unwrap().is_empty());
        store.append_snapshot(T1, vec![count("Alpha", 3, 1)]).unwrap();
        assert!(path.exists());

        let reopened = JsonHistoryFile::new(&path);
        let history = reopened.load().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(T1).unwrap()[0], count("Alpha", 3, 1));
    }

    #[test]
    fn test_json_file_legacy_format() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("todo_history.json");
        fs::write(
            &path,
            r#"{"2023-11-05T08:15:30.1234567+00:00":[{"ProjectName":"Core","TotalCount":2,"LevelCount":{"TODO":1,"NOTE":1}}]}"#,
        )
        .unwrap();

        let history = JsonHistoryFile::new(&path).load().unwrap();
        let snapshot = history.get("2023-11-05T08:15:30.1234567+00:00").unwrap();
        assert_eq!(snapshot[0].name, "Core");
        assert_eq!(snapshot[0].kinds["NOTE"], 1);
        assert_eq!(history.total_series("Total").unwrap().points[0].1, 2);
    }

    #[test]
    fn test_json_file_corrupt() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("todo_history.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonHistoryFile::new(&path).load().unwrap_err();
        assert!(matches!(err, TodoscanError::History { .. }));
    }

    #[test]
    fn test_now_timestamp_parses() {
        assert!(parse_timestamp(&now_timestamp()).is_ok());
    }
}
