use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Formula, Schedule};

/// Display-continuity snapshot of the selection view, consumed once on
/// restore (the reload path of the original controller).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub selected_formula: Option<Formula>,
    pub is_active: bool,
    pub cycle_secs: f64,
    pub active_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleSnapshot {
    schedule: Schedule,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default)]
    session: Option<SessionSnapshot>,
    #[serde(default)]
    last_inactive_schedule: Option<ScheduleSnapshot>,
}

/// Client-side persistence, none of it server-authoritative: a session
/// snapshot that survives one restart, and the last known inactive schedule
/// kept for 24 hours of display continuity.
pub struct SnapshotStore {
    path: PathBuf,
    data: RwLock<StoredState>,
}

const SCHEDULE_SNAPSHOT_TTL_HOURS: i64 = 24;

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read snapshots from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            StoredState::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn save_session(&self, snapshot: SessionSnapshot) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.session = Some(snapshot);
        self.persist(&guard)
    }

    /// Read and remove the session snapshot; it is only meant to survive one
    /// explicit restart.
    pub fn take_session(&self) -> Result<Option<SessionSnapshot>> {
        let mut guard = self.data.write().unwrap();
        let snapshot = guard.session.take();
        if snapshot.is_some() {
            self.persist(&guard)?;
        }
        Ok(snapshot)
    }

    pub fn remember_inactive_schedule(&self, schedule: Schedule) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.last_inactive_schedule = Some(ScheduleSnapshot {
            schedule,
            saved_at: Utc::now(),
        });
        self.persist(&guard)
    }

    /// Last known inactive schedule, if remembered within the past 24 hours.
    pub fn last_inactive_schedule(&self) -> Option<Schedule> {
        let guard = self.data.read().unwrap();
        let snapshot = guard.last_inactive_schedule.as_ref()?;
        let age = Utc::now() - snapshot.saved_at;
        if age > Duration::hours(SCHEDULE_SNAPSHOT_TTL_HOURS) {
            return None;
        }
        Some(snapshot.schedule.clone())
    }

    fn persist(&self, data: &StoredState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write snapshots to {}", self.path.display()))
    }
}
