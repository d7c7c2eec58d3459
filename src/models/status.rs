use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::cycle::CycleConfig;
use crate::models::formula::deserialize_formula_or_off;
use crate::models::{Formula, Schedule};

/// Body for `POST /api/activate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivateRequest {
    pub color: Formula,
    pub cycle_time: f64,
    pub duration: f64,
}

impl ActivateRequest {
    pub fn new(color: Formula, config: CycleConfig) -> Self {
        Self {
            color,
            cycle_time: config.cycle_secs,
            duration: config.active_secs,
        }
    }
}

/// Response shape shared by activate/deactivate (and the pause/resume and
/// clear-override endpoints, which reuse it with most fields absent).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_formula_or_off")]
    pub active_formula: Option<Formula>,
    #[serde(default)]
    pub cycle_time: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub user_override: bool,
    #[serde(default)]
    pub paused_schedule: Option<Schedule>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/status` payload. `cycle_start_time` is the authoritative anchor
/// for the progress animation; it is absent between activation being accepted
/// and the device thread actually firing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "deserialize_formula_or_off")]
    pub active_formula: Option<Formula>,
    #[serde(default, deserialize_with = "deserialize_formula_or_off")]
    pub active_schedule: Option<Formula>,
    #[serde(default)]
    pub is_scheduled: bool,
    #[serde(default)]
    pub user_override: bool,
    #[serde(default)]
    pub schedule_end_time: Option<f64>,
    #[serde(default)]
    pub cycle_start_time: Option<f64>,
    #[serde(default)]
    pub current_cycle_time: Option<f64>,
    #[serde(default)]
    pub current_duration: Option<f64>,
}

impl DeviceStatus {
    pub fn is_active(&self) -> bool {
        self.active_formula.is_some()
    }

    /// Authoritative cycle timing, when the backend reports all three fields.
    pub fn cycle_anchor(&self) -> Option<(Formula, f64, CycleConfig)> {
        let formula = self.active_formula?;
        let start = self.cycle_start_time?;
        let cycle_secs = self.current_cycle_time?;
        let active_secs = self.current_duration?;
        Some((
            formula,
            start,
            CycleConfig {
                cycle_secs,
                active_secs,
            },
        ))
    }
}

/// `GET /api/schedule-status` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleStatus {
    #[serde(default)]
    pub current_time: Option<String>,
    #[serde(default)]
    pub active_schedule: Option<Schedule>,
    #[serde(default)]
    pub next_schedule: Option<Schedule>,
    #[serde(default)]
    pub next_schedule_time: Option<String>,
    #[serde(default, rename = "gpio_status")]
    pub device: DeviceStatus,
}

/// `GET /api/schedules` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleList {
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

/// One conflicting schedule in an overlap report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapSummary {
    pub id: u32,
    pub formula: Formula,
    pub time_range: String,
    pub recurrence: String,
}

/// `POST /api/schedules/check-overlap` payload (also embedded in 409
/// responses from schedule create/update).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapCheck {
    #[serde(default = "default_true")]
    pub valid: bool,
    #[serde(default)]
    pub overlapping_schedules: Vec<OverlapSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// `POST /api/quiz-result` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    pub answers: Vec<Formula>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScentInfo {
    pub name: String,
    pub description: String,
    pub mood: String,
}

/// `POST /api/quiz-result` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    #[serde(default)]
    pub status: String,
    pub recommended_scent: Formula,
    pub scent_info: ScentInfo,
    #[serde(default)]
    pub score_breakdown: HashMap<Formula, u32>,
}
