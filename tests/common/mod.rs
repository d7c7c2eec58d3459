//! Shared test doubles: the notifier, API client, clock and render surface
//! are all injected seams, so the flows can run without a backend, a display
//! or real time.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use scentctl::api::DeviceApi;
use scentctl::clock::Clock;
use scentctl::error::{ClientError, Result};
use scentctl::models::{
    ActivateRequest, ActivationResponse, DeviceStatus, Formula, OverlapCheck, QuizResponse,
    Schedule, ScheduleDraft, ScheduleList, ScheduleStatus,
};
use scentctl::notify::Notifier;
use scentctl::sync::{ArcSpec, IndicatorPoint, IndicatorSurface, TrackLayout};

/// Clock whose time only moves when a test advances it.
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn at(epoch_secs: f64) -> Self {
        Self {
            now: Mutex::new(epoch_secs),
        }
    }

    pub fn advance(&self, secs: f64) {
        *self.now.lock().unwrap() += secs;
    }

    pub fn set(&self, epoch_secs: f64) {
        *self.now.lock().unwrap() = epoch_secs;
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}

/// Records every draw call; layout is mutable so tests can simulate a
/// container that has not rendered yet or resizes.
#[derive(Default)]
pub struct RecordingSurface {
    layout: Mutex<Option<TrackLayout>>,
    pub points: Mutex<Vec<IndicatorPoint>>,
    pub arcs: Mutex<Vec<ArcSpec>>,
    pub clear_count: AtomicUsize,
}

impl RecordingSurface {
    pub fn sized(width: f64, height: f64) -> Self {
        let surface = Self::default();
        surface.set_layout(width, height);
        surface
    }

    pub fn set_layout(&self, width: f64, height: f64) {
        *self.layout.lock().unwrap() = Some(TrackLayout::new(width, height));
    }

    pub fn point_count(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.lock().unwrap().len()
    }

    pub fn clears(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }
}

impl IndicatorSurface for RecordingSurface {
    fn layout(&self) -> TrackLayout {
        self.layout
            .lock()
            .unwrap()
            .unwrap_or(TrackLayout {
                width: 0.0,
                height: 0.0,
            })
    }

    fn place_indicator(&self, point: IndicatorPoint) {
        self.points.lock().unwrap().push(point);
    }

    fn apply_arc(&self, arc: ArcSpec) {
        self.arcs.lock().unwrap().push(arc);
    }

    fn clear(&self) {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Captures notifications instead of logging them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| level == "error")
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn successes(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| level == "success")
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("success".into(), message.into()));
    }

    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("error".into(), message.into()));
    }

    fn warning(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("warning".into(), message.into()));
    }
}

/// Scripted backend: queue outcomes for activate, set the status the next
/// polls should see, and inspect the recorded call order afterwards.
#[derive(Default)]
pub struct ScriptedApi {
    pub activate_results: Mutex<VecDeque<Result<ActivationResponse>>>,
    pub status: Mutex<DeviceStatus>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_activate(&self, result: Result<ActivationResponse>) {
        self.activate_results.lock().unwrap().push_back(result);
    }

    pub fn set_status(&self, status: DeviceStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

/// Status payload with full cycle timing, as the backend reports once the
/// device thread has fired.
pub fn anchored_status(formula: Formula, start: f64, cycle_secs: f64, active_secs: f64) -> DeviceStatus {
    serde_json::from_value(serde_json::json!({
        "active": true,
        "active_formula": formula.color_code(),
        "cycle_start_time": start,
        "current_cycle_time": cycle_secs,
        "current_duration": active_secs,
    }))
    .unwrap()
}

pub fn inactive_status() -> DeviceStatus {
    serde_json::from_value(serde_json::json!({ "active_formula": null })).unwrap()
}

#[async_trait]
impl DeviceApi for ScriptedApi {
    async fn activate(&self, request: &ActivateRequest) -> Result<ActivationResponse> {
        self.record(format!("activate {}", request.color));
        self.activate_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ActivationResponse::default()))
    }

    async fn deactivate(&self) -> Result<ActivationResponse> {
        self.record("deactivate");
        Ok(ActivationResponse::default())
    }

    async fn status(&self) -> Result<DeviceStatus> {
        self.record("status");
        Ok(self.status.lock().unwrap().clone())
    }

    async fn schedule_status(&self) -> Result<ScheduleStatus> {
        self.record("schedule_status");
        Ok(ScheduleStatus::default())
    }

    async fn pause_schedule(&self) -> Result<ActivationResponse> {
        self.record("pause_schedule");
        Ok(ActivationResponse::default())
    }

    async fn resume_schedule(&self) -> Result<ActivationResponse> {
        self.record("resume_schedule");
        Ok(ActivationResponse::default())
    }

    async fn clear_override(&self) -> Result<ActivationResponse> {
        self.record("clear_override");
        Ok(ActivationResponse::default())
    }

    async fn list_schedules(&self) -> Result<ScheduleList> {
        self.record("list_schedules");
        Ok(ScheduleList::default())
    }

    async fn create_schedule(&self, _draft: &ScheduleDraft) -> Result<Schedule> {
        self.record("create_schedule");
        Err(ClientError::State("not scripted".into()))
    }

    async fn update_schedule(&self, _id: u32, _draft: &ScheduleDraft) -> Result<Schedule> {
        self.record("update_schedule");
        Err(ClientError::State("not scripted".into()))
    }

    async fn delete_schedule(&self, id: u32) -> Result<()> {
        self.record(format!("delete_schedule {id}"));
        Ok(())
    }

    async fn check_overlap(&self, _draft: &ScheduleDraft) -> Result<OverlapCheck> {
        self.record("check_overlap");
        Err(ClientError::State("not scripted".into()))
    }

    async fn submit_quiz(&self, _answers: &[Formula]) -> Result<QuizResponse> {
        self.record("submit_quiz");
        Err(ClientError::Network("offline".into()))
    }
}
