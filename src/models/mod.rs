pub mod cycle;
pub mod formula;
pub mod schedule;
pub mod status;

pub use cycle::{CycleConfig, CycleState, DEFAULT_ACTIVE_SECS, DEFAULT_CYCLE_SECS};
pub use formula::{Formula, ALL_FORMULAS};
pub use schedule::{Recurrence, Schedule, ScheduleDraft};
pub use status::{
    ActivateRequest, ActivationResponse, DeviceStatus, OverlapCheck, QuizRequest, QuizResponse,
    ScheduleList, ScheduleStatus,
};
