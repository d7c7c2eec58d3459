//! Client library for a cycle-based home scent diffuser.
//!
//! The core is the [`sync::ProgressSynchronizer`], which keeps a continuously
//! animated progress indicator consistent with the backend's reported cycle
//! timing: optimistic on activation, re-anchored on every status poll, and
//! torn down as an explicit cancellable task. Around it sit the typed wire
//! models, the `/api/*` client, schedule and quiz helpers, and the
//! client-side snapshot store.

pub mod api;
pub mod clock;
pub mod config;
pub mod console;
pub mod demo;
pub mod error;
pub mod models;
pub mod notify;
pub mod quiz;
pub mod schedule;
pub mod store;
pub mod sync;

pub use api::{DeviceApi, HttpDeviceApi};
pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use error::ClientError;
pub use notify::{LogNotifier, Notifier};
pub use sync::ProgressSynchronizer;
