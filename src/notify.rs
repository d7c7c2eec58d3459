use std::sync::Arc;

use log::{error, info, warn};

/// User-facing notification sink, injected into the synchronizer so tests can
/// capture messages instead of relying on a global notification manager.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Routes notifications through the log facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
    }
}

pub type SharedNotifier = Arc<dyn Notifier>;
