use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration with environment overrides (`SCENTCTL_SERVER`,
/// `SCENTCTL_POLL_SECS`, `SCENTCTL_FRAME_MS`, `SCENTCTL_SNAPSHOT_PATH`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the diffuser backend.
    pub server_url: String,
    /// Fixed status poll interval.
    pub poll_interval: Duration,
    /// Animation frame interval for the watch view.
    pub frame_interval: Duration,
    /// Where client-side snapshots live.
    pub snapshot_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval: Duration::from_secs(30),
            frame_interval: Duration::from_millis(33),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(server) = std::env::var("SCENTCTL_SERVER") {
            if !server.is_empty() {
                config.server_url = server;
            }
        }
        if let Some(secs) = env_parse::<u64>("SCENTCTL_POLL_SECS") {
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(millis) = env_parse::<u64>("SCENTCTL_FRAME_MS") {
            config.frame_interval = Duration::from_millis(millis.max(1));
        }
        if let Ok(path) = std::env::var("SCENTCTL_SNAPSHOT_PATH") {
            if !path.is_empty() {
                config.snapshot_path = PathBuf::from(path);
            }
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scentctl")
        .join("snapshots.json")
}
