use std::time::{SystemTime, UNIX_EPOCH};

pub mod ids;
pub mod logging;
pub mod state_paths;

pub use ids::generate_invocation_id;
pub use logging::{append_relay_log_fields, LogLevel};
pub use state_paths::{bootstrap_state_root, StatePaths};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to create runtime path {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn bootstrap_creates_required_directories() {
        let dir = tempdir().expect("temp dir");
        let paths = StatePaths::new(dir.path().join("state"));
        bootstrap_state_root(&paths).expect("bootstrap succeeds");

        for required in paths.required_directories() {
            assert!(
                required.is_dir(),
                "missing directory: {}",
                required.display()
            );
        }
        assert_eq!(paths.settings_file(), dir.path().join("state/config.yaml"));
    }
}
