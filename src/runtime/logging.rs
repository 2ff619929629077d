use super::StatePaths;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Best effort: a log line that cannot be written is dropped.
pub fn append_relay_log_fields(
    paths: &StatePaths,
    level: LogLevel,
    event: &str,
    message: &str,
    fields: Map<String, Value>,
) {
    let mut payload = Map::new();
    payload.insert(
        "timestamp".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    payload.insert("level".to_string(), Value::from(level.as_str()));
    payload.insert("event".to_string(), Value::from(event));
    payload.insert("message".to_string(), Value::from(message));
    for (key, value) in fields {
        payload.entry(key).or_insert(value);
    }

    let Ok(line) = serde_json::to_string(&Value::Object(payload)) else {
        return;
    };

    let path = paths.relay_log_path();
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn read_lines(paths: &StatePaths) -> Vec<Value> {
        fs::read_to_string(paths.relay_log_path())
            .expect("read log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[test]
    fn appends_one_json_object_per_line() {
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path());
        append_relay_log_fields(&paths, LogLevel::Info, "relay.started", "hello", Map::new());
        append_relay_log_fields(&paths, LogLevel::Error, "relay.failed", "boom", Map::new());

        let lines = read_lines(&paths);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["event"], "relay.started");
        assert_eq!(lines[1]["message"], "boom");
        assert!(lines[0]["timestamp"].as_str().expect("ts").ends_with('Z'));
    }

    #[test]
    fn extra_fields_cannot_override_core_keys() {
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path());
        let fields = json!({ "event": "spoofed", "invocation_id": "inv-1" });
        let Value::Object(fields) = fields else {
            panic!("object");
        };
        append_relay_log_fields(&paths, LogLevel::Warn, "bridge.timeout", "late", fields);

        let lines = read_lines(&paths);
        assert_eq!(lines[0]["event"], "bridge.timeout");
        assert_eq!(lines[0]["invocation_id"], "inv-1");
    }
}
