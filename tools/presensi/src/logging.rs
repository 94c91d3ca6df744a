use crate::errors::PresensiError;
use crate::log_retention::enforce_total_budget;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_DISK_BUDGET_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: 4096,
            budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), PresensiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PresensiError::Io(e.to_string()))?;
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| PresensiError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PresensiError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| PresensiError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| PresensiError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            let _ = enforce_total_budget(parent, self.budget_bytes)?;
        }

        Ok(())
    }
}

/// Event sink handed to the store front ends. A failed append is dropped so
/// logging never changes the outcome of an operation.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    logger: Option<JsonlLogger>,
}

impl EventLog {
    pub fn new(logger: JsonlLogger) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    pub fn disabled() -> Self {
        Self { logger: None }
    }

    pub fn info(&self, event_type: &str, payload: Value) {
        self.emit("info", event_type, payload);
    }

    pub fn warn(&self, event_type: &str, payload: Value) {
        self.emit("warn", event_type, payload);
    }

    pub fn error(&self, event_type: &str, payload: Value) {
        self.emit("error", event_type, payload);
    }

    fn emit(&self, level: &str, event_type: &str, payload: Value) {
        if let Some(logger) = &self.logger {
            let _ = logger.append(&LogEvent {
                level,
                event_type,
                payload,
            });
        }
    }
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
