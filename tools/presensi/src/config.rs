use crate::errors::PresensiError;
use crate::gate::AccessWindow;
use crate::logging::DEFAULT_DISK_BUDGET_BYTES;
use crate::runtime::FileSystem;
use crate::store::DEFAULT_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub gate: AccessWindow,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeScope {
    pub process_cwd: PathBuf,
    pub working_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                path: PathBuf::from(DEFAULT_FILE_NAME),
            },
            gate: AccessWindow::default(),
            logging: LoggingConfig {
                enabled: true,
                path: PathBuf::from(".presensi/logs/events.jsonl"),
                max_payload_bytes: 4096,
                budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialAppConfig {
    store: Option<PartialStoreConfig>,
    gate: Option<PartialGateConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialStoreConfig {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialGateConfig {
    start_hour: Option<u32>,
    end_hour: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialLoggingConfig {
    enabled: Option<bool>,
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    budget_bytes: Option<u64>,
}

pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<(AppConfig, RuntimeScope), PresensiError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let path = absolutize_path(process_cwd, path);
        let file_contents = fs.read_to_string(&path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| PresensiError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);

    let scope = resolve_scope(process_cwd, overrides);
    validate_config(&cfg)?;
    Ok((cfg, scope))
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(store) = partial.store {
        if let Some(path) = store.path {
            cfg.store.path = path;
        }
    }

    if let Some(gate) = partial.gate {
        if let Some(value) = gate.start_hour {
            cfg.gate.start_hour = value;
        }
        if let Some(value) = gate.end_hour {
            cfg.gate.end_hour = value;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(value) = logging.enabled {
            cfg.logging.enabled = value;
        }
        if let Some(value) = logging.path {
            cfg.logging.path = value;
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
        if let Some(value) = logging.budget_bytes {
            cfg.logging.budget_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(file) = &overrides.file {
        cfg.store.path = file.clone();
    }
}

pub fn resolve_scope(process_cwd: &Path, overrides: &CliOverrides) -> RuntimeScope {
    let process_cwd = process_cwd.to_path_buf();
    let working_dir = match &overrides.working_dir {
        Some(path) => absolutize_path(&process_cwd, path),
        None => process_cwd.clone(),
    };
    RuntimeScope {
        process_cwd,
        working_dir,
    }
}

/// Backing file location, relative paths taken from the working dir.
pub fn store_path(cfg: &AppConfig, scope: &RuntimeScope) -> PathBuf {
    absolutize_path(&scope.working_dir, &cfg.store.path)
}

pub fn log_path(cfg: &AppConfig, scope: &RuntimeScope) -> PathBuf {
    absolutize_path(&scope.working_dir, &cfg.logging.path)
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), PresensiError> {
    if cfg.store.path.as_os_str().is_empty() {
        return Err(PresensiError::InvalidConfig(
            "store.path must not be empty".to_string(),
        ));
    }

    if cfg.gate.start_hour >= cfg.gate.end_hour || cfg.gate.end_hour > 24 {
        return Err(PresensiError::InvalidConfig(format!(
            "gate window must satisfy start_hour < end_hour <= 24 (got {}..{})",
            cfg.gate.start_hour, cfg.gate.end_hour
        )));
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(PresensiError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
