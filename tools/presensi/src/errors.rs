use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresensiError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("{0}")]
    Validation(String),
    #[error("failed to load attendance records: {0}")]
    Load(String),
    #[error("failed to save attendance records: {0}")]
    Persistence(String),
    #[error("{0}")]
    AccessRestricted(String),
}

impl PresensiError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
