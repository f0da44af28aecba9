use thiserror::Error;

/// All errors that can occur in refsplit-core.
#[derive(Debug, Error)]
pub enum RefsplitError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes used by the `refsplit` binary.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
}

pub type Result<T> = std::result::Result<T, RefsplitError>;
