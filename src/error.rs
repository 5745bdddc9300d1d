//! Error types for the settings builder and the INI configuration loader.

/// Everything that can go wrong while assembling or loading a [`crate::settings::Settings`]
/// record. `tick()` itself is infallible; these only surface before a state machine runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("out_count must be in 0..=32, got {0}")]
    OutCountOutOfRange(u32),

    #[error("set_count must be in 0..=32, got {0}")]
    SetCountOutOfRange(u32),

    #[error("sideset_count must be in 0..=5, got {0}")]
    SidesetCountOutOfRange(u32),

    #[error("push_threshold must be in 1..=32, got {0}")]
    PushThresholdOutOfRange(u32),

    #[error("pull_threshold must be in 1..=32, got {0}")]
    PullThresholdOutOfRange(u32),

    #[error("wrap_start ({wrap_start}) must be <= wrap_end ({wrap_end}), both in 0..=31")]
    InvalidWrap { wrap_start: u8, wrap_end: u8 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ini file: {0}")]
    Ini(String),

    #[error("instruction word {key:?}={value:?} is not a valid 16-bit hex literal")]
    BadInstruction { key: String, value: String },

    #[error("config key {key:?}={value:?} could not be parsed")]
    InvalidValue { key: String, value: String },
}
