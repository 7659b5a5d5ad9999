//! Tuner error types

use thiserror::Error;

/// Tuner result type alias
pub type Result<T> = std::result::Result<T, TunerError>;

/// Errors surfaced by the tuner.
///
/// Engine failures inside a training step are absorbed locally (penalty
/// reward + early episode end) and never reach this type; everything that
/// does reach it is fatal for the current operation.
#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Backtest engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Policy checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
