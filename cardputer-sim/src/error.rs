//! Simulator error types

use thiserror::Error;

/// Errors from parsing simulator vocabulary (actions, modes, controls)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Action name outside the closed action set
    #[error("Unknown key action: {0}")]
    UnknownAction(String),

    /// Screen name that is not one of the six modes
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// Numeric control name that is not rpm/speed/temp/voltage
    #[error("Unknown control: {0}")]
    UnknownControl(String),
}
