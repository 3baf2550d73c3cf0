//! Error types for the drive agent.
//!
//! Configuration problems are caught when the agent is set up
//! ([`ConfigError`]); everything that can go wrong on a drive tick is a
//! [`DriveError`].

use core::fmt::Debug;

use thiserror::Error;

use crate::utils::inference::TensorKind;

/// Rejected configuration: calibration or model shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid calibration: min_value {min} must be below max_value {max}")]
    InvalidCalibration { min: u16, max: u16 },

    #[error("model exposes no {kind} tensor at index {index}")]
    MissingTensor { kind: TensorKind, index: usize },

    #[error("{kind} tensor holds {len} slots, {required} required")]
    TensorTooSmall {
        kind: TensorKind,
        len: usize,
        required: usize,
    },
}

/// The controller was asked to act before it was ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// `initialize` has not been called.
    #[error("actuator and sensor are not initialized")]
    NotInitialized,

    /// `set_model` has not been called.
    #[error("no inference model is bound")]
    ModelNotSet,

    /// A bound tensor vanished or shrank after `set_model`.
    #[error("bound {0} tensor is no longer available")]
    TensorLost(TensorKind),
}

/// Failure of a single drive tick.
#[derive(Debug, Error)]
pub enum DriveError<E: Debug> {
    #[error(transparent)]
    State(#[from] StateError),

    /// The inference engine reported a failed invocation.
    #[error("inference invocation failed: {0:?}")]
    Inference(E),
}
