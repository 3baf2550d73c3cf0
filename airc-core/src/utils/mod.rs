//! Utility re-exports and helper macros for the drive agent.
//!
//! - `controllers`: the drive-loop controller, collaborator traits and the
//!   command channel
//! - `inference`: the inference-engine and error-sink seams
//! - `math`: sensor normalization and steering decisions
//! - `error`: configuration and runtime error types
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod controllers;
pub mod error;
pub mod inference;
pub mod math;

pub use controllers::agent::DriveLoopController;
pub use controllers::{pace, AgentCommand, AGENT_CHANNEL};
pub use embassy_time::Duration;
pub use error::{ConfigError, DriveError, StateError};
pub use math::decision::{Steering, SteeringCommand};
pub use math::normalize::Calibration;

#[doc(hidden)]
pub use static_cell::StaticCell as __StaticCell;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: $crate::utils::__StaticCell<$t> = $crate::utils::__StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
