//! Neural-network drive agent for range-sensing cars on no-std embedded platforms.
//!
//! A [`DriveLoopController`](utils::controllers::agent::DriveLoopController) reads a
//! three-beam range sensor, normalizes the samples, runs them through a
//! pre-trained classifier and turns the winning class into a steering command.
//!
//! For a runnable host, see the `mock-mcu` application in `airc-app/`.
#![cfg_attr(not(test), no_std)]

pub mod utils;
