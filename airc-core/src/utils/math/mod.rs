//! Math utilities for the drive agent.
//!
//! This module turns raw range samples into model inputs and model scores into
//! steering commands.

pub mod decision;
pub mod normalize;
