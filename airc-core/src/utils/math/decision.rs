//! Steering decisions from classifier scores.
//!
//! The model scores three classes: left, straight, right. The highest score
//! wins; on a tie the earliest class is kept.

use serde::{Deserialize, Serialize};

/// Number of steering classes the model scores.
pub const CLASS_COUNT: usize = 3;

/// Throttle sent with every steering command.
pub const FULL_THROTTLE: f32 = 1.0;

/// Index of the highest score, scanning left to right.
///
/// A later score only replaces the current best when strictly greater, so
/// ties resolve to the lowest index. NaN scores never win.
pub fn select_class(scores: &[f32; CLASS_COUNT]) -> usize {
    let mut best = 0;
    let mut max = scores[0];
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if max < score {
            max = score;
            best = i;
        }
    }
    best
}

/// Steering direction of each class, in class order.
const CLASSES: [Steering; CLASS_COUNT] = [Steering::Left, Steering::Straight, Steering::Right];

/// Discrete steering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Steering {
    Left,
    Straight,
    Right,
}

impl Steering {
    /// Map a class index onto a direction; out-of-range indices are `None`.
    pub fn from_class(class: usize) -> Option<Self> {
        CLASSES.get(class).copied()
    }

    /// Steering value in `{-1, 0, +1}`.
    pub fn value(self) -> f32 {
        match self {
            Steering::Left => -1.0,
            Steering::Straight => 0.0,
            Steering::Right => 1.0,
        }
    }
}

/// Command handed to the actuator after a successful inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringCommand {
    pub direction: Steering,
    pub throttle: f32,
}

impl SteeringCommand {
    pub fn from_scores(scores: &[f32; CLASS_COUNT]) -> Self {
        // select_class always returns an index below CLASS_COUNT
        Self {
            direction: CLASSES[select_class(scores)],
            throttle: FULL_THROTTLE,
        }
    }

    pub fn steering(&self) -> f32 {
        self.direction.value()
    }
}
