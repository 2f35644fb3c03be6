//! Greedy steer-to-food heuristic.
//!
//! Deliberately naive: no path search and no body avoidance. A steer attempt
//! is bounded by [`SteerPolicy::max_attempts`] ticks and reports whether the
//! score moved instead of failing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{ArrowKey, Position};

/// One game-loop step of the game under test.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_STEER_ATTEMPTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteerPolicy {
    pub tick: Duration,
    pub max_attempts: u32,
}

impl Default for SteerPolicy {
    fn default() -> Self {
        Self {
            tick: TICK_INTERVAL,
            max_attempts: MAX_STEER_ATTEMPTS,
        }
    }
}

/// Result of one steer-to-food attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteerOutcome {
    /// Score text observed after the last tick.
    pub score: Option<String>,
    pub attempts: u32,
    /// False when the attempt budget ran out with the score unchanged.
    pub converged: bool,
}

/// Pick the next input: horizontal first, then vertical, nothing when on the food.
pub fn choose_key(head: Position, food: Position) -> Option<ArrowKey> {
    if food.x > head.x {
        Some(ArrowKey::Right)
    } else if food.x < head.x {
        Some(ArrowKey::Left)
    } else if food.y > head.y {
        Some(ArrowKey::Down)
    } else if food.y < head.y {
        Some(ArrowKey::Up)
    } else {
        None
    }
}
