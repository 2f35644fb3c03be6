//! Read-only view of the game under test.
//!
//! Nothing here is owned by the suite: every value is a snapshot of state the
//! page exposes on `window.snakeGame` or renders into the DOM.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map the game's unit velocity onto a heading; a stopped snake has none.
    pub fn from_velocity(dx: i64, dy: i64) -> Option<Self> {
        match (dx, dy) {
            (1, _) => Some(Direction::Right),
            (-1, _) => Some(Direction::Left),
            (_, 1) => Some(Direction::Down),
            (_, -1) => Some(Direction::Up),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn key(self) -> ArrowKey {
        match self {
            Direction::Up => ArrowKey::Up,
            Direction::Down => ArrowKey::Down,
            Direction::Left => ArrowKey::Left,
            Direction::Right => ArrowKey::Right,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// The four directional inputs the game listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    pub const ALL: [ArrowKey; 4] = [ArrowKey::Up, ArrowKey::Down, ArrowKey::Left, ArrowKey::Right];

    /// DOM key name dispatched to the page.
    pub fn name(self) -> &'static str {
        match self {
            ArrowKey::Up => "ArrowUp",
            ArrowKey::Down => "ArrowDown",
            ArrowKey::Left => "ArrowLeft",
            ArrowKey::Right => "ArrowRight",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            ArrowKey::Up => Direction::Up,
            ArrowKey::Down => Direction::Down,
            ArrowKey::Left => Direction::Left,
            ArrowKey::Right => Direction::Right,
        }
    }
}

impl fmt::Display for ArrowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    Running,
    Paused,
    GameOver,
}

impl GameState {
    /// Game over takes precedence over paused.
    pub fn from_flags(is_game_over: bool, is_paused: bool) -> Self {
        if is_game_over {
            GameState::GameOver
        } else if is_paused {
            GameState::Paused
        } else {
            GameState::Running
        }
    }
}

/// Wire shape returned by the snapshot script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSnapshot {
    pub head: Position,
    pub food: Position,
    pub dx: i64,
    pub dy: i64,
    pub is_game_over: bool,
    pub is_paused: bool,
    pub tile_count: i64,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub head: Position,
    pub food: Position,
    pub direction: Option<Direction>,
    pub state: GameState,
    pub tile_count: i64,
    pub length: usize,
}

impl From<RawSnapshot> for GameSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self {
            head: raw.head,
            food: raw.food,
            direction: Direction::from_velocity(raw.dx, raw.dy),
            state: GameState::from_flags(raw.is_game_over, raw.is_paused),
            tile_count: raw.tile_count,
            length: raw.length,
        }
    }
}

impl GameSnapshot {
    /// Cell the game places the head on after a reset.
    pub fn center(&self) -> Position {
        Position::new(self.tile_count / 2, self.tile_count / 2)
    }
}

/// Numeric value of the score display; an empty display reads as zero.
pub fn parse_score(text: Option<&str>) -> Result<i64> {
    let trimmed = text.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| anyhow!("Score display is not a number: {:?}", trimmed))
}
