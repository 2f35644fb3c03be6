//! End-to-end scenarios for the browser Snake game.
//!
//! [`page::SnakeGamePage`] is the only code that knows the game's DOM and its
//! `window.snakeGame` contract; [`scenarios`] script behaviors against it and
//! [`runner::ScenarioRunner`] executes them on isolated pages from any
//! [`snake_browser::PageFactory`].

pub mod config;
pub mod game;
pub mod page;
pub mod runner;
pub mod scenarios;
pub mod steer;

pub use config::E2eConfig;
pub use game::{ArrowKey, Direction, GameSnapshot, GameState, Position};
pub use page::SnakeGamePage;
pub use runner::{RunReport, RunnerOptions, ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;
pub use steer::{SteerOutcome, SteerPolicy};
