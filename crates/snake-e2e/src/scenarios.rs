//! Behavioral scenarios for the Snake game.
//!
//! Every scenario starts from a freshly loaded, ready page (see
//! [`crate::runner`]) and drives the game only through [`SnakeGamePage`].

use anyhow::{Result, ensure};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use snake_browser::{Condition, expect_title};
use std::fmt;
use std::time::Duration;

use crate::game::{ArrowKey, parse_score};
use crate::page::SnakeGamePage;
use crate::steer::SteerOutcome;

pub const EXPECTED_TITLE: &str = "Snake Game";
pub const PAUSE_LABEL: &str = "Pause";
pub const RESUME_LABEL: &str = "Resume";
pub const TARGET_SCORE: i64 = 100;
/// Foods eaten before attempting to run into the body.
pub const SELF_COLLISION_GROWTH: u32 = 3;

const OBSERVE_WAIT: Duration = Duration::from_millis(500);
const SETTLE_WAIT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioId {
    Title,
    StartGame,
    PauseResume,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    EatFood,
    ReachTargetScore,
    WallCollision,
    NoReversal,
    RestartAfterGameOver,
    ResetMovesFood,
    ResetWithoutStart,
    SelfCollision,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 15] = [
        ScenarioId::Title,
        ScenarioId::StartGame,
        ScenarioId::PauseResume,
        ScenarioId::MoveUp,
        ScenarioId::MoveDown,
        ScenarioId::MoveLeft,
        ScenarioId::MoveRight,
        ScenarioId::EatFood,
        ScenarioId::ReachTargetScore,
        ScenarioId::WallCollision,
        ScenarioId::NoReversal,
        ScenarioId::RestartAfterGameOver,
        ScenarioId::ResetMovesFood,
        ScenarioId::ResetWithoutStart,
        ScenarioId::SelfCollision,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenarioId::Title => "title",
            ScenarioId::StartGame => "start-game",
            ScenarioId::PauseResume => "pause-resume",
            ScenarioId::MoveUp => "move-up",
            ScenarioId::MoveDown => "move-down",
            ScenarioId::MoveLeft => "move-left",
            ScenarioId::MoveRight => "move-right",
            ScenarioId::EatFood => "eat-food",
            ScenarioId::ReachTargetScore => "reach-target-score",
            ScenarioId::WallCollision => "wall-collision",
            ScenarioId::NoReversal => "no-reversal",
            ScenarioId::RestartAfterGameOver => "restart-after-game-over",
            ScenarioId::ResetMovesFood => "reset-moves-food",
            ScenarioId::ResetWithoutStart => "reset-without-start",
            ScenarioId::SelfCollision => "self-collision",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScenarioId::Title => "should have the correct title",
            ScenarioId::StartGame => "should start the game when the Start Game button is clicked",
            ScenarioId::PauseResume => "should pause and resume the game",
            ScenarioId::MoveUp => "should move the snake up when the up arrow key is pressed",
            ScenarioId::MoveDown => "should move the snake down when the down arrow key is pressed",
            ScenarioId::MoveLeft => "should move the snake left when the left arrow key is pressed",
            ScenarioId::MoveRight => {
                "should move the snake right when the right arrow key is pressed"
            }
            ScenarioId::EatFood => "should increase the score when the snake eats food",
            ScenarioId::ReachTargetScore => "should reach a score of 100 by eating food",
            ScenarioId::WallCollision => "should end the game when the snake hits a wall",
            ScenarioId::NoReversal => "should prevent 180-degree turns",
            ScenarioId::RestartAfterGameOver => "should restart the game after game over",
            ScenarioId::ResetMovesFood => "clicking reset should move the food",
            ScenarioId::ResetWithoutStart => {
                "clicking reset should reset game state without starting the game"
            }
            ScenarioId::SelfCollision => "should end the game when the snake hits itself",
        }
    }

    pub async fn run(self, game: &SnakeGamePage) -> Result<()> {
        match self {
            ScenarioId::Title => title(game).await,
            ScenarioId::StartGame => start_game(game).await,
            ScenarioId::PauseResume => pause_resume(game).await,
            ScenarioId::MoveUp => move_without_game_over(game, ArrowKey::Up).await,
            ScenarioId::MoveDown => move_without_game_over(game, ArrowKey::Down).await,
            ScenarioId::MoveLeft => move_without_game_over(game, ArrowKey::Left).await,
            ScenarioId::MoveRight => move_without_game_over(game, ArrowKey::Right).await,
            ScenarioId::EatFood => eat_food(game).await,
            ScenarioId::ReachTargetScore => reach_target_score(game).await,
            ScenarioId::WallCollision => wall_collision(game).await,
            ScenarioId::NoReversal => no_reversal(game).await,
            ScenarioId::RestartAfterGameOver => restart_after_game_over(game).await,
            ScenarioId::ResetMovesFood => reset_moves_food(game).await,
            ScenarioId::ResetWithoutStart => reset_without_start(game).await,
            ScenarioId::SelfCollision => self_collision(game).await,
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

async fn title(game: &SnakeGamePage) -> Result<()> {
    expect_title(game.page(), EXPECTED_TITLE, game.wait_policy()).await?;
    game.game_canvas.expect(Condition::Visible).await?;
    Ok(())
}

async fn start_game(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    game.start_button.expect(Condition::Disabled).await?;
    game.pause_button.expect(Condition::Enabled).await?;
    Ok(())
}

async fn pause_resume(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    game.click_pause().await?;
    game.pause_button
        .expect(Condition::Text(RESUME_LABEL.to_string()))
        .await?;

    let paused_at = game.read_snake_head().await?;
    game.pause(OBSERVE_WAIT).await?;
    let still_at = game.read_snake_head().await?;
    ensure!(
        still_at == paused_at,
        "Snake moved while paused: {} -> {}",
        paused_at,
        still_at
    );

    game.click_pause().await?;
    game.pause_button
        .expect(Condition::Text(PAUSE_LABEL.to_string()))
        .await?;
    game.pause(OBSERVE_WAIT).await?;
    let resumed_at = game.read_snake_head().await?;
    ensure!(
        resumed_at != paused_at,
        "Snake did not move after resuming: still at {}",
        resumed_at
    );
    Ok(())
}

async fn move_without_game_over(game: &SnakeGamePage, key: ArrowKey) -> Result<()> {
    game.click_start().await?;
    game.press_key(key).await?;
    game.pause(game.steer_policy().tick).await?;
    game.game_over_message.expect(Condition::Hidden).await?;
    Ok(())
}

async fn eat_food(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    let initial = game.read_score().await?;
    let outcome = game.eat_food_and_get_score(initial.clone()).await?;
    ensure_score_increased(initial.as_deref(), &outcome)
}

async fn reach_target_score(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    let mut current = 0;

    while current < TARGET_SCORE {
        let initial = game.read_score().await?;
        let outcome = game.eat_food_and_get_score(initial).await?;
        ensure!(
            outcome.converged,
            "Food not reached at score {} within {} ticks",
            current,
            outcome.attempts
        );
        current = game.score_value().await?;
        game.pause(SETTLE_WAIT).await?;
    }

    // The loop stops at the first score >= target; anything above it means
    // one food was worth more than the remaining distance.
    ensure!(
        current == TARGET_SCORE,
        "Score overshot the target: expected {}, got {}",
        TARGET_SCORE,
        current
    );
    Ok(())
}

async fn wall_collision(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    run_into_left_wall(game).await
}

async fn no_reversal(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    let tick = game.steer_policy().tick;

    for forward in [ArrowKey::Right, ArrowKey::Down] {
        game.press_key(forward).await?;
        game.pause(tick).await?;
        let before = game.read_direction().await?;

        let backward = forward.direction().opposite().key();
        game.press_key(backward).await?;
        game.pause(tick).await?;
        let after = game.read_direction().await?;

        ensure!(
            after == before,
            "{} reversed the snake: {:?} -> {:?}",
            backward,
            before,
            after
        );
        game.game_over_message.expect(Condition::Hidden).await?;
    }
    Ok(())
}

async fn restart_after_game_over(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    run_into_left_wall(game).await?;

    game.click_play_again().await?;
    game.game_over_message.expect(Condition::Hidden).await?;
    game.start_button.expect(Condition::Disabled).await?;
    game.score_display
        .expect(Condition::Text("0".to_string()))
        .await?;

    // A restarted round must play like a fresh one.
    let initial = game.read_score().await?;
    let outcome = game.eat_food_and_get_score(initial.clone()).await?;
    ensure_score_increased(initial.as_deref(), &outcome)?;

    run_into_left_wall(game).await
}

async fn reset_moves_food(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    let food_before = game.read_food().await?;

    let initial = game.read_score().await?;
    game.eat_food_and_get_score(initial).await?;

    game.click_reset().await?;
    let food_after = game.read_food().await?;
    ensure!(
        food_after != food_before,
        "Food stayed at {} across a reset",
        food_before
    );

    // Reset does not start the game.
    game.click_start().await?;
    let initial = game.read_score().await?;
    let outcome = game.eat_food_and_get_score(initial.clone()).await?;
    ensure_score_increased(initial.as_deref(), &outcome)?;

    run_into_left_wall(game).await
}

async fn reset_without_start(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    game.press_key(ArrowKey::Right).await?;
    game.pause(OBSERVE_WAIT).await?;
    let initial = game.read_score().await?;
    game.eat_food_and_get_score(initial).await?;

    game.click_reset().await?;
    game.score_display
        .expect(Condition::Text("0".to_string()))
        .await?;
    game.start_button.expect(Condition::Enabled).await?;
    game.pause_button.expect(Condition::Disabled).await?;

    let snapshot = game.snapshot().await?;
    ensure!(
        snapshot.head == snapshot.center(),
        "Snake head at {} after reset, expected the centre {}",
        snapshot.head,
        snapshot.center()
    );
    Ok(())
}

async fn self_collision(game: &SnakeGamePage) -> Result<()> {
    game.click_start().await?;
    game.grow_snake_by_eating_food(SELF_COLLISION_GROWTH).await?;

    let tick = game.steer_policy().tick;
    for key in [ArrowKey::Right, ArrowKey::Down, ArrowKey::Left, ArrowKey::Up] {
        game.press_key(key).await?;
        game.pause(tick).await?;
    }

    game.game_over_message.expect(Condition::Visible).await?;
    Ok(())
}

async fn run_into_left_wall(game: &SnakeGamePage) -> Result<()> {
    game.press_key(ArrowKey::Left).await?;
    game.wait_for_game_over().await?;
    game.game_over_message.expect(Condition::Visible).await?;
    Ok(())
}

fn ensure_score_increased(initial: Option<&str>, outcome: &SteerOutcome) -> Result<()> {
    let before = parse_score(initial)?;
    let after = parse_score(outcome.score.as_deref())?;
    ensure!(
        after > before,
        "Score did not increase after {} ticks ({} -> {}, converged: {})",
        outcome.attempts,
        before,
        after,
        outcome.converged
    );
    Ok(())
}
