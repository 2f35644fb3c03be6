//! Page object for the Snake game.
//!
//! Scenarios talk to the game only through [`SnakeGamePage`]: element ids,
//! the `window.snakeGame` contract and key names stay in this file.

use anyhow::{Context, Result, bail, ensure};
use snake_browser::{BrowserPage, ElementState, Locator, WaitPolicy, wait_for_function};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::game::{
    ArrowKey, Direction, GameSnapshot, GameState, Position, RawSnapshot, parse_score,
};
use crate::steer::{SteerOutcome, SteerPolicy, choose_key};

pub const START_BUTTON: &str = "#startBtn";
pub const PAUSE_BUTTON: &str = "#pauseBtn";
pub const SCORE_DISPLAY: &str = "#score";
pub const GAME_OVER_MESSAGE: &str = "#gameOver";
pub const PLAY_AGAIN_BUTTON: &str = "#playAgainBtn";
pub const RESET_BUTTON: &str = "#resetBtn";
pub const GAME_CANVAS: &str = "#gameCanvas";

/// True once the game has a snake, food and a heading.
pub const GAME_READY_SCRIPT: &str = "(() => {
  const game = window.snakeGame;
  return Boolean(game && game.snake && game.snake.length > 0 && game.food && game.direction);
})()";

/// Everything the suite reads from `window.snakeGame`, in one round trip.
pub const GAME_SNAPSHOT_SCRIPT: &str = "(() => {
  const game = window.snakeGame;
  if (!game || !Array.isArray(game.snake) || game.snake.length === 0 || !game.food) {
    return null;
  }
  return {
    head: { x: game.snake[0].x, y: game.snake[0].y },
    food: { x: game.food.x, y: game.food.y },
    dx: game.dx ?? 0,
    dy: game.dy ?? 0,
    isGameOver: Boolean(game.isGameOver),
    isPaused: Boolean(game.isPaused),
    tileCount: game.tileCount ?? 0,
    length: game.snake.length,
  };
})()";

pub struct SnakeGamePage {
    page: Arc<dyn BrowserPage>,
    base_url: Url,
    wait: WaitPolicy,
    steer: SteerPolicy,
    pub start_button: Locator,
    pub pause_button: Locator,
    pub score_display: Locator,
    pub game_over_message: Locator,
    pub play_again_button: Locator,
    pub reset_button: Locator,
    pub game_canvas: Locator,
}

impl SnakeGamePage {
    pub fn new(page: Arc<dyn BrowserPage>, base_url: Url) -> Self {
        Self::with_policies(page, base_url, WaitPolicy::default(), SteerPolicy::default())
    }

    pub fn with_policies(
        page: Arc<dyn BrowserPage>,
        base_url: Url,
        wait: WaitPolicy,
        steer: SteerPolicy,
    ) -> Self {
        let locator = |selector: &str| Locator::new(page.clone(), selector).with_policy(wait);
        Self {
            start_button: locator(START_BUTTON),
            pause_button: locator(PAUSE_BUTTON),
            score_display: locator(SCORE_DISPLAY),
            game_over_message: locator(GAME_OVER_MESSAGE),
            play_again_button: locator(PLAY_AGAIN_BUTTON),
            reset_button: locator(RESET_BUTTON),
            game_canvas: locator(GAME_CANVAS),
            page,
            base_url,
            wait,
            steer,
        }
    }

    pub fn page(&self) -> &dyn BrowserPage {
        self.page.as_ref()
    }

    pub fn wait_policy(&self) -> &WaitPolicy {
        &self.wait
    }

    pub fn steer_policy(&self) -> &SteerPolicy {
        &self.steer
    }

    /// Load the application root.
    pub async fn navigate(&self) -> Result<()> {
        let url = self.base_url.join("/")?;
        debug!(url = %url, "navigate");
        self.page.goto(url.as_str()).await?;
        Ok(())
    }

    pub async fn wait_until_ready(&self) -> Result<()> {
        wait_for_function(self.page(), GAME_READY_SCRIPT, &self.wait)
            .await
            .context("window.snakeGame never finished initializing")
    }

    pub async fn title(&self) -> Result<String> {
        Ok(self.page.title().await?)
    }

    pub async fn click_start(&self) -> Result<()> {
        Ok(self.start_button.click().await?)
    }

    pub async fn click_pause(&self) -> Result<()> {
        Ok(self.pause_button.click().await?)
    }

    pub async fn click_play_again(&self) -> Result<()> {
        Ok(self.play_again_button.click().await?)
    }

    pub async fn click_reset(&self) -> Result<()> {
        Ok(self.reset_button.click().await?)
    }

    pub async fn read_score(&self) -> Result<Option<String>> {
        Ok(self.score_display.text_content().await?)
    }

    pub async fn score_value(&self) -> Result<i64> {
        parse_score(self.read_score().await?.as_deref())
    }

    pub async fn press_key(&self, key: ArrowKey) -> Result<()> {
        Ok(self.page.press_key(key.name()).await?)
    }

    /// Typed read of `window.snakeGame`; fails until the game has initialized.
    pub async fn snapshot(&self) -> Result<GameSnapshot> {
        let value = self.page.evaluate(GAME_SNAPSHOT_SCRIPT).await?;
        if value.is_null() {
            bail!("window.snakeGame is not initialized (missing snake or food)");
        }
        let raw: RawSnapshot =
            serde_json::from_value(value).context("Unexpected window.snakeGame shape")?;
        Ok(raw.into())
    }

    pub async fn read_snake_head(&self) -> Result<Position> {
        Ok(self.snapshot().await?.head)
    }

    pub async fn read_food(&self) -> Result<Position> {
        Ok(self.snapshot().await?.food)
    }

    /// Current heading, `None` while the snake is not moving.
    pub async fn read_direction(&self) -> Result<Option<Direction>> {
        Ok(self.snapshot().await?.direction)
    }

    pub async fn read_game_state(&self) -> Result<GameState> {
        Ok(self.snapshot().await?.state)
    }

    pub async fn read_tile_count(&self) -> Result<i64> {
        Ok(self.snapshot().await?.tile_count)
    }

    pub async fn wait_for_game_over(&self) -> Result<()> {
        Ok(self.game_over_message.wait_for(ElementState::Visible).await?)
    }

    pub async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(locator.is_visible().await?)
    }

    /// Passive wait, e.g. to let the game loop advance.
    pub async fn pause(&self, duration: Duration) -> Result<()> {
        Ok(self.page.wait_for_timeout(duration).await?)
    }

    /// Steer toward the food one tick at a time until the score text changes
    /// from `initial` or the attempt budget runs out.
    pub async fn eat_food_and_get_score(&self, initial: Option<String>) -> Result<SteerOutcome> {
        let mut current = initial.clone();
        let mut attempts = 0;

        while current == initial && attempts < self.steer.max_attempts {
            let snapshot = self.snapshot().await?;
            let key = choose_key(snapshot.head, snapshot.food);
            if let Some(key) = key {
                self.press_key(key).await?;
            }

            self.pause(self.steer.tick).await?;
            current = self.read_score().await?;
            attempts += 1;
            debug!(
                attempts,
                head = %snapshot.head,
                food = %snapshot.food,
                key = ?key,
                "steer tick"
            );
        }

        let converged = current != initial;
        if !converged {
            warn!(
                attempts,
                score = ?current,
                "Food not reached within the attempt budget"
            );
        }

        Ok(SteerOutcome {
            score: current,
            attempts,
            converged,
        })
    }

    /// Eat `count` foods, requiring the score to rise every time.
    pub async fn grow_snake_by_eating_food(&self, count: u32) -> Result<()> {
        for round in 1..=count {
            let initial = self.read_score().await?;
            let before = parse_score(initial.as_deref())?;
            let outcome = self.eat_food_and_get_score(initial).await?;
            let after = self.score_value().await?;
            ensure!(
                after > before,
                "Score did not increase while growing the snake (round {}/{}: {} -> {} after {} ticks)",
                round,
                count,
                before,
                after,
                outcome.attempts
            );
        }
        Ok(())
    }
}
