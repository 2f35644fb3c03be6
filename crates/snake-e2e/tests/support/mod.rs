//! In-process stand-in for the Snake game page.
//!
//! Time only moves through `wait_for_timeout`, one game tick per 100 ms, so
//! every scenario is deterministic and runs without sleeping. Food placement
//! is predictable: always a few cells from the head in the direction of
//! travel and toward the board centre, which keeps it reachable by the greedy
//! steering without reversing.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use snake_browser::{BrowserError, BrowserPage, ElementInfo, PageFactory, Result};
use snake_e2e::page::{GAME_READY_SCRIPT, GAME_SNAPSHOT_SCRIPT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub const TILE_COUNT: i64 = 20;
pub const TICK_MS: u64 = 100;
pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

pub fn base_url() -> Url {
    Url::parse("http://snake.test:8080/").unwrap()
}

/// Knobs for pages that misbehave on purpose.
#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    /// `window.snakeGame` never appears.
    pub never_ready: bool,
    /// Reversal keys are honoured, as in a buggy game.
    pub allow_reversal: bool,
    /// Score added per food.
    pub points: i64,
    /// The pause button flips its label but the loop keeps ticking.
    pub ignores_pause: bool,
    /// The head wraps around the board edges, so walls never end the game.
    pub walls_wrap: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            never_ready: false,
            allow_reversal: false,
            points: 10,
            ignores_pause: false,
            walls_wrap: false,
        }
    }
}

#[derive(Debug)]
struct Game {
    options: SimOptions,
    snake: Vec<(i64, i64)>,
    dx: i64,
    dy: i64,
    food: (i64, i64),
    score: i64,
    running: bool,
    paused: bool,
    over: bool,
    spawns: i64,
    elapsed_ms: u64,
}

impl Game {
    fn new(options: SimOptions) -> Self {
        let mut game = Self {
            options,
            snake: Vec::new(),
            dx: 1,
            dy: 0,
            food: (0, 0),
            score: 0,
            running: false,
            paused: false,
            over: false,
            spawns: 0,
            elapsed_ms: 0,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        let center = TILE_COUNT / 2;
        self.snake = vec![(center, center)];
        self.dx = 1;
        self.dy = 0;
        self.score = 0;
        self.running = false;
        self.paused = false;
        self.over = false;
        self.spawn_food();
    }

    fn start(&mut self) {
        self.running = true;
        self.elapsed_ms = 0;
    }

    fn spawn_food(&mut self) {
        let (hx, hy) = self.snake[0];
        let reach = 3 + self.spawns % 3;
        self.spawns += 1;
        let toward_center = |c: i64| if c < TILE_COUNT / 2 { c + reach } else { c - reach };
        self.food = if self.dx != 0 {
            ((hx + self.dx * reach).clamp(0, TILE_COUNT - 1), toward_center(hy))
        } else {
            (toward_center(hx), toward_center(hy))
        };
    }

    fn steer(&mut self, dx: i64, dy: i64) {
        let reverses = (dx != 0 && dx == -self.dx) || (dy != 0 && dy == -self.dy);
        if reverses && !self.options.allow_reversal {
            return;
        }
        self.dx = dx;
        self.dy = dy;
    }

    fn tick(&mut self) {
        let halted = self.paused && !self.options.ignores_pause;
        if !self.running || halted || self.over {
            return;
        }
        let (hx, hy) = self.snake[0];
        let mut head = (hx + self.dx, hy + self.dy);
        if self.options.walls_wrap {
            head = (head.0.rem_euclid(TILE_COUNT), head.1.rem_euclid(TILE_COUNT));
        }
        let off_board = !(0..TILE_COUNT).contains(&head.0) || !(0..TILE_COUNT).contains(&head.1);
        if off_board || self.snake.contains(&head) {
            self.over = true;
            self.running = false;
            return;
        }
        self.snake.insert(0, head);
        if head == self.food {
            self.score += self.options.points;
            self.spawn_food();
        } else {
            self.snake.pop();
        }
    }

    fn advance(&mut self, ms: u64) {
        self.elapsed_ms += ms;
        while self.elapsed_ms >= TICK_MS {
            self.elapsed_ms -= TICK_MS;
            self.tick();
        }
    }

    fn element(&self, selector: &str) -> Option<ElementInfo> {
        let info = |visible: bool, enabled: bool, text: Option<&str>| ElementInfo {
            visible,
            enabled,
            text: text.map(str::to_string),
        };
        let startable = !self.running && !self.over;
        match selector {
            "#startBtn" => Some(info(true, startable, Some("Start Game"))),
            "#pauseBtn" => {
                let label = if self.paused { "Resume" } else { "Pause" };
                Some(info(true, self.running && !self.over, Some(label)))
            }
            "#score" => Some(ElementInfo {
                visible: true,
                enabled: true,
                text: Some(self.score.to_string()),
            }),
            "#gameOver" => Some(info(self.over, true, Some("Game Over!"))),
            "#playAgainBtn" => Some(info(self.over, true, Some("Play Again"))),
            "#resetBtn" => Some(info(true, true, Some("Reset"))),
            "#gameCanvas" => Some(info(true, true, None)),
            _ => None,
        }
    }

    fn snapshot(&self) -> Value {
        let (hx, hy) = self.snake[0];
        json!({
            "head": {"x": hx, "y": hy},
            "food": {"x": self.food.0, "y": self.food.1},
            "dx": self.dx,
            "dy": self.dy,
            "isGameOver": self.over,
            "isPaused": self.paused,
            "tileCount": TILE_COUNT,
            "length": self.snake.len(),
        })
    }
}

/// One simulated tab.
pub struct SimulatedGamePage {
    options: SimOptions,
    game: Mutex<Option<Game>>,
    visited: Mutex<Vec<String>>,
    keys: Mutex<Vec<String>>,
    waited_ms: AtomicUsize,
    screenshots: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl SimulatedGamePage {
    pub fn new() -> Self {
        Self::with_options(SimOptions::default())
    }

    pub fn with_options(options: SimOptions) -> Self {
        Self::tracked(options, Arc::new(AtomicUsize::new(0)))
    }

    fn tracked(options: SimOptions, closed: Arc<AtomicUsize>) -> Self {
        Self {
            options,
            game: Mutex::new(None),
            visited: Mutex::new(Vec::new()),
            keys: Mutex::new(Vec::new()),
            waited_ms: AtomicUsize::new(0),
            screenshots: AtomicUsize::new(0),
            closed,
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }

    pub fn waited(&self) -> Duration {
        Duration::from_millis(self.waited_ms.load(Ordering::SeqCst) as u64)
    }

    pub fn score(&self) -> i64 {
        self.with_game(|game| game.score)
    }

    pub fn snake_len(&self) -> usize {
        self.with_game(|game| game.snake.len())
    }

    pub fn is_game_over(&self) -> bool {
        self.with_game(|game| game.over)
    }

    pub fn is_running(&self) -> bool {
        self.with_game(|game| game.running)
    }

    /// Put food directly on a cell, bypassing the spawn rule.
    pub fn place_food(&self, x: i64, y: i64) {
        self.with_game(|game| game.food = (x, y));
    }

    fn with_game<T>(&self, f: impl FnOnce(&mut Game) -> T) -> T {
        let mut guard = self.game.lock().unwrap();
        let game = guard.as_mut().expect("page was never navigated");
        f(game)
    }

    fn loaded<T>(&self, f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        self.game.lock().unwrap().as_mut().map(f)
    }
}

#[async_trait]
impl BrowserPage for SimulatedGamePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        *self.game.lock().unwrap() = Some(Game::new(self.options));
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self
            .loaded(|_| "Snake Game".to_string())
            .unwrap_or_default())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        if self.options.never_ready {
            return Ok(if expression == GAME_READY_SCRIPT {
                Value::Bool(false)
            } else {
                Value::Null
            });
        }
        if expression == GAME_READY_SCRIPT {
            Ok(Value::Bool(self.loaded(|_| true).unwrap_or(false)))
        } else if expression == GAME_SNAPSHOT_SCRIPT {
            Ok(self.loaded(|game| game.snapshot()).unwrap_or(Value::Null))
        } else {
            Err(BrowserError::Evaluation(format!(
                "unsupported expression: {}",
                expression
            )))
        }
    }

    async fn query(&self, selector: &str) -> Result<Option<ElementInfo>> {
        Ok(self.loaded(|game| game.element(selector)).flatten())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let handled = self.loaded(|game| match selector {
            "#startBtn" => {
                game.start();
                true
            }
            "#pauseBtn" => {
                game.paused = !game.paused;
                true
            }
            "#playAgainBtn" => {
                game.reset();
                game.start();
                true
            }
            "#resetBtn" => {
                game.reset();
                true
            }
            "#score" | "#gameOver" | "#gameCanvas" => true,
            _ => false,
        });
        match handled {
            Some(true) => Ok(()),
            _ => Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let (dx, dy) = match key {
            "ArrowUp" => (0, -1),
            "ArrowDown" => (0, 1),
            "ArrowLeft" => (-1, 0),
            "ArrowRight" => (1, 0),
            other => return Err(BrowserError::UnknownKey(other.to_string())),
        };
        self.keys.lock().unwrap().push(key.to_string());
        self.loaded(|game| game.steer(dx, dy));
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        let ms = duration.as_millis() as u64;
        self.waited_ms.fetch_add(ms as usize, Ordering::SeqCst);
        self.loaded(|game| game.advance(ms));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        Ok(PNG_MAGIC.to_vec())
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out a fresh simulated page per call.
pub struct SimulatedBrowser {
    options: SimOptions,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl SimulatedBrowser {
    pub fn new() -> Self {
        Self::with_options(SimOptions::default())
    }

    pub fn with_options(options: SimOptions) -> Self {
        Self {
            options,
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFactory for SimulatedBrowser {
    async fn new_page(&self) -> Result<Arc<dyn BrowserPage>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(SimulatedGamePage::tracked(
            self.options,
            self.closed.clone(),
        )))
    }
}
