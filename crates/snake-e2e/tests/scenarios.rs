mod support;

use snake_browser::WaitPolicy;
use snake_e2e::game::{Direction, GameState, Position};
use snake_e2e::page::SnakeGamePage;
use snake_e2e::scenarios::{ScenarioId, TARGET_SCORE};
use snake_e2e::steer::SteerPolicy;
use std::sync::Arc;
use std::time::Duration;
use support::{SimOptions, SimulatedGamePage, base_url};

async fn loaded_game(options: SimOptions) -> (Arc<SimulatedGamePage>, SnakeGamePage) {
    let page = Arc::new(SimulatedGamePage::with_options(options));
    let game = SnakeGamePage::new(page.clone(), base_url());
    game.navigate().await.unwrap();
    game.wait_until_ready().await.unwrap();
    (page, game)
}

/// A game whose steering gives up after two ticks, before any food is in reach.
async fn impatient_game() -> (Arc<SimulatedGamePage>, SnakeGamePage) {
    let page = Arc::new(SimulatedGamePage::new());
    let steer = SteerPolicy {
        tick: Duration::from_millis(100),
        max_attempts: 2,
    };
    let game = SnakeGamePage::with_policies(page.clone(), base_url(), WaitPolicy::default(), steer);
    game.navigate().await.unwrap();
    game.wait_until_ready().await.unwrap();
    (page, game)
}

async fn run(scenario: ScenarioId) -> (Arc<SimulatedGamePage>, anyhow::Result<()>) {
    let (page, game) = loaded_game(SimOptions::default()).await;
    let result = scenario.run(&game).await;
    (page, result)
}

#[tokio::test]
async fn every_scenario_passes_against_a_well_behaved_game() {
    for scenario in ScenarioId::ALL {
        let (_, result) = run(scenario).await;
        assert!(result.is_ok(), "{} failed: {:#}", scenario, result.unwrap_err());
    }
}

#[tokio::test]
async fn target_score_is_reached_exactly() {
    let (page, result) = run(ScenarioId::ReachTargetScore).await;
    result.unwrap();
    assert_eq!(page.score(), TARGET_SCORE);
    assert!(!page.is_game_over());
}

#[tokio::test]
async fn wall_collision_ends_the_round() {
    let (page, result) = run(ScenarioId::WallCollision).await;
    result.unwrap();
    assert!(page.is_game_over());
    assert!(!page.is_running());
}

#[tokio::test]
async fn self_collision_needs_a_grown_snake() {
    let (page, result) = run(ScenarioId::SelfCollision).await;
    result.unwrap();
    assert!(page.is_game_over());
    assert_eq!(page.score(), 30);
    assert_eq!(page.snake_len(), 4);
}

#[tokio::test]
async fn reset_leaves_the_game_stopped_at_the_centre() {
    let (page, result) = run(ScenarioId::ResetWithoutStart).await;
    result.unwrap();
    assert!(!page.is_running());
    assert_eq!(page.score(), 0);
}

#[tokio::test]
async fn reversal_is_reported_when_the_game_allows_it() {
    let options = SimOptions {
        allow_reversal: true,
        ..SimOptions::default()
    };
    let (_, game) = loaded_game(options).await;

    let err = ScenarioId::NoReversal.run(&game).await.unwrap_err();

    assert!(err.to_string().contains("reversed the snake"), "{err:#}");
    assert_eq!(game.read_direction().await.unwrap(), Some(Direction::Left));
}

#[tokio::test]
async fn pause_freezes_the_head() {
    let (_, game) = loaded_game(SimOptions::default()).await;
    game.click_start().await.unwrap();
    game.click_pause().await.unwrap();

    let before = game.read_snake_head().await.unwrap();
    game.pause(std::time::Duration::from_millis(500)).await.unwrap();

    assert_eq!(game.read_snake_head().await.unwrap(), before);
    assert_eq!(game.read_game_state().await.unwrap(), GameState::Paused);
    assert_eq!(before, Position::new(10, 10));
}

#[tokio::test]
async fn overshooting_the_target_score_fails() {
    let options = SimOptions {
        points: 15,
        ..SimOptions::default()
    };
    let (page, game) = loaded_game(options).await;

    let err = ScenarioId::ReachTargetScore.run(&game).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Score overshot the target: expected 100, got 105"
    );
    assert_eq!(page.score(), 105);
}

#[tokio::test]
async fn target_score_fails_when_food_is_out_of_reach() {
    let (page, game) = impatient_game().await;

    let err = ScenarioId::ReachTargetScore.run(&game).await.unwrap_err();

    assert_eq!(err.to_string(), "Food not reached at score 0 within 2 ticks");
    assert_eq!(page.score(), 0);
}

#[tokio::test]
async fn growing_the_snake_fails_when_the_score_stalls() {
    let (page, game) = impatient_game().await;
    game.click_start().await.unwrap();

    let err = game.grow_snake_by_eating_food(3).await.unwrap_err();

    assert!(
        err.to_string()
            .starts_with("Score did not increase while growing the snake (round 1/3: 0 -> 0"),
        "{err:#}"
    );
    assert_eq!(page.snake_len(), 1);
}

#[tokio::test]
async fn self_collision_stops_at_the_growth_step_when_food_is_out_of_reach() {
    let (page, game) = impatient_game().await;

    let err = ScenarioId::SelfCollision.run(&game).await.unwrap_err();

    assert!(err.to_string().contains("while growing the snake"), "{err:#}");
    assert!(!page.is_game_over());
}

#[tokio::test]
async fn pause_that_does_not_stop_the_loop_is_reported() {
    let options = SimOptions {
        ignores_pause: true,
        ..SimOptions::default()
    };
    let (_, game) = loaded_game(options).await;

    let err = ScenarioId::PauseResume.run(&game).await.unwrap_err();

    assert!(err.to_string().starts_with("Snake moved while paused"), "{err:#}");
}

#[tokio::test]
async fn wall_collision_times_out_when_walls_wrap() {
    let options = SimOptions {
        walls_wrap: true,
        ..SimOptions::default()
    };
    let (page, game) = loaded_game(options).await;

    let err = ScenarioId::WallCollision.run(&game).await.unwrap_err();

    assert!(
        err.downcast_ref::<snake_browser::BrowserError>()
            .is_some_and(snake_browser::BrowserError::is_timeout),
        "{err:#}"
    );
    assert!(err.to_string().contains("#gameOver to be visible"), "{err:#}");
    assert!(!page.is_game_over());
    assert!(page.is_running());
}
