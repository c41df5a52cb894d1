use anyhow::Result;
use ratatui::Frame;

use super::tui::{Controls, TuiApp, restore_terminal, run_event_loop, setup_terminal};
use crate::game::{Direction, GameConfig, GameEngine, GameState};
use crate::input::KeyAction;
use crate::metrics::GameMetrics;
use crate::render::{Renderer, StatusLine};

/// Default tick for keyboard play
pub const HUMAN_TICK_MS: u64 = 150;

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    controls: Controls,
    pending_direction: Option<Direction>,
}

impl HumanMode {
    pub fn new(config: GameConfig, tick_ms: u64) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            controls: Controls::new(tick_ms),
            pending_direction: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = run_event_loop(self, &mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    fn update_game(&mut self) {
        if let Some(dir) = self.pending_direction.take() {
            self.state.snake.steer(dir);
        }

        let result = self.engine.update(&mut self.state);
        if result.terminated() {
            self.metrics.on_episode_end(result.score);
        }
    }

    fn reset_game(&mut self) {
        self.state = self.engine.reset();
        self.metrics.restart_clock();
        self.pending_direction = None;
    }

    fn status(&self) -> StatusLine {
        StatusLine::new("Snake")
            .entry("Length", self.state.snake.len())
            .entry("High", self.metrics.high_score)
            .entry("Time", self.metrics.format_time())
            .entry("Tick", format!("{} ms", self.controls.tick.millis()))
            .paused(self.controls.paused)
            .steering(true)
    }
}

impl TuiApp for HumanMode {
    fn controls(&mut self) -> &mut Controls {
        &mut self.controls
    }

    fn on_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::Steer(dir) => self.pending_direction = Some(dir),
            KeyAction::Restart => self.reset_game(),
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        self.update_game();
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.metrics.update();
        let status = self.status();
        self.renderer.render(frame, &self.state, &status);
    }
}
