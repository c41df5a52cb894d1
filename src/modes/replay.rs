//! Replay a recorded best path
//!
//! Each tick forces the recorded fruit position and direction onto the world
//! and commits it without relocating eaten fruit, so the recorded episode
//! plays back exactly.

use anyhow::{Context, Result};
use ratatui::Frame;
use std::path::Path;
use tracing::info;

use super::tui::{Controls, TuiApp, restore_terminal, run_event_loop, setup_terminal};
use crate::game::{GameConfig, GameEngine, GameState, StepResult};
use crate::input::KeyAction;
use crate::render::{Renderer, StatusLine};
use crate::rl::{EpisodeRecord, load_best_path};

pub struct ReplayMode {
    record: EpisodeRecord,
    cursor: usize,
    /// Score reached by the replayed episode so far
    score: u32,
    engine: GameEngine,
    state: GameState,
    renderer: Renderer,
    controls: Controls,
}

impl ReplayMode {
    pub fn new(path: &Path, config: GameConfig, tick_ms: u64) -> Result<Self> {
        let record = load_best_path(path)
            .with_context(|| format!("Failed to load recorded path {:?}", path))?;
        info!(path = %path.display(), ticks = record.len(), "loaded recorded path");
        Ok(Self::from_record(record, config, tick_ms))
    }

    pub fn from_record(record: EpisodeRecord, config: GameConfig, tick_ms: u64) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();
        Self {
            record,
            cursor: 0,
            score: 0,
            engine,
            state,
            renderer: Renderer::new(),
            controls: Controls::new(tick_ms),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = run_event_loop(self, &mut terminal).await;
        restore_terminal(&mut terminal)?;
        result?;

        println!(
            "Replayed {}/{} ticks, score {}",
            self.cursor,
            self.record.len(),
            self.score
        );
        Ok(())
    }

    /// Play the next recorded tick. Returns `None` once the path is exhausted.
    fn step(&mut self) -> Option<StepResult> {
        let step = *self.record.steps().get(self.cursor)?;
        self.cursor += 1;

        self.state.fruit = step.fruit;
        self.state.snake.direction = step.direction;
        let result = self.engine.update_scripted(&mut self.state);
        self.score = result.score;

        if self.is_finished() {
            info!(score = self.score, ticks = self.cursor, "replay finished");
        }
        Some(result)
    }

    fn restart(&mut self) {
        self.state = self.engine.reset();
        self.cursor = 0;
        self.score = 0;
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.record.len()
    }

    fn status(&self) -> StatusLine {
        let mode = if self.is_finished() {
            "Replay (done)"
        } else {
            "Replay"
        };
        StatusLine::new(mode)
            .entry("Tick", format!("{}/{}", self.cursor, self.record.len()))
            .entry("Points", self.score)
            .entry("Speed", format!("{} ms", self.controls.tick.millis()))
            .paused(self.controls.paused)
    }
}

impl TuiApp for ReplayMode {
    fn controls(&mut self) -> &mut Controls {
        &mut self.controls
    }

    fn on_key(&mut self, action: KeyAction) {
        if action == KeyAction::Restart {
            self.restart();
        }
    }

    fn on_tick(&mut self) {
        self.step();
    }

    fn draw(&mut self, frame: &mut Frame) {
        let status = self.status();
        self.renderer.render(frame, &self.state, &status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};
    use crate::rl::{QAgent, QLearningConfig};

    /// Record one training episode against a seeded engine
    fn record_episode(seed: u64) -> (EpisodeRecord, u32) {
        let mut agent = QAgent::with_seed(QLearningConfig::default(), seed);
        let mut engine = GameEngine::with_seed(GameConfig::training(), seed);
        let mut world = engine.reset();

        loop {
            let report = agent.train_tick(&world);
            world.snake.direction = report.action;
            let step = engine.update(&mut world);
            if step.terminated() {
                break;
            }
        }

        // Empty unless the episode scored
        (agent.best_path().clone(), agent.best_score())
    }

    #[test]
    fn test_replay_reproduces_recorded_score() {
        for seed in 0..20 {
            let (record, score) = record_episode(seed);
            if record.is_empty() {
                continue;
            }

            let mut mode = ReplayMode::from_record(record, GameConfig::training(), 50);
            let mut last = None;
            while let Some(result) = mode.step() {
                last = Some(result);
            }

            let last = last.unwrap();
            assert!(mode.is_finished());
            assert_eq!(mode.score, score);
            // The recorded episode ended on a collision
            assert!(last.terminated());
            assert_eq!(last.score, score);
        }
    }

    #[test]
    fn test_scripted_fruit_is_used() {
        let mut record = EpisodeRecord::new();
        record.push(Direction::Right, Position::new(6, 10));
        record.push(Direction::Up, Position::new(15, 15));

        let mut mode = ReplayMode::from_record(record, GameConfig::training(), 50);
        mode.step();
        assert_eq!(mode.score, 1);
        assert_eq!(mode.state.snake.head(), Position::new(6, 10));
        assert_eq!(mode.state.snake.len(), 3);

        mode.step();
        assert_eq!(mode.state.fruit, Position::new(15, 15));
        assert_eq!(mode.state.snake.head(), Position::new(6, 9));
        assert_eq!(mode.state.snake.len(), 4);

        assert!(mode.is_finished());
        assert!(mode.step().is_none());
    }

    #[test]
    fn test_restart_rewinds() {
        let mut record = EpisodeRecord::new();
        record.push(Direction::Right, Position::new(0, 0));

        let mut mode = ReplayMode::from_record(record, GameConfig::training(), 50);
        mode.step();
        assert!(mode.is_finished());

        mode.restart();
        assert!(!mode.is_finished());
        assert_eq!(mode.state.snake.head(), Position::new(5, 10));

        // The restart key does the same; steering is ignored
        mode.on_tick();
        mode.on_key(KeyAction::Steer(Direction::Up));
        assert!(mode.is_finished());
        mode.on_key(KeyAction::Restart);
        assert_eq!(mode.cursor, 0);
    }
}
