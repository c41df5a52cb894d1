//! Watch a trained table play greedily
//!
//! The table is never updated here. Episodes restart automatically after a
//! collision; the best-scoring path seen is written out on quit.

use anyhow::{Context, Result};
use ratatui::Frame;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::tui::{Controls, TuiApp, restore_terminal, run_event_loop, setup_terminal};
use crate::game::{GameConfig, GameEngine, GameState};
use crate::metrics::GameMetrics;
use crate::render::{Renderer, StatusLine};
use crate::rl::{QAgent, best_path_file, load_metadata, load_q_table, save_best_path};

pub struct RunMode {
    agent: QAgent,
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    controls: Controls,
    out_dir: PathBuf,
}

impl RunMode {
    /// Load the table at `q_table` for play on `config`'s grid
    pub fn new(
        q_table: &Path,
        config: GameConfig,
        out_dir: PathBuf,
        tick_ms: u64,
    ) -> Result<Self> {
        let table = load_q_table(q_table)
            .with_context(|| format!("Failed to load trained table {:?}", q_table))?;

        match load_metadata(q_table) {
            Some(meta) if meta.grid_size != config.grid_size => warn!(
                trained = meta.grid_size,
                playing = config.grid_size,
                "table was trained on a different grid size"
            ),
            Some(meta) => info!(
                episodes = meta.episodes_trained,
                best_score = meta.best_score,
                "loaded table metadata"
            ),
            None => {}
        }

        Ok(Self::with_agent(
            QAgent::for_evaluation(table),
            GameEngine::new(config),
            out_dir,
            tick_ms,
        ))
    }

    fn with_agent(agent: QAgent, mut engine: GameEngine, out_dir: PathBuf, tick_ms: u64) -> Self {
        let state = engine.reset();
        Self {
            agent,
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            controls: Controls::new(tick_ms),
            out_dir,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let session = run_event_loop(self, &mut terminal).await;
        let saved = self.finish(session);
        restore_terminal(&mut terminal)?;

        if let Some(path) = saved? {
            println!(
                "Best path ({} points) saved to: {:?}",
                self.agent.best_score(),
                path
            );
        }
        Ok(())
    }

    /// Write the best path however the session ended, then report the
    /// session's own error first
    fn finish(&self, session: Result<()>) -> Result<Option<PathBuf>> {
        let saved = self.save_best_path();
        match (session, saved) {
            (Ok(()), saved) => saved,
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(save_err)) => {
                warn!(error = %save_err, "failed to save best path");
                Err(err)
            }
        }
    }

    /// One greedy decision followed by one engine tick
    fn step(&mut self) {
        let report = self.agent.greedy_tick(&self.state);
        self.state.snake.direction = report.action;
        self.engine.update(&mut self.state);

        if let Some(score) = report.finished_score {
            self.metrics.on_episode_end(score);
        }
    }

    /// Write the best path seen so far, if any episode scored
    fn save_best_path(&self) -> Result<Option<PathBuf>> {
        let best = self.agent.best_path();
        if best.is_empty() {
            return Ok(None);
        }
        let path = best_path_file(&self.out_dir, self.agent.best_score());
        save_best_path(best, &path)?;
        Ok(Some(path))
    }

    fn status(&self) -> StatusLine {
        StatusLine::new("Run")
            .entry("Episode", self.metrics.episodes_played + 1)
            .entry("Best", self.agent.best_score())
            .entry("Mean", format!("{:.2}", self.metrics.mean_score()))
            .entry("Tick", format!("{} ms", self.controls.tick.millis()))
            .paused(self.controls.paused)
    }
}

impl TuiApp for RunMode {
    fn controls(&mut self) -> &mut Controls {
        &mut self.controls
    }

    fn on_tick(&mut self) {
        self.step();
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.metrics.update();
        let status = self.status();
        self.renderer.render(frame, &self.state, &status);
    }
}
