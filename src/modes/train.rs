//! Headless Q-learning training
//!
//! Runs epsilon-greedy episodes on the training grid until the configured
//! episode count is reached or a stop is requested, then writes the Q-table
//! (with its metadata sidecar) and the best-scoring path.
//!
//! # Example
//!
//! ```rust,no_run
//! use qsnake::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//! use std::sync::atomic::AtomicBool;
//!
//! let config = TrainConfig::new(PathBuf::from("out"));
//! let mut train_mode = TrainMode::new(config)?;
//! let summary = train_mode.run(&AtomicBool::new(false))?;
//! println!("best score {}", summary.best_score);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::game::{GameConfig, GameEngine, GameState};
use crate::metrics::TrainingStats;
use crate::rl::{
    QAgent, QLearningConfig, TableMetadata, best_path_file, q_table_file, save_best_path,
    save_q_table,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Game configuration (grid size, starting snake)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters and episode limit
    pub q_config: QLearningConfig,

    /// Root directory for `trained_q_matrices/` and `paths/`
    pub out_dir: PathBuf,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Seed for both the agent and fruit placement
    pub seed: Option<u64>,
}

impl TrainConfig {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            game_config: GameConfig::training(),
            q_config: QLearningConfig::default(),
            out_dir,
            log_frequency: 100,
            seed: None,
        }
    }
}

/// Where a finished training run left its artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub episodes: usize,
    pub best_score: u32,
    pub q_table_path: PathBuf,
    /// Absent when no episode produced a path
    pub best_path_path: Option<PathBuf>,
    /// Running average of the episode scores over `trend_window` episodes
    pub score_trend: Vec<f64>,
    pub trend_window: usize,
}

/// Smoothing window for the end-of-run score trend: a tenth of the run
pub fn trend_window(episodes: usize) -> usize {
    (episodes / 10).max(1)
}

pub struct TrainMode {
    agent: QAgent,
    engine: GameEngine,
    state: GameState,
    stats: TrainingStats,
    config: TrainConfig,

    /// Reward accumulated in the running episode
    episode_reward: f64,

    /// Ticks taken in the running episode
    episode_ticks: usize,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config
            .game_config
            .validate()
            .map_err(|e| anyhow!("Invalid game config: {e}"))?;
        config
            .q_config
            .validate()
            .map_err(|e| anyhow!("Invalid Q-learning config: {e}"))?;

        let (agent, mut engine) = match config.seed {
            Some(seed) => (
                QAgent::with_seed(config.q_config.clone(), seed),
                GameEngine::with_seed(config.game_config.clone(), seed),
            ),
            None => (
                QAgent::new(config.q_config.clone()),
                GameEngine::new(config.game_config.clone()),
            ),
        };
        let state = engine.reset();

        Ok(Self {
            agent,
            engine,
            state,
            stats: TrainingStats::new(100),
            config,
            episode_reward: 0.0,
            episode_ticks: 0,
        })
    }

    /// Train until the episode limit or until `stop` is raised, then save
    pub fn run(&mut self, stop: &AtomicBool) -> Result<TrainSummary> {
        self.print_header();

        while !self.agent.is_done() {
            if stop.load(Ordering::Relaxed) {
                info!(episodes = self.agent.episodes(), "training interrupted");
                break;
            }
            self.tick();
        }

        let summary = self.save()?;

        println!("\nTraining complete!");
        println!("Q-table saved to: {:?}", summary.q_table_path);
        if let Some(path) = &summary.best_path_path {
            println!("Best path saved to: {:?}", path);
        }
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());
        self.print_trend(&summary);

        Ok(summary)
    }

    /// Advance the simulation by one agent decision
    fn tick(&mut self) {
        let report = self.agent.train_tick(&self.state);
        self.episode_reward += report.reward;
        self.episode_ticks += 1;

        self.state.snake.direction = report.action;
        self.engine.update(&mut self.state);

        if let Some(score) = report.finished_score {
            self.stats
                .record_episode(self.episode_reward, self.episode_ticks, score);
            let params = self.agent.params();
            self.stats.record_params(params.alpha, params.epsilon);
            self.episode_reward = 0.0;
            self.episode_ticks = 0;

            let episodes = self.agent.episodes();
            if self.config.log_frequency > 0 && episodes % self.config.log_frequency == 0 {
                self.print_progress(episodes);
            }
        }
    }

    /// Write the Q-table and, if any, the best path
    fn save(&self) -> Result<TrainSummary> {
        let episodes = self.agent.episodes();
        let best_score = self.agent.best_score();

        let q_table_path = q_table_file(&self.config.out_dir, episodes);
        let metadata = TableMetadata::new(
            self.config.game_config.grid_size,
            episodes,
            best_score,
            *self.agent.params(),
        );
        save_q_table(self.agent.table(), &q_table_path, Some(&metadata))?;

        let best_path = self.agent.best_path();
        let best_path_path = if best_path.is_empty() {
            None
        } else {
            let path = best_path_file(&self.config.out_dir, best_score);
            save_best_path(best_path, &path)?;
            Some(path)
        };

        let trend_window = trend_window(episodes);
        Ok(TrainSummary {
            episodes,
            best_score,
            q_table_path,
            best_path_path,
            score_trend: self.stats.running_average(trend_window),
            trend_window,
        })
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn print_header(&self) {
        let q = &self.config.q_config;
        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Snake");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", q.max_episodes);
        println!("Grid: {0}x{0}", self.config.game_config.grid_size);
        println!("Q-Learning Config:");
        println!("  Alpha: {} (floor {})", q.alpha, q.alpha_floor);
        println!("  Gamma: {}", q.gamma);
        println!("  Epsilon: {} (floor {})", q.epsilon, q.epsilon_floor);
        println!(
            "  Rewards: fruit {} / collision {} / move {}",
            q.rewards.fruit, q.rewards.collision, q.rewards.step
        );
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Output dir: {:?}", self.config.out_dir);
        println!("{}", "=".repeat(70));
        println!();
    }

    /// One line per `trend_window` episodes of the smoothed score
    fn print_trend(&self, summary: &TrainSummary) {
        if summary.score_trend.is_empty() {
            return;
        }
        let window = summary.trend_window;
        println!("\nScore trend ({window}-episode running average):");
        for (i, average) in summary.score_trend.iter().enumerate().step_by(window) {
            println!("  Episode {:>6}: {:.2}", i + window, average);
        }
        if let Some(last) = summary.score_trend.last() {
            info!(window, final_average = last, "score trend");
        }
    }

    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {}",
            episode,
            self.config.q_config.max_episodes,
            self.stats.format_summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{load_best_path, load_metadata, load_q_table};
    use tempfile::TempDir;

    fn small_config(out_dir: PathBuf, episodes: usize) -> TrainConfig {
        let mut config = TrainConfig::new(out_dir);
        config.q_config.max_episodes = episodes;
        config.log_frequency = 5;
        config.seed = Some(11);
        config
    }

    #[test]
    fn test_train_config_defaults() {
        let config = TrainConfig::new(PathBuf::from("out"));
        assert_eq!(config.game_config.grid_size, 20);
        assert_eq!(config.q_config.max_episodes, 2500);
        assert_eq!(config.out_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = TrainConfig::new(PathBuf::from("out"));
        config.q_config.gamma = 1.5;
        assert!(TrainMode::new(config).is_err());
    }

    #[test]
    fn test_run_saves_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let config = small_config(temp_dir.path().to_path_buf(), 10);
        let mut train_mode = TrainMode::new(config).unwrap();

        let summary = train_mode.run(&AtomicBool::new(false)).unwrap();

        assert_eq!(summary.episodes, 10);
        assert_eq!(
            summary.q_table_path,
            temp_dir
                .path()
                .join("trained_q_matrices")
                .join("trained_array_10.npy")
        );
        assert_eq!(train_mode.stats().episodes(), 10);
        assert_eq!(train_mode.stats().best_score(), summary.best_score);

        let table = load_q_table(&summary.q_table_path).unwrap();
        assert!(table.visited_states() > 0);

        let metadata = load_metadata(&summary.q_table_path).unwrap();
        assert_eq!(metadata.episodes_trained, 10);
        assert_eq!(metadata.best_score, summary.best_score);

        // A best path exists once some episode scored
        match summary.best_path_path {
            Some(path) => {
                assert!(summary.best_score > 0);
                assert!(!load_best_path(&path).unwrap().is_empty());
            }
            None => assert_eq!(summary.best_score, 0),
        }
    }

    #[test]
    fn test_trend_window_is_a_tenth() {
        assert_eq!(trend_window(2500), 250);
        assert_eq!(trend_window(20), 2);
        assert_eq!(trend_window(9), 1);
        assert_eq!(trend_window(0), 1);
    }

    #[test]
    fn test_run_reports_score_trend() {
        let temp_dir = TempDir::new().unwrap();
        let config = small_config(temp_dir.path().to_path_buf(), 20);
        let mut train_mode = TrainMode::new(config).unwrap();

        let summary = train_mode.run(&AtomicBool::new(false)).unwrap();

        assert_eq!(summary.trend_window, 2);
        assert_eq!(summary.score_trend.len(), 19);
        assert_eq!(summary.score_trend, train_mode.stats().running_average(2));

        let history = train_mode.stats().score_history();
        let last_pair = f64::from(history[18] + history[19]) / 2.0;
        assert_eq!(summary.score_trend.last(), Some(&last_pair));
    }

    #[test]
    fn test_stop_flag_saves_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let config = small_config(temp_dir.path().to_path_buf(), 10);
        let mut train_mode = TrainMode::new(config).unwrap();

        let summary = train_mode.run(&AtomicBool::new(true)).unwrap();

        assert_eq!(summary.episodes, 0);
        assert!(summary.best_path_path.is_none());
        assert!(summary.score_trend.is_empty());
        assert!(summary.q_table_path.exists());
    }
}
