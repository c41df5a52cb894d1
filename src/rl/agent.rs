//! Tabular Q-learning agent
//!
//! The agent reads the world only through [`WorldView`]. Each tick it encodes
//! the current state, picks a direction, scores that direction against the
//! pre-move body, encodes the one-step lookahead state and (when training)
//! performs the Bellman backup. Committing the chosen direction to the world
//! is left to the caller, which then lets the engine advance.

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use super::config::{Hyperparameters, QLearningConfig};
use super::episode::{EpisodeRecord, PathTracker};
use super::policy;
use super::q_table::QTable;
use super::reward::{MoveOutcome, RewardConfig, classify_move};
use super::state::StateVector;
use crate::game::{Direction, WorldView};

/// What happened during one agent tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub state: StateVector,
    pub action: Direction,
    pub outcome: MoveOutcome,
    pub reward: f64,
    /// Score of the episode that this tick ended, if it ended one
    pub finished_score: Option<u32>,
    /// Whether the finished episode set a new best score
    pub new_best: bool,
}

pub struct QAgent {
    config: QLearningConfig,
    params: Hyperparameters,
    table: QTable,
    paths: PathTracker,
    episodes: usize,
    rng: StdRng,
}

impl QAgent {
    /// Fresh agent with an all-zero table
    pub fn new(config: QLearningConfig) -> Self {
        Self::with_table(QTable::new(), config, StdRng::from_entropy())
    }

    pub fn with_seed(config: QLearningConfig, seed: u64) -> Self {
        Self::with_table(QTable::new(), config, StdRng::seed_from_u64(seed))
    }

    /// Greedy agent over a trained table, scored with the evaluation rewards
    pub fn for_evaluation(table: QTable) -> Self {
        let config = QLearningConfig {
            rewards: RewardConfig::evaluation(),
            ..Default::default()
        };
        Self::with_table(table, config, StdRng::from_entropy())
    }

    pub fn with_table(table: QTable, config: QLearningConfig, rng: StdRng) -> Self {
        Self {
            params: Hyperparameters::from_config(&config),
            config,
            table,
            paths: PathTracker::new(),
            episodes: 0,
            rng,
        }
    }

    /// One epsilon-greedy training tick with a Bellman update
    pub fn train_tick<W: WorldView + ?Sized>(&mut self, world: &W) -> TickReport {
        let state = StateVector::encode(world, None);
        let heading = world.heading();
        let action = policy::epsilon_greedy(
            self.table.row(state),
            heading,
            self.params.epsilon,
            &mut self.rng,
        );

        let outcome = classify_move(world, action);
        let reward = self.config.rewards.value(outcome);
        let next_state = StateVector::encode(world, Some(action));

        self.paths.record(action, world.fruit());
        self.table.update(
            state,
            action,
            reward,
            next_state,
            self.params.alpha,
            self.params.gamma,
        );

        let mut report = TickReport {
            state,
            action,
            outcome,
            reward,
            finished_score: None,
            new_best: false,
        };

        if outcome.is_terminal() {
            self.finish_episode(world, &mut report);
            self.params.decay(&self.config);
        }

        report
    }

    /// One pure-greedy tick; the table is left untouched
    pub fn greedy_tick<W: WorldView + ?Sized>(&mut self, world: &W) -> TickReport {
        let state = StateVector::encode(world, None);
        let action = policy::greedy(self.table.row(state), world.heading(), &mut self.rng);
        let outcome = classify_move(world, action);

        self.paths.record(action, world.fruit());

        let mut report = TickReport {
            state,
            action,
            outcome,
            reward: self.config.rewards.value(outcome),
            finished_score: None,
            new_best: false,
        };

        if outcome.is_terminal() {
            self.finish_episode(world, &mut report);
        }

        report
    }

    fn finish_episode<W: WorldView + ?Sized>(&mut self, world: &W, report: &mut TickReport) {
        let score = world.score();
        self.episodes += 1;
        report.finished_score = Some(score);
        report.new_best = self.paths.finish_episode(score);

        if report.new_best {
            info!(
                episode = self.episodes,
                score,
                alpha = self.params.alpha,
                epsilon = self.params.epsilon,
                "new best score"
            );
        } else {
            debug!(episode = self.episodes, score, "episode finished");
        }
    }

    /// True once the configured number of training episodes has finished
    pub fn is_done(&self) -> bool {
        self.episodes >= self.config.max_episodes
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn params(&self) -> &Hyperparameters {
        &self.params
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn best_score(&self) -> u32 {
        self.paths.best_score()
    }

    pub fn best_path(&self) -> &EpisodeRecord {
        self.paths.best()
    }

    pub fn current_path(&self) -> &EpisodeRecord {
        self.paths.current()
    }
}
