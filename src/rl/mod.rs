//! Tabular Q-learning for Snake
//!
//! Provides:
//! - 12-flag state encoding with one-step lookahead
//! - Lookahead reward function judged on the pre-move body
//! - Random-safe, greedy and epsilon-greedy action selection
//! - Dense Q-table with the Bellman backup and decaying learning rates
//! - NumPy-compatible persistence for tables and best paths

pub mod agent;
pub mod config;
pub mod episode;
pub mod persistence;
pub mod policy;
pub mod q_table;
pub mod reward;
pub mod state;

pub use agent::{QAgent, TickReport};
pub use config::{Hyperparameters, QLearningConfig};
pub use episode::{EpisodeRecord, PathStep, PathTracker};
pub use persistence::{
    PersistenceError, TableMetadata, best_path_file, load_best_path, load_metadata, load_q_table,
    q_table_file, save_best_path, save_q_table,
};
pub use q_table::{NUM_ACTIONS, QTable};
pub use reward::{MoveOutcome, RewardConfig, classify_move, reward};
pub use state::{NUM_STATES, StateVector};
