//! qsnake - Snake with a tabular Q-learning agent
//!
//! This library provides:
//! - Core game logic (game module)
//! - 12-flag state encoding, lookahead rewards and Q-table learning (rl module)
//! - TUI rendering and keyboard input (render, input modules)
//! - Execution modes: train, run, replay and human (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
