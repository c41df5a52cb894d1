//! Core game logic module for Snake
//!
//! This module contains the world model without any I/O or rendering
//! dependencies. Human play, training, evaluation and replay all drive it
//! through [`GameEngine`].

pub mod action;
pub mod config;
pub mod engine;
pub mod state;
pub mod view;

// Re-export commonly used types
pub use action::Direction;
pub use config::GameConfig;
pub use engine::{GameEngine, StepResult};
pub use state::{CollisionType, GameState, Position, Snake};
pub use view::WorldView;
