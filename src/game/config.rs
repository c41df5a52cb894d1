use serde::{Deserialize, Serialize};

use super::action::Direction;

/// Configuration for the game world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Head cell of the snake after every reset
    pub start_head: (i32, i32),
    /// Heading of the snake after every reset
    pub start_direction: Direction,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            initial_snake_length: 3,
            start_head: (5, 10),
            start_direction: Direction::Right,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Grid used for training, evaluation and replay
    pub fn training() -> Self {
        Self::new(20)
    }

    /// Larger grid used for human play
    pub fn human() -> Self {
        Self::new(30)
    }

    /// Check that the starting snake fits on the grid
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_snake_length < 2 {
            return Err(format!(
                "initial_snake_length must be at least 2, got {}",
                self.initial_snake_length
            ));
        }

        let (dx, dy) = self.start_direction.delta();
        let back = self.initial_snake_length as i32 - 1;
        let tail = (self.start_head.0 - dx * back, self.start_head.1 - dy * back);
        let size = self.grid_size as i32;
        let inside = |(x, y): (i32, i32)| (0..size).contains(&x) && (0..size).contains(&y);

        if !inside(self.start_head) || !inside(tail) {
            return Err(format!(
                "starting snake {:?}..{:?} does not fit on a {}x{} grid",
                self.start_head, tail, self.grid_size, self.grid_size
            ));
        }

        Ok(())
    }
}
