//! Read-only observation interface into the world.
//!
//! The learning agent only ever sees the world through [`WorldView`], so the
//! encoder and reward function can be exercised against hand-built snapshots.

use super::action::Direction;
use super::state::{GameState, Position};

pub trait WorldView {
    fn grid_size(&self) -> usize;

    /// Snake cells, head first
    fn body(&self) -> &[Position];

    fn heading(&self) -> Direction;

    fn fruit(&self) -> Position;

    /// True when the next move keeps the tail (a fruit was just eaten)
    fn growth_pending(&self) -> bool;

    /// Fruits eaten in the current episode
    fn score(&self) -> u32;

    fn head(&self) -> Position {
        self.body()[0]
    }

    fn in_bounds(&self, pos: Position) -> bool {
        let size = self.grid_size() as i32;
        (0..size).contains(&pos.x) && (0..size).contains(&pos.y)
    }

    /// Body cells a head moving this tick would crash into.
    ///
    /// The tail vacates on a normal move and is therefore excluded, unless
    /// growth is pending, in which case it stays put.
    fn blocking_body(&self) -> &[Position] {
        let body = self.body();
        if self.growth_pending() {
            body
        } else {
            &body[..body.len() - 1]
        }
    }

    /// Whether stepping onto `pos` this tick ends the episode
    fn is_deadly(&self, pos: Position) -> bool {
        !self.in_bounds(pos) || self.blocking_body().contains(&pos)
    }
}

impl WorldView for GameState {
    fn grid_size(&self) -> usize {
        self.grid_size
    }

    fn body(&self) -> &[Position] {
        &self.snake.body
    }

    fn heading(&self) -> Direction {
        self.snake.direction
    }

    fn fruit(&self) -> Position {
        self.fruit
    }

    fn growth_pending(&self) -> bool {
        self.snake.grow_pending
    }

    fn score(&self) -> u32 {
        self.score
    }
}
