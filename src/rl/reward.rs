use serde::{Deserialize, Serialize};

use crate::game::{Direction, WorldView};

/// What a candidate move would lead to, judged on the pre-move body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Fruit,
    Collision,
    Move,
}

impl MoveOutcome {
    pub fn is_terminal(self) -> bool {
        self == MoveOutcome::Collision
    }
}

/// Scalar rewards for each [`MoveOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub fruit: f64,
    pub collision: f64,
    pub step: f64,
}

impl RewardConfig {
    /// Rewards used while learning
    pub fn training() -> Self {
        Self {
            fruit: 50.0,
            collision: -10.0,
            step: 0.0,
        }
    }

    /// Rewards used by greedy evaluation, which only cares about terminal events
    pub fn evaluation() -> Self {
        Self {
            fruit: 1.0,
            collision: -1.0,
            step: 0.0,
        }
    }

    pub fn value(&self, outcome: MoveOutcome) -> f64 {
        match outcome {
            MoveOutcome::Fruit => self.fruit,
            MoveOutcome::Collision => self.collision,
            MoveOutcome::Move => self.step,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::training()
    }
}

/// Classify moving one step in `direction` from the current head.
///
/// Must run before the world commits the move.
pub fn classify_move<W: WorldView + ?Sized>(world: &W, direction: Direction) -> MoveOutcome {
    let next = world.head().step(direction);
    if next == world.fruit() {
        MoveOutcome::Fruit
    } else if world.is_deadly(next) {
        MoveOutcome::Collision
    } else {
        MoveOutcome::Move
    }
}

pub fn reward<W: WorldView + ?Sized>(world: &W, direction: Direction, rewards: &RewardConfig) -> f64 {
    rewards.value(classify_move(world, direction))
}
