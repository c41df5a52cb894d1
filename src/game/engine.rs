use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use super::{
    config::GameConfig,
    state::{CollisionType, GameState, Position, Snake},
};

/// Outcome of committing one tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the head landed on the fruit this tick
    pub ate_fruit: bool,
    /// Collision that ended the episode, if any. The state has already been
    /// reset when this is set.
    pub collision: Option<CollisionType>,
    /// Score reached by the end of this tick, before any reset
    pub score: u32,
}

impl StepResult {
    pub fn terminated(&self) -> bool {
        self.collision.is_some()
    }
}

/// The game engine that handles all world transitions
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine whose fruit placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A fresh episode: initial snake and a random fruit
    pub fn reset(&mut self) -> GameState {
        let snake = GameState::initial_snake(&self.config);
        let fruit = self.spawn_fruit(&snake);
        GameState::new(snake, fruit, self.config.grid_size)
    }

    /// Commit one tick: advance the snake, check the fruit, check for failure.
    ///
    /// On failure the state is reset in place before returning.
    pub fn update(&mut self, state: &mut GameState) -> StepResult {
        self.commit(state, true)
    }

    /// Like [`GameEngine::update`], but an eaten fruit is left where it is.
    /// Used when replaying a recorded path that dictates fruit positions.
    pub fn update_scripted(&mut self, state: &mut GameState) -> StepResult {
        self.commit(state, false)
    }

    fn commit(&mut self, state: &mut GameState, relocate_fruit: bool) -> StepResult {
        state.snake.advance();
        state.steps += 1;

        let ate_fruit = self.check_fruit_eaten(state, relocate_fruit);
        let score = state.score;
        let collision = self.check_fail(state);

        StepResult {
            ate_fruit,
            collision,
            score,
        }
    }

    /// Mark growth and relocate the fruit when the head reached it
    fn check_fruit_eaten(&mut self, state: &mut GameState, relocate_fruit: bool) -> bool {
        if state.snake.head() != state.fruit {
            return false;
        }

        state.snake.grow_pending = true;
        state.score += 1;
        if relocate_fruit {
            state.fruit = self.spawn_fruit(&state.snake);
        }
        true
    }

    /// Reset the state if the head left the grid or hit the body
    fn check_fail(&mut self, state: &mut GameState) -> Option<CollisionType> {
        let head = state.snake.head();
        let collision = if !state.is_in_bounds(head) {
            CollisionType::Wall
        } else if state.snake.collides_with_body(head) {
            CollisionType::SelfCollision
        } else {
            return None;
        };

        debug!(
            ?collision,
            score = state.score,
            steps = state.steps,
            "episode ended"
        );
        *state = self.reset();
        Some(collision)
    }

    /// Resample a uniformly random cell until it is disjoint from the snake.
    ///
    /// Terminates almost surely as long as the grid has a free cell.
    fn spawn_fruit(&mut self, snake: &Snake) -> Position {
        let size = self.config.grid_size as i32;
        loop {
            let pos = Position::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if !snake.body.contains(&pos) {
                return pos;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Direction;

    fn engine() -> GameEngine {
        GameEngine::with_seed(GameConfig::training(), 7)
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let state = engine.reset();

        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Position::new(5, 10));
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(!state.is_occupied_by_snake(state.fruit));
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.fruit = Position::new(15, 15);

        let result = engine.update(&mut state);

        assert!(!result.terminated());
        assert!(!result.ate_fruit);
        assert_eq!(state.steps, 1);
        assert_eq!(state.snake.head(), Position::new(6, 10));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_growth_after_fruit() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.fruit = Position::new(6, 10);

        let result = engine.update(&mut state);
        assert!(result.ate_fruit);
        assert_eq!(state.score, 1);
        // Growth lands on the following tick
        assert_eq!(state.snake.len(), 3);
        assert!(state.snake.grow_pending);
        assert!(!state.is_occupied_by_snake(state.fruit));

        state.fruit = Position::new(0, 0);
        engine.update(&mut state);
        assert_eq!(state.snake.len(), 4);

        engine.update(&mut state);
        assert_eq!(state.snake.len(), 4);
    }

    #[test]
    fn test_wall_collision_resets() {
        let mut engine = engine();
        let mut state = GameState::new(
            Snake::new(Position::new(0, 5), Direction::Left, 3),
            Position::new(5, 5),
            20,
        );
        state.score = 4;

        let result = engine.update(&mut state);

        assert_eq!(result.collision, Some(CollisionType::Wall));
        assert_eq!(result.score, 4);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.snake.head(), Position::new(5, 10));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_self_collision_resets() {
        let mut engine = engine();
        // Head (5,5) heading Up into a body that curls around it
        let body = vec![
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 4),
            Position::new(5, 4),
            Position::new(4, 4),
        ];
        let mut state = GameState::new(
            Snake::from_segments(body, Direction::Up),
            Position::new(10, 10),
            20,
        );
        state.snake.grow_pending = true;

        let result = engine.update(&mut state);

        assert_eq!(result.collision, Some(CollisionType::SelfCollision));
        assert_eq!(state.snake.len(), 3);
        assert!(!state.snake.grow_pending);
    }

    #[test]
    fn test_moving_into_vacating_tail_is_safe() {
        let mut engine = engine();
        // A 4-cell square loop: the head chases the tail
        let body = vec![
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 6),
            Position::new(5, 6),
        ];
        let mut state = GameState::new(
            Snake::from_segments(body, Direction::Down),
            Position::new(10, 10),
            20,
        );

        let result = engine.update(&mut state);

        assert!(!result.terminated());
        assert_eq!(state.snake.head(), Position::new(5, 6));
    }

    #[test]
    fn test_scripted_update_keeps_fruit() {
        let mut engine = engine();
        let mut state = engine.reset();
        state.fruit = Position::new(6, 10);

        let result = engine.update_scripted(&mut state);

        assert!(result.ate_fruit);
        assert_eq!(state.fruit, Position::new(6, 10));
    }

    #[test]
    fn test_fruit_never_spawns_on_snake() {
        let mut engine = GameEngine::with_seed(GameConfig::new(4), 3);
        let snake = Snake::from_segments(
            (0..4)
                .flat_map(|y| (0..4).map(move |x| Position::new(x, y)))
                .filter(|p| *p != Position::new(3, 3))
                .collect(),
            Direction::Right,
        );

        for _ in 0..20 {
            assert_eq!(engine.spawn_fruit(&snake), Position::new(3, 3));
        }
    }
}
