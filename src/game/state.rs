use super::action::Direction;
use super::config::GameConfig;

/// A grid cell. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The neighbouring cell one step in `direction`
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Occupied cells, head at the front
    pub body: Vec<Position>,
    pub direction: Direction,
    /// Set when a fruit was eaten; the next advance keeps the tail
    pub grow_pending: bool,
}

impl Snake {
    /// A straight snake of `length` cells trailing behind `head`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let back = direction.opposite();
        let body = std::iter::successors(Some(head), |cell| Some(cell.step(back)))
            .take(length)
            .collect();
        Self::from_segments(body, direction)
    }

    /// Build a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        Self {
            body,
            direction,
            grow_pending: false,
        }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Whether `pos` lies on any segment behind the head
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body.iter().skip(1).any(|&cell| cell == pos)
    }

    /// Move one cell in the current direction.
    ///
    /// No bounds or collision checking happens here; the engine inspects the
    /// new head afterwards.
    pub fn advance(&mut self) {
        let head = self.head().step(self.direction);
        self.body.insert(0, head);
        if !std::mem::take(&mut self.grow_pending) {
            self.body.pop();
        }
    }

    /// Steer from keyboard input, ignoring a reversal into the neck
    pub fn steer(&mut self, direction: Direction) {
        if !self.direction.is_opposite(direction) {
            self.direction = direction;
        }
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Head left the grid
    Wall,
    /// Head entered a body cell
    SelfCollision,
}

/// Everything the engine, agent and renderer need to know about the world
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub fruit: Position,
    pub grid_size: usize,
    /// Fruits eaten during the current episode
    pub score: u32,
    /// Ticks committed during the current episode
    pub steps: u32,
}

impl GameState {
    pub fn new(snake: Snake, fruit: Position, grid_size: usize) -> Self {
        Self {
            snake,
            fruit,
            grid_size,
            score: 0,
            steps: 0,
        }
    }

    /// The snake every episode starts with
    pub fn initial_snake(config: &GameConfig) -> Snake {
        Snake::new(
            config.start_head.into(),
            config.start_direction,
            config.initial_snake_length,
        )
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let size = self.grid_size as i32;
        (0..size).contains(&pos.x) && (0..size).contains(&pos.y)
    }

    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.body.contains(&pos)
    }
}
