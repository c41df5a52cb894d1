use crate::game::{Direction, Position};

/// One recorded tick: the direction chosen and where the fruit was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub direction: Direction,
    pub fruit: Position,
}

/// Ordered moves of a single life of the snake
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeRecord {
    steps: Vec<PathStep>,
}

impl EpisodeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    pub fn push(&mut self, direction: Direction, fruit: Position) {
        self.steps.push(PathStep { direction, fruit });
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Keeps the path of the current episode and the best one seen so far
#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    current: EpisodeRecord,
    best: EpisodeRecord,
    best_score: u32,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, direction: Direction, fruit: Position) {
        self.current.push(direction, fruit);
    }

    /// Close the current episode. Its path becomes the best path only when
    /// `score` beats every earlier episode; either way the buffer is cleared.
    ///
    /// Returns true on a new best score.
    pub fn finish_episode(&mut self, score: u32) -> bool {
        let current = std::mem::take(&mut self.current);
        if score > self.best_score {
            self.best_score = score;
            self.best = current;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> &EpisodeRecord {
        &self.current
    }

    pub fn best(&self) -> &EpisodeRecord {
        &self.best
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_path_only_on_new_max() {
        let mut tracker = PathTracker::new();

        tracker.record(Direction::Up, Position::new(1, 1));
        tracker.record(Direction::Left, Position::new(1, 1));
        assert!(tracker.finish_episode(2));
        assert_eq!(tracker.best_score(), 2);
        assert_eq!(tracker.best().len(), 2);
        assert!(tracker.current().is_empty());

        tracker.record(Direction::Down, Position::new(3, 3));
        assert!(!tracker.finish_episode(2));
        assert_eq!(tracker.best().len(), 2);
        assert_eq!(tracker.best().steps()[0].direction, Direction::Up);
        assert!(tracker.current().is_empty());

        tracker.record(Direction::Right, Position::new(4, 4));
        assert!(tracker.finish_episode(3));
        assert_eq!(
            tracker.best().steps(),
            &[PathStep {
                direction: Direction::Right,
                fruit: Position::new(4, 4)
            }]
        );
    }

    #[test]
    fn test_zero_score_is_never_best() {
        let mut tracker = PathTracker::new();
        tracker.record(Direction::Up, Position::new(0, 0));
        assert!(!tracker.finish_episode(0));
        assert!(tracker.best().is_empty());
    }
}
