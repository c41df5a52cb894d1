//! 12-flag discretised observation used as the Q-table key.
//!
//! | flags | meaning                                   |
//! |-------|-------------------------------------------|
//! | 0-3   | moving up / right / down / left           |
//! | 4-7   | fruit is up / right / down / left of head |
//! | 8-11  | danger up / right / down / left of head   |
//!
//! Flag 0 is the most significant of the 12 packed bits, so
//! [`StateVector::index`] is the row-major index into a `[2; 12]` array.

use std::fmt;

use crate::game::{Direction, WorldView};

pub const NUM_FLAGS: usize = 12;

/// Number of distinct states (2^12)
pub const NUM_STATES: usize = 1 << NUM_FLAGS;

const MOVING: usize = 0;
const FOOD: usize = 4;
const DANGER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateVector(u16);

impl StateVector {
    /// Encode the world as seen from the head.
    ///
    /// With `lookahead = Some(d)` the head is taken to be one step in `d` and
    /// the heading to be `d`, without touching the world. Danger is judged
    /// against the same pre-move body the reward function uses.
    pub fn encode<W: WorldView + ?Sized>(world: &W, lookahead: Option<Direction>) -> Self {
        let (heading, head) = match lookahead {
            Some(d) => (d, world.head().step(d)),
            None => (world.heading(), world.head()),
        };

        let mut state = Self::default();
        state.set(MOVING + heading.index());

        let fruit = world.fruit();
        if fruit.y < head.y {
            state.set(FOOD + Direction::Up.index());
        } else if fruit.y > head.y {
            state.set(FOOD + Direction::Down.index());
        }
        if fruit.x > head.x {
            state.set(FOOD + Direction::Right.index());
        } else if fruit.x < head.x {
            state.set(FOOD + Direction::Left.index());
        }

        for d in Direction::ALL {
            if world.is_deadly(head.step(d)) {
                state.set(DANGER + d.index());
            }
        }

        state
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_STATES).then_some(Self(index as u16))
    }

    pub fn from_flags(flags: [bool; NUM_FLAGS]) -> Self {
        let mut state = Self::default();
        for (i, _) in flags.iter().enumerate().filter(|(_, f)| **f) {
            state.set(i);
        }
        state
    }

    /// Row index into the Q-table
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn flag(self, i: usize) -> bool {
        self.0 & Self::bit(i) != 0
    }

    pub fn flags(self) -> [bool; NUM_FLAGS] {
        std::array::from_fn(|i| self.flag(i))
    }

    pub fn moving(self, d: Direction) -> bool {
        self.flag(MOVING + d.index())
    }

    pub fn food(self, d: Direction) -> bool {
        self.flag(FOOD + d.index())
    }

    pub fn danger(self, d: Direction) -> bool {
        self.flag(DANGER + d.index())
    }

    /// The single heading flag that is set
    pub fn heading(self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.moving(*d))
    }

    fn set(&mut self, i: usize) {
        self.0 |= Self::bit(i);
    }

    fn bit(i: usize) -> u16 {
        debug_assert!(i < NUM_FLAGS);
        1 << (NUM_FLAGS - 1 - i)
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in self.flags() {
            f.write_str(if flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}
