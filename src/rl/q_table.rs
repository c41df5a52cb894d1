use super::state::{NUM_STATES, StateVector};
use crate::game::Direction;

pub const NUM_ACTIONS: usize = 4;

/// Dense tabular action-value function: one row of 4 action values per state.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: Vec<[f64; NUM_ACTIONS]>,
}

impl QTable {
    /// All-zero table
    pub fn new() -> Self {
        Self {
            rows: vec![[0.0; NUM_ACTIONS]; NUM_STATES],
        }
    }

    /// Build from a flat row-major buffer of `NUM_STATES * NUM_ACTIONS` values
    pub fn from_flat(values: &[f64]) -> Option<Self> {
        if values.len() != NUM_STATES * NUM_ACTIONS {
            return None;
        }
        let rows = values
            .chunks_exact(NUM_ACTIONS)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Some(Self { rows })
    }

    /// Flat row-major copy, state-major then action
    pub fn to_flat(&self) -> Vec<f64> {
        self.rows.iter().flatten().copied().collect()
    }

    pub fn row(&self, state: StateVector) -> &[f64; NUM_ACTIONS] {
        &self.rows[state.index()]
    }

    pub fn value(&self, state: StateVector, action: Direction) -> f64 {
        self.rows[state.index()][action.index()]
    }

    pub fn max_value(&self, state: StateVector) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Bellman backup:
    /// `Q[s][a] = (1 - alpha) * Q[s][a] + alpha * (r + gamma * max_a' Q[s'][a'])`.
    ///
    /// Returns the updated value.
    pub fn update(
        &mut self,
        state: StateVector,
        action: Direction,
        reward: f64,
        next_state: StateVector,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let target = reward + gamma * self.max_value(next_state);
        let cell = &mut self.rows[state.index()][action.index()];
        *cell = (1.0 - alpha) * *cell + alpha * target;
        *cell
    }

    /// Number of states whose row has been touched by an update
    pub fn visited_states(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.iter().any(|v| *v != 0.0))
            .count()
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn state(index: usize) -> StateVector {
        StateVector::from_index(index).unwrap()
    }

    #[test]
    fn test_new_table_is_zero() {
        let table = QTable::new();
        assert_eq!(table.to_flat().len(), NUM_STATES * NUM_ACTIONS);
        assert!(table.to_flat().iter().all(|v| *v == 0.0));
        assert_eq!(table.visited_states(), 0);
    }

    #[test]
    fn test_update_formula() {
        let mut table = QTable::new();
        let s = state(10);
        let next = state(20);
        table.rows[next.index()] = [1.0, 4.0, -2.0, 0.5];
        table.rows[s.index()][Direction::Down.index()] = 2.0;

        let updated = table.update(s, Direction::Down, 50.0, next, 0.3, 0.2);

        // 0.7 * 2 + 0.3 * (50 + 0.2 * 4)
        let expected = 0.7 * 2.0 + 0.3 * (50.0 + 0.2 * 4.0);
        assert!((updated - expected).abs() < 1e-12);
        assert_eq!(table.value(s, Direction::Down), updated);
        assert_eq!(table.visited_states(), 2);
    }

    #[test]
    fn test_update_lies_between_old_and_target() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut table = QTable::new();
        for _ in 0..2_000 {
            let s = state(rng.gen_range(0..NUM_STATES));
            let next = state(rng.gen_range(0..NUM_STATES));
            let a = Direction::ALL[rng.gen_range(0..NUM_ACTIONS)];
            let reward = [50.0, -10.0, 0.0][rng.gen_range(0..3)];
            let alpha = rng.gen_range(0.01..=0.3);
            let gamma = 0.2;

            let old = table.value(s, a);
            let target = reward + gamma * table.max_value(next);
            let new = table.update(s, a, reward, next, alpha, gamma);

            let lo = old.min(target) - 1e-9;
            let hi = old.max(target) + 1e-9;
            assert!((lo..=hi).contains(&new), "{new} outside [{old}, {target}]");
        }
    }

    #[test]
    fn test_flat_roundtrip() {
        let mut table = QTable::new();
        table.rows[4095] = [1.5, -2.5, 3.25, 0.0];
        let flat = table.to_flat();
        assert_eq!(flat[4095 * 4 + 2], 3.25);
        assert_eq!(QTable::from_flat(&flat), Some(table));
        assert_eq!(QTable::from_flat(&flat[1..]), None);
    }
}
