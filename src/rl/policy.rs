//! Action selection over the four absolute directions.

use rand::Rng;

use crate::game::Direction;

/// Pick uniformly among `candidates`, never reversing into the neck.
///
/// With all four directions as candidates this chooses among three. The filter
/// only guards against the immediate reversal, not longer body segments.
pub fn random_safe<R: Rng + ?Sized>(
    heading: Direction,
    candidates: &[Direction],
    rng: &mut R,
) -> Direction {
    let safe: Vec<Direction> = candidates
        .iter()
        .copied()
        .filter(|d| !heading.is_opposite(*d))
        .collect();

    let pool = if safe.is_empty() { candidates } else { &safe[..] };
    match pool.len() {
        0 => heading,
        n => pool[rng.gen_range(0..n)],
    }
}

/// Directions sharing the maximum value
pub fn best_actions(values: &[f64; 4]) -> Vec<Direction> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Direction::ALL
        .into_iter()
        .filter(|d| values[d.index()] == max)
        .collect()
}

/// Argmax over the action values; ties go to [`random_safe`] over the tied set
pub fn greedy<R: Rng + ?Sized>(values: &[f64; 4], heading: Direction, rng: &mut R) -> Direction {
    let best = best_actions(values);
    match best.as_slice() {
        [only] => *only,
        tied => random_safe(heading, tied, rng),
    }
}

/// Draw `u` from (0, 1] at percent resolution and explore when `u < epsilon`
pub fn should_explore<R: Rng + ?Sized>(epsilon: f64, rng: &mut R) -> bool {
    let u = rng.gen_range(1..=100u32) as f64 / 100.0;
    u < epsilon
}

pub fn epsilon_greedy<R: Rng + ?Sized>(
    values: &[f64; 4],
    heading: Direction,
    epsilon: f64,
    rng: &mut R,
) -> Direction {
    if should_explore(epsilon, rng) {
        random_safe(heading, &Direction::ALL, rng)
    } else {
        greedy(values, heading, rng)
    }
}
