//! Saving and loading trained tables and recorded paths
//!
//! Both artifacts are plain NumPy `.npy` arrays with no extra header:
//!
//! - Q-table: `f64` array of shape `[2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 4]`,
//!   indexed by the 12 state flags and then the action.
//! - Best path: `i64` array of shape `[2, T, 2]`. Row 0 holds the chosen
//!   direction vectors `(dx, dy)`, row 1 the fruit position `(x, y)` at each
//!   of the `T` ticks.
//!
//! A Q-table may carry a `<path>.meta.json` sidecar with training metadata.

use anyhow::{Context, Result};
use ndarray::{Array3, ArrayD, IxDyn};
use ndarray_npy::{ReadNpyError, WriteNpyError, read_npy, write_npy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::config::Hyperparameters;
use super::episode::{EpisodeRecord, PathStep};
use super::q_table::{NUM_ACTIONS, QTable};
use super::state::NUM_FLAGS;
use crate::game::{Direction, Position};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("expected an array of shape {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("invalid direction vector ({dx}, {dy}) at step {step}")]
    InvalidDirection { step: usize, dx: i64, dy: i64 },

    #[error("fruit position ({x}, {y}) at step {step} is out of range")]
    InvalidFruit { step: usize, x: i64, y: i64 },

    #[error(transparent)]
    Read(#[from] ReadNpyError),

    #[error(transparent)]
    Write(#[from] WriteNpyError),
}

/// Shape of the on-disk Q-table
pub fn q_table_shape() -> Vec<usize> {
    let mut shape = vec![2; NUM_FLAGS];
    shape.push(NUM_ACTIONS);
    shape
}

/// Metadata saved next to a trained table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub grid_size: usize,
    pub episodes_trained: usize,
    pub best_score: u32,
    pub final_params: Hyperparameters,
    /// Version identifier of the crate that wrote the table
    pub version: String,
}

impl TableMetadata {
    pub fn new(
        grid_size: usize,
        episodes_trained: usize,
        best_score: u32,
        final_params: Hyperparameters,
    ) -> Self {
        Self {
            grid_size,
            episodes_trained,
            best_score,
            final_params,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Conventional location of a table trained for `episodes` episodes
pub fn q_table_file(dir: &Path, episodes: usize) -> PathBuf {
    dir.join("trained_q_matrices")
        .join(format!("trained_array_{episodes}.npy"))
}

/// Conventional location of a best path scoring `score`
pub fn best_path_file(dir: &Path, score: u32) -> PathBuf {
    dir.join("paths").join(format!("{score}_points.npy"))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    Ok(())
}

fn meta_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save a Q-table, plus its metadata sidecar when given
pub fn save_q_table(table: &QTable, path: &Path, metadata: Option<&TableMetadata>) -> Result<()> {
    ensure_parent(path)?;

    let array = ArrayD::from_shape_vec(IxDyn(&q_table_shape()), table.to_flat())
        .context("Q-table does not match the on-disk shape")?;
    write_npy(path, &array)
        .map_err(PersistenceError::from)
        .with_context(|| format!("Failed to write Q-table to {:?}", path))?;

    if let Some(metadata) = metadata {
        let meta_path = meta_path(path);
        let json =
            serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
        std::fs::write(&meta_path, json)
            .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;
    }

    info!(path = %path.display(), visited = table.visited_states(), "saved Q-table");
    Ok(())
}

/// Load a Q-table. A missing or malformed file is an error.
pub fn load_q_table(path: &Path) -> Result<QTable> {
    let array: ArrayD<f64> = read_npy(path)
        .map_err(PersistenceError::from)
        .with_context(|| format!("Failed to read Q-table from {:?}", path))?;

    let expected = q_table_shape();
    if array.shape() != expected.as_slice() {
        return Err(PersistenceError::ShapeMismatch {
            expected,
            found: array.shape().to_vec(),
        })
        .with_context(|| format!("Malformed Q-table in {:?}", path));
    }

    // Logical (row-major) iteration regardless of the file's memory order
    let flat: Vec<f64> = array.iter().copied().collect();
    QTable::from_flat(&flat).with_context(|| format!("Malformed Q-table in {:?}", path))
}

/// Read the metadata sidecar of a table, if one exists and parses
pub fn load_metadata(path: &Path) -> Option<TableMetadata> {
    let meta_path = meta_path(path);
    let json = std::fs::read_to_string(&meta_path).ok()?;
    match serde_json::from_str(&json) {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            warn!(path = %meta_path.display(), %err, "ignoring unreadable metadata");
            None
        }
    }
}

pub fn save_best_path(record: &EpisodeRecord, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let steps = record.steps();
    let mut array = Array3::<i64>::zeros((2, steps.len(), 2));
    for (t, step) in steps.iter().enumerate() {
        let (dx, dy) = step.direction.delta();
        array[[0, t, 0]] = i64::from(dx);
        array[[0, t, 1]] = i64::from(dy);
        array[[1, t, 0]] = i64::from(step.fruit.x);
        array[[1, t, 1]] = i64::from(step.fruit.y);
    }

    write_npy(path, &array)
        .map_err(PersistenceError::from)
        .with_context(|| format!("Failed to write best path to {:?}", path))?;

    info!(path = %path.display(), ticks = steps.len(), "saved best path");
    Ok(())
}

pub fn load_best_path(path: &Path) -> Result<EpisodeRecord> {
    let array: Array3<i64> = read_npy(path)
        .map_err(PersistenceError::from)
        .with_context(|| format!("Failed to read best path from {:?}", path))?;

    let shape = array.shape();
    if shape[0] != 2 || shape[2] != 2 {
        return Err(PersistenceError::ShapeMismatch {
            expected: vec![2, shape[1], 2],
            found: shape.to_vec(),
        })
        .with_context(|| format!("Malformed best path in {:?}", path));
    }

    let mut steps = Vec::with_capacity(shape[1]);
    for t in 0..shape[1] {
        let (dx, dy) = (array[[0, t, 0]], array[[0, t, 1]]);
        let direction = narrow(dx, dy)
            .and_then(|(dx, dy)| Direction::from_delta(dx, dy))
            .ok_or(PersistenceError::InvalidDirection { step: t, dx, dy })
            .with_context(|| format!("Malformed best path in {:?}", path))?;

        let (x, y) = (array[[1, t, 0]], array[[1, t, 1]]);
        let fruit = narrow(x, y)
            .map(Position::from)
            .ok_or(PersistenceError::InvalidFruit { step: t, x, y })
            .with_context(|| format!("Malformed best path in {:?}", path))?;

        steps.push(PathStep { direction, fruit });
    }

    Ok(EpisodeRecord::from_steps(steps))
}

/// Both coordinates as `i32`, or `None` if either does not fit
fn narrow(a: i64, b: i64) -> Option<(i32, i32)> {
    Some((i32::try_from(a).ok()?, i32::try_from(b).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::state::{NUM_STATES, StateVector};
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use tempfile::TempDir;

    fn random_table(seed: u64) -> QTable {
        let mut rng = StdRng::seed_from_u64(seed);
        let flat: Vec<f64> = (0..NUM_STATES * NUM_ACTIONS)
            .map(|_| rng.gen_range(-20.0..60.0))
            .collect();
        QTable::from_flat(&flat).unwrap()
    }

    #[test]
    fn test_q_table_roundtrip_is_bit_identical() {
        let temp_dir = TempDir::new().unwrap();
        let path = q_table_file(temp_dir.path(), 2500);
        let table = random_table(1);

        save_q_table(&table, &path, None).unwrap();
        let loaded = load_q_table(&path).unwrap();

        for index in 0..NUM_STATES {
            let state = StateVector::from_index(index).unwrap();
            for action in Direction::ALL {
                assert_eq!(
                    table.value(state, action).to_bits(),
                    loaded.value(state, action).to_bits()
                );
            }
        }
    }

    #[test]
    fn test_on_disk_layout_follows_flags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.npy");

        let mut flags = [false; NUM_FLAGS];
        flags[0] = true; // moving up
        flags[11] = true; // danger left
        let state = StateVector::from_flags(flags);
        let mut flat = QTable::new().to_flat();
        flat[state.index() * NUM_ACTIONS + Direction::Right.index()] = 3.5;
        save_q_table(&QTable::from_flat(&flat).unwrap(), &path, None).unwrap();

        let array: ArrayD<f64> = read_npy(&path).unwrap();
        let mut index = vec![0usize; NUM_FLAGS + 1];
        index[0] = 1;
        index[11] = 1;
        index[12] = Direction::Right.index();
        assert_eq!(array[index.as_slice()], 3.5);
    }

    #[test]
    fn test_metadata_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.npy");
        let params = Hyperparameters {
            alpha: 0.01,
            gamma: 0.2,
            epsilon: 0.0003,
        };
        let metadata = TableMetadata::new(20, 2500, 42, params);

        assert!(load_metadata(&path).is_none());
        save_q_table(&QTable::new(), &path, Some(&metadata)).unwrap();
        assert_eq!(load_metadata(&path), Some(metadata));
    }

    #[test]
    fn test_missing_table_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_q_table(&temp_dir.path().join("nope.npy")).is_err());
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.npy");
        write_npy(&path, &ndarray::Array2::<f64>::zeros((4096, 4))).unwrap();

        let err = load_q_table(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PersistenceError>(),
            Some(PersistenceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_best_path_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = best_path_file(temp_dir.path(), 7);
        assert!(path.ends_with("paths/7_points.npy"));

        let mut record = EpisodeRecord::new();
        record.push(Direction::Up, Position::new(5, 9));
        record.push(Direction::Left, Position::new(12, 3));
        record.push(Direction::Down, Position::new(12, 3));

        save_best_path(&record, &path).unwrap();
        assert_eq!(load_best_path(&path).unwrap(), record);
    }

    #[test]
    fn test_best_path_with_bad_direction() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad_path.npy");
        let mut array = Array3::<i64>::zeros((2, 1, 2));
        array[[0, 0, 0]] = 2;
        write_npy(&path, &array).unwrap();

        let err = load_best_path(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PersistenceError>(),
            Some(PersistenceError::InvalidDirection { step: 0, .. })
        ));
    }

    #[test]
    fn test_best_path_with_oversized_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge_path.npy");

        // 2^32 + 3 would wrap to 3 under a plain cast
        let huge = (1i64 << 32) + 3;
        let mut array = Array3::<i64>::zeros((2, 2, 2));
        array[[0, 0, 0]] = 1;
        array[[0, 1, 0]] = 1;
        array[[1, 0, 0]] = 4;
        array[[1, 0, 1]] = 4;
        array[[1, 1, 0]] = huge;
        array[[1, 1, 1]] = 4;
        write_npy(&path, &array).unwrap();

        let err = load_best_path(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PersistenceError>(),
            Some(PersistenceError::InvalidFruit { step: 1, x, y: 4 }) if *x == huge
        ));

        // A wrapped unit vector is still rejected
        array[[1, 1, 0]] = 4;
        array[[0, 1, 0]] = (1i64 << 32) + 1;
        write_npy(&path, &array).unwrap();
        let err = load_best_path(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PersistenceError>(),
            Some(PersistenceError::InvalidDirection { step: 1, .. })
        ));
    }
}
