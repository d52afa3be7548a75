//! Save/Load for cloud state
//!
//! Uses bincode. The pool is written as its grid bounds plus the full
//! ordered slot list, empty slots included, so slot ids survive a round
//! trip. The index map and live count are rebuilt on load.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cloud::Cloud;
use crate::engine::CloudEngine;
use crate::geometry::GridBounds;
use crate::pool::{CloudPool, PoolError};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a cloud pool
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub bounds: GridBounds,
    /// Every slot in index order
    pub slots: Vec<Cloud>,
}

/// Save a pool to a writer
pub fn save_pool<W: Write>(writer: W, pool: &CloudPool) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        bounds: pool.bounds(),
        slots: pool.slots().to_vec(),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Read and version-check a snapshot without building the pool.
fn read_snapshot<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    Ok(save_data)
}

fn rebuild(save_data: SaveData) -> Result<CloudPool, SaveError> {
    let pool = CloudPool::from_slots(save_data.bounds, save_data.slots)?;
    pool.verify()?;
    Ok(pool)
}

/// Load a pool from a reader, rejecting inconsistent snapshots
pub fn load_pool<R: Read>(reader: R) -> Result<CloudPool, SaveError> {
    rebuild(read_snapshot(reader)?)
}

/// Load a pool saved for a level of exactly `bounds`.
pub fn load_pool_for<R: Read>(bounds: GridBounds, reader: R) -> Result<CloudPool, SaveError> {
    let save_data = read_snapshot(reader)?;
    if save_data.bounds != bounds {
        return Err(SaveError::BoundsMismatch {
            expected: bounds,
            found: save_data.bounds,
        });
    }
    rebuild(save_data)
}

impl CloudEngine {
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        save_pool(writer, &self.pool)
    }

    /// Replace the current clouds with a saved pool for the same level.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let pool = load_pool_for(self.bounds(), reader)?;
        log::debug!("loaded {} clouds", pool.len());
        self.pool = pool;
        Ok(())
    }
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Inconsistent cloud snapshot: {0}")]
    Inconsistent(#[from] PoolError),
    #[error("Saved level is {found:?}, expected {expected:?}")]
    BoundsMismatch {
        expected: GridBounds,
        found: GridBounds,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{ActorId, Attribution, CloudType, Cosmetic};
    use crate::geometry::Coord;
    use crate::placement::CloudSpec;
    use crate::pool::SlotId;
    use crate::sandbox::GridLevel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_save_load_roundtrip() {
        let bounds = GridBounds::new(20, 20);
        let mut engine = CloudEngine::new(bounds);
        let mut level = GridLevel::new(bounds);
        let mut rng = StdRng::seed_from_u64(12);

        let cosmetic = Cosmetic {
            colour: Some(4),
            name: Some("sulphurous haze".into()),
            tile: None,
        };
        for i in 0..6 {
            let spec = CloudSpec::new(CloudType::Poison, Coord::new(i * 2, 3), 8)
                .by(Attribution::player(ActorId(0)))
                .cosmetic(cosmetic.clone());
            engine.place(&mut level, &mut rng, spec);
        }
        // leave a hole so slot order matters
        engine.delete(&mut level, &mut rng, SlotId(2));

        let mut save_buffer = Vec::new();
        engine.save(&mut save_buffer).expect("Save failed");

        let mut loaded = CloudEngine::new(bounds);
        loaded.load(&save_buffer[..]).expect("Load failed");

        assert_eq!(loaded.pool().slots(), engine.pool().slots());
        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded.lookup(Coord::new(2, 3)), Some(SlotId(1)));
        assert!(loaded.lookup(Coord::new(4, 3)).is_none());
        assert_eq!(loaded.cloud_name(SlotId(0)), Some("sulphurous haze"));
        loaded.pool().verify().unwrap();
    }

    #[test]
    fn test_load_rejects_wrong_version() {
        let data = SaveData {
            version: SAVE_VERSION + 1,
            bounds: GridBounds::new(4, 4),
            slots: vec![Cloud::default(); 3],
        };
        let bytes = bincode::serialize(&data).unwrap();
        assert!(matches!(
            load_pool(&bytes[..]),
            Err(SaveError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_load_rejects_double_occupancy() {
        let cloud = Cloud {
            kind: CloudType::Fire,
            pos: Coord::new(1, 1),
            decay: 30,
            ..Default::default()
        };
        let data = SaveData {
            version: SAVE_VERSION,
            bounds: GridBounds::new(4, 4),
            slots: vec![cloud.clone(), cloud],
        };
        let bytes = bincode::serialize(&data).unwrap();
        assert!(matches!(
            load_pool(&bytes[..]),
            Err(SaveError::Inconsistent(PoolError::DoubleOccupancy { .. }))
        ));
    }

    #[test]
    fn test_load_rejects_other_level_size() {
        let small = CloudEngine::new(GridBounds::new(4, 4));
        let mut buffer = Vec::new();
        small.save(&mut buffer).unwrap();
        let mut big = CloudEngine::new(GridBounds::new(8, 8));
        assert!(matches!(
            big.load(&buffer[..]),
            Err(SaveError::BoundsMismatch { .. })
        ));
    }

    #[test]
    fn test_load_rejects_oversized_bounds() {
        let data = SaveData {
            version: SAVE_VERSION,
            bounds: GridBounds::new(70_000, 70_000),
            slots: Vec::new(),
        };
        let bytes = bincode::serialize(&data).unwrap();
        assert!(matches!(
            load_pool(&bytes[..]),
            Err(SaveError::Inconsistent(PoolError::BadBounds { .. }))
        ));

        let mut engine = CloudEngine::new(GridBounds::new(8, 8));
        assert!(matches!(
            engine.load(&bytes[..]),
            Err(SaveError::BoundsMismatch { .. })
        ));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_truncated_save_is_an_error() {
        let engine = CloudEngine::new(GridBounds::new(4, 4));
        let mut buffer = Vec::new();
        engine.save(&mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);
        let mut other = CloudEngine::new(GridBounds::new(4, 4));
        assert!(other.load(&buffer[..]).is_err());
    }
}
