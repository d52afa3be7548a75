//! Cloud engine - owns the pool and tuning, and is the entry point for
//! every hazard operation.
//!
//! The level (terrain, visibility, occupants, conduct log) and the random
//! source are passed into each mutating call rather than held, so the
//! engine itself is plain data and runs are reproducible from a seed.

use rand::Rng;

use crate::cloud::{Cloud, CloudType};
use crate::config::CloudTuning;
use crate::geometry::{Coord, GridBounds};
use crate::level::Level;
use crate::pool::{CloudPool, SlotId};
use crate::visibility;

/// Main cloud engine.
#[derive(Debug, Clone)]
pub struct CloudEngine {
    pub(crate) pool: CloudPool,
    pub(crate) tuning: CloudTuning,
}

impl CloudEngine {
    /// Create an empty engine for a level of the given size.
    pub fn new(bounds: GridBounds) -> Self {
        Self::with_tuning(bounds, CloudTuning::default())
    }

    pub fn with_tuning(bounds: GridBounds, tuning: CloudTuning) -> Self {
        Self::from_parts(CloudPool::new(bounds), tuning)
    }

    pub fn from_parts(pool: CloudPool, tuning: CloudTuning) -> Self {
        Self { pool, tuning }
    }

    pub fn pool(&self) -> &CloudPool {
        &self.pool
    }

    pub fn tuning(&self) -> &CloudTuning {
        &self.tuning
    }

    pub fn set_tuning(&mut self, tuning: CloudTuning) {
        self.tuning = tuning;
    }

    pub fn bounds(&self) -> GridBounds {
        self.pool.bounds()
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn lookup(&self, pos: Coord) -> Option<SlotId> {
        self.pool.lookup(pos)
    }

    pub fn get(&self, slot: SlotId) -> Option<&Cloud> {
        self.pool.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Cloud)> {
        self.pool.iter()
    }

    pub fn type_at(&self, pos: Coord) -> CloudType {
        self.pool.type_at(pos)
    }

    pub fn is_opaque(&self, slot: SlotId) -> bool {
        self.pool.get(slot).is_some_and(|c| c.kind.is_opaque())
    }

    pub fn is_opaque_at(&self, pos: Coord) -> bool {
        self.pool.lookup(pos).is_some_and(|s| self.is_opaque(s))
    }

    pub fn cloud_name(&self, slot: SlotId) -> Option<&str> {
        self.pool.get(slot).map(Cloud::name)
    }

    /// Clouds within `radius` of `pos` (including `pos` itself).
    pub fn clouds_within(&self, pos: Coord, radius: i32) -> Vec<SlotId> {
        std::iter::once(pos)
            .chain(pos.within_radius(radius))
            .filter_map(|p| self.pool.lookup(p))
            .collect()
    }

    /// Destroy the cloud in `slot`, running its expiry side effects first.
    pub fn delete<L, R>(&mut self, level: &mut L, rng: &mut R, slot: SlotId) -> bool
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(cloud) = self.pool.get(slot) else {
            return false;
        };
        let (kind, pos) = (cloud.kind, cloud.pos);

        if kind == CloudType::Rain {
            self.rain_leaves_water(level, rng, pos);
        }

        if self.pool.free(slot).is_none() {
            return false;
        }
        log::debug!("{} at {} dissipated", kind, pos);
        visibility::cloud_changed(level, kind, pos);
        true
    }

    /// Destroy whatever cloud is at `pos`.
    pub fn delete_at<L, R>(&mut self, level: &mut L, rng: &mut R, pos: Coord) -> bool
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        match self.pool.lookup(pos) {
            Some(slot) => self.delete(level, rng, slot),
            None => false,
        }
    }

    /// Move the cloud in `slot` to an empty, in-bounds cell.
    pub fn move_cloud<L: Level + ?Sized>(&mut self, level: &mut L, slot: SlotId, to: Coord) -> bool {
        let Some(kind) = self.pool.get(slot).map(|c| c.kind) else {
            return false;
        };
        match self.pool.relocate(slot, to) {
            Some(from) => {
                if from != to {
                    visibility::cloud_changed(level, kind, from);
                    visibility::cloud_changed(level, kind, to);
                }
                true
            }
            None => false,
        }
    }

    /// Exchange the clouds (or absence of clouds) at two cells.
    pub fn swap<L: Level + ?Sized>(&mut self, level: &mut L, a: Coord, b: Coord) -> bool {
        if a == b {
            return true;
        }
        let affects_los = self.is_opaque_at(a) || self.is_opaque_at(b);
        if !self.pool.swap_cells(a, b) {
            return false;
        }
        if affects_los {
            level.invalidate_around(a);
            level.invalidate_around(b);
        }
        true
    }

    /// Put a fully-formed cloud into the pool, with no policy checks beyond
    /// bounds and occupancy. Silently drops it if the pool is full.
    pub(crate) fn spawn<L: Level + ?Sized>(&mut self, level: &mut L, cloud: Cloud) -> Option<SlotId> {
        if cloud.decay < 1 || self.pool.lookup(cloud.pos).is_some() {
            return None;
        }
        let (kind, pos, decay) = (cloud.kind, cloud.pos, cloud.decay);
        match self.pool.allocate(cloud) {
            Some(slot) => {
                log::debug!("{} appears at {} (decay {})", kind, pos, decay);
                visibility::cloud_changed(level, kind, pos);
                Some(slot)
            }
            None => {
                log::warn!("cloud pool full; {} at {} dropped", kind, pos);
                None
            }
        }
    }
}
