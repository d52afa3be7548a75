//! Fixed-capacity cloud arena with a dense position index.
//!
//! Slots hold `Cloud` records; an empty slot has kind `CloudType::None`.
//! The index maps every grid cell to the slot occupying it. All mutation
//! keeps the two in agreement:
//!
//! - slot `s` is live iff `index[slot[s].pos] == Some(s)`
//! - `live` equals the number of live slots
//!
//! The pool performs no gameplay checks; placement policy lives in
//! [`crate::placement`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cloud::{Cloud, CloudType};
use crate::config::MAX_CLOUDS;
use crate::geometry::{Coord, GridBounds};

/// Index of a slot in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub usize);

/// Identifies one particular occupancy of a slot. Freed-and-reused slots get
/// a new generation, so a stale handle never matches the new cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotTicket {
    pub slot: SlotId,
    pub generation: u32,
}

#[derive(Debug, Clone)]
pub struct CloudPool {
    bounds: GridBounds,
    slots: Vec<Cloud>,
    generations: Vec<u32>,
    index: Vec<Option<SlotId>>,
    live: usize,
}

impl CloudPool {
    pub fn new(bounds: GridBounds) -> Self {
        Self::with_capacity(bounds, MAX_CLOUDS)
    }

    /// A pool with a non-standard slot count, for small test levels.
    pub fn with_capacity(bounds: GridBounds, capacity: usize) -> Self {
        Self {
            bounds,
            slots: vec![Cloud::default(); capacity],
            generations: vec![0; capacity],
            index: vec![None; bounds.cell_count()],
            live: 0,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_full(&self) -> bool {
        self.live >= self.slots.len()
    }

    /// Slot occupying `pos`, if any.
    pub fn lookup(&self, pos: Coord) -> Option<SlotId> {
        self.bounds.index(pos).and_then(|i| self.index[i])
    }

    /// The live cloud in `slot`.
    pub fn get(&self, slot: SlotId) -> Option<&Cloud> {
        self.slots.get(slot.0).filter(|c| c.is_live())
    }

    pub(crate) fn get_mut(&mut self, slot: SlotId) -> Option<&mut Cloud> {
        self.slots.get_mut(slot.0).filter(|c| c.is_live())
    }

    pub fn at(&self, pos: Coord) -> Option<&Cloud> {
        self.lookup(pos).and_then(|s| self.get(s))
    }

    pub fn type_at(&self, pos: Coord) -> CloudType {
        self.at(pos).map_or(CloudType::None, |c| c.kind)
    }

    /// Live clouds in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Cloud)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_live())
            .map(|(i, c)| (SlotId(i), c))
    }

    /// Every slot, empty ones included, in slot order.
    pub fn slots(&self) -> &[Cloud] {
        &self.slots
    }

    /// Reserve the first free slot for `cloud`.
    ///
    /// Returns `None` when the pool is full. The caller must have checked
    /// that `cloud.pos` is in bounds and unoccupied.
    pub fn allocate(&mut self, cloud: Cloud) -> Option<SlotId> {
        if cloud.kind.is_none() || self.is_full() {
            return None;
        }
        let cell = self.bounds.index(cloud.pos)?;
        debug_assert!(
            self.index[cell].is_none(),
            "allocating a cloud on occupied cell {}",
            cloud.pos
        );

        let slot = self.slots.iter().position(|c| !c.is_live())?;
        self.slots[slot] = cloud;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.index[cell] = Some(SlotId(slot));
        self.live += 1;
        Some(SlotId(slot))
    }

    /// Clear `slot`, returning the cloud that was there.
    pub fn free(&mut self, slot: SlotId) -> Option<Cloud> {
        let cloud = self.slots.get_mut(slot.0).filter(|c| c.is_live())?;
        let removed = std::mem::take(cloud);

        if let Some(cell) = self.bounds.index(removed.pos) {
            debug_assert_eq!(
                self.index[cell],
                Some(slot),
                "freeing slot {:?} whose cell {} points elsewhere",
                slot,
                removed.pos
            );
            self.index[cell] = None;
        }
        self.live -= 1;
        Some(removed)
    }

    /// Move the cloud in `slot` to `to`. Returns the old position.
    ///
    /// Fails (returning `None`) if `to` is out of bounds or already holds
    /// another cloud.
    pub fn relocate(&mut self, slot: SlotId, to: Coord) -> Option<Coord> {
        let to_cell = self.bounds.index(to)?;
        let from = self.get(slot)?.pos;
        if from == to {
            return Some(from);
        }
        if self.index[to_cell].is_some() {
            return None;
        }
        if let Some(from_cell) = self.bounds.index(from) {
            self.index[from_cell] = None;
        }
        self.index[to_cell] = Some(slot);
        self.slots[slot.0].pos = to;
        Some(from)
    }

    /// Exchange whatever occupies `a` and `b` (either may be empty).
    pub fn swap_cells(&mut self, a: Coord, b: Coord) -> bool {
        let (Some(ca), Some(cb)) = (self.bounds.index(a), self.bounds.index(b)) else {
            return false;
        };
        if ca == cb {
            return true;
        }
        let sa = self.index[ca];
        let sb = self.index[cb];
        if let Some(s) = sa {
            self.slots[s.0].pos = b;
        }
        if let Some(s) = sb {
            self.slots[s.0].pos = a;
        }
        self.index[ca] = sb;
        self.index[cb] = sa;
        true
    }

    pub(crate) fn tickets(&self) -> Vec<SlotTicket> {
        self.iter()
            .map(|(slot, _)| SlotTicket {
                slot,
                generation: self.generations[slot.0],
            })
            .collect()
    }

    pub(crate) fn ticket_is_current(&self, ticket: SlotTicket) -> bool {
        self.get(ticket.slot).is_some() && self.generations[ticket.slot.0] == ticket.generation
    }

    /// Rebuild a pool from an ordered slot list.
    pub fn from_slots(bounds: GridBounds, slots: Vec<Cloud>) -> Result<Self, PoolError> {
        let cells = bounds
            .checked_cell_count()
            .ok_or(PoolError::BadBounds { bounds })?;
        let mut pool = Self {
            bounds,
            generations: vec![0; slots.len()],
            index: vec![None; cells],
            slots,
            live: 0,
        };
        for (i, cloud) in pool.slots.iter().enumerate() {
            if !cloud.is_live() {
                continue;
            }
            let cell = bounds
                .index(cloud.pos)
                .ok_or(PoolError::OutOfBounds { slot: SlotId(i), pos: cloud.pos })?;
            if let Some(other) = pool.index[cell] {
                return Err(PoolError::DoubleOccupancy {
                    pos: cloud.pos,
                    first: other,
                    second: SlotId(i),
                });
            }
            pool.index[cell] = Some(SlotId(i));
            pool.live += 1;
        }
        Ok(pool)
    }

    /// Check every pool/index invariant, reporting the first violation.
    pub fn verify(&self) -> Result<(), PoolError> {
        let mut live = 0;
        for (i, cloud) in self.slots.iter().enumerate() {
            if !cloud.is_live() {
                continue;
            }
            live += 1;
            let slot = SlotId(i);
            let cell = self
                .bounds
                .index(cloud.pos)
                .ok_or(PoolError::OutOfBounds { slot, pos: cloud.pos })?;
            if self.index[cell] != Some(slot) {
                return Err(PoolError::Unindexed { slot, pos: cloud.pos });
            }
        }
        for (cell, entry) in self.index.iter().enumerate() {
            let Some(slot) = *entry else { continue };
            let pos = Coord::new(
                cell as i32 % self.bounds.width,
                cell as i32 / self.bounds.width,
            );
            match self.slots.get(slot.0) {
                Some(c) if c.is_live() && c.pos == pos => {}
                _ => return Err(PoolError::Dangling { pos, slot }),
            }
        }
        if live != self.live {
            return Err(PoolError::LiveCount {
                counted: live,
                recorded: self.live,
            });
        }
        Ok(())
    }
}

/// A broken pool/index invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("grid {bounds:?} is negative or too large to index")]
    BadBounds { bounds: GridBounds },
    #[error("slot {slot:?} holds a cloud outside the grid at {pos}")]
    OutOfBounds { slot: SlotId, pos: Coord },
    #[error("slot {slot:?} at {pos} is missing from the index")]
    Unindexed { slot: SlotId, pos: Coord },
    #[error("index at {pos} points to slot {slot:?}, which is not there")]
    Dangling { pos: Coord, slot: SlotId },
    #[error("cell {pos} claimed by both {first:?} and {second:?}")]
    DoubleOccupancy {
        pos: Coord,
        first: SlotId,
        second: SlotId,
    },
    #[error("live count {recorded} disagrees with {counted} live slots")]
    LiveCount { counted: usize, recorded: usize },
}
