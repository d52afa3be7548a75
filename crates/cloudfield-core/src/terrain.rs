//! Terrain as seen by the cloud engine.
//!
//! The engine only needs a handful of classifications (solid, watery, lava,
//! flammable) and two ways of changing the map: permanently (a tree burning
//! down) and temporarily (rain flooding a floor).

use serde::{Deserialize, Serialize};

use crate::geometry::Coord;

/// Terrain feature occupying a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[default]
    Floor,
    ShallowWater,
    DeepWater,
    Lava,
    Tree,
    Wall,
}

impl Feature {
    /// Nothing, cloud or creature, may occupy it.
    pub fn is_solid(self) -> bool {
        matches!(self, Feature::Tree | Feature::Wall)
    }

    pub fn is_watery(self) -> bool {
        matches!(self, Feature::ShallowWater | Feature::DeepWater)
    }

    pub fn is_lava(self) -> bool {
        self == Feature::Lava
    }

    pub fn is_flammable(self) -> bool {
        self == Feature::Tree
    }
}

/// Why a temporary terrain change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainChangeCause {
    Flood,
}

/// Read/write access to the level's terrain.
///
/// Cells outside the grid must report `Feature::Wall`.
pub trait Terrain {
    fn feature(&self, pos: Coord) -> Feature;

    /// Harmful clouds may not be created here.
    fn is_sanctuary(&self, pos: Coord) -> bool;

    /// A marker forbids fire from destroying this cell's feature.
    fn fire_vetoed(&self, pos: Coord) -> bool;

    /// Permanently replace the feature at `pos`.
    fn set_feature(&mut self, pos: Coord, feature: Feature);

    /// Replace the feature at `pos` for `duration` time units, after which
    /// it reverts.
    fn change_temporarily(
        &mut self,
        pos: Coord,
        feature: Feature,
        duration: i32,
        cause: TerrainChangeCause,
    );

    /// How many of the eight neighbours of `pos` carry `feature`.
    fn count_neighbours(&self, pos: Coord, feature: Feature) -> i32 {
        pos.neighbours()
            .filter(|&n| self.feature(n) == feature)
            .count() as i32
    }
}
