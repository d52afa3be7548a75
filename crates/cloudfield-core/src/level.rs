//! The rest of the game, as far as the cloud engine is concerned.

use serde::{Deserialize, Serialize};

use crate::cloud::{ActorId, Attribution};
use crate::geometry::Coord;
use crate::terrain::Terrain;
use crate::visibility::Visibility;

/// Which side a summoned creature fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behaviour {
    Friendly,
    Hostile,
}

/// Request to raise a spectral creature from a ghostly flame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonRequest {
    pub pos: Coord,
    pub behaviour: Behaviour,
    pub summoner: ActorId,
}

/// Conduct events credited to whoever is responsible for a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conduct {
    /// The player's own fire consumed a plant.
    KilledPlant,
    /// An ally's fire consumed a plant.
    PlantKilledByServant,
    /// A mutagenic cloud mutated a creature.
    CausedMutation,
}

/// Actor lookups the engine needs while simulating.
pub trait Occupants {
    fn actor_at(&self, pos: Coord) -> Option<ActorId>;

    fn actor_exists(&self, id: ActorId) -> bool;

    /// Where the player stands, if on this level.
    fn player_pos(&self) -> Option<Coord>;

    /// A spectral creature stands at `pos`.
    fn is_spectral_at(&self, pos: Coord) -> bool;

    /// Create a spectral creature. Returns whether one appeared.
    fn summon_spectral(&mut self, request: SummonRequest) -> bool;
}

/// Sink for conduct/credit bookkeeping.
pub trait ConductLog {
    fn record(&mut self, conduct: Conduct, attribution: &Attribution);
}

/// Everything a simulation step may touch outside the pool.
pub trait Level: Terrain + Visibility + Occupants + ConductLog {}

impl<T> Level for T where T: Terrain + Visibility + Occupants + ConductLog {}
