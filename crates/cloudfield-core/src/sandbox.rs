//! In-memory level for tools and tests.
//!
//! `GridLevel` implements every collaborator trait over plain vectors and
//! records what the engine asked of it.

use std::collections::{HashMap, HashSet};

use crate::cloud::{ActorId, Attribution};
use crate::geometry::{Coord, GridBounds};
use crate::level::{Conduct, ConductLog, Occupants, SummonRequest};
use crate::terrain::{Feature, Terrain, TerrainChangeCause};
use crate::visibility::Visibility;

/// A temporary terrain change the engine requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainChange {
    pub pos: Coord,
    pub from: Feature,
    pub to: Feature,
    pub duration: i32,
    pub cause: TerrainChangeCause,
}

#[derive(Debug, Clone)]
pub struct GridLevel {
    bounds: GridBounds,
    features: Vec<Feature>,
    sanctuary: HashSet<Coord>,
    fire_vetoes: HashSet<Coord>,
    actors: HashMap<ActorId, Coord>,
    spectral: HashSet<Coord>,
    next_summon: u32,
    pub player_pos: Option<Coord>,
    /// Every `invalidate_around` call, in order.
    pub invalidations: Vec<Coord>,
    pub terrain_changes: Vec<TerrainChange>,
    pub conducts: Vec<(Conduct, Attribution)>,
    pub summons: Vec<SummonRequest>,
}

impl GridLevel {
    /// An all-floor level.
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            features: vec![Feature::Floor; bounds.cell_count()],
            sanctuary: HashSet::new(),
            fire_vetoes: HashSet::new(),
            actors: HashMap::new(),
            spectral: HashSet::new(),
            next_summon: 10_000,
            player_pos: None,
            invalidations: Vec::new(),
            terrain_changes: Vec::new(),
            conducts: Vec::new(),
            summons: Vec::new(),
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Set up terrain without it counting as an engine-made change.
    pub fn set_feature_at(&mut self, pos: Coord, feature: Feature) {
        if let Some(i) = self.bounds.index(pos) {
            self.features[i] = feature;
        }
    }

    /// Fill the rectangle from `a` to `b` inclusive.
    pub fn fill(&mut self, a: Coord, b: Coord, feature: Feature) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                self.set_feature_at(Coord::new(x, y), feature);
            }
        }
    }

    pub fn set_sanctuary(&mut self, pos: Coord, on: bool) {
        if on {
            self.sanctuary.insert(pos);
        } else {
            self.sanctuary.remove(&pos);
        }
    }

    pub fn set_fire_veto(&mut self, pos: Coord, on: bool) {
        if on {
            self.fire_vetoes.insert(pos);
        } else {
            self.fire_vetoes.remove(&pos);
        }
    }

    pub fn add_actor(&mut self, id: ActorId, pos: Coord) {
        self.actors.insert(id, pos);
    }

    pub fn move_actor(&mut self, id: ActorId, pos: Coord) {
        if let Some(p) = self.actors.get_mut(&id) {
            *p = pos;
        }
    }

    pub fn remove_actor(&mut self, id: ActorId) {
        if let Some(pos) = self.actors.remove(&id) {
            self.spectral.remove(&pos);
        }
    }

    pub fn spectral_count(&self) -> usize {
        self.spectral.len()
    }
}

impl Terrain for GridLevel {
    fn feature(&self, pos: Coord) -> Feature {
        self.bounds
            .index(pos)
            .map_or(Feature::Wall, |i| self.features[i])
    }

    fn is_sanctuary(&self, pos: Coord) -> bool {
        self.sanctuary.contains(&pos)
    }

    fn fire_vetoed(&self, pos: Coord) -> bool {
        self.fire_vetoes.contains(&pos)
    }

    fn set_feature(&mut self, pos: Coord, feature: Feature) {
        self.set_feature_at(pos, feature);
    }

    fn change_temporarily(
        &mut self,
        pos: Coord,
        feature: Feature,
        duration: i32,
        cause: TerrainChangeCause,
    ) {
        let from = self.feature(pos);
        self.terrain_changes.push(TerrainChange {
            pos,
            from,
            to: feature,
            duration,
            cause,
        });
        self.set_feature_at(pos, feature);
    }
}

impl Visibility for GridLevel {
    fn invalidate_around(&mut self, pos: Coord) {
        self.invalidations.push(pos);
    }
}

impl Occupants for GridLevel {
    fn actor_at(&self, pos: Coord) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|(_, p)| **p == pos)
            .map(|(&id, _)| id)
    }

    fn actor_exists(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    fn player_pos(&self) -> Option<Coord> {
        self.player_pos
    }

    fn is_spectral_at(&self, pos: Coord) -> bool {
        self.spectral.contains(&pos)
    }

    fn summon_spectral(&mut self, request: SummonRequest) -> bool {
        if self.actor_at(request.pos).is_some() || self.feature(request.pos).is_solid() {
            return false;
        }
        let id = ActorId(self.next_summon);
        self.next_summon += 1;
        self.actors.insert(id, request.pos);
        self.spectral.insert(request.pos);
        self.summons.push(request);
        true
    }
}

impl ConductLog for GridLevel {
    fn record(&mut self, conduct: Conduct, attribution: &Attribution) {
        self.conducts.push((conduct, *attribution));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Behaviour;

    #[test]
    fn test_out_of_bounds_is_wall() {
        let level = GridLevel::new(GridBounds::new(3, 3));
        assert_eq!(level.feature(Coord::new(-1, 0)), Feature::Wall);
        assert_eq!(level.feature(Coord::new(3, 0)), Feature::Wall);
        assert_eq!(level.feature(Coord::new(1, 1)), Feature::Floor);
    }

    #[test]
    fn test_count_neighbours_at_edge() {
        let mut level = GridLevel::new(GridBounds::new(3, 3));
        level.fill(Coord::new(0, 0), Coord::new(2, 0), Feature::DeepWater);
        assert_eq!(level.count_neighbours(Coord::new(1, 1), Feature::DeepWater), 3);
        // five of the corner's neighbours are off the grid
        assert_eq!(level.count_neighbours(Coord::new(0, 0), Feature::Wall), 5);
    }

    #[test]
    fn test_temporary_change_is_logged() {
        let mut level = GridLevel::new(GridBounds::new(3, 3));
        let pos = Coord::new(1, 2);
        level.change_temporarily(pos, Feature::ShallowWater, 700, TerrainChangeCause::Flood);
        assert_eq!(level.feature(pos), Feature::ShallowWater);
        assert_eq!(level.terrain_changes[0].from, Feature::Floor);
        assert_eq!(level.terrain_changes[0].duration, 700);
    }

    #[test]
    fn test_summon_occupies_cell() {
        let mut level = GridLevel::new(GridBounds::new(3, 3));
        let request = SummonRequest {
            pos: Coord::new(1, 1),
            behaviour: Behaviour::Friendly,
            summoner: ActorId(0),
        };
        assert!(level.summon_spectral(request));
        assert!(level.is_spectral_at(Coord::new(1, 1)));
        assert!(level.actor_at(Coord::new(1, 1)).is_some());
        assert!(!level.summon_spectral(request));
        assert_eq!(level.spectral_count(), 1);
    }
}
