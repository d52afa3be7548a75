//! Placement policy - whether a new cloud may appear at a cell, and what
//! happens to whatever is already there.

use rand::Rng;

use crate::cloud::{Attribution, Cloud, CloudType, Cosmetic};
use crate::config::DECAY_PER_TURN;
use crate::dice::{one_chance_in, random2};
use crate::engine::CloudEngine;
use crate::geometry::Coord;
use crate::level::Level;
use crate::pool::SlotId;

/// Everything needed to create a cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudSpec {
    pub kind: CloudType,
    pub pos: Coord,
    /// Lifetime in turns; stored internally as `duration * 10` decay.
    pub duration: i32,
    pub attribution: Attribution,
    /// `None` picks the type's default spread rate.
    pub spread_rate: Option<i32>,
    pub cosmetic: Cosmetic,
    pub excl_rad: i32,
}

impl CloudSpec {
    pub fn new(kind: CloudType, pos: Coord, duration: i32) -> Self {
        Self {
            kind,
            pos,
            duration,
            attribution: Attribution::environment(),
            spread_rate: None,
            cosmetic: Cosmetic::default(),
            excl_rad: -1,
        }
    }

    pub fn by(mut self, attribution: Attribution) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn spread_rate(mut self, rate: i32) -> Self {
        self.spread_rate = Some(rate);
        self
    }

    pub fn cosmetic(mut self, cosmetic: Cosmetic) -> Self {
        self.cosmetic = cosmetic;
        self
    }

    pub fn exclusion_radius(mut self, radius: i32) -> Self {
        self.excl_rad = radius;
        self
    }
}

/// Why a placement created nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Type `None`, or a duration that is non-positive or too large to
    /// express in decay units.
    Empty,
    OutOfBounds,
    /// Harmful cloud inside a sanctuary.
    Sanctuary,
    /// The type can't exist on this terrain (ink off water).
    Terrain,
    Solid,
    /// The existing cloud may not be overwritten.
    Occupied,
    /// No slot could be found or freed.
    PoolFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Created(SlotId),
    Rejected(Rejection),
}

impl Placement {
    pub fn slot(self) -> Option<SlotId> {
        match self {
            Placement::Created(slot) => Some(slot),
            Placement::Rejected(_) => None,
        }
    }

    pub fn is_created(self) -> bool {
        matches!(self, Placement::Created(_))
    }
}

/// Nothing to create: no type, or a duration outside `1..=i32::MAX / DECAY_PER_TURN`.
fn is_empty_spec(spec: &CloudSpec) -> bool {
    spec.kind.is_none() || spec.duration < 1 || spec.duration > i32::MAX / DECAY_PER_TURN
}

/// `new` is a recognised upgrade of `existing` in place.
fn is_stronger_variant(new: CloudType, existing: CloudType) -> bool {
    match (new, existing) {
        (CloudType::Poison, CloudType::NoxiousGas) => true,
        (CloudType::RagingWinds, _) => true,
        _ => false,
    }
}

impl CloudEngine {
    /// May a cloud of `new` replace the one in `existing`?
    ///
    /// Only weak occupants (smoke, mist, nearly expired) and the pairings in
    /// `is_stronger_variant` give way. Fresh trails are not weak, so they
    /// hold their cell against fire or gas until they fade.
    pub fn can_overwrite(&self, new: CloudType, existing: SlotId) -> bool {
        match self.pool.get(existing) {
            Some(cloud) => {
                cloud.is_weak(self.tuning.weak_decay) || is_stronger_variant(new, cloud.kind)
            }
            None => true,
        }
    }

    /// Terrain checks shared by every creation path.
    fn site_check<L: Level + ?Sized>(&self, level: &L, kind: CloudType, pos: Coord) -> Result<(), Rejection> {
        if !self.bounds().contains(pos) {
            return Err(Rejection::OutOfBounds);
        }
        if level.is_sanctuary(pos) && !kind.is_harmless() {
            return Err(Rejection::Sanctuary);
        }
        let feature = level.feature(pos);
        if kind.needs_water() && !feature.is_watery() {
            return Err(Rejection::Terrain);
        }
        if feature.is_solid() {
            return Err(Rejection::Solid);
        }
        Ok(())
    }

    /// Create a cloud, overwriting a weaker occupant and evicting under pool
    /// pressure as needed.
    pub fn place<L, R>(&mut self, level: &mut L, rng: &mut R, spec: CloudSpec) -> Placement
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        if is_empty_spec(&spec) {
            return Placement::Rejected(Rejection::Empty);
        }
        if let Err(why) = self.site_check(level, spec.kind, spec.pos) {
            return Placement::Rejected(why);
        }

        if let Some(existing) = self.pool.lookup(spec.pos) {
            if !self.can_overwrite(spec.kind, existing) {
                return Placement::Rejected(Rejection::Occupied);
            }
            log::debug!(
                "{} overwrites {} at {}",
                spec.kind,
                self.pool.type_at(spec.pos),
                spec.pos
            );
            self.delete(level, rng, existing);
            debug_assert!(self.pool.lookup(spec.pos).is_none());
        }

        if self.pool.is_full() {
            match self.choose_victim(rng) {
                Some(victim) => {
                    log::debug!("cloud pool full; evicting slot {:?}", victim);
                    self.delete(level, rng, victim);
                }
                None => return Placement::Rejected(Rejection::PoolFull),
            }
        }

        let cloud = self.cloud_from_spec(spec);
        match self.spawn(level, cloud) {
            Some(slot) => Placement::Created(slot),
            None => Placement::Rejected(Rejection::PoolFull),
        }
    }

    /// Create a cloud only if the cell is empty. Never overwrites or evicts.
    ///
    /// For ambient emitters that shouldn't stomp on anything.
    pub fn check_place<L, R>(&mut self, level: &mut L, rng: &mut R, spec: CloudSpec) -> Placement
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        if is_empty_spec(&spec) {
            return Placement::Rejected(Rejection::Empty);
        }
        if let Err(why) = self.site_check(level, spec.kind, spec.pos) {
            return Placement::Rejected(why);
        }
        if self.pool.lookup(spec.pos).is_some() {
            return Placement::Rejected(Rejection::Occupied);
        }
        if self.pool.is_full() {
            return Placement::Rejected(Rejection::PoolFull);
        }
        self.place(level, rng, spec)
    }

    /// A weak cloud if any exist (uniformly among them), else any slot.
    fn choose_victim<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SlotId> {
        let weak_decay = self.tuning.weak_decay;
        let mut chosen = None;
        let mut seen = 0;
        for (slot, cloud) in self.pool.iter() {
            if cloud.is_weak(weak_decay) {
                seen += 1;
                if one_chance_in(rng, seen) {
                    chosen = Some(slot);
                }
            }
        }
        if chosen.is_some() {
            return chosen;
        }
        let capacity = self.pool.capacity() as i32;
        if capacity == 0 {
            return None;
        }
        let slot = SlotId(random2(rng, capacity) as usize);
        self.pool.get(slot).map(|_| slot)
    }

    fn cloud_from_spec(&self, spec: CloudSpec) -> Cloud {
        Cloud {
            kind: spec.kind,
            pos: spec.pos,
            decay: spec.duration * DECAY_PER_TURN,
            spread_rate: self.tuning.spread_rate_for(spec.kind, spec.spread_rate),
            attribution: spec.attribution,
            cosmetic: spec.cosmetic,
            excl_rad: spec.excl_rad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudTuning;
    use crate::geometry::GridBounds;
    use crate::pool::CloudPool;
    use crate::sandbox::GridLevel;
    use crate::terrain::Feature;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (CloudEngine, GridLevel, StdRng) {
        let bounds = GridBounds::new(12, 12);
        (
            CloudEngine::new(bounds),
            GridLevel::new(bounds),
            StdRng::seed_from_u64(99),
        )
    }

    #[test]
    fn test_place_sets_decay_and_default_spread() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(4, 4);
        let slot = engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::GreySmoke, pos, 7))
            .slot()
            .unwrap();
        let cloud = engine.get(slot).unwrap();
        assert_eq!(cloud.decay, 70);
        assert_eq!(cloud.spread_rate, 22);
        assert_eq!(cloud.excl_rad, -1);
        assert_eq!(level.invalidations, vec![pos]);
    }

    #[test]
    fn test_explicit_spread_rate_wins() {
        let (mut engine, mut level, mut rng) = setup();
        let spec = CloudSpec::new(CloudType::Poison, Coord::new(1, 1), 3).spread_rate(40);
        let slot = engine.place(&mut level, &mut rng, spec).slot().unwrap();
        assert_eq!(engine.get(slot).unwrap().spread_rate, 40);
    }

    #[test]
    fn test_rejects_sanctuary_unless_harmless() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(2, 2);
        level.set_sanctuary(pos, true);
        assert_eq!(
            engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, pos, 5)),
            Placement::Rejected(Rejection::Sanctuary)
        );
        assert!(engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::Mist, pos, 5))
            .is_created());
    }

    #[test]
    fn test_ink_needs_water() {
        let (mut engine, mut level, mut rng) = setup();
        let dry = Coord::new(2, 2);
        let wet = Coord::new(3, 2);
        level.set_feature_at(wet, Feature::DeepWater);
        assert_eq!(
            engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Ink, dry, 5)),
            Placement::Rejected(Rejection::Terrain)
        );
        assert!(engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::Ink, wet, 5))
            .is_created());
    }

    #[test]
    fn test_rejects_solid_and_out_of_bounds() {
        let (mut engine, mut level, mut rng) = setup();
        let wall = Coord::new(5, 5);
        level.set_feature_at(wall, Feature::Wall);
        assert_eq!(
            engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, wall, 5)),
            Placement::Rejected(Rejection::Solid)
        );
        assert_eq!(
            engine.place(
                &mut level,
                &mut rng,
                CloudSpec::new(CloudType::Fire, Coord::new(-1, 0), 5)
            ),
            Placement::Rejected(Rejection::OutOfBounds)
        );
        assert!(engine.is_empty());
    }

    #[test]
    fn test_weak_smoke_is_overwritten() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(6, 6);
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::BlackSmoke, pos, 10));
        let placed = engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Poison, pos, 4));
        assert!(placed.is_created());
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.type_at(pos), CloudType::Poison);
        engine.pool().verify().unwrap();
    }

    #[test]
    fn test_strong_occupant_rejects() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(6, 6);
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, pos, 10));
        let before = engine.pool().slots().to_vec();
        assert_eq!(
            engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::FreezingVapour, pos, 10)),
            Placement::Rejected(Rejection::Occupied)
        );
        assert_eq!(engine.pool().slots(), &before[..]);
    }

    #[test]
    fn test_stronger_variant_pairs() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(6, 6);
        let gas = engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::NoxiousGas, pos, 10))
            .slot()
            .unwrap();
        assert!(engine.can_overwrite(CloudType::Poison, gas));
        assert!(engine.can_overwrite(CloudType::RagingWinds, gas));
        assert!(!engine.can_overwrite(CloudType::NoxiousGas, gas));
        assert!(!engine.can_overwrite(CloudType::Fire, gas));
    }

    #[test]
    fn test_nearly_expired_is_weak() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(6, 6);
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, pos, 2));
        assert!(engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::FreezingVapour, pos, 5))
            .is_created());
        assert_eq!(engine.type_at(pos), CloudType::FreezingVapour);
    }

    #[test]
    fn test_huge_duration_leaves_occupant_alone() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(3, 3);
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::GreySmoke, pos, 10));
        let before = engine.pool().slots().to_vec();
        let invalidations = level.invalidations.clone();

        for duration in [i32::MAX / 5, i32::MAX] {
            let spec = CloudSpec::new(CloudType::Poison, pos, duration);
            assert_eq!(
                engine.place(&mut level, &mut rng, spec.clone()),
                Placement::Rejected(Rejection::Empty)
            );
            assert_eq!(
                engine.check_place(&mut level, &mut rng, spec),
                Placement::Rejected(Rejection::Empty)
            );
        }
        assert_eq!(engine.pool().slots(), &before[..]);
        assert_eq!(level.invalidations, invalidations);

        let longest = i32::MAX / DECAY_PER_TURN;
        let slot = engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::Poison, pos, longest))
            .slot()
            .unwrap();
        assert_eq!(engine.get(slot).unwrap().decay, longest * DECAY_PER_TURN);
    }

    #[test]
    fn test_fresh_trail_holds_its_cell() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(7, 7);
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::MagicTrail, pos, 10));
        assert_eq!(
            engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, pos, 5)),
            Placement::Rejected(Rejection::Occupied)
        );
        assert!(engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::RagingWinds, pos, 5))
            .is_created());
    }

    #[test]
    fn test_check_place_never_overwrites() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(6, 6);
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::GreySmoke, pos, 5));
        assert_eq!(
            engine.check_place(&mut level, &mut rng, CloudSpec::new(CloudType::Poison, pos, 5)),
            Placement::Rejected(Rejection::Occupied)
        );
        assert_eq!(engine.type_at(pos), CloudType::GreySmoke);
    }

    #[test]
    fn test_full_pool_evicts_weak_first() {
        let bounds = GridBounds::new(12, 12);
        let mut engine =
            CloudEngine::from_parts(CloudPool::with_capacity(bounds, 3), CloudTuning::default());
        let mut level = GridLevel::new(bounds);
        let mut rng = StdRng::seed_from_u64(4);

        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, Coord::new(0, 0), 10));
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Mist, Coord::new(1, 0), 10));
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, Coord::new(2, 0), 10));

        let placed = engine.place(
            &mut level,
            &mut rng,
            CloudSpec::new(CloudType::Poison, Coord::new(5, 5), 10),
        );
        assert!(placed.is_created());
        assert_eq!(engine.len(), 3);
        assert_eq!(engine.type_at(Coord::new(1, 0)), CloudType::None);
        assert_eq!(engine.type_at(Coord::new(0, 0)), CloudType::Fire);
        assert_eq!(engine.type_at(Coord::new(2, 0)), CloudType::Fire);
        engine.pool().verify().unwrap();
    }

    #[test]
    fn test_full_pool_without_weak_evicts_someone() {
        let bounds = GridBounds::new(12, 12);
        let mut engine =
            CloudEngine::from_parts(CloudPool::with_capacity(bounds, 2), CloudTuning::default());
        let mut level = GridLevel::new(bounds);
        let mut rng = StdRng::seed_from_u64(8);

        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, Coord::new(0, 0), 10));
        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, Coord::new(1, 0), 10));
        let placed = engine.place(
            &mut level,
            &mut rng,
            CloudSpec::new(CloudType::Poison, Coord::new(5, 5), 10),
        );
        assert!(placed.is_created());
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.type_at(Coord::new(5, 5)), CloudType::Poison);
    }

    #[test]
    fn test_check_place_on_full_pool_does_not_evict() {
        let bounds = GridBounds::new(12, 12);
        let mut engine =
            CloudEngine::from_parts(CloudPool::with_capacity(bounds, 1), CloudTuning::default());
        let mut level = GridLevel::new(bounds);
        let mut rng = StdRng::seed_from_u64(8);

        engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::Mist, Coord::new(0, 0), 10));
        assert_eq!(
            engine.check_place(
                &mut level,
                &mut rng,
                CloudSpec::new(CloudType::Mist, Coord::new(3, 3), 10)
            ),
            Placement::Rejected(Rejection::PoolFull)
        );
        assert_eq!(engine.type_at(Coord::new(0, 0)), CloudType::Mist);
    }
}
