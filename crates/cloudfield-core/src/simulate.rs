//! Decay and spread simulation.
//!
//! One call to [`CloudEngine::manage_clouds`] advances every live cloud by
//! the elapsed time. Slots are visited in index order; a cloud created
//! during the pass (by spread, steam or summoning fallout) is skipped until
//! the next pass, even if it lands in a slot the pass has not reached yet.

use rand::Rng;

use crate::cloud::{Cloud, CloudType, KillCategory};
use crate::dice::{div_rand_round, one_chance_in, random2, x_chance_in_y};
use crate::engine::CloudEngine;
use crate::level::{Behaviour, Level, SummonRequest};
use crate::pool::SlotId;

/// Decay for a cloud spreading out of a parent with `decay` left. Always
/// strictly below the parent's; `None` when nothing would be left.
pub(crate) fn child_decay(decay: i32) -> Option<i32> {
    let mut child = decay / 2 + 1;
    if child >= decay {
        child = decay - 1;
    }
    (child >= 1).then_some(child)
}

impl CloudEngine {
    /// Advance every cloud by `time_taken` time units.
    pub fn manage_clouds<L, R>(&mut self, level: &mut L, rng: &mut R, time_taken: i32)
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        for ticket in self.pool.tickets() {
            if !self.pool.ticket_is_current(ticket) {
                continue;
            }
            self.advance(level, rng, ticket.slot, time_taken);
        }
    }

    fn advance<L, R>(&mut self, level: &mut L, rng: &mut R, slot: SlotId, time_taken: i32)
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(mut cloud) = self.pool.get(slot).cloned() else {
            return;
        };

        if cloud.kind.is_fire() {
            self.fire_boils_water(level, rng, &cloud);
        }
        if cloud.kind == CloudType::GhostlyFlame {
            self.ghostly_flame_summons(level, rng, &cloud, time_taken);
        }

        let mut dissipate = self.dissipation_rate(cloud.kind, level.feature(cloud.pos), time_taken);

        if cloud.kind == CloudType::ForestFire {
            self.spread_forest_fire(level, rng, &cloud);
        } else if x_chance_in_y(rng, cloud.spread_rate, 100) {
            cloud.spread_rate -= div_rand_round(rng, cloud.spread_rate, self.tuning.spread_rate_falloff);
            if let Some(c) = self.pool.get_mut(slot) {
                c.spread_rate = cloud.spread_rate;
            }
            dissipate += self.spread(level, rng, &cloud);
        }

        let expired = match self.pool.get_mut(slot) {
            Some(c) => {
                c.decay -= dissipate;
                c.decay < 1
            }
            None => false,
        };
        if expired {
            self.delete(level, rng, slot);
        }
    }

    /// Generic spread into the eight neighbours. Returns the extra decay
    /// the parent pays for its children.
    fn spread<L, R>(&mut self, level: &mut L, rng: &mut R, parent: &Cloud) -> i32
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        let chance = self.tuning.spread_bands.chance_for(parent.decay);
        let Some(decay) = child_decay(parent.decay) else {
            return 0;
        };
        let mut extra = 0;
        for n in parent.pos.neighbours() {
            if random2(rng, 100) >= chance {
                continue;
            }
            if !self.bounds().contains(n) || self.pool.lookup(n).is_some() {
                continue;
            }
            let feature = level.feature(n);
            if feature.is_solid()
                || (level.is_sanctuary(n) && !parent.kind.is_harmless())
                || (parent.kind.needs_water() && !feature.is_watery())
            {
                continue;
            }
            let child = Cloud {
                pos: n,
                decay,
                ..parent.clone()
            };
            if self.spawn(level, child).is_some() {
                extra += self.tuning.spread_extra_decay;
            }
        }
        extra
    }

    /// Forest fire throws flames around itself and sets neighbouring trees
    /// alight, each tree rolling separately.
    fn spread_forest_fire<L, R>(&mut self, level: &mut L, rng: &mut R, parent: &Cloud)
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        let tuning = self.tuning.forest_fire.clone();
        let make_flames = one_chance_in(rng, tuning.flame_one_in);
        for n in parent.pos.neighbours() {
            if !self.bounds().contains(n) || self.pool.lookup(n).is_some() || level.is_sanctuary(n) {
                continue;
            }
            let feature = level.feature(n);

            if make_flames && !feature.is_solid() {
                if let Some(decay) = child_decay(parent.decay) {
                    let flame = Cloud {
                        kind: CloudType::Fire,
                        pos: n,
                        decay,
                        ..parent.clone()
                    };
                    self.spawn(level, flame);
                }
            }

            if feature.is_flammable()
                && one_chance_in(rng, tuning.ignite_one_in)
                && self.burn_tree(level, n, &parent.attribution)
            {
                let burning = Cloud {
                    pos: n,
                    decay: tuning.min_duration + random2(rng, tuning.duration_spread),
                    ..parent.clone()
                };
                self.spawn(level, burning);
            }
        }
    }

    /// Ghostly flame may raise a spectral creature for whoever cast it.
    fn ghostly_flame_summons<L, R>(&self, level: &mut L, rng: &mut R, cloud: &Cloud, time_taken: i32)
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(source) = cloud.attribution.source else {
            return;
        };
        if level.actor_at(cloud.pos).is_some() || !level.actor_exists(source) {
            return;
        }

        let g = &self.tuning.ghostly_flame;
        let nearby = cloud
            .pos
            .within_radius(g.radius)
            .filter(|&p| level.is_spectral_at(p))
            .count();
        let chance = g.rate_for(nearby);
        if !x_chance_in_y(rng, chance, time_taken * g.rate_scale) {
            return;
        }

        let behaviour = match cloud.attribution.whose {
            KillCategory::Other => Behaviour::Hostile,
            KillCategory::Player | KillCategory::Ally => Behaviour::Friendly,
        };
        let request = SummonRequest {
            pos: cloud.pos,
            behaviour,
            summoner: source,
        };
        if level.summon_spectral(request) {
            log::debug!("ghostly flame at {} raises a spectral creature", cloud.pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{ActorId, Attribution};
    use crate::geometry::{Coord, GridBounds};
    use crate::placement::CloudSpec;
    use crate::sandbox::GridLevel;
    use crate::terrain::{Feature, Terrain};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (CloudEngine, GridLevel, StdRng) {
        let bounds = GridBounds::new(16, 16);
        (
            CloudEngine::new(bounds),
            GridLevel::new(bounds),
            StdRng::seed_from_u64(2024),
        )
    }

    #[test]
    fn test_child_decay_strictly_lower() {
        assert_eq!(child_decay(100), Some(51));
        assert_eq!(child_decay(3), Some(2));
        assert_eq!(child_decay(2), Some(1));
        assert_eq!(child_decay(1), None);
        for d in 2..200 {
            let c = child_decay(d).unwrap();
            assert!(c < d && c >= 1);
        }
    }

    #[test]
    fn test_non_spreading_cloud_decays_each_pass() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(5, 5);
        let slot = engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::Poison, pos, 5))
            .slot()
            .unwrap();

        let mut last = engine.get(slot).unwrap().decay;
        for _ in 0..4 {
            engine.manage_clouds(&mut level, &mut rng, 10);
            let now = engine.get(slot).unwrap().decay;
            assert!(now < last);
            last = now;
        }
        engine.manage_clouds(&mut level, &mut rng, 10);
        assert!(engine.lookup(pos).is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_spread_children_are_younger_and_inherit() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(8, 8);
        let attribution = Attribution::player(ActorId(1));
        let spec = CloudSpec::new(CloudType::Mist, pos, 20)
            .spread_rate(100)
            .by(attribution);
        engine.place(&mut level, &mut rng, spec);

        engine.manage_clouds(&mut level, &mut rng, 1);
        assert!(engine.len() > 1, "a fresh cloud at rate 100 spreads");
        let parent = engine.pool().at(pos).unwrap().clone();
        for (_, child) in engine.iter().filter(|(_, c)| c.pos != pos) {
            assert_eq!(child.kind, CloudType::Mist);
            assert_eq!(child.attribution, attribution);
            assert_eq!(child.decay, 101);
            assert_eq!(child.pos.distance(pos), 1);
        }
        let children = engine.len() as i32 - 1;
        assert_eq!(parent.decay, 200 - 1 - 8 * children);
        assert_eq!(parent.spread_rate, 90);
        engine.pool().verify().unwrap();
    }

    #[test]
    fn test_children_not_advanced_in_same_pass() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(8, 8);
        let spec = CloudSpec::new(CloudType::Mist, pos, 20).spread_rate(100);
        engine.place(&mut level, &mut rng, spec);
        engine.manage_clouds(&mut level, &mut rng, 1);
        // every child still has exactly the decay it was born with
        for (_, c) in engine.iter().filter(|(_, c)| c.pos != pos) {
            assert_eq!(c.decay, 101);
        }
    }

    #[test]
    fn test_spread_skips_walls_and_sanctuary() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(8, 8);
        for n in pos.neighbours() {
            if n.x == 9 {
                level.set_feature_at(n, Feature::Wall);
            } else {
                level.set_sanctuary(n, true);
            }
        }
        let spec = CloudSpec::new(CloudType::Poison, pos, 20).spread_rate(100);
        engine.place(&mut level, &mut rng, spec);
        for _ in 0..5 {
            engine.manage_clouds(&mut level, &mut rng, 1);
        }
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_ink_spreads_only_over_water() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(8, 8);
        level.set_feature_at(pos, Feature::DeepWater);
        level.set_feature_at(Coord::new(9, 8), Feature::ShallowWater);
        let spec = CloudSpec::new(CloudType::Ink, pos, 30).spread_rate(100);
        engine.place(&mut level, &mut rng, spec);
        for _ in 0..10 {
            engine.manage_clouds(&mut level, &mut rng, 1);
        }
        for (_, c) in engine.iter() {
            assert!(level.feature(c.pos).is_watery());
        }
    }

    #[test]
    fn test_fire_over_deep_water_burns_out_fast() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(4, 4);
        level.set_feature_at(pos, Feature::DeepWater);
        let slot = engine
            .place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, pos, 5))
            .slot()
            .unwrap();
        engine.manage_clouds(&mut level, &mut rng, 10);
        assert_eq!(engine.get(slot).unwrap().decay, 10);
        engine.manage_clouds(&mut level, &mut rng, 10);
        assert_eq!(engine.type_at(pos), CloudType::None);
    }

    #[test]
    fn test_forest_fire_burns_trees() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(8, 8);
        for n in pos.neighbours() {
            level.set_feature_at(n, Feature::Tree);
        }
        let spec = CloudSpec::new(CloudType::ForestFire, pos, 100).by(Attribution::player(ActorId(0)));
        engine.place(&mut level, &mut rng, spec);
        for _ in 0..60 {
            engine.manage_clouds(&mut level, &mut rng, 1);
        }
        let burnt = pos
            .neighbours()
            .filter(|&n| level.feature(n) == Feature::Floor)
            .count();
        assert!(burnt > 0);
        assert_eq!(
            level.conducts.len(),
            level
                .conducts
                .iter()
                .filter(|(c, _)| *c == crate::level::Conduct::KilledPlant)
                .count()
        );
        assert!(!level.conducts.is_empty());
        engine.pool().verify().unwrap();
    }

    #[test]
    fn test_ghostly_flame_needs_living_source() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(3, 3);
        let spec = CloudSpec::new(CloudType::GhostlyFlame, pos, 500).by(Attribution::hostile(ActorId(9)));
        engine.place(&mut level, &mut rng, spec);
        for _ in 0..100 {
            engine.manage_clouds(&mut level, &mut rng, 10);
        }
        assert!(level.summons.is_empty());
    }

    #[test]
    fn test_ghostly_flame_summons_for_source() {
        let (mut engine, mut level, mut rng) = setup();
        let pos = Coord::new(3, 3);
        level.add_actor(ActorId(9), Coord::new(10, 10));
        let spec = CloudSpec::new(CloudType::GhostlyFlame, pos, 500).by(Attribution::hostile(ActorId(9)));
        engine.place(&mut level, &mut rng, spec);
        for _ in 0..100 {
            engine.manage_clouds(&mut level, &mut rng, 10);
            if !level.summons.is_empty() {
                break;
            }
        }
        let request = level.summons[0];
        assert_eq!(request.pos, pos);
        assert_eq!(request.behaviour, Behaviour::Hostile);
        assert_eq!(request.summoner, ActorId(9));
    }
}
