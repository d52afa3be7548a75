//! Terrain feedback: how terrain speeds a cloud's end, and how clouds
//! change terrain (rain floods, fire boils water and burns trees).

use rand::Rng;

use crate::cloud::{Attribution, Cloud, CloudType, KillCategory};
use crate::dice::{one_chance_in, random_range};
use crate::engine::CloudEngine;
use crate::geometry::Coord;
use crate::level::{Conduct, Level};
use crate::terrain::{Feature, TerrainChangeCause};

impl CloudEngine {
    /// Dissipation for one pass: elapsed time, scaled up when the cloud sits
    /// on terrain hostile to it.
    pub(crate) fn dissipation_rate(&self, kind: CloudType, feature: Feature, time_taken: i32) -> i32 {
        let d = &self.tuning.dissipation;
        let multiplier = if kind.is_fire() && feature == Feature::DeepWater {
            d.fire_over_deep_water
        } else if kind.is_cold() && feature.is_lava() {
            d.cold_over_lava
        } else if kind.needs_water() && !feature.is_watery() {
            d.water_cloud_off_water
        } else {
            1
        };
        time_taken * multiplier
    }

    /// Expiring rain may leave standing water behind: floor floods, and
    /// shallow water (other than under the player) deepens.
    pub(crate) fn rain_leaves_water<L, R>(&self, level: &mut L, rng: &mut R, pos: Coord)
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        let rain = &self.tuning.rain;
        let lava = level.count_neighbours(pos, Feature::Lava);
        let deep = level.count_neighbours(pos, Feature::DeepWater);
        if !one_chance_in(rng, rain.flood_one_in + lava - deep) {
            return;
        }

        let new_feature = match level.feature(pos) {
            Feature::Floor => Feature::ShallowWater,
            Feature::ShallowWater
                if level.player_pos() != Some(pos) && one_chance_in(rng, rain.deepen_one_in) =>
            {
                Feature::DeepWater
            }
            _ => return,
        };
        let duration = random_range(rng, rain.min_flood_duration, rain.max_flood_duration);
        log::debug!("rain at {} leaves {:?} for {}", pos, new_feature, duration);
        level.change_temporarily(pos, new_feature, duration, TerrainChangeCause::Flood);
    }

    /// Fire boils neighbouring water into steam. Sanctuary water stays calm.
    pub(crate) fn fire_boils_water<L, R>(&mut self, level: &mut L, rng: &mut R, fire: &Cloud)
    where
        L: Level + ?Sized,
        R: Rng + ?Sized,
    {
        if !fire.kind.is_fire() {
            return;
        }
        let steam = self.tuning.steam.clone();
        for n in fire.pos.neighbours() {
            if !self.bounds().contains(n) {
                continue;
            }
            let feature = level.feature(n);
            if !feature.is_watery()
                || feature.is_solid()
                || level.is_sanctuary(n)
                || self.pool.lookup(n).is_some()
            {
                continue;
            }
            if !one_chance_in(rng, steam.one_in) {
                continue;
            }
            let cloud = Cloud {
                kind: CloudType::Steam,
                pos: n,
                decay: fire.decay / 2 + 1,
                spread_rate: steam.spread_rate,
                attribution: fire.attribution,
                ..Default::default()
            };
            self.spawn(level, cloud);
        }
    }

    /// Forest fire takes the tree at `pos`: the tree becomes floor and the
    /// responsible party is charged with killing a plant.
    ///
    /// Returns false if a marker forbids it.
    pub(crate) fn burn_tree<L: Level + ?Sized>(
        &mut self,
        level: &mut L,
        pos: Coord,
        attribution: &Attribution,
    ) -> bool {
        if level.fire_vetoed(pos) || !level.feature(pos).is_flammable() {
            return false;
        }
        level.set_feature(pos, Feature::Floor);
        level.invalidate_around(pos);
        log::debug!("forest fire consumes the tree at {}", pos);

        match attribution.whose {
            KillCategory::Player => level.record(Conduct::KilledPlant, attribution),
            KillCategory::Ally => level.record(Conduct::PlantKilledByServant, attribution),
            KillCategory::Other => {}
        }
        true
    }
}
