//! Tuning constants for spread, dissipation and terrain feedback.
//!
//! Defaults reproduce the engine's historical behaviour. A partial JSON
//! document can override any subset of fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cloud::CloudType;

/// Number of cloud slots in a pool.
pub const MAX_CLOUDS: usize = 600;

/// Time units in one full turn at normal speed.
pub const BASELINE_DELAY: i32 = 10;

/// Decay units per turn of caller-supplied duration.
pub const DECAY_PER_TURN: i32 = 10;

/// Per-neighbour spread chance, stepping down as a cloud nears expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadBands {
    pub fresh_above: i32,
    pub fresh_chance: i32,
    pub aging_above: i32,
    pub aging_chance: i32,
    pub dying_chance: i32,
}

impl Default for SpreadBands {
    fn default() -> Self {
        Self {
            fresh_above: 30,
            fresh_chance: 80,
            aging_above: 20,
            aging_chance: 50,
            dying_chance: 30,
        }
    }
}

impl SpreadBands {
    pub fn chance_for(&self, decay: i32) -> i32 {
        if decay > self.fresh_above {
            self.fresh_chance
        } else if decay > self.aging_above {
            self.aging_chance
        } else {
            self.dying_chance
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DissipationTuning {
    /// Fire over deep water.
    pub fire_over_deep_water: i32,
    /// Cold and rain over lava.
    pub cold_over_lava: i32,
    /// Water-only clouds over dry terrain.
    pub water_cloud_off_water: i32,
}

impl Default for DissipationTuning {
    fn default() -> Self {
        Self {
            fire_over_deep_water: 4,
            cold_over_lava: 4,
            water_cloud_off_water: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestFireTuning {
    /// 1-in-N per pass for plain flames to appear on the open cells around
    /// a forest fire.
    pub flame_one_in: i32,
    /// 1-in-N per flammable neighbour for it to catch fire.
    pub ignite_one_in: i32,
    /// Burning tree decay: `min_duration + random2(duration_spread)`.
    pub min_duration: i32,
    pub duration_spread: i32,
}

impl Default for ForestFireTuning {
    fn default() -> Self {
        Self {
            flame_one_in: 5,
            ignite_one_in: 20,
            min_duration: 25,
            duration_spread: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamTuning {
    pub one_in: i32,
    pub spread_rate: i32,
}

impl Default for SteamTuning {
    fn default() -> Self {
        Self {
            one_in: 5,
            spread_rate: 22,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RainTuning {
    /// Base 1-in-N for expiring rain to leave water, before neighbour adjustments.
    pub flood_one_in: i32,
    /// 1-in-N for shallow water to deepen.
    pub deepen_one_in: i32,
    pub min_flood_duration: i32,
    pub max_flood_duration: i32,
}

impl Default for RainTuning {
    fn default() -> Self {
        Self {
            flood_one_in: 5,
            deepen_one_in: 3,
            min_flood_duration: 500,
            max_flood_duration: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostlyFlameTuning {
    pub radius: i32,
    /// Chance indexed by the number of spectral creatures nearby (last entry
    /// applies to any larger count).
    pub summon_rate: Vec<i32>,
    /// Denominator per elapsed time unit.
    pub rate_scale: i32,
}

impl Default for GhostlyFlameTuning {
    fn default() -> Self {
        Self {
            radius: 2,
            summon_rate: vec![650, 175, 45, 20, 0],
            rate_scale: 600,
        }
    }
}

impl GhostlyFlameTuning {
    pub fn rate_for(&self, nearby: usize) -> i32 {
        match self.summon_rate.last() {
            Some(&last) => self.summon_rate.get(nearby).copied().unwrap_or(last),
            None => 0,
        }
    }
}

/// All engine tuning data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTuning {
    pub spread_bands: SpreadBands,
    /// Decay charged to a parent for every child it spawns.
    pub spread_extra_decay: i32,
    /// A successful spread attempt lowers `spread_rate` by `rate / divisor`.
    pub spread_rate_falloff: i32,
    /// Clouds at or below this decay count as weak.
    pub weak_decay: i32,
    pub dissipation: DissipationTuning,
    pub forest_fire: ForestFireTuning,
    pub steam: SteamTuning,
    pub rain: RainTuning,
    pub ghostly_flame: GhostlyFlameTuning,
    /// Spread rate used when a placement doesn't specify one.
    pub default_spread_rates: BTreeMap<CloudType, i32>,
}

impl Default for CloudTuning {
    fn default() -> Self {
        let default_spread_rates = [
            (CloudType::Steam, 22),
            (CloudType::GreySmoke, 22),
            (CloudType::BlackSmoke, 22),
            (CloudType::BlueSmoke, 22),
            (CloudType::PurpleSmoke, 22),
            (CloudType::Rain, 11),
            (CloudType::Ink, 11),
        ]
        .into_iter()
        .collect();

        Self {
            spread_bands: SpreadBands::default(),
            spread_extra_decay: 8,
            spread_rate_falloff: 10,
            weak_decay: 20,
            dissipation: DissipationTuning::default(),
            forest_fire: ForestFireTuning::default(),
            steam: SteamTuning::default(),
            rain: RainTuning::default(),
            ghostly_flame: GhostlyFlameTuning::default(),
            default_spread_rates,
        }
    }
}

impl CloudTuning {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: CloudTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Spread rate for a placement: the explicit hint, else the type default.
    pub fn spread_rate_for(&self, kind: CloudType, hint: Option<i32>) -> i32 {
        match hint {
            Some(rate) if rate >= 0 => rate,
            _ => self.default_spread_rates.get(&kind).copied().unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let percent = |field: &'static str, v: i32| {
            if (0..=100).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value: v })
            }
        };
        let positive = |field: &'static str, v: i32| {
            if v > 0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value: v })
            }
        };

        percent("spread_bands.fresh_chance", self.spread_bands.fresh_chance)?;
        percent("spread_bands.aging_chance", self.spread_bands.aging_chance)?;
        percent("spread_bands.dying_chance", self.spread_bands.dying_chance)?;
        positive("spread_rate_falloff", self.spread_rate_falloff)?;
        positive("dissipation.fire_over_deep_water", self.dissipation.fire_over_deep_water)?;
        positive("dissipation.cold_over_lava", self.dissipation.cold_over_lava)?;
        positive("dissipation.water_cloud_off_water", self.dissipation.water_cloud_off_water)?;
        positive("forest_fire.flame_one_in", self.forest_fire.flame_one_in)?;
        positive("forest_fire.ignite_one_in", self.forest_fire.ignite_one_in)?;
        positive("steam.one_in", self.steam.one_in)?;
        positive("rain.flood_one_in", self.rain.flood_one_in)?;
        positive("rain.deepen_one_in", self.rain.deepen_one_in)?;
        positive("ghostly_flame.rate_scale", self.ghostly_flame.rate_scale)?;
        if self.rain.max_flood_duration < self.rain.min_flood_duration {
            return Err(ConfigError::OutOfRange {
                field: "rain.max_flood_duration",
                value: self.rain.max_flood_duration,
            });
        }
        for (&kind, &rate) in &self.default_spread_rates {
            if !(0..=100).contains(&rate) {
                return Err(ConfigError::BadSpreadRate { kind, rate });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i32 },
    #[error("default spread rate for {kind:?} must be 0-100, got {rate}")]
    BadSpreadRate { kind: CloudType, rate: i32 },
}
