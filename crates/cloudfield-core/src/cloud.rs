//! Cloud records and the hazard type catalogue.
//!
//! `CloudType` is a closed set; every per-type concern (opacity,
//! harmlessness, terrain interplay, damage, side effects) is an exhaustive
//! match over it so a new type cannot be added without deciding each one.

use serde::{Deserialize, Serialize};

use crate::geometry::Coord;

/// Hazard category. `None` marks an empty pool slot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CloudType {
    #[default]
    None,
    Fire,
    ForestFire,
    NoxiousGas,
    FreezingVapour,
    Poison,
    BlackSmoke,
    GreySmoke,
    BlueSmoke,
    PurpleSmoke,
    Steam,
    Ink,
    CalcifyingDust,
    HolyFlames,
    Miasma,
    Mist,
    Chaos,
    Rain,
    MutagenicFog,
    MagicTrail,
    RagingWinds,
    DustTrail,
    GhostlyFlame,
}

impl CloudType {
    /// Every real hazard type (excludes `None`).
    pub const ALL: [CloudType; 22] = [
        CloudType::Fire,
        CloudType::ForestFire,
        CloudType::NoxiousGas,
        CloudType::FreezingVapour,
        CloudType::Poison,
        CloudType::BlackSmoke,
        CloudType::GreySmoke,
        CloudType::BlueSmoke,
        CloudType::PurpleSmoke,
        CloudType::Steam,
        CloudType::Ink,
        CloudType::CalcifyingDust,
        CloudType::HolyFlames,
        CloudType::Miasma,
        CloudType::Mist,
        CloudType::Chaos,
        CloudType::Rain,
        CloudType::MutagenicFog,
        CloudType::MagicTrail,
        CloudType::RagingWinds,
        CloudType::DustTrail,
        CloudType::GhostlyFlame,
    ];

    pub fn is_none(self) -> bool {
        self == CloudType::None
    }

    pub fn is_smoke(self) -> bool {
        matches!(
            self,
            CloudType::BlackSmoke
                | CloudType::GreySmoke
                | CloudType::BlueSmoke
                | CloudType::PurpleSmoke
        )
    }

    /// Blocks line of sight while present.
    pub fn is_opaque(self) -> bool {
        self.is_smoke() || matches!(self, CloudType::Steam | CloudType::Ink)
    }

    /// Never hurts anyone; allowed inside sanctuaries.
    pub fn is_harmless(self) -> bool {
        match self {
            CloudType::None
            | CloudType::BlackSmoke
            | CloudType::GreySmoke
            | CloudType::BlueSmoke
            | CloudType::PurpleSmoke
            | CloudType::Mist
            | CloudType::Rain
            | CloudType::Ink
            | CloudType::MagicTrail
            | CloudType::DustTrail
            | CloudType::RagingWinds => true,
            CloudType::Fire
            | CloudType::ForestFire
            | CloudType::NoxiousGas
            | CloudType::FreezingVapour
            | CloudType::Poison
            | CloudType::Steam
            | CloudType::CalcifyingDust
            | CloudType::HolyFlames
            | CloudType::Miasma
            | CloudType::Chaos
            | CloudType::MutagenicFog
            | CloudType::GhostlyFlame => false,
        }
    }

    /// Burns: dissipates over deep water and boils adjacent water into steam.
    pub fn is_fire(self) -> bool {
        matches!(self, CloudType::Fire | CloudType::ForestFire)
    }

    /// Dissipates quickly over lava.
    pub fn is_cold(self) -> bool {
        matches!(self, CloudType::FreezingVapour | CloudType::Rain)
    }

    /// Can only exist over water-bearing terrain.
    pub fn needs_water(self) -> bool {
        self == CloudType::Ink
    }

    /// Inflicts something beyond plain damage, so engulfment is worth
    /// announcing even when no damage lands.
    pub fn has_side_effects(self) -> bool {
        matches!(
            self,
            CloudType::NoxiousGas
                | CloudType::Miasma
                | CloudType::MutagenicFog
                | CloudType::Chaos
                | CloudType::CalcifyingDust
        )
    }

    /// Whether armour soaks part of this cloud's damage.
    pub fn armour_applies(self) -> bool {
        matches!(
            self,
            CloudType::Fire
                | CloudType::ForestFire
                | CloudType::HolyFlames
                | CloudType::FreezingVapour
                | CloudType::Steam
                | CloudType::GhostlyFlame
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            CloudType::None => "?",
            CloudType::Fire => "roaring flames",
            CloudType::ForestFire => "fire",
            CloudType::NoxiousGas => "noxious fumes",
            CloudType::FreezingVapour => "freezing vapour",
            CloudType::Poison => "poison gas",
            CloudType::BlackSmoke => "black smoke",
            CloudType::GreySmoke => "grey smoke",
            CloudType::BlueSmoke => "blue smoke",
            CloudType::PurpleSmoke => "purple smoke",
            CloudType::Steam => "steam",
            CloudType::Ink => "ink",
            CloudType::CalcifyingDust => "calcifying dust",
            CloudType::HolyFlames => "blessed fire",
            CloudType::Miasma => "foul pestilence",
            CloudType::Mist => "thin mist",
            CloudType::Chaos => "seething chaos",
            CloudType::Rain => "rain",
            CloudType::MutagenicFog => "mutagenic fog",
            CloudType::MagicTrail => "magical condensation",
            CloudType::RagingWinds => "raging winds",
            CloudType::DustTrail => "sparse dust",
            CloudType::GhostlyFlame => "ghostly flame",
        }
    }
}

impl std::fmt::Display for CloudType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle to an actor owned elsewhere in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Who is responsible for a cloud, for credit and blame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillCategory {
    Player,
    Ally,
    #[default]
    Other,
}

/// Finer-grained origin of a cloud's damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillerKind {
    #[default]
    None,
    PlayerMissile,
    MonsterMissile,
    Misc,
}

/// Responsibility metadata copied onto a cloud when it is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub whose: KillCategory,
    pub killer: KillerKind,
    pub source: Option<ActorId>,
}

impl Attribution {
    pub fn player(source: ActorId) -> Self {
        Self {
            whose: KillCategory::Player,
            killer: KillerKind::PlayerMissile,
            source: Some(source),
        }
    }

    pub fn ally(source: ActorId) -> Self {
        Self {
            whose: KillCategory::Ally,
            killer: KillerKind::MonsterMissile,
            source: Some(source),
        }
    }

    pub fn hostile(source: ActorId) -> Self {
        Self {
            whose: KillCategory::Other,
            killer: KillerKind::MonsterMissile,
            source: Some(source),
        }
    }

    /// No responsible actor (traps, terrain, ambient emitters).
    pub fn environment() -> Self {
        Self {
            whose: KillCategory::Other,
            killer: KillerKind::Misc,
            source: None,
        }
    }

    /// Caused by the player or something fighting on the player's side.
    pub fn is_player_side(&self) -> bool {
        matches!(self.whose, KillCategory::Player | KillCategory::Ally)
    }
}

/// Optional display overrides. Spread children inherit them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosmetic {
    pub colour: Option<u8>,
    pub name: Option<String>,
    pub tile: Option<String>,
}

/// One hazard occupying one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloud {
    pub kind: CloudType,
    pub pos: Coord,
    /// Life remaining, in tenths of a turn.
    pub decay: i32,
    /// Percent chance per tick of attempting to spread.
    pub spread_rate: i32,
    pub attribution: Attribution,
    pub cosmetic: Cosmetic,
    /// Safe-zone hint for travel exclusion; -1 when unset.
    pub excl_rad: i32,
}

impl Default for Cloud {
    fn default() -> Self {
        Self {
            kind: CloudType::None,
            pos: Coord::default(),
            decay: 0,
            spread_rate: 0,
            attribution: Attribution::default(),
            cosmetic: Cosmetic::default(),
            excl_rad: -1,
        }
    }
}

impl Cloud {
    pub fn is_live(&self) -> bool {
        !self.kind.is_none()
    }

    /// Display name, honouring a name override.
    pub fn name(&self) -> &str {
        self.cosmetic.name.as_deref().unwrap_or(self.kind.name())
    }

    /// About to expire or intrinsically flimsy; may be replaced or evicted.
    pub fn is_weak(&self, weak_decay: i32) -> bool {
        self.kind.is_smoke() || self.kind == CloudType::Mist || self.decay <= weak_decay
    }
}
