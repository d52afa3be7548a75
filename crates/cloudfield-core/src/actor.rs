//! Capability interface for creatures standing in clouds.
//!
//! Creatures are owned by the rest of the game. The engine only asks
//! questions of them and hands them damage and status effects.

use serde::{Deserialize, Serialize};

use crate::cloud::{ActorId, Attribution, CloudType};
use crate::config::BASELINE_DELAY;
use crate::geometry::Coord;

/// Resistance value meaning "cannot be harmed at all".
pub const RESIST_IMMUNE: i32 = 5000;

/// Damage flavours a creature can resist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resist {
    Fire,
    Cold,
    Poison,
    Steam,
    Rot,
    Petrification,
    Holy,
    NegativeEnergy,
}

impl Resist {
    /// Resistances that are either held or not; one level counts for more.
    pub fn is_boolean(self) -> bool {
        matches!(self, Resist::Holy | Resist::Rot)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holiness {
    #[default]
    Natural,
    Undead,
    Holy,
    Demonic,
    Nonliving,
}

/// How a creature relates to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attitude {
    Friendly,
    Neutral,
    #[default]
    Hostile,
}

/// Lasting conditions a cloud can inflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffect {
    Confusion { turns: i32 },
    Petrification,
    Poison { strength: i32 },
    Disease { turns: i32 },
}

pub trait Actor {
    fn id(&self) -> ActorId;

    fn is_player(&self) -> bool;

    fn pos(&self) -> Coord;

    /// Resistance level to `kind`. Negative values are vulnerabilities.
    /// With `include_temporary` false, only permanent sources count.
    fn resist(&self, kind: Resist, include_temporary: bool) -> i32;

    fn holiness(&self) -> Holiness {
        Holiness::Natural
    }

    /// Made of fire (fire elementals and the like).
    fn is_fiery(&self) -> bool {
        false
    }

    fn is_icy(&self) -> bool {
        false
    }

    fn is_unbreathing(&self) -> bool {
        false
    }

    /// An active, temporary ward against fire.
    fn has_fire_ward(&self) -> bool {
        false
    }

    fn interrupt_fire_ward(&mut self) {}

    /// Experience level for the player, hit dice for monsters.
    fn level(&self) -> i32;

    fn armour_class(&self) -> i32 {
        0
    }

    /// Time units spent this turn; `BASELINE_DELAY` is one normal turn.
    fn time_taken(&self) -> i32 {
        BASELINE_DELAY
    }

    fn attitude(&self) -> Attitude;

    /// A patron shields this creature from its own side's clouds.
    fn protected_by_faction(&self) -> bool {
        false
    }

    fn hurt(&mut self, amount: i32, cause: CloudType, attribution: &Attribution);

    fn apply_status(&mut self, status: StatusEffect, attribution: &Attribution);

    /// Try to give the creature a random mutation. Returns whether it took.
    fn mutate(&mut self) -> bool;

    fn chaos_affect(&mut self, attribution: &Attribution);
}
