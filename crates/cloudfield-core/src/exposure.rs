//! Resolving a creature's exposure to the cloud it stands in.
//!
//! Each turn an occupied cloud cell resolves in one pass:
//!
//! 1. immunity (type rules plus faction protection) ends it early
//! 2. resistance for the cloud's damage flavour
//! 3. base damage roll, reduced by resistance
//! 4. armour soak (rolled damage only)
//! 5. scaling by the time the creature actually spent in the cloud
//! 6. at most one type-specific side effect
//!
//! "Maximum mode" replaces every roll with its ceiling. It is what AI uses
//! to judge a cloud, and always bounds the rolled result from above.

use rand::Rng;

use crate::actor::{Actor, Attitude, Holiness, Resist, StatusEffect, RESIST_IMMUNE};
use crate::cloud::{Cloud, CloudType};
use crate::config::BASELINE_DELAY;
use crate::dice::{coinflip, div_rand_round, one_chance_in, random2, random2avg, x_chance_in_y};
use crate::engine::CloudEngine;
use crate::level::{Conduct, Level};
use crate::pool::SlotId;

/// Something beyond plain damage that a cloud does to a creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    Status(StatusEffect),
    /// Roll for a random mutation.
    Mutation,
    Chaos,
    /// Rain puts out a fire ward.
    QuenchFireWard,
}

/// Outcome of one creature's turn inside one cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exposure {
    pub slot: SlotId,
    pub kind: CloudType,
    pub immune: bool,
    pub resist: i32,
    pub damage: i32,
    pub side_effect: Option<SideEffect>,
    /// Worth announcing that the creature is engulfed.
    pub engulfed: bool,
    /// Resistance absorbed part of a damaging cloud.
    pub resisted: bool,
}

/// The resistance that applies to `kind`, if any.
fn resist_kind(kind: CloudType) -> Option<Resist> {
    match kind {
        CloudType::Fire | CloudType::ForestFire => Some(Resist::Fire),
        CloudType::FreezingVapour => Some(Resist::Cold),
        CloudType::Poison => Some(Resist::Poison),
        CloudType::Steam => Some(Resist::Steam),
        CloudType::Miasma => Some(Resist::Rot),
        CloudType::CalcifyingDust => Some(Resist::Petrification),
        CloudType::HolyFlames => Some(Resist::Holy),
        CloudType::GhostlyFlame => Some(Resist::NegativeEnergy),
        CloudType::None
        | CloudType::NoxiousGas
        | CloudType::BlackSmoke
        | CloudType::GreySmoke
        | CloudType::BlueSmoke
        | CloudType::PurpleSmoke
        | CloudType::Ink
        | CloudType::Mist
        | CloudType::Chaos
        | CloudType::Rain
        | CloudType::MutagenicFog
        | CloudType::MagicTrail
        | CloudType::RagingWinds
        | CloudType::DustTrail => None,
    }
}

/// Type-level immunity, ignoring who made the cloud.
pub fn is_immune<A: Actor + ?Sized>(kind: CloudType, actor: &A, include_temporary: bool) -> bool {
    let res = |r| actor.resist(r, include_temporary);
    match kind {
        CloudType::Fire | CloudType::ForestFire => {
            actor.is_fiery() || (include_temporary && actor.has_fire_ward())
        }
        CloudType::FreezingVapour => actor.is_icy(),
        CloudType::NoxiousGas => res(Resist::Poison) > 0 || actor.is_unbreathing(),
        CloudType::Poison => res(Resist::Poison) > 0,
        CloudType::Steam => actor.is_player() && res(Resist::Steam) > 0,
        CloudType::Miasma => res(Resist::Rot) > 0,
        CloudType::CalcifyingDust => res(Resist::Petrification) > 0,
        CloudType::HolyFlames => actor.holiness() == Holiness::Holy,
        CloudType::GhostlyFlame => actor.holiness() == Holiness::Undead,
        CloudType::Rain => !actor.is_fiery() && !(include_temporary && actor.has_fire_ward()),
        CloudType::Chaos | CloudType::MutagenicFog => false,
        CloudType::None
        | CloudType::BlackSmoke
        | CloudType::GreySmoke
        | CloudType::BlueSmoke
        | CloudType::PurpleSmoke
        | CloudType::Ink
        | CloudType::Mist
        | CloudType::MagicTrail
        | CloudType::RagingWinds
        | CloudType::DustTrail => true,
    }
}

/// Immunity for a particular cloud: the type rules, plus a patron sparing
/// friendly and neutral creatures from clouds made by the player's side.
pub fn cloud_immune<A: Actor + ?Sized>(cloud: &Cloud, actor: &A) -> bool {
    if is_immune(cloud.kind, actor, true) {
        return true;
    }
    !actor.is_player()
        && actor.protected_by_faction()
        && matches!(actor.attitude(), Attitude::Friendly | Attitude::Neutral)
        && cloud.attribution.is_player_side()
}

pub fn resistance<A: Actor + ?Sized>(kind: CloudType, actor: &A) -> i32 {
    if kind == CloudType::Rain {
        return if actor.is_fiery() { 0 } else { RESIST_IMMUNE };
    }
    match resist_kind(kind) {
        Some(r) => actor.resist(r, true),
        None => 0,
    }
}

/// Scale `damage` by resistance level `res` to flavour `kind`.
pub fn resist_adjust(damage: i32, res: i32, kind: Option<Resist>) -> i32 {
    if res > 3 {
        0
    } else if res > 0 {
        let bonus = i32::from(kind.is_some_and(Resist::is_boolean));
        damage / ((3 * res + 1) / 2 + bonus)
    } else if res < 0 {
        damage * 15 / 10
    } else {
        damage
    }
}

/// Steam scalds harder while fresh.
pub fn steam_damage(decay: i32) -> i32 {
    let decay = decay.clamp(10, 60);
    (decay * 13 + 20) / 50
}

/// Damage dice `(size, rolls, extra)` for `cloud` against `actor`, or
/// `None` for clouds that never damage it.
fn damage_dice<A: Actor + ?Sized>(cloud: &Cloud, actor: &A) -> Option<(i32, i32, i32)> {
    match cloud.kind {
        CloudType::Rain if actor.is_fiery() => Some((9, 1, 0)),
        CloudType::Fire | CloudType::ForestFire | CloudType::HolyFlames | CloudType::FreezingVapour => {
            if actor.is_player() {
                Some((23, 3, 10))
            } else {
                Some((32, 4, 10))
            }
        }
        CloudType::NoxiousGas => Some((3, 1, 0)),
        CloudType::Poison => Some((10, 1, 0)),
        CloudType::Miasma => Some((12, 3, 0)),
        CloudType::Steam => Some((steam_damage(cloud.decay), 2, 0)),
        CloudType::GhostlyFlame => Some((15, 3, 4)),
        _ => None,
    }
}

/// Highest possible base damage after resistance, before time scaling.
fn max_base_damage<A: Actor + ?Sized>(cloud: &Cloud, actor: &A, res: i32) -> i32 {
    match damage_dice(cloud, actor) {
        Some((size, _, extra)) => resist_adjust(extra + size - 1, res, resist_kind(cloud.kind)).max(0),
        None => 0,
    }
}

fn max_damage<A: Actor + ?Sized>(cloud: &Cloud, actor: &A, res: i32) -> i32 {
    let dmg = max_base_damage(cloud, actor, res);
    let time = actor.time_taken().max(0);
    (dmg * time + BASELINE_DELAY - 1) / BASELINE_DELAY
}

fn rolled_damage<A, R>(rng: &mut R, cloud: &Cloud, actor: &A, res: i32) -> i32
where
    A: Actor + ?Sized,
    R: Rng + ?Sized,
{
    let Some((size, rolls, extra)) = damage_dice(cloud, actor) else {
        return 0;
    };
    let mut dmg = resist_adjust(random2avg(rng, size, rolls) + extra, res, resist_kind(cloud.kind));
    if cloud.kind.armour_applies() {
        dmg -= random2(rng, actor.armour_class().max(0) + 1);
    }
    let time = actor.time_taken().max(0);
    div_rand_round(rng, dmg.max(0) * time, BASELINE_DELAY)
}

fn confusion_turns<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    if coinflip(rng) {
        3
    } else {
        2
    }
}

fn roll_side_effect<A, R>(rng: &mut R, cloud: &Cloud, actor: &A) -> Option<SideEffect>
where
    A: Actor + ?Sized,
    R: Rng + ?Sized,
{
    let level = actor.level();
    match cloud.kind {
        CloudType::Rain => actor.has_fire_ward().then_some(SideEffect::QuenchFireWard),
        CloudType::NoxiousGas => {
            let confused = if actor.is_player() {
                1 + random2(rng, 27) >= level
            } else if level >= 21 {
                one_chance_in(rng, 50)
            } else {
                !x_chance_in_y(rng, level, 21)
            };
            confused.then(|| {
                SideEffect::Status(StatusEffect::Confusion {
                    turns: confusion_turns(rng),
                })
            })
        }
        CloudType::CalcifyingDust => {
            (random2(rng, 55) - 13 >= level).then_some(SideEffect::Status(StatusEffect::Petrification))
        }
        CloudType::Poison => Some(SideEffect::Status(StatusEffect::Poison {
            strength: (cloud.decay / 10).clamp(1, 5),
        })),
        CloudType::Miasma => Some(SideEffect::Status(StatusEffect::Disease {
            turns: 10 + random2(rng, 10),
        })),
        CloudType::MutagenicFog => coinflip(rng).then_some(SideEffect::Mutation),
        CloudType::Chaos => coinflip(rng).then_some(SideEffect::Chaos),
        _ => None,
    }
}

/// Could `kind` hurt `actor` at all? With `accept_temp` false, only
/// permanent resistances are trusted.
pub fn is_harmful<A: Actor + ?Sized>(kind: CloudType, actor: &A, accept_temp: bool) -> bool {
    if is_immune(kind, actor, accept_temp) {
        return false;
    }
    if kind.has_side_effects() || kind == CloudType::Poison {
        return true;
    }
    let sample = Cloud {
        kind,
        decay: 100,
        ..Default::default()
    };
    let res = match resist_kind(kind) {
        Some(r) => actor.resist(r, accept_temp),
        None => resistance(kind, actor),
    };
    max_base_damage(&sample, actor, res) > 0
}

impl CloudEngine {
    /// Work out what the cloud under `actor` does to it this turn, without
    /// touching the creature.
    pub fn expose_actor<A, R>(&self, rng: &mut R, actor: &A) -> Option<Exposure>
    where
        A: Actor + ?Sized,
        R: Rng + ?Sized,
    {
        let slot = self.pool.lookup(actor.pos())?;
        let cloud = self.pool.get(slot)?;

        if cloud_immune(cloud, actor) {
            return Some(Exposure {
                slot,
                kind: cloud.kind,
                immune: true,
                resist: RESIST_IMMUNE,
                damage: 0,
                side_effect: None,
                engulfed: false,
                resisted: false,
            });
        }

        let res = resistance(cloud.kind, actor);
        let damage = rolled_damage(rng, cloud, actor, res);
        let side_effect = roll_side_effect(rng, cloud, actor);
        Some(Exposure {
            slot,
            kind: cloud.kind,
            immune: false,
            resist: res,
            damage,
            side_effect,
            engulfed: actor.is_player() || damage > 0 || cloud.kind.has_side_effects(),
            resisted: res > 0 && max_base_damage(cloud, actor, 0) > 0,
        })
    }

    /// Resolve the cloud under `actor` and apply the result. Returns the
    /// damage dealt.
    pub fn apply_to_actor<L, A, R>(&self, level: &mut L, rng: &mut R, actor: &mut A) -> i32
    where
        L: Level + ?Sized,
        A: Actor + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(exposure) = self.expose_actor(rng, actor) else {
            return 0;
        };
        if exposure.immune {
            return 0;
        }
        let Some(cloud) = self.pool.get(exposure.slot) else {
            return 0;
        };
        let attribution = cloud.attribution;

        match exposure.side_effect {
            Some(SideEffect::Status(status)) => {
                log::debug!("{} inflicts {:?} on {:?}", cloud.kind, status, actor.id());
                actor.apply_status(status, &attribution);
            }
            Some(SideEffect::Mutation) => {
                if actor.mutate() && !actor.is_player() {
                    level.record(Conduct::CausedMutation, &attribution);
                }
            }
            Some(SideEffect::Chaos) => actor.chaos_affect(&attribution),
            Some(SideEffect::QuenchFireWard) => actor.interrupt_fire_ward(),
            None => {}
        }

        if exposure.damage > 0 {
            actor.hurt(exposure.damage, cloud.kind, &attribution);
        }
        exposure.damage
    }

    /// The most damage the cloud in `slot` could do to `actor` this turn.
    pub fn max_damage_to<A: Actor + ?Sized>(&self, actor: &A, slot: SlotId) -> i32 {
        let Some(cloud) = self.pool.get(slot) else {
            return 0;
        };
        if cloud_immune(cloud, actor) {
            return 0;
        }
        max_damage(cloud, actor, resistance(cloud.kind, actor))
    }
}
