//! Cloudfield Core - environmental hazard engine for grid levels.
//!
//! Clouds are transient hazards (fire, gas, steam, smoke and friends), one
//! per grid cell, living in a fixed-capacity pool. Each game tick they
//! decay, spread to neighbouring cells and interact with terrain; creatures
//! standing in them take damage and status effects.
//!
//! The engine owns only cloud state. Terrain, visibility, creatures and
//! conduct bookkeeping belong to the host game and are reached through the
//! traits in [`terrain`], [`visibility`], [`level`] and [`actor`]. The
//! random source is passed into every call, so a seeded generator replays
//! a run exactly.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actor`] | Creature capability interface, resistances, status effects |
//! | [`cloud`] | Cloud records, hazard types, attribution |
//! | [`config`] | Tuning constants, JSON overrides |
//! | [`dice`] | Integer dice over any `rand::Rng` |
//! | [`engine`] | `CloudEngine` queries, deletion and movement |
//! | [`exposure`] | Immunity, damage and side effects for creatures in clouds |
//! | [`feedback`] | Terrain-driven dissipation, rain flooding, boiling, burning |
//! | [`geometry`] | Grid coordinates and bounds |
//! | [`level`] | Occupant and conduct collaborator traits |
//! | [`persistence`] | bincode save/load of the pool |
//! | [`placement`] | Placement policy, overwrite and eviction |
//! | [`pool`] | Fixed-capacity slot arena with position index |
//! | [`sandbox`] | In-memory level implementing every collaborator trait |
//! | [`simulate`] | Per-tick decay and spread |
//! | [`terrain`] | Terrain features and the terrain service trait |
//! | [`visibility`] | Line-of-sight invalidation hook |
//!
//! # Example
//!
//! ```rust
//! use cloudfield_core::prelude::*;
//! use rand::SeedableRng;
//!
//! let bounds = GridBounds::new(20, 20);
//! let mut engine = CloudEngine::new(bounds);
//! let mut level = GridLevel::new(bounds);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//! let spec = CloudSpec::new(CloudType::Poison, Coord::new(5, 5), 6);
//! assert!(engine.place(&mut level, &mut rng, spec).is_created());
//!
//! for _ in 0..10 {
//!     engine.manage_clouds(&mut level, &mut rng, 10);
//! }
//! assert!(engine.is_empty());
//! ```

pub mod actor;
pub mod cloud;
pub mod config;
pub mod dice;
pub mod engine;
pub mod exposure;
pub mod feedback;
pub mod geometry;
pub mod level;
pub mod persistence;
pub mod placement;
pub mod pool;
pub mod sandbox;
pub mod simulate;
pub mod terrain;
pub mod visibility;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::actor::{Actor, Attitude, Holiness, Resist, StatusEffect, RESIST_IMMUNE};
    pub use crate::cloud::{ActorId, Attribution, Cloud, CloudType, Cosmetic, KillCategory, KillerKind};
    pub use crate::config::{CloudTuning, ConfigError, MAX_CLOUDS};
    pub use crate::engine::CloudEngine;
    pub use crate::exposure::{is_harmful, Exposure, SideEffect};
    pub use crate::geometry::{Coord, GridBounds};
    pub use crate::level::{Behaviour, Conduct, ConductLog, Level, Occupants, SummonRequest};
    pub use crate::persistence::SaveError;
    pub use crate::placement::{CloudSpec, Placement, Rejection};
    pub use crate::pool::{CloudPool, PoolError, SlotId};
    pub use crate::sandbox::GridLevel;
    pub use crate::terrain::{Feature, Terrain, TerrainChangeCause};
    pub use crate::visibility::Visibility;
}
