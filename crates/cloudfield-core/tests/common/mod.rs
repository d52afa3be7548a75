//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use cloudfield_core::prelude::*;

/// A creature with fixed stats that records everything done to it.
#[derive(Debug, Default)]
pub struct TestActor {
    pub id: u32,
    pub player: bool,
    pub pos: Coord,
    pub resists: HashMap<Resist, i32>,
    pub holiness: Holiness,
    pub fiery: bool,
    pub icy: bool,
    pub unbreathing: bool,
    pub level: i32,
    pub ac: i32,
    pub attitude: Attitude,
    pub hp_lost: i32,
    pub statuses: Vec<StatusEffect>,
}

impl TestActor {
    pub fn monster(pos: Coord) -> Self {
        Self {
            id: 100,
            pos,
            level: 8,
            ..Default::default()
        }
    }

    pub fn with_resist(mut self, kind: Resist, level: i32) -> Self {
        self.resists.insert(kind, level);
        self
    }

    pub fn is_confused(&self) -> bool {
        self.statuses
            .iter()
            .any(|s| matches!(s, StatusEffect::Confusion { .. }))
    }
}

impl Actor for TestActor {
    fn id(&self) -> ActorId {
        ActorId(self.id)
    }

    fn is_player(&self) -> bool {
        self.player
    }

    fn pos(&self) -> Coord {
        self.pos
    }

    fn resist(&self, kind: Resist, _include_temporary: bool) -> i32 {
        self.resists.get(&kind).copied().unwrap_or(0)
    }

    fn holiness(&self) -> Holiness {
        self.holiness
    }

    fn is_fiery(&self) -> bool {
        self.fiery
    }

    fn is_icy(&self) -> bool {
        self.icy
    }

    fn is_unbreathing(&self) -> bool {
        self.unbreathing
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn armour_class(&self) -> i32 {
        self.ac
    }

    fn attitude(&self) -> Attitude {
        self.attitude
    }

    fn hurt(&mut self, amount: i32, _cause: CloudType, _attribution: &Attribution) {
        self.hp_lost += amount;
    }

    fn apply_status(&mut self, status: StatusEffect, _attribution: &Attribution) {
        self.statuses.push(status);
    }

    fn mutate(&mut self) -> bool {
        false
    }

    fn chaos_affect(&mut self, _attribution: &Attribution) {}
}
