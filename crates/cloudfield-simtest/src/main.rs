//! Cloudfield Headless Scenario Harness
//!
//! Runs hazard scenarios against the cloud engine on an in-memory level,
//! with creatures held as `hecs` entities. No rendering, no game loop.
//!
//! Usage:
//!   cargo run -p cloudfield-simtest
//!   cargo run -p cloudfield-simtest -- --verbose --seed 7
//!   cargo run -p cloudfield-simtest -- --tuning my_tuning.json
//!   cargo run -p cloudfield-simtest -- --dump-tuning

use std::collections::HashMap;

use cloudfield_core::prelude::*;
use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Bundled tuning (the defaults, as data) ──────────────────────────────
const TUNING_JSON: &str = include_str!("../../../data/cloud_tuning.json");

// ── Creature components ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Position(Coord);

#[derive(Debug, Clone)]
struct Creature {
    name: &'static str,
    player: bool,
    level: i32,
    ac: i32,
    fiery: bool,
    icy: bool,
    unbreathing: bool,
    holiness: Holiness,
    attitude: Attitude,
}

impl Creature {
    fn monster(name: &'static str, level: i32) -> Self {
        Self {
            name,
            player: false,
            level,
            ac: 2,
            fiery: false,
            icy: false,
            unbreathing: false,
            holiness: Holiness::Natural,
            attitude: Attitude::Hostile,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Resists(HashMap<Resist, i32>);

#[derive(Debug, Clone, Copy)]
struct Health {
    hp: i32,
    max: i32,
}

#[derive(Debug, Clone, Default)]
struct Afflictions {
    statuses: Vec<StatusEffect>,
    mutations: u32,
}

impl Afflictions {
    fn confused(&self) -> bool {
        self.statuses
            .iter()
            .any(|s| matches!(s, StatusEffect::Confusion { .. }))
    }
}

/// Borrowed view of one creature's components, handed to the engine.
struct CreatureActor<'a> {
    id: ActorId,
    pos: Coord,
    creature: &'a Creature,
    resists: &'a Resists,
    health: &'a mut Health,
    afflictions: &'a mut Afflictions,
}

impl Actor for CreatureActor<'_> {
    fn id(&self) -> ActorId {
        self.id
    }

    fn is_player(&self) -> bool {
        self.creature.player
    }

    fn pos(&self) -> Coord {
        self.pos
    }

    fn resist(&self, kind: Resist, _include_temporary: bool) -> i32 {
        self.resists.0.get(&kind).copied().unwrap_or(0)
    }

    fn holiness(&self) -> Holiness {
        self.creature.holiness
    }

    fn is_fiery(&self) -> bool {
        self.creature.fiery
    }

    fn is_icy(&self) -> bool {
        self.creature.icy
    }

    fn is_unbreathing(&self) -> bool {
        self.creature.unbreathing
    }

    fn level(&self) -> i32 {
        self.creature.level
    }

    fn armour_class(&self) -> i32 {
        self.creature.ac
    }

    fn attitude(&self) -> Attitude {
        self.creature.attitude
    }

    fn hurt(&mut self, amount: i32, cause: CloudType, _attribution: &Attribution) {
        self.health.hp -= amount;
        log::debug!("{} takes {} from {}", self.creature.name, amount, cause);
    }

    fn apply_status(&mut self, status: StatusEffect, _attribution: &Attribution) {
        self.afflictions.statuses.push(status);
    }

    fn mutate(&mut self) -> bool {
        self.afflictions.mutations += 1;
        true
    }

    fn chaos_affect(&mut self, _attribution: &Attribution) {}
}

fn spawn_creature(
    world: &mut World,
    level: &mut GridLevel,
    pos: Coord,
    creature: Creature,
    resists: &[(Resist, i32)],
) -> hecs::Entity {
    let hp = 10 + creature.level * 6;
    let entity = world.spawn((
        Position(pos),
        creature,
        Resists(resists.iter().copied().collect()),
        Health { hp, max: hp },
        Afflictions::default(),
    ));
    level.add_actor(ActorId(entity.id()), pos);
    entity
}

/// One turn of cloud exposure for every creature. Returns total damage.
fn expose_creatures(
    engine: &CloudEngine,
    level: &mut GridLevel,
    rng: &mut StdRng,
    world: &mut World,
) -> i32 {
    let mut total = 0;
    for (entity, (pos, creature, resists, health, afflictions)) in world.query_mut::<(
        &Position,
        &Creature,
        &Resists,
        &mut Health,
        &mut Afflictions,
    )>() {
        let mut actor = CreatureActor {
            id: ActorId(entity.id()),
            pos: pos.0,
            creature,
            resists,
            health,
            afflictions,
        };
        total += engine.apply_to_actor(level, rng, &mut actor);
    }
    total
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    tuning_path: Option<String>,
    dump_tuning: bool,
}

fn parse_args() -> Options {
    let mut opts = Options {
        verbose: false,
        seed: 42,
        tuning_path: None,
        dump_tuning: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => opts.verbose = true,
            "--dump-tuning" => opts.dump_tuning = true,
            "--seed" => match args.next().and_then(|s| s.parse().ok()) {
                Some(seed) => opts.seed = seed,
                None => {
                    eprintln!("--seed needs an integer");
                    std::process::exit(2);
                }
            },
            "--tuning" => opts.tuning_path = args.next(),
            other => log::warn!("ignoring unknown argument {}", other),
        }
    }
    opts
}

fn load_tuning(path: Option<&str>) -> CloudTuning {
    let Some(path) = path else {
        return CloudTuning::default();
    };
    let loaded = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| CloudTuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("using tuning from {}", path);
            tuning
        }
        Err(e) => {
            eprintln!("cannot load tuning {}: {}", path, e);
            std::process::exit(2);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args();
    let tuning = load_tuning(opts.tuning_path.as_deref());

    if opts.dump_tuning {
        match serde_json::to_string_pretty(&tuning) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("cannot serialize tuning: {}", e);
                std::process::exit(2);
            }
        }
        return;
    }

    println!("=== Cloudfield Scenario Harness (seed {}) ===\n", opts.seed);
    let verbose = opts.verbose;
    let seed = opts.seed;

    let mut results = Vec::new();

    // 1. Bundled tuning data
    results.extend(validate_tuning_data(verbose));

    // 2. Fire beside water
    results.extend(validate_fire_and_water(&tuning, seed, verbose));

    // 3. Creatures in noxious gas
    results.extend(validate_gas_exposure(&tuning, seed, verbose));

    // 4. Damage bounds across every cloud type
    results.extend(validate_damage_bounds(&tuning, seed, verbose));

    // 5. Forest fire through a wood
    results.extend(validate_forest_fire(&tuning, seed, verbose));

    // 6. Rain flooding
    results.extend(validate_rain(&tuning, seed, verbose));

    // 7. Pool pressure and eviction
    results.extend(validate_pool_pressure(&tuning, seed, verbose));

    // 8. Ghostly flame summoning
    results.extend(validate_ghostly_flame(&tuning, seed, verbose));

    // 9. Save/load determinism
    results.extend(validate_persistence(&tuning, seed, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn setup(tuning: &CloudTuning, width: i32, height: i32, seed: u64) -> (CloudEngine, GridLevel, StdRng) {
    let bounds = GridBounds::new(width, height);
    (
        CloudEngine::with_tuning(bounds, tuning.clone()),
        GridLevel::new(bounds),
        StdRng::seed_from_u64(seed),
    )
}

fn consistency(name: &str, engine: &CloudEngine) -> TestResult {
    let verdict = engine.pool().verify();
    TestResult {
        name: name.into(),
        passed: verdict.is_ok(),
        detail: match verdict {
            Ok(()) => format!("{} live clouds, index consistent", engine.len()),
            Err(e) => e.to_string(),
        },
    }
}

// ── 1. Tuning Data ──────────────────────────────────────────────────────

fn validate_tuning_data(_verbose: bool) -> Vec<TestResult> {
    println!("--- Tuning Data ---");
    let mut results = Vec::new();

    let bundled = match CloudTuning::from_json(TUNING_JSON) {
        Ok(t) => t,
        Err(e) => {
            results.push(TestResult {
                name: "tuning_parse".into(),
                passed: false,
                detail: format!("bundled tuning rejected: {}", e),
            });
            return results;
        }
    };

    let same = serde_json::to_value(&bundled).ok() == serde_json::to_value(CloudTuning::default()).ok();
    results.push(TestResult {
        name: "tuning_matches_defaults".into(),
        passed: same,
        detail: "bundled JSON equals built-in defaults".into(),
    });

    let partial = CloudTuning::from_json(r#"{ "weak_decay": 30 }"#);
    results.push(TestResult {
        name: "tuning_partial_override".into(),
        passed: partial
            .as_ref()
            .is_ok_and(|t| t.weak_decay == 30 && t.spread_extra_decay == 8),
        detail: "partial override keeps remaining defaults".into(),
    });

    let bad = CloudTuning::from_json(r#"{ "steam": { "one_in": 0 } }"#);
    results.push(TestResult {
        name: "tuning_rejects_bad_values".into(),
        passed: matches!(bad, Err(ConfigError::OutOfRange { .. })),
        detail: match bad {
            Ok(_) => "zero steam chance accepted".into(),
            Err(e) => e.to_string(),
        },
    });

    results
}

// ── 2. Fire and Water ───────────────────────────────────────────────────

fn validate_fire_and_water(tuning: &CloudTuning, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Fire and Water ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 12, 12, seed);

    let fire_pos = Coord::new(5, 5);
    level.fill(Coord::new(6, 3), Coord::new(8, 8), Feature::DeepWater);
    let fire = engine
        .place(&mut level, &mut rng, CloudSpec::new(CloudType::Fire, fire_pos, 10))
        .slot();

    let mut steam_seen = 0;
    let mut expired_at = None;
    for tick in 1..=15 {
        engine.manage_clouds(&mut level, &mut rng, 10);
        let steam = engine
            .iter()
            .filter(|(_, c)| c.kind == CloudType::Steam)
            .count();
        steam_seen = steam_seen.max(steam);
        if expired_at.is_none() && engine.type_at(fire_pos) != CloudType::Fire {
            expired_at = Some(tick);
        }
        if verbose {
            println!("  tick {:2}: {} clouds, {} steam", tick, engine.len(), steam);
        }
    }

    results.push(TestResult {
        name: "fire_placed".into(),
        passed: fire.is_some(),
        detail: format!("fire at {}", fire_pos),
    });
    results.push(TestResult {
        name: "fire_boils_water".into(),
        passed: steam_seen > 0,
        detail: format!("peak of {} steam clouds", steam_seen),
    });
    results.push(TestResult {
        name: "fire_expires_on_time".into(),
        passed: expired_at == Some(10),
        detail: format!("fire gone after tick {:?}", expired_at),
    });
    results.push(TestResult {
        name: "steam_clears".into(),
        passed: engine.is_empty(),
        detail: format!("{} clouds left after 15 ticks", engine.len()),
    });
    results.push(consistency("fire_pool_consistent", &engine));
    results
}

// ── 3. Gas Exposure ─────────────────────────────────────────────────────

fn validate_gas_exposure(tuning: &CloudTuning, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Gas Exposure ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 10, 3, seed);
    let mut world = World::new();

    let golem = spawn_creature(
        &mut world,
        &mut level,
        Coord::new(2, 1),
        Creature::monster("iron golem", 12),
        &[(Resist::Poison, 3)],
    );
    let wraith = spawn_creature(
        &mut world,
        &mut level,
        Coord::new(4, 1),
        Creature {
            unbreathing: true,
            holiness: Holiness::Undead,
            ..Creature::monster("wraith", 6)
        },
        &[],
    );
    let goblin = spawn_creature(
        &mut world,
        &mut level,
        Coord::new(6, 1),
        Creature::monster("goblin", 1),
        &[],
    );

    let mut total = 0;
    for _ in 0..100 {
        for x in 1..9 {
            let pos = Coord::new(x, 1);
            if engine.type_at(pos) != CloudType::NoxiousGas {
                engine.place(&mut level, &mut rng, CloudSpec::new(CloudType::NoxiousGas, pos, 5));
            }
        }
        total += expose_creatures(&engine, &mut level, &mut rng, &mut world);
        engine.manage_clouds(&mut level, &mut rng, 10);
    }

    for (entity, label) in [(golem, "golem"), (wraith, "wraith")] {
        let unharmed = match world.query_one_mut::<(&Health, &Afflictions)>(entity) {
            Ok((health, afflictions)) => health.hp == health.max && !afflictions.confused(),
            Err(_) => false,
        };
        results.push(TestResult {
            name: format!("gas_spares_{}", label),
            passed: unharmed,
            detail: "no damage, no confusion over 100 ticks".into(),
        });
    }

    let goblin_state = world
        .query_one_mut::<(&Health, &Afflictions)>(goblin)
        .map(|(h, a)| (h.max - h.hp, a.confused()));
    results.push(TestResult {
        name: "gas_harms_goblin".into(),
        passed: matches!(goblin_state, Ok((lost, confused)) if lost > 0 && confused),
        detail: format!("goblin (lost hp, confused) = {:?}", goblin_state.ok()),
    });

    if verbose {
        println!("  total gas damage dealt: {}", total);
    }
    results
}

// ── 4. Damage Bounds ────────────────────────────────────────────────────

fn validate_damage_bounds(tuning: &CloudTuning, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Damage Bounds ---");
    let mut results = Vec::new();
    let mut violations = Vec::new();

    for kind in CloudType::ALL {
        let (mut engine, mut level, mut rng) = setup(tuning, 3, 3, seed);
        let pos = Coord::new(1, 1);
        level.set_feature_at(pos, Feature::ShallowWater);
        let Some(slot) = engine
            .place(&mut level, &mut rng, CloudSpec::new(kind, pos, 8))
            .slot()
        else {
            violations.push(format!("{} could not be placed", kind));
            continue;
        };

        let mut world = World::new();
        let ogre = spawn_creature(&mut world, &mut level, pos, Creature::monster("ogre", 5), &[]);
        let max = match world.query_one_mut::<(&Position, &Creature, &Resists, &mut Health, &mut Afflictions)>(ogre) {
            Ok((p, creature, resists, health, afflictions)) => {
                let actor = CreatureActor {
                    id: ActorId(ogre.id()),
                    pos: p.0,
                    creature,
                    resists,
                    health,
                    afflictions,
                };
                engine.max_damage_to(&actor, slot)
            }
            Err(_) => 0,
        };

        let mut worst = 0;
        for _ in 0..50 {
            worst = worst.max(expose_creatures(&engine, &mut level, &mut rng, &mut world));
        }
        if worst > max {
            violations.push(format!("{} dealt {} > max {}", kind, worst, max));
        }
        if verbose {
            let mutations = world
                .query_one_mut::<&Afflictions>(ogre)
                .map_or(0, |a| a.mutations);
            println!(
                "  {:22} max {:3}  worst roll {:3}  mutations {}",
                kind.name(),
                max,
                worst,
                mutations
            );
        }
    }

    results.push(TestResult {
        name: "damage_within_max".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            "rolled damage never exceeds the maximum".into()
        } else {
            violations.join("; ")
        },
    });
    results
}

// ── 5. Forest Fire ──────────────────────────────────────────────────────

fn validate_forest_fire(tuning: &CloudTuning, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Forest Fire ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 20, 20, seed);

    level.fill(Coord::new(0, 0), Coord::new(19, 19), Feature::Tree);
    level.fill(Coord::new(9, 9), Coord::new(10, 10), Feature::Floor);
    let vetoed = Coord::new(11, 10);
    level.set_fire_veto(vetoed, true);

    let spec = CloudSpec::new(CloudType::ForestFire, Coord::new(9, 9), 40).by(Attribution::player(ActorId(0)));
    let placed = engine.place(&mut level, &mut rng, spec).is_created();

    for _ in 0..300 {
        engine.manage_clouds(&mut level, &mut rng, 10);
        if engine.is_empty() {
            break;
        }
    }

    let burnt = (0..20)
        .flat_map(|y| (0..20).map(move |x| Coord::new(x, y)))
        .filter(|&p| level.feature(p) == Feature::Floor)
        .count()
        - 4;

    results.push(TestResult {
        name: "forest_fire_placed".into(),
        passed: placed,
        detail: "forest fire lit in the clearing".into(),
    });
    results.push(TestResult {
        name: "forest_fire_burns_trees".into(),
        passed: burnt > 0,
        detail: format!("{} trees burnt", burnt),
    });
    results.push(TestResult {
        name: "forest_fire_conduct".into(),
        passed: level.conducts.len() == burnt
            && level.conducts.iter().all(|(c, _)| *c == Conduct::KilledPlant),
        detail: format!("{} plant kills recorded", level.conducts.len()),
    });
    results.push(TestResult {
        name: "forest_fire_veto".into(),
        passed: level.feature(vetoed) == Feature::Tree,
        detail: format!("vetoed tree at {} survives", vetoed),
    });
    results.push(consistency("forest_pool_consistent", &engine));

    if verbose {
        println!("  {} invalidations from burnt trees", level.invalidations.len());
    }
    results
}

// ── 6. Rain ─────────────────────────────────────────────────────────────

fn validate_rain(tuning: &CloudTuning, seed: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Rain ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 16, 16, seed);

    let player_pos = Coord::new(8, 8);
    level.fill(Coord::new(7, 7), Coord::new(9, 9), Feature::ShallowWater);
    level.player_pos = Some(player_pos);

    for round in 0..5 {
        for y in 0..16 {
            for x in 0..16 {
                let spec = CloudSpec::new(CloudType::Rain, Coord::new(x, y), 1 + round);
                engine.check_place(&mut level, &mut rng, spec);
            }
        }
        for _ in 0..20 {
            engine.manage_clouds(&mut level, &mut rng, 10);
        }
    }

    let floods = level.terrain_changes.len();
    results.push(TestResult {
        name: "rain_floods".into(),
        passed: floods > 0,
        detail: format!("{} cells flooded", floods),
    });
    results.push(TestResult {
        name: "rain_flood_durations".into(),
        passed: level.terrain_changes.iter().all(|c| {
            c.cause == TerrainChangeCause::Flood
                && (tuning.rain.min_flood_duration..=tuning.rain.max_flood_duration).contains(&c.duration)
        }),
        detail: "every flood is timed within the configured range".into(),
    });
    results.push(TestResult {
        name: "rain_spares_player_cell".into(),
        passed: level.feature(player_pos) == Feature::ShallowWater,
        detail: format!("player's cell is {:?}", level.feature(player_pos)),
    });
    results.push(consistency("rain_pool_consistent", &engine));
    results
}

// ── 7. Pool Pressure ────────────────────────────────────────────────────

fn validate_pool_pressure(tuning: &CloudTuning, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Pool Pressure ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 40, 40, seed);

    let mut created = 0;
    let mut rejected = 0;
    for y in 0..40 {
        for x in 0..40 {
            let kind = if (x + y) % 3 == 0 {
                CloudType::GreySmoke
            } else {
                CloudType::Poison
            };
            match engine.place(&mut level, &mut rng, CloudSpec::new(kind, Coord::new(x, y), 10)) {
                Placement::Created(_) => created += 1,
                Placement::Rejected(_) => rejected += 1,
            }
        }
    }

    results.push(TestResult {
        name: "pool_caps_at_max".into(),
        passed: engine.len() == MAX_CLOUDS,
        detail: format!("{} live of {} slots", engine.len(), MAX_CLOUDS),
    });
    results.push(TestResult {
        name: "pool_evicts_instead_of_failing".into(),
        passed: created == 1600 && rejected == 0,
        detail: format!("{} created, {} rejected", created, rejected),
    });
    results.push(consistency("pool_consistent_when_full", &engine));

    for _ in 0..30 {
        engine.manage_clouds(&mut level, &mut rng, 10);
    }
    results.push(TestResult {
        name: "pool_drains".into(),
        passed: engine.is_empty(),
        detail: format!("{} clouds left after 30 ticks", engine.len()),
    });
    if verbose {
        println!("  {} visibility invalidations", level.invalidations.len());
    }
    results
}

// ── 8. Ghostly Flame ────────────────────────────────────────────────────

fn validate_ghostly_flame(tuning: &CloudTuning, seed: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Ghostly Flame ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 15, 15, seed);
    let mut world = World::new();

    let caster = spawn_creature(
        &mut world,
        &mut level,
        Coord::new(1, 1),
        Creature {
            player: true,
            attitude: Attitude::Friendly,
            ..Creature::monster("necromancer", 10)
        },
        &[],
    );
    let attribution = Attribution::player(ActorId(caster.id()));
    for y in 6..9 {
        for x in 6..9 {
            let spec = CloudSpec::new(CloudType::GhostlyFlame, Coord::new(x, y), 100).by(attribution);
            engine.place(&mut level, &mut rng, spec);
        }
    }

    for _ in 0..60 {
        engine.manage_clouds(&mut level, &mut rng, 10);
    }

    results.push(TestResult {
        name: "ghostly_flame_summons".into(),
        passed: !level.summons.is_empty(),
        detail: format!("{} spectral creatures raised", level.summons.len()),
    });
    results.push(TestResult {
        name: "ghostly_flame_friendly".into(),
        passed: level
            .summons
            .iter()
            .all(|s| s.behaviour == Behaviour::Friendly && s.summoner == ActorId(caster.id())),
        detail: "summons fight for the caster".into(),
    });
    results.push(TestResult {
        name: "ghostly_flame_crowding".into(),
        passed: level.summons.len() <= 9,
        detail: "at most one summon per flame cell".into(),
    });
    results
}

// ── 9. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(tuning: &CloudTuning, seed: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();
    let (mut engine, mut level, mut rng) = setup(tuning, 16, 16, seed);

    for (i, kind) in [CloudType::BlackSmoke, CloudType::Steam, CloudType::Mist]
        .into_iter()
        .enumerate()
    {
        let spec = CloudSpec::new(kind, Coord::new(4 + 4 * i as i32, 8), 12).spread_rate(40);
        engine.place(&mut level, &mut rng, spec);
    }
    for _ in 0..3 {
        engine.manage_clouds(&mut level, &mut rng, 10);
    }

    let mut buffer = Vec::new();
    let saved = engine.save(&mut buffer);
    let mut copy = CloudEngine::with_tuning(engine.bounds(), tuning.clone());
    let loaded = saved.and_then(|()| copy.load(&buffer[..]));

    results.push(TestResult {
        name: "save_load_roundtrip".into(),
        passed: loaded.is_ok() && copy.pool().slots() == engine.pool().slots(),
        detail: match &loaded {
            Ok(()) => format!("{} clouds in {} bytes", copy.len(), buffer.len()),
            Err(e) => e.to_string(),
        },
    });

    let mut level_copy = level.clone();
    let mut rng_copy = rng.clone();
    for _ in 0..6 {
        engine.manage_clouds(&mut level, &mut rng, 10);
        copy.manage_clouds(&mut level_copy, &mut rng_copy, 10);
    }
    results.push(TestResult {
        name: "loaded_run_matches".into(),
        passed: copy.pool().slots() == engine.pool().slots(),
        detail: "loaded engine replays the original exactly".into(),
    });
    results
}
