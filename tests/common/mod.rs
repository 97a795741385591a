#![allow(dead_code)]

use parking_lot::Mutex;
use pokemon_battle_guess::aggregate::Aggregator;
use pokemon_battle_guess::battle::{BattleExecutor, ExecutorError, Ruleset, TrialOutcome};
use pokemon_battle_guess::catalog::Catalog;
use pokemon_battle_guess::model::{CombatantSpec, Stats};
use pokemon_battle_guess::service::{BattleService, SimulationSettings};
use pokemon_battle_guess::store::SessionStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub const FIXTURE_CATALOG: &str = r#"{
    "creatures": [
        {"id": 6, "name": "Charizard", "species": "charizard", "types": ["fire", "flying"],
         "baseStats": {"hp": 78, "atk": 84, "def": 78, "spa": 109, "spd": 85, "spe": 100},
         "abilities": ["blaze"],
         "movePool": ["flamethrower", "airslash", "dragonclaw", "earthquake", "slash"],
         "competitive": {"moves": ["flamethrower", "airslash", "dragonclaw", "earthquake"],
                         "ability": "blaze", "item": "lifeorb"}},
        {"id": 9, "name": "Blastoise", "species": "blastoise", "types": ["water"],
         "baseStats": {"hp": 79, "atk": 83, "def": 100, "spa": 85, "spd": 105, "spe": 78},
         "abilities": ["torrent"],
         "movePool": ["surf", "icebeam", "earthquake", "bodyslam", "hydropump"],
         "competitive": {"moves": ["surf", "icebeam", "earthquake", "bodyslam"],
                         "ability": "torrent", "item": "leftovers"}},
        {"id": 143, "name": "Snorlax", "species": "snorlax", "types": ["normal"],
         "baseStats": {"hp": 160, "atk": 110, "def": 65, "spa": 65, "spd": 110, "spe": 30},
         "abilities": ["thickfat"],
         "movePool": ["bodyslam", "earthquake", "crunch", "slash", "tackle"]},
        {"id": 999, "name": "Missingno", "species": "missingno", "types": ["normal"],
         "baseStats": {"hp": 33, "atk": 136, "def": 1, "spa": 6, "spd": 6, "spe": 29},
         "movePool": ["glitch"]}
    ],
    "moves": {
        "airslash": {"name": "Air Slash", "type": "flying", "category": "special", "power": 75, "accuracy": 95},
        "bodyslam": {"name": "Body Slam", "type": "normal", "category": "physical", "power": 85},
        "crunch": {"name": "Crunch", "type": "dark", "category": "physical", "power": 80},
        "dragonclaw": {"name": "Dragon Claw", "type": "dragon", "category": "physical", "power": 80},
        "earthquake": {"name": "Earthquake", "type": "ground", "category": "physical", "power": 100},
        "fireslam": {"name": "Fire Slam", "type": "fire", "category": "physical", "power": 300},
        "flamethrower": {"name": "Flamethrower", "type": "fire", "category": "special", "power": 90},
        "heavyswing": {"name": "Heavy Swing", "type": "normal", "category": "physical", "power": 300},
        "hydropump": {"name": "Hydro Pump", "type": "water", "category": "special", "power": 110, "accuracy": 80},
        "icebeam": {"name": "Ice Beam", "type": "ice", "category": "special", "power": 90},
        "quickblow": {"name": "Quick Blow", "type": "normal", "category": "physical", "power": 300, "priority": 1},
        "shadowball": {"name": "Shadow Ball", "type": "ghost", "category": "special", "power": 80},
        "slash": {"name": "Slash", "type": "normal", "category": "physical", "power": 70},
        "splash": {"name": "Splash", "type": "normal", "category": "status", "power": 0},
        "surf": {"name": "Surf", "type": "water", "category": "special", "power": 90},
        "tackle": {"name": "Tackle", "type": "normal", "category": "physical", "power": 40},
        "thunderbolt": {"name": "Thunderbolt", "type": "electric", "category": "special", "power": 90}
    },
    "items": ["leftovers", "lifeorb"]
}"#;

pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_json(FIXTURE_CATALOG).expect("fixture catalog is valid"))
}

pub fn stats(hp: u32, atk: u32, def: u32, spa: u32, spd: u32, spe: u32) -> Stats {
    Stats {
        hp,
        atk,
        def,
        spa,
        spd,
        spe,
    }
}

/// Level 50 combatant without ability or item.
pub fn spec(name: &str, types: &[&str], base_stats: Stats, moves: &[&str]) -> CombatantSpec {
    CombatantSpec {
        creature_id: 0,
        name: name.to_string(),
        species: name.to_ascii_lowercase(),
        level: 50,
        types: types.iter().map(|t| t.to_string()).collect(),
        base_stats,
        moves: moves.iter().map(|m| m.to_string()).collect(),
        ability: "noability".to_string(),
        item: None,
    }
}

/// Returns the same outcome for every trial.
pub struct FixedOutcome(pub TrialOutcome);

impl BattleExecutor for FixedOutcome {
    fn simulate_one(
        &self,
        _a: &CombatantSpec,
        _b: &CombatantSpec,
        _ruleset: &Ruleset,
        _seed: u64,
    ) -> Result<TrialOutcome, ExecutorError> {
        Ok(self.0)
    }
}

/// Fails the trial that receives `seed`; every other trial goes to side A.
pub struct FailOnSeed(pub u64);

impl BattleExecutor for FailOnSeed {
    fn simulate_one(
        &self,
        _a: &CombatantSpec,
        _b: &CombatantSpec,
        _ruleset: &Ruleset,
        seed: u64,
    ) -> Result<TrialOutcome, ExecutorError> {
        if seed == self.0 {
            return Err(ExecutorError::Engine("engine crashed".to_string()));
        }
        Ok(TrialOutcome::Winner(pokemon_battle_guess::battle::Side::A))
    }
}

/// Sleeps before every trial.
pub struct SlowExecutor(pub Duration);

impl BattleExecutor for SlowExecutor {
    fn simulate_one(
        &self,
        _a: &CombatantSpec,
        _b: &CombatantSpec,
        _ruleset: &Ruleset,
        _seed: u64,
    ) -> Result<TrialOutcome, ExecutorError> {
        std::thread::sleep(self.0);
        Ok(TrialOutcome::Draw)
    }
}

/// Records side A's moveset for every trial; all trials are draws.
#[derive(Default)]
pub struct RecordingExecutor {
    pub movesets: Mutex<HashSet<Vec<String>>>,
}

impl BattleExecutor for RecordingExecutor {
    fn simulate_one(
        &self,
        a: &CombatantSpec,
        _b: &CombatantSpec,
        _ruleset: &Ruleset,
        _seed: u64,
    ) -> Result<TrialOutcome, ExecutorError> {
        self.movesets.lock().insert(a.moves.clone());
        Ok(TrialOutcome::Draw)
    }
}

pub fn aggregator(executor: Arc<dyn BattleExecutor>) -> Aggregator {
    Aggregator::new(catalog(), executor, 2).expect("worker pool builds")
}

pub fn service(
    executor: Arc<dyn BattleExecutor>,
    settings: SimulationSettings,
) -> Arc<BattleService> {
    Arc::new(BattleService::new(
        Arc::new(aggregator(executor)),
        Arc::new(SessionStore::default()),
        settings,
    ))
}

pub fn seeded_settings(seed: u64) -> SimulationSettings {
    SimulationSettings {
        seed: Some(seed),
        ..SimulationSettings::default()
    }
}
