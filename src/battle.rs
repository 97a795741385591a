use crate::catalog::Catalog;
use crate::items::{item_effect, ItemEffect};
use crate::model::{CombatantSpec, MoveCategory, MoveData, Stats, MAX_MOVES};
use crate::stats::level_stats;
use crate::types::type_effectiveness;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const MIN_GENERATION: u8 = 1;
pub const MAX_GENERATION: u8 = 9;
pub const DEFAULT_GENERATION: u8 = 9;
const MAX_TURNS: u32 = 500;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    A,
    B,
}

impl Side {
    fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Result of a single trial. A draw credits neither side.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TrialOutcome {
    Winner(Side),
    Draw,
}

/// Decision policy both sides use when picking moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    #[default]
    Random,
    Elite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ruleset {
    pub generation: u8,
    pub ai: AiDifficulty,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            generation: DEFAULT_GENERATION,
            ai: AiDifficulty::Random,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("generation {0} is not supported")]
    UnsupportedGeneration(u8),
    #[error("{name} is level {level}, outside the supported 1-100 range")]
    LevelOutOfRange { name: String, level: u8 },
    #[error("{0} has no moves")]
    EmptyMoveset(String),
    #[error("{name} has {count} moves, at most 4 are allowed")]
    TooManyMoves { name: String, count: usize },
    #[error("{name} knows unrecognized move '{move_id}'")]
    UnknownMove { name: String, move_id: String },
    #[error("{0}")]
    Engine(String),
}

/// Single-battle capability: run one fight between `a` and `b` and report the winner.
///
/// Implementations must be deterministic for a given `seed` and free of side effects
/// visible to the caller, since trials are run concurrently and in any order.
pub trait BattleExecutor: Send + Sync {
    fn simulate_one(
        &self,
        a: &CombatantSpec,
        b: &CombatantSpec,
        ruleset: &Ruleset,
        seed: u64,
    ) -> Result<TrialOutcome, ExecutorError>;
}

/// Compact 1v1 executor shipped with the service.
///
/// Covers priority and speed ordering, accuracy, STAB, the type chart, the 85-100% damage
/// roll, a handful of abilities and the items in [`crate::items::ITEM_EFFECTS`]. Status
/// moves are selectable but have no effect.
#[derive(Debug, Clone)]
pub struct DuelExecutor {
    catalog: Arc<Catalog>,
}

impl DuelExecutor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    fn battler<'a>(
        &'a self,
        spec: &'a CombatantSpec,
        generation: u8,
    ) -> Result<Battler<'a>, ExecutorError> {
        if !spec.level_in_range() {
            return Err(ExecutorError::LevelOutOfRange {
                name: spec.name.clone(),
                level: spec.level,
            });
        }
        if spec.moves.is_empty() {
            return Err(ExecutorError::EmptyMoveset(spec.name.clone()));
        }
        if spec.moves.len() > MAX_MOVES {
            return Err(ExecutorError::TooManyMoves {
                name: spec.name.clone(),
                count: spec.moves.len(),
            });
        }
        let moves = spec
            .moves
            .iter()
            .map(|id| {
                self.catalog
                    .move_data(id)
                    .ok_or_else(|| ExecutorError::UnknownMove {
                        name: spec.name.clone(),
                        move_id: id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Battler::new(spec, moves, generation))
    }

    /// Damage `attacker` would deal to a fresh `defender` with `move_id` at a fixed roll.
    pub fn estimate_damage(
        &self,
        attacker: &CombatantSpec,
        defender: &CombatantSpec,
        move_id: &str,
        ruleset: &Ruleset,
        roll: f32,
    ) -> Result<u32, ExecutorError> {
        let mv = self
            .catalog
            .move_data(move_id)
            .ok_or_else(|| ExecutorError::UnknownMove {
                name: attacker.name.clone(),
                move_id: move_id.to_string(),
            })?;
        let att = self.battler(attacker, ruleset.generation)?;
        let def = self.battler(defender, ruleset.generation)?;
        Ok(compute_damage(&att, &def, mv, ruleset.generation, roll))
    }
}

impl BattleExecutor for DuelExecutor {
    fn simulate_one(
        &self,
        a: &CombatantSpec,
        b: &CombatantSpec,
        ruleset: &Ruleset,
        seed: u64,
    ) -> Result<TrialOutcome, ExecutorError> {
        if !(MIN_GENERATION..=MAX_GENERATION).contains(&ruleset.generation) {
            return Err(ExecutorError::UnsupportedGeneration(ruleset.generation));
        }
        let duel = Duel {
            a: self.battler(a, ruleset.generation)?,
            b: self.battler(b, ruleset.generation)?,
            generation: ruleset.generation,
            ai: ruleset.ai,
            rng: SmallRng::seed_from_u64(seed),
        };
        Ok(duel.run())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Ability {
    Blaze,
    Torrent,
    Overgrow,
    Swarm,
    Levitate,
    Intimidate,
    HugePower,
    Adaptability,
    Multiscale,
    ThickFat,
    Sturdy,
    Technician,
    RoughSkin,
    FlashFire,
    WaterAbsorb,
    VoltAbsorb,
    LightningRod,
}

impl Ability {
    fn from_id(id: &str) -> Option<Self> {
        let ability = match id {
            "blaze" => Ability::Blaze,
            "torrent" => Ability::Torrent,
            "overgrow" => Ability::Overgrow,
            "swarm" => Ability::Swarm,
            "levitate" => Ability::Levitate,
            "intimidate" => Ability::Intimidate,
            "hugepower" | "purepower" => Ability::HugePower,
            "adaptability" => Ability::Adaptability,
            "multiscale" => Ability::Multiscale,
            "thickfat" => Ability::ThickFat,
            "sturdy" => Ability::Sturdy,
            "technician" => Ability::Technician,
            "roughskin" => Ability::RoughSkin,
            "flashfire" => Ability::FlashFire,
            "waterabsorb" => Ability::WaterAbsorb,
            "voltabsorb" => Ability::VoltAbsorb,
            "lightningrod" => Ability::LightningRod,
            _ => return None,
        };
        Some(ability)
    }

    fn pinch_type(self) -> Option<&'static str> {
        match self {
            Ability::Blaze => Some("fire"),
            Ability::Torrent => Some("water"),
            Ability::Overgrow => Some("grass"),
            Ability::Swarm => Some("bug"),
            _ => None,
        }
    }

    fn immune_to(self, move_type: &str) -> bool {
        matches!(
            (self, move_type),
            (Ability::Levitate, "ground")
                | (Ability::FlashFire, "fire")
                | (Ability::WaterAbsorb, "water")
                | (Ability::VoltAbsorb | Ability::LightningRod, "electric")
        )
    }
}

struct Battler<'a> {
    spec: &'a CombatantSpec,
    moves: Vec<&'a MoveData>,
    stats: Stats,
    current_hp: u32,
    atk_stage: i8,
    ability: Option<Ability>,
    item: Option<&'static ItemEffect>,
    item_spent: bool,
    locked_move: Option<usize>,
}

impl<'a> Battler<'a> {
    fn new(spec: &'a CombatantSpec, moves: Vec<&'a MoveData>, generation: u8) -> Self {
        let stats = level_stats(&spec.base_stats, spec.level);
        // Held items arrive in gen 2, abilities in gen 3.
        let item = if generation >= 2 {
            spec.item.as_deref().and_then(item_effect)
        } else {
            None
        };
        let ability = if generation >= 3 {
            Ability::from_id(&spec.ability)
        } else {
            None
        };
        Battler {
            spec,
            moves,
            current_hp: stats.hp,
            stats,
            atk_stage: 0,
            ability,
            item,
            item_spent: false,
            locked_move: None,
        }
    }

    fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    fn at_full_hp(&self) -> bool {
        self.current_hp == self.stats.hp
    }

    fn has_ability(&self, ability: Ability) -> bool {
        self.ability == Some(ability)
    }

    fn item(&self) -> Option<&'static ItemEffect> {
        self.item.filter(|_| !self.item_spent)
    }

    fn speed(&self) -> u32 {
        let mult = self.item().map_or(1.0, |i| i.spe_mult);
        (self.stats.spe as f32 * mult) as u32
    }

    fn attack_stat(&self, category: MoveCategory) -> f32 {
        match category {
            MoveCategory::Physical => {
                let mut atk = self.stats.atk as f32 * stage_multiplier(self.atk_stage);
                if self.has_ability(Ability::HugePower) {
                    atk *= 2.0;
                }
                atk * self.item().map_or(1.0, |i| i.atk_mult)
            }
            MoveCategory::Special => {
                self.stats.spa as f32 * self.item().map_or(1.0, |i| i.spa_mult)
            }
            MoveCategory::Status => 0.0,
        }
    }

    fn defense_stat(&self, category: MoveCategory) -> f32 {
        match category {
            MoveCategory::Physical => self.stats.def as f32,
            MoveCategory::Special => self.stats.spd as f32,
            MoveCategory::Status => 0.0,
        }
    }

    fn fraction_of_max(&self, divisor: u32) -> u32 {
        (self.stats.hp / divisor).max(1)
    }

    fn lose_hp(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    fn heal(&mut self, amount: u32) {
        self.current_hp = (self.current_hp + amount).min(self.stats.hp);
    }

    fn take_hit(&mut self, damage: u32) {
        let sash = self.item().is_some_and(|i| i.sash_like);
        let sturdy = self.has_ability(Ability::Sturdy);
        if damage >= self.current_hp && self.at_full_hp() && (sash || sturdy) {
            self.current_hp = 1;
            if sash && !sturdy {
                self.item_spent = true;
            }
            return;
        }
        self.lose_hp(damage);
        if let Some(divisor) = self.item().and_then(|i| i.pinch_heal_divisor) {
            if !self.is_fainted() && self.current_hp * 2 <= self.stats.hp {
                let amount = self.fraction_of_max(divisor);
                self.heal(amount);
                self.item_spent = true;
            }
        }
    }
}

fn stage_multiplier(stage: i8) -> f32 {
    let stage = f32::from(stage);
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

#[derive(Clone)]
struct PlannedAction {
    side: Side,
    move_index: usize,
    priority: i32,
    speed: u32,
    tie_break: u64,
}

struct Duel<'a> {
    a: Battler<'a>,
    b: Battler<'a>,
    generation: u8,
    ai: AiDifficulty,
    rng: SmallRng,
}

impl<'a> Duel<'a> {
    fn run(mut self) -> TrialOutcome {
        self.on_entry();
        for _turn in 0..MAX_TURNS {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            self.run_turn();
        }
        self.outcome().unwrap_or(TrialOutcome::Draw)
    }

    fn battler(&self, side: Side) -> &Battler<'a> {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    fn battler_mut(&mut self, side: Side) -> &mut Battler<'a> {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    fn outcome(&self) -> Option<TrialOutcome> {
        match (self.a.is_fainted(), self.b.is_fainted()) {
            (true, true) => Some(TrialOutcome::Draw),
            (true, false) => Some(TrialOutcome::Winner(Side::B)),
            (false, true) => Some(TrialOutcome::Winner(Side::A)),
            (false, false) => None,
        }
    }

    fn on_entry(&mut self) {
        for side in [Side::A, Side::B] {
            if self.battler(side).has_ability(Ability::Intimidate) {
                let target = self.battler_mut(side.opponent());
                target.atk_stage = (target.atk_stage - 1).max(-6);
            }
        }
    }

    fn choose_move(&mut self, side: Side) -> usize {
        let attacker = self.battler(side);
        if let Some(locked) = attacker.locked_move {
            return locked;
        }
        let move_count = attacker.moves.len();
        let chosen = match self.ai {
            AiDifficulty::Random => None,
            AiDifficulty::Elite => {
                best_move(attacker, self.battler(side.opponent()), self.generation)
            }
        };
        let chosen = chosen.unwrap_or_else(|| self.rng.gen_range(0..move_count));
        let attacker = self.battler_mut(side);
        if attacker.item().is_some_and(|i| i.choice_lock) {
            attacker.locked_move = Some(chosen);
        }
        chosen
    }

    fn planned_action(&mut self, side: Side, move_index: usize) -> PlannedAction {
        let battler = self.battler(side);
        let priority = battler.moves[move_index].priority;
        let speed = battler.speed();
        PlannedAction {
            side,
            move_index,
            priority,
            speed,
            tie_break: self.rng.gen(),
        }
    }

    fn run_turn(&mut self) {
        let a_move = self.choose_move(Side::A);
        let b_move = self.choose_move(Side::B);
        let mut actions = vec![
            self.planned_action(Side::A, a_move),
            self.planned_action(Side::B, b_move),
        ];
        actions.sort_by(|lhs, rhs| {
            rhs.priority
                .cmp(&lhs.priority)
                .then_with(|| rhs.speed.cmp(&lhs.speed))
                .then_with(|| lhs.tie_break.cmp(&rhs.tie_break))
        });
        for action in actions {
            if self.outcome().is_some() {
                return;
            }
            self.execute_move(action.side, action.move_index);
        }
        self.end_of_turn();
    }

    fn execute_move(&mut self, side: Side, move_idx: usize) {
        let generation = self.generation;
        let (attacker, defender) = match side {
            Side::A => (&mut self.a, &mut self.b),
            Side::B => (&mut self.b, &mut self.a),
        };
        let mv = attacker.moves[move_idx];
        if !mv.deals_damage() || !roll_accuracy(mv, &mut self.rng) {
            return;
        }
        let roll = f32::from(self.rng.gen_range(85u8..=100)) / 100.0;
        let damage = compute_damage(attacker, defender, mv, generation, roll);
        if damage == 0 {
            return;
        }
        defender.take_hit(damage);
        if mv.category == MoveCategory::Physical && defender.has_ability(Ability::RoughSkin) {
            let amount = attacker.fraction_of_max(8);
            attacker.lose_hp(amount);
        }
        if let Some(divisor) = attacker.item().and_then(|i| i.recoil_divisor) {
            let amount = attacker.fraction_of_max(divisor);
            attacker.lose_hp(amount);
        }
    }

    fn end_of_turn(&mut self) {
        for side in [Side::A, Side::B] {
            let battler = self.battler_mut(side);
            if battler.is_fainted() {
                continue;
            }
            if let Some(divisor) = battler.item().and_then(|i| i.residual_heal_divisor) {
                let amount = battler.fraction_of_max(divisor);
                battler.heal(amount);
            }
        }
    }
}

/// Elite policy: highest expected damage (power, accuracy, matchup), first index on ties.
/// Returns `None` when no move can deal damage so the caller falls back to a random pick.
fn best_move(attacker: &Battler<'_>, defender: &Battler<'_>, generation: u8) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, mv) in attacker.moves.iter().enumerate() {
        let expected = compute_damage(attacker, defender, mv, generation, 0.925) as f32
            * (mv.accuracy.min(100.0) / 100.0);
        if expected <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, value)| expected > value) {
            best = Some((idx, expected));
        }
    }
    best.map(|(idx, _)| idx)
}

fn roll_accuracy(move_def: &MoveData, rng: &mut SmallRng) -> bool {
    if move_def.accuracy >= 100.0 {
        return true;
    }
    let roll = rng.gen_range(0.0..100.0);
    roll < move_def.accuracy
}

pub fn sample_accuracy_hits(move_def: &MoveData, seed: u64, trials: usize) -> usize {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..trials)
        .filter(|_| roll_accuracy(move_def, &mut rng))
        .count()
}

fn compute_damage(
    attacker: &Battler<'_>,
    defender: &Battler<'_>,
    move_def: &MoveData,
    generation: u8,
    roll: f32,
) -> u32 {
    if !move_def.deals_damage() {
        return 0;
    }
    let move_type = move_def.move_type.to_ascii_lowercase();
    if defender.ability.is_some_and(|a| a.immune_to(&move_type)) {
        return 0;
    }
    let type_mod = type_effectiveness(&move_type, &defender.spec.types, generation);
    if type_mod == 0.0 {
        return 0;
    }
    let atk = attacker.attack_stat(move_def.category);
    let def = defender.defense_stat(move_def.category);
    if def <= 0.0 {
        return 0;
    }

    let mut power = move_def.power as f32;
    if attacker.has_ability(Ability::Technician) && move_def.power <= 60 {
        power *= 1.5;
    }
    let level = f32::from(attacker.spec.level);
    let mut base = (((2.0 * level / 5.0 + 2.0) * power * atk / def) / 50.0) + 2.0;

    let stab = if attacker
        .spec
        .types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&move_type))
    {
        if attacker.has_ability(Ability::Adaptability) {
            2.0
        } else {
            1.5
        }
    } else {
        1.0
    };

    let mut modifier = stab * type_mod * roll;
    if let Some(pinch) = attacker.ability.and_then(Ability::pinch_type) {
        if pinch == move_type && attacker.current_hp * 3 <= attacker.stats.hp {
            modifier *= 1.5;
        }
    }
    if defender.has_ability(Ability::ThickFat) && matches!(move_type.as_str(), "fire" | "ice") {
        modifier *= 0.5;
    }
    if defender.has_ability(Ability::Multiscale) && defender.at_full_hp() {
        modifier *= 0.5;
    }
    if let Some(item) = attacker.item() {
        modifier *= item.damage_mult;
        if type_mod > 1.0 {
            modifier *= item.super_effective_mult;
        }
    }
    base *= modifier;
    base.floor().max(1.0) as u32
}
