//! Combatant Builder: catalog record + battle options -> [`CombatantSpec`].

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::model::{CombatantSpec, CreatureRecord, MAX_LEVEL, MAX_MOVES, MIN_LEVEL};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_LEVEL: u8 = 50;
const NO_ABILITY: &str = "noability";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MovesetPolicy {
    /// Draw up to four moves from the legal pool on every build.
    #[default]
    Random,
    /// Use the curated set, or the strongest legal moves when none is curated.
    Competitive,
}

impl MovesetPolicy {
    /// Whether repeated builds can differ, i.e. the builder must run once per trial.
    pub fn varies_per_trial(self) -> bool {
        matches!(self, MovesetPolicy::Random)
    }
}

impl fmt::Display for MovesetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovesetPolicy::Random => f.write_str("random"),
            MovesetPolicy::Competitive => f.write_str("competitive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub level: u8,
    pub with_items: bool,
    pub moveset: MovesetPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            with_items: false,
            moveset: MovesetPolicy::Random,
        }
    }
}

/// Build a battle-ready combatant.
///
/// Pure apart from `rng`: the competitive policy never draws from it, so the same spec
/// comes back on every call, while the random policy samples moves, ability and item.
pub fn build_combatant<R: Rng + ?Sized>(
    catalog: &Catalog,
    creature_id: u32,
    options: &BuildOptions,
    rng: &mut R,
) -> Result<CombatantSpec> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&options.level) {
        return Err(EngineError::InvalidOptions(format!(
            "level {} is outside {MIN_LEVEL}-{MAX_LEVEL}",
            options.level
        )));
    }
    let creature = catalog
        .creature(creature_id)
        .ok_or(EngineError::UnknownCreature(creature_id))?;

    let (moves, ability, item) = match options.moveset {
        MovesetPolicy::Random => {
            let moves = random_moves(catalog, creature, rng)?;
            let ability = creature
                .abilities
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| NO_ABILITY.to_string());
            let item = if options.with_items {
                catalog.items().choose(rng).cloned()
            } else {
                None
            };
            (moves, ability, item)
        }
        MovesetPolicy::Competitive => {
            let moves = competitive_moves(catalog, creature)?;
            let set = creature.competitive.as_ref();
            let ability = set
                .and_then(|s| s.ability.clone())
                .or_else(|| creature.abilities.first().cloned())
                .unwrap_or_else(|| NO_ABILITY.to_string());
            let item = if options.with_items {
                set.and_then(|s| s.item.clone())
            } else {
                None
            };
            (moves, ability, item)
        }
    };

    Ok(CombatantSpec {
        creature_id: creature.id,
        name: creature.name.clone(),
        species: creature.species.clone(),
        level: options.level,
        types: creature.types.clone(),
        base_stats: creature.base_stats,
        moves,
        ability,
        item,
    })
}

/// Known moves from `ids`, first occurrence only, in their original order.
fn unique_known<'a>(catalog: &Catalog, ids: &'a [String]) -> Vec<&'a String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|m| catalog.is_known_move(m) && seen.insert(m.as_str()))
        .collect()
}

fn legal_pool<'a>(catalog: &Catalog, creature: &'a CreatureRecord) -> Vec<&'a String> {
    unique_known(catalog, &creature.move_pool)
}

fn no_legal_moves(creature: &CreatureRecord, policy: MovesetPolicy) -> EngineError {
    EngineError::NoLegalMoves {
        creature_id: creature.id,
        name: creature.name.clone(),
        policy,
    }
}

fn random_moves<R: Rng + ?Sized>(
    catalog: &Catalog,
    creature: &CreatureRecord,
    rng: &mut R,
) -> Result<Vec<String>> {
    let pool = legal_pool(catalog, creature);
    if pool.is_empty() {
        return Err(no_legal_moves(creature, MovesetPolicy::Random));
    }
    Ok(pool
        .choose_multiple(rng, MAX_MOVES)
        .map(|m| (*m).clone())
        .collect())
}

fn competitive_moves(catalog: &Catalog, creature: &CreatureRecord) -> Result<Vec<String>> {
    let curated: Vec<String> = creature
        .competitive
        .as_ref()
        .map(|set| {
            unique_known(catalog, &set.moves)
                .into_iter()
                .take(MAX_MOVES)
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    if !curated.is_empty() {
        return Ok(curated);
    }

    // No curated set: strongest legal moves, ties broken by id.
    let mut pool = legal_pool(catalog, creature);
    pool.sort_by(|lhs, rhs| {
        let power = |id: &str| catalog.move_data(id).map_or(0, |m| m.power);
        power(rhs.as_str())
            .cmp(&power(lhs.as_str()))
            .then_with(|| lhs.cmp(rhs))
    });
    if pool.is_empty() {
        return Err(no_legal_moves(creature, MovesetPolicy::Competitive));
    }
    Ok(pool.into_iter().take(MAX_MOVES).cloned().collect())
}
