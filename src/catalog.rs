use crate::model::{normalize_id, CreatureRecord, MoveData};
use crate::types::PokemonType;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    creatures: Vec<CreatureRecord>,
    moves: HashMap<String, MoveData>,
    #[serde(default)]
    items: Vec<String>,
}

/// Read-only creature catalog: base records, the move table and the held-item pool.
///
/// Move, ability and item ids are normalized on load so lookups never depend on how
/// the catalog author spelled them.
#[derive(Debug, Clone)]
pub struct Catalog {
    creatures: HashMap<u32, CreatureRecord>,
    moves: HashMap<String, MoveData>,
    items: Vec<String>,
}

/// Normalized ids with repeats collapsed, keeping the first occurrence.
fn unique_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| normalize_id(id))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

impl Catalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog at {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid catalog {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let parsed: CatalogFile =
            serde_json::from_str(raw).context("Failed to parse catalog JSON")?;
        Self::from_parts(parsed.creatures, parsed.moves, parsed.items)
    }

    pub fn from_parts(
        creatures: Vec<CreatureRecord>,
        moves: HashMap<String, MoveData>,
        items: Vec<String>,
    ) -> anyhow::Result<Self> {
        let moves: HashMap<String, MoveData> = moves
            .into_iter()
            .map(|(id, data)| (normalize_id(&id), data))
            .collect();
        for (id, data) in &moves {
            if PokemonType::parse(&data.move_type).is_none() {
                bail!("Move '{id}' has unknown type '{}'", data.move_type);
            }
        }

        let mut by_id = HashMap::with_capacity(creatures.len());
        for mut creature in creatures {
            if creature.types.is_empty() {
                bail!("Creature {} ({}) has no types", creature.id, creature.name);
            }
            if let Some(bad) = creature
                .types
                .iter()
                .find(|t| PokemonType::parse(t).is_none())
            {
                bail!("Creature {} ({}) has unknown type '{bad}'", creature.id, creature.name);
            }
            creature.move_pool = unique_ids(&creature.move_pool);
            creature.abilities = creature.abilities.iter().map(|a| normalize_id(a)).collect();
            if let Some(set) = creature.competitive.as_mut() {
                set.moves = unique_ids(&set.moves);
                set.ability = set.ability.as_deref().map(normalize_id);
                set.item = set.item.as_deref().map(normalize_id);
            }
            let id = creature.id;
            if by_id.insert(id, creature).is_some() {
                bail!("Duplicate creature id {id}");
            }
        }

        Ok(Self {
            creatures: by_id,
            moves,
            items: items.iter().map(|i| normalize_id(i)).collect(),
        })
    }

    pub fn creature(&self, id: u32) -> Option<&CreatureRecord> {
        self.creatures.get(&id)
    }

    pub fn move_data(&self, id: &str) -> Option<&MoveData> {
        self.moves.get(id)
    }

    pub fn is_known_move(&self, id: &str) -> bool {
        self.moves.contains_key(id)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "creatures": [
            {"id": 25, "name": "Pikachu", "species": "pikachu", "types": ["Electric"],
             "baseStats": {"hp": 35, "atk": 55, "def": 40, "spa": 50, "spd": 50, "spe": 90},
             "abilities": ["Static"], "movePool": ["Thunderbolt", "Quick Attack"]}
        ],
        "moves": {
            "Thunderbolt": {"name": "Thunderbolt", "type": "electric", "category": "special", "power": 90},
            "quickattack": {"name": "Quick Attack", "type": "normal", "category": "physical", "power": 40, "priority": 1}
        },
        "items": ["Life Orb"]
    }"#;

    #[test]
    fn ids_are_normalized_on_load() {
        let catalog = Catalog::from_json(SMALL).expect("catalog loads");
        let pikachu = catalog.creature(25).expect("pikachu present");
        assert_eq!(pikachu.move_pool, vec!["thunderbolt", "quickattack"]);
        assert_eq!(pikachu.abilities, vec!["static"]);
        assert!(catalog.is_known_move("thunderbolt"));
        assert_eq!(catalog.items(), ["lifeorb"]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn repeated_pool_entries_collapse_after_normalizing() {
        let raw = SMALL.replace(
            r#"["Thunderbolt", "Quick Attack"]"#,
            r#"["Thunderbolt", "Quick Attack", "thunderbolt", "QuickAttack"]"#,
        );
        let catalog = Catalog::from_json(&raw).expect("catalog loads");
        let pikachu = catalog.creature(25).expect("pikachu present");
        assert_eq!(pikachu.move_pool, vec!["thunderbolt", "quickattack"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = SMALL.replace(
            r#""creatures": ["#,
            r#""creatures": [{"id": 25, "name": "Raichu", "species": "raichu", "types": ["electric"],
             "baseStats": {"hp": 60, "atk": 90, "def": 55, "spa": 90, "spd": 80, "spe": 110}},"#,
        );
        let err = Catalog::from_json(&raw).expect_err("duplicate id must fail");
        assert!(err.to_string().contains("Duplicate creature id 25"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let raw = SMALL.replace(r#"["Electric"]"#, r#"["Shadow"]"#);
        assert!(Catalog::from_json(&raw).is_err());
    }

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::from_json(include_str!("../data/catalog.json"))
            .expect("bundled catalog is valid");
        assert!(catalog.creature(6).is_some());
        assert!(!catalog.items().is_empty());
    }
}
