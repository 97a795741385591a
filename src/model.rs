use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;
pub const MAX_MOVES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

fn default_accuracy() -> f32 {
    100.0
}

fn default_priority() -> i32 {
    0
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveData {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u32,
    #[serde(default = "default_accuracy")]
    pub accuracy: f32,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl MoveData {
    pub fn deals_damage(&self) -> bool {
        self.power > 0 && self.category != MoveCategory::Status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Stats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

/// Curated moveset used by the `competitive` policy.
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitiveSet {
    pub moves: Vec<String>,
    #[serde(default)]
    pub ability: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
}

/// A creature as stored in the catalog, before any battle options are applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureRecord {
    pub id: u32,
    pub name: String,
    pub species: String,
    pub types: Vec<String>,
    pub base_stats: Stats,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub move_pool: Vec<String>,
    #[serde(default)]
    pub competitive: Option<CompetitiveSet>,
}

/// One side's battle-ready configuration for a single simulated fight.
///
/// Moves, ability and item are normalized ids (see [`normalize_id`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantSpec {
    pub creature_id: u32,
    pub name: String,
    pub species: String,
    pub level: u8,
    pub types: Vec<String>,
    pub base_stats: Stats,
    pub moves: Vec<String>,
    pub ability: String,
    pub item: Option<String>,
}

impl CombatantSpec {
    pub fn level_in_range(&self) -> bool {
        (MIN_LEVEL..=MAX_LEVEL).contains(&self.level)
    }
}

/// Lowercase ascii-alphanumeric id, e.g. "Flare Blitz" -> "flareblitz".
pub fn normalize_id(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_spaces_and_punctuation() {
        assert_eq!(normalize_id("Flare Blitz"), "flareblitz");
        assert_eq!(normalize_id("U-turn"), "uturn");
        assert_eq!(normalize_id("King's Shield"), "kingsshield");
    }

    #[test]
    fn move_defaults_apply() {
        let raw = r#"{"name":"Tackle","type":"normal","category":"physical","power":40}"#;
        let mv: MoveData = serde_json::from_str(raw).expect("tackle parses");
        assert_eq!(mv.accuracy, 100.0);
        assert_eq!(mv.priority, 0);
        assert!(mv.deals_damage());
    }
}
