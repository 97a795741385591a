use phf::phf_map;

/// Battle effect of a held item in the bundled duel executor. Items missing from
/// [`ITEM_EFFECTS`] are carried on the combatant but have no effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemEffect {
    pub name: &'static str,
    pub atk_mult: f32,
    pub spa_mult: f32,
    pub spe_mult: f32,
    pub damage_mult: f32,
    pub super_effective_mult: f32,
    /// Attacker loses `1/n` of max HP after landing a hit.
    pub recoil_divisor: Option<u32>,
    /// Holder heals `1/n` of max HP at the end of every turn.
    pub residual_heal_divisor: Option<u32>,
    /// Holder heals `1/n` of max HP once, when dropping to half HP or below.
    pub pinch_heal_divisor: Option<u32>,
    /// Locks the holder into the first move it selects.
    pub choice_lock: bool,
    /// Survives a one-hit KO from full HP with 1 HP, once.
    pub sash_like: bool,
}

const NEUTRAL: ItemEffect = ItemEffect {
    name: "",
    atk_mult: 1.0,
    spa_mult: 1.0,
    spe_mult: 1.0,
    damage_mult: 1.0,
    super_effective_mult: 1.0,
    recoil_divisor: None,
    residual_heal_divisor: None,
    pinch_heal_divisor: None,
    choice_lock: false,
    sash_like: false,
};

pub static ITEM_EFFECTS: phf::Map<&'static str, ItemEffect> = phf_map! {
    "leftovers" => ItemEffect { name: "Leftovers", residual_heal_divisor: Some(16), ..NEUTRAL },
    "lifeorb" => ItemEffect { name: "Life Orb", damage_mult: 1.3, recoil_divisor: Some(10), ..NEUTRAL },
    "choiceband" => ItemEffect { name: "Choice Band", atk_mult: 1.5, choice_lock: true, ..NEUTRAL },
    "choicespecs" => ItemEffect { name: "Choice Specs", spa_mult: 1.5, choice_lock: true, ..NEUTRAL },
    "choicescarf" => ItemEffect { name: "Choice Scarf", spe_mult: 1.5, choice_lock: true, ..NEUTRAL },
    "focussash" => ItemEffect { name: "Focus Sash", sash_like: true, ..NEUTRAL },
    "expertbelt" => ItemEffect { name: "Expert Belt", super_effective_mult: 1.2, ..NEUTRAL },
    "sitrusberry" => ItemEffect { name: "Sitrus Berry", pinch_heal_divisor: Some(4), ..NEUTRAL },
};

pub fn item_effect(id: &str) -> Option<&'static ItemEffect> {
    ITEM_EFFECTS.get(id)
}
