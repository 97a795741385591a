//! Level scaling of base stats.
//!
//! Combatants carry base stats; the duel executor derives in-battle stats with the
//! standard formula at a fixed 31 IVs, 0 EVs and a neutral nature.

use crate::model::Stats;

pub const DEFAULT_IV: u32 = 31;

pub fn calc_hp(base: u32, iv: u32, ev: u32, level: u8) -> u32 {
    let level = u32::from(level);
    let base_value = base * 2 + iv + ev / 4;
    (base_value * level) / 100 + level + 10
}

pub fn calc_stat(base: u32, iv: u32, ev: u32, level: u8) -> u32 {
    let level = u32::from(level);
    let base_value = base * 2 + iv + ev / 4;
    (base_value * level) / 100 + 5
}

pub fn level_stats(base: &Stats, level: u8) -> Stats {
    Stats {
        hp: calc_hp(base.hp, DEFAULT_IV, 0, level),
        atk: calc_stat(base.atk, DEFAULT_IV, 0, level),
        def: calc_stat(base.def, DEFAULT_IV, 0, level),
        spa: calc_stat(base.spa, DEFAULT_IV, 0, level),
        spd: calc_stat(base.spd, DEFAULT_IV, 0, level),
        spe: calc_stat(base.spe, DEFAULT_IV, 0, level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charizard_lv50_neutral() {
        let base = Stats {
            hp: 78,
            atk: 84,
            def: 78,
            spa: 109,
            spd: 85,
            spe: 100,
        };
        let set = level_stats(&base, 50);
        assert_eq!(set.hp, 153);
        assert_eq!(set.atk, 104);
        assert_eq!(set.def, 98);
        assert_eq!(set.spa, 129);
        assert_eq!(set.spd, 105);
        assert_eq!(set.spe, 120);
    }

    #[test]
    fn level_one_stays_positive() {
        let base = Stats {
            hp: 1,
            atk: 5,
            def: 5,
            spa: 5,
            spd: 5,
            spe: 5,
        };
        let set = level_stats(&base, 1);
        assert_eq!(set.hp, 11);
        assert_eq!(set.atk, 5);
    }
}
