// Type chart for the bundled duel executor. Steel/Dark arrive in gen 2 and Fairy in gen 6;
// before that those types are treated as typeless.
use phf::phf_map;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

static TYPE_NAMES: phf::Map<&'static str, PokemonType> = phf_map! {
    "normal" => PokemonType::Normal,
    "fire" => PokemonType::Fire,
    "water" => PokemonType::Water,
    "electric" => PokemonType::Electric,
    "grass" => PokemonType::Grass,
    "ice" => PokemonType::Ice,
    "fighting" => PokemonType::Fighting,
    "poison" => PokemonType::Poison,
    "ground" => PokemonType::Ground,
    "flying" => PokemonType::Flying,
    "psychic" => PokemonType::Psychic,
    "bug" => PokemonType::Bug,
    "rock" => PokemonType::Rock,
    "ghost" => PokemonType::Ghost,
    "dragon" => PokemonType::Dragon,
    "dark" => PokemonType::Dark,
    "steel" => PokemonType::Steel,
    "fairy" => PokemonType::Fairy,
};

impl PokemonType {
    pub fn parse(name: &str) -> Option<Self> {
        TYPE_NAMES.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// First generation in which the type exists.
    pub fn introduced_in(self) -> u8 {
        match self {
            PokemonType::Dark | PokemonType::Steel => 2,
            PokemonType::Fairy => 6,
            _ => 1,
        }
    }
}

/// Combined multiplier of `move_type` against every type in `target_types`.
pub fn type_effectiveness(move_type: &str, target_types: &[String], generation: u8) -> f32 {
    let Some(attacking) = PokemonType::parse(move_type) else {
        return 1.0;
    };
    if attacking.introduced_in() > generation {
        return 1.0;
    }
    target_types
        .iter()
        .filter_map(|t| PokemonType::parse(t))
        .filter(|t| t.introduced_in() <= generation)
        .map(|defending| single_type_effectiveness(attacking, defending))
        .product()
}

fn single_type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f32 {
    use PokemonType::*;
    match attacking {
        Normal => match defending {
            Rock | Steel => 0.5,
            Ghost => 0.0,
            _ => 1.0,
        },
        Fire => match defending {
            Fire | Water | Rock | Dragon => 0.5,
            Grass | Ice | Bug | Steel => 2.0,
            _ => 1.0,
        },
        Water => match defending {
            Water | Grass | Dragon => 0.5,
            Fire | Ground | Rock => 2.0,
            _ => 1.0,
        },
        Electric => match defending {
            Electric | Grass | Dragon => 0.5,
            Water | Flying => 2.0,
            Ground => 0.0,
            _ => 1.0,
        },
        Grass => match defending {
            Fire | Grass | Poison | Flying | Bug | Dragon | Steel => 0.5,
            Water | Ground | Rock => 2.0,
            _ => 1.0,
        },
        Ice => match defending {
            Fire | Water | Ice | Steel => 0.5,
            Grass | Ground | Flying | Dragon => 2.0,
            _ => 1.0,
        },
        Fighting => match defending {
            Normal | Ice | Rock | Dark | Steel => 2.0,
            Poison | Flying | Psychic | Bug | Fairy => 0.5,
            Ghost => 0.0,
            _ => 1.0,
        },
        Poison => match defending {
            Grass | Fairy => 2.0,
            Poison | Ground | Rock | Ghost => 0.5,
            Steel => 0.0,
            _ => 1.0,
        },
        Ground => match defending {
            Fire | Electric | Poison | Rock | Steel => 2.0,
            Grass | Bug => 0.5,
            Flying => 0.0,
            _ => 1.0,
        },
        Flying => match defending {
            Grass | Fighting | Bug => 2.0,
            Electric | Rock | Steel => 0.5,
            _ => 1.0,
        },
        Psychic => match defending {
            Fighting | Poison => 2.0,
            Psychic | Steel => 0.5,
            Dark => 0.0,
            _ => 1.0,
        },
        Bug => match defending {
            Grass | Psychic | Dark => 2.0,
            Fire | Fighting | Poison | Flying | Ghost | Steel | Fairy => 0.5,
            _ => 1.0,
        },
        Rock => match defending {
            Fire | Ice | Flying | Bug => 2.0,
            Fighting | Ground | Steel => 0.5,
            _ => 1.0,
        },
        Ghost => match defending {
            Ghost | Psychic => 2.0,
            Dark => 0.5,
            Normal => 0.0,
            _ => 1.0,
        },
        Dragon => match defending {
            Dragon => 2.0,
            Steel => 0.5,
            Fairy => 0.0,
            _ => 1.0,
        },
        Dark => match defending {
            Psychic | Ghost => 2.0,
            Fighting | Dark | Fairy => 0.5,
            _ => 1.0,
        },
        Steel => match defending {
            Rock | Ice | Fairy => 2.0,
            Fire | Water | Electric | Steel => 0.5,
            _ => 1.0,
        },
        Fairy => match defending {
            Fighting | Dragon | Dark => 2.0,
            Fire | Poison | Steel => 0.5,
            _ => 1.0,
        },
    }
}
