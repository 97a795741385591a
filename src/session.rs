use crate::battle::{Ruleset, Side, TrialOutcome};
use crate::model::CombatantSpec;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Per-slot win counters. Combining two tallies is a plain sum, so partial tallies
/// from concurrent workers can be merged in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WinTally {
    pub wins1: u32,
    pub wins2: u32,
    pub draws: u32,
}

impl WinTally {
    #[must_use]
    pub fn record(mut self, outcome: TrialOutcome) -> Self {
        match outcome {
            TrialOutcome::Winner(Side::A) => self.wins1 += 1,
            TrialOutcome::Winner(Side::B) => self.wins2 += 1,
            TrialOutcome::Draw => self.draws += 1,
        }
        self
    }

    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            wins1: self.wins1 + other.wins1,
            wins2: self.wins2 + other.wins2,
            draws: self.draws + other.draws,
        }
    }

    pub fn total(&self) -> u32 {
        self.wins1 + self.wins2 + self.draws
    }

    /// Creature 1's win rate over all trials run, draws included in the denominator.
    pub fn win_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.wins1) / f64::from(total)
    }
}

/// Aggregated result of one simulate request, not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedBattle {
    pub combatant1: CombatantSpec,
    pub combatant2: CombatantSpec,
    pub ruleset: Ruleset,
    pub seed: u64,
    pub tally: WinTally,
}

impl SimulatedBattle {
    pub fn total_battles(&self) -> u32 {
        self.tally.total()
    }

    pub fn win_rate(&self) -> f64 {
        self.tally.win_rate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleSession {
    pub id: Uuid,
    pub battle: SimulatedBattle,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BattleSession {
    pub fn win_rate(&self) -> f64 {
        self.battle.win_rate()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
