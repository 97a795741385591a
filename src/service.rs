//! Battle Service: the simulate-battle and submit-guess operations.
//!
//! Simulation work runs on the blocking pool under a deadline. The request's
//! [`CancelToken`] trips when the deadline passes or when the calling future is dropped
//! (a client disconnect), and a cancelled or failed aggregation never reaches the store.

use crate::aggregate::{Aggregator, BattleRequest, CancelToken};
use crate::battle::{AiDifficulty, Ruleset, DEFAULT_GENERATION, MAX_GENERATION, MIN_GENERATION};
use crate::builder::{BuildOptions, MovesetPolicy};
use crate::config::SimulationConfig;
use crate::error::{EngineError, Result};
use crate::model::CombatantSpec;
use crate::scoring::{self, ScoreResult};
use crate::session::BattleSession;
use crate::store::SessionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub trial_count: u32,
    pub timeout: Duration,
    pub default_level: u8,
    pub seed: Option<u64>,
}

impl From<&SimulationConfig> for SimulationSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            trial_count: config.trial_count,
            timeout: Duration::from_secs(config.timeout_secs),
            default_level: config.default_level,
            seed: config.seed,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

/// Client-facing battle options. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BattleOptions {
    pub generation: Option<u8>,
    pub pokemon1_level: Option<u8>,
    pub pokemon2_level: Option<u8>,
    pub with_items: bool,
    pub moveset_type: MovesetPolicy,
    pub ai_difficulty: AiDifficulty,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub pokemon1_id: u32,
    pub pokemon2_id: u32,
    #[serde(default)]
    pub options: BattleOptions,
}

impl SimulateRequest {
    pub fn new(pokemon1_id: u32, pokemon2_id: u32) -> Self {
        Self {
            pokemon1_id,
            pokemon2_id,
            options: BattleOptions::default(),
        }
    }

    fn to_battle_request(&self, default_level: u8) -> Result<BattleRequest> {
        let options = &self.options;
        let generation = options.generation.unwrap_or(DEFAULT_GENERATION);
        if !(MIN_GENERATION..=MAX_GENERATION).contains(&generation) {
            return Err(EngineError::InvalidOptions(format!(
                "generation {generation} is outside {MIN_GENERATION}-{MAX_GENERATION}"
            )));
        }
        let side = |level: Option<u8>| BuildOptions {
            level: level.unwrap_or(default_level),
            with_items: options.with_items,
            moveset: options.moveset_type,
        };
        Ok(BattleRequest {
            creature1: self.pokemon1_id,
            creature2: self.pokemon2_id,
            options1: side(options.pokemon1_level),
            options2: side(options.pokemon2_level),
            ruleset: Ruleset {
                generation,
                ai: options.ai_difficulty,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantSummary {
    #[serde(flatten)]
    pub spec: CombatantSpec,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub battle_id: Uuid,
    pub pokemon1: CombatantSummary,
    pub pokemon2: CombatantSummary,
    pub total_battles: u32,
    pub draws: u32,
    pub win_rate: f64,
    pub generation: u8,
    pub seed: u64,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<&BattleSession> for SimulateResponse {
    fn from(session: &BattleSession) -> Self {
        let battle = &session.battle;
        Self {
            battle_id: session.id,
            pokemon1: CombatantSummary {
                spec: battle.combatant1.clone(),
                wins: battle.tally.wins1,
            },
            pokemon2: CombatantSummary {
                spec: battle.combatant2.clone(),
                wins: battle.tally.wins2,
            },
            total_battles: battle.total_battles(),
            draws: battle.tally.draws,
            win_rate: battle.win_rate(),
            generation: battle.ruleset.generation,
            seed: battle.seed,
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    pub battle_id: String,
    pub guessed_win_rate: f64,
}

#[derive(Debug)]
pub struct BattleService {
    aggregator: Arc<Aggregator>,
    store: Arc<SessionStore>,
    settings: SimulationSettings,
}

impl BattleService {
    pub fn new(
        aggregator: Arc<Aggregator>,
        store: Arc<SessionStore>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            aggregator,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Run the configured number of trials and persist the result as a new session.
    pub async fn simulate_battle(&self, request: &SimulateRequest) -> Result<SimulateResponse> {
        let battle_request = request.to_battle_request(self.settings.default_level)?;
        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let trial_count = self.settings.trial_count;

        let cancel = CancelToken::new();
        let _cancel_on_drop = cancel.drop_guard();
        let worker_cancel = cancel.clone();
        let aggregator = Arc::clone(&self.aggregator);

        debug!(
            pokemon1 = request.pokemon1_id,
            pokemon2 = request.pokemon2_id,
            trials = trial_count,
            seed,
            "starting battle simulation"
        );
        let task = tokio::task::spawn_blocking(move || {
            aggregator.aggregate(&battle_request, trial_count, seed, &worker_cancel)
        });

        let battle = match tokio::time::timeout(self.settings.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => return Err(EngineError::WorkerFailed(join_error.to_string())),
            Err(_) => {
                cancel.cancel();
                warn!(
                    pokemon1 = request.pokemon1_id,
                    pokemon2 = request.pokemon2_id,
                    timeout_secs = self.settings.timeout.as_secs(),
                    "battle simulation timed out"
                );
                return Err(EngineError::Cancelled);
            }
        };

        let session = self.store.create_session(battle);
        info!(
            battle = %session.id,
            pokemon1 = %session.battle.combatant1.name,
            pokemon2 = %session.battle.combatant2.name,
            wins1 = session.battle.tally.wins1,
            wins2 = session.battle.tally.wins2,
            draws = session.battle.tally.draws,
            "battle simulated"
        );
        Ok(SimulateResponse::from(session.as_ref()))
    }

    /// Score a guess against a stored session. The guess is validated before the lookup,
    /// so a malformed guess reports `InvalidGuess` even for an unknown battle.
    pub fn submit_guess(&self, battle_id: &str, guessed_win_rate: f64) -> Result<ScoreResult> {
        let guessed = scoring::validate_guess(guessed_win_rate)?;
        let id = Uuid::parse_str(battle_id.trim())
            .map_err(|_| EngineError::NotFound(battle_id.to_string()))?;
        let session = self.store.get(&id)?;
        let result = scoring::score(session.win_rate(), guessed)?;
        info!(
            battle = %id,
            actual = result.actual_win_rate,
            guessed = result.guessed_win_rate,
            score = result.score,
            "guess scored"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_configured_level_and_latest_generation() {
        let request = SimulateRequest::new(6, 9);
        let battle = request.to_battle_request(42).expect("defaults are valid");
        assert_eq!(battle.options1.level, 42);
        assert_eq!(battle.options2.level, 42);
        assert_eq!(battle.ruleset.generation, DEFAULT_GENERATION);
        assert_eq!(battle.options1.moveset, MovesetPolicy::Random);
        assert!(!battle.options1.with_items);
    }

    #[test]
    fn generation_out_of_range_is_invalid_options() {
        let mut request = SimulateRequest::new(6, 9);
        request.options.generation = Some(10);
        assert!(matches!(
            request.to_battle_request(50),
            Err(EngineError::InvalidOptions(_))
        ));
    }

    #[test]
    fn wire_request_uses_camel_case() {
        let request: SimulateRequest = serde_json::from_str(
            r#"{"pokemon1Id": 6, "pokemon2Id": 9,
                "options": {"generation": 4, "pokemon1Level": 100, "withItems": true,
                            "movesetType": "competitive", "aiDifficulty": "elite"}}"#,
        )
        .expect("request parses");
        let battle = request.to_battle_request(50).expect("valid options");
        assert_eq!(battle.options1.level, 100);
        assert_eq!(battle.options2.level, 50);
        assert!(battle.options2.with_items);
        assert_eq!(battle.options1.moveset, MovesetPolicy::Competitive);
        assert_eq!(battle.ruleset, Ruleset { generation: 4, ai: AiDifficulty::Elite });
    }
}
