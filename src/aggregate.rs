//! Simulation Aggregator: run N independent trials on a bounded worker pool and tally them.

use crate::battle::{BattleExecutor, Ruleset, TrialOutcome};
use crate::builder::{build_combatant, BuildOptions};
use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::model::CombatantSpec;
use crate::session::{SimulatedBattle, WinTally};
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Trials per simulate request.
pub const DEFAULT_TRIAL_COUNT: u32 = 100;

/// Cooperative cancellation flag shared between a request and its trials.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Cancels the token when the returned guard is dropped.
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

#[derive(Debug)]
pub struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Two creatures plus the options each side is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleRequest {
    pub creature1: u32,
    pub creature2: u32,
    pub options1: BuildOptions,
    pub options2: BuildOptions,
    pub ruleset: Ruleset,
}

pub struct Aggregator {
    catalog: Arc<Catalog>,
    executor: Arc<dyn BattleExecutor>,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("creatures", &self.catalog.len())
            .field("workers", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

/// Mixed into the trial seed for the builder's rng so combatant draws and battle rolls
/// come from separate streams.
const BUILD_SALT: u64 = 0xD1B5_4A32_D192_ED03;

/// Seed handed to the executor for `trial`. Distinct for every trial of a session.
pub fn trial_seed(seed: u64, trial: u32) -> u64 {
    seed ^ u64::from(trial).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl Aggregator {
    /// `worker_threads == 0` sizes the pool to the available parallelism.
    pub fn new(
        catalog: Arc<Catalog>,
        executor: Arc<dyn BattleExecutor>,
        worker_threads: usize,
    ) -> anyhow::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|idx| format!("battle-trial-{idx}"))
            .build()
            .context("Failed to build simulation worker pool")?;
        Ok(Self {
            catalog,
            executor,
            pool,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run `trial_count` trials and return the unsaved aggregate.
    ///
    /// Any builder or executor failure aborts the whole aggregation; a partial tally is
    /// never returned. Trial order is irrelevant, counts are merged with a plain sum.
    pub fn aggregate(
        &self,
        request: &BattleRequest,
        trial_count: u32,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<SimulatedBattle> {
        if trial_count == 0 {
            return Err(EngineError::InvalidOptions(
                "trial count must be positive".to_string(),
            ));
        }

        // Trial 0's combatants double as the session's record of what was simulated and
        // surface builder errors before any work is scheduled.
        let (combatant1, combatant2, _) = self.trial_setup(request, None, None, seed, 0)?;
        let (combatant1, combatant2) = (combatant1.into_owned(), combatant2.into_owned());
        let fixed1 = (!request.options1.moveset.varies_per_trial()).then_some(&combatant1);
        let fixed2 = (!request.options2.moveset.varies_per_trial()).then_some(&combatant2);

        let tally = self.pool.install(|| {
            (0..trial_count)
                .into_par_iter()
                .map(|trial| self.run_trial(request, fixed1, fixed2, seed, trial, cancel))
                .try_fold(WinTally::default, |acc, outcome| outcome.map(|o| acc.record(o)))
                .try_reduce(WinTally::default, |lhs, rhs| Ok(lhs.merge(rhs)))
        })?;

        debug!(
            creature1 = request.creature1,
            creature2 = request.creature2,
            trials = tally.total(),
            wins1 = tally.wins1,
            wins2 = tally.wins2,
            draws = tally.draws,
            "aggregation finished"
        );

        Ok(SimulatedBattle {
            combatant1,
            combatant2,
            ruleset: request.ruleset,
            seed,
            tally,
        })
    }

    /// Combatants and battle seed for one trial; `fixed*` specs are reused as-is.
    fn trial_setup<'s>(
        &self,
        request: &BattleRequest,
        fixed1: Option<&'s CombatantSpec>,
        fixed2: Option<&'s CombatantSpec>,
        seed: u64,
        trial: u32,
    ) -> Result<(Cow<'s, CombatantSpec>, Cow<'s, CombatantSpec>, u64)> {
        let battle_seed = trial_seed(seed, trial);
        let mut rng = SmallRng::seed_from_u64(battle_seed ^ BUILD_SALT);
        let spec1 = match fixed1 {
            Some(spec) => Cow::Borrowed(spec),
            None => Cow::Owned(build_combatant(
                &self.catalog,
                request.creature1,
                &request.options1,
                &mut rng,
            )?),
        };
        let spec2 = match fixed2 {
            Some(spec) => Cow::Borrowed(spec),
            None => Cow::Owned(build_combatant(
                &self.catalog,
                request.creature2,
                &request.options2,
                &mut rng,
            )?),
        };
        Ok((spec1, spec2, battle_seed))
    }

    fn run_trial(
        &self,
        request: &BattleRequest,
        fixed1: Option<&CombatantSpec>,
        fixed2: Option<&CombatantSpec>,
        seed: u64,
        trial: u32,
        cancel: &CancelToken,
    ) -> Result<TrialOutcome> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let (spec1, spec2, battle_seed) = self.trial_setup(request, fixed1, fixed2, seed, trial)?;
        self.executor
            .simulate_one(&spec1, &spec2, &request.ruleset, battle_seed)
            .map_err(|source| EngineError::SimulationFailed { trial, source })
    }
}
