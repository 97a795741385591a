//! Scoring Engine: compare a guessed win rate with the simulated one.
//!
//! accuracy = 1 - |actual - guessed|, score = accuracy scaled to 0..=100 and rounded
//! half up. Both are deterministic and non-increasing in the absolute error.

use crate::error::{EngineError, Result};
use serde::Serialize;

pub const MAX_SCORE: u32 = 100;

/// Lower accuracy bound (inclusive) of each feedback band.
pub const PERFECT_THRESHOLD: f64 = 0.95;
pub const GREAT_THRESHOLD: f64 = 0.85;
pub const CLOSE_THRESHOLD: f64 = 0.70;

/// Accuracy is snapped to this resolution before it is scored or banded, so float noise
/// such as 0.8499999999999999 for an error of 0.15 lands on the documented threshold.
const ACCURACY_SNAP: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreBand {
    Perfect,
    Great,
    Close,
    WayOff,
}

impl ScoreBand {
    pub fn for_accuracy(accuracy: f64) -> Self {
        if accuracy >= PERFECT_THRESHOLD {
            ScoreBand::Perfect
        } else if accuracy >= GREAT_THRESHOLD {
            ScoreBand::Great
        } else if accuracy >= CLOSE_THRESHOLD {
            ScoreBand::Close
        } else {
            ScoreBand::WayOff
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Perfect => "Perfect! You read this matchup exactly.",
            ScoreBand::Great => "Great guess! Very close to the simulated result.",
            ScoreBand::Close => "Close! You were in the right neighbourhood.",
            ScoreBand::WayOff => "Way off! The simulation saw this battle very differently.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub actual_win_rate: f64,
    pub guessed_win_rate: f64,
    pub accuracy: f64,
    pub score: u32,
    pub band: ScoreBand,
    pub message: String,
}

/// Guesses must be finite and inside [0, 1]; nothing is clamped.
pub fn validate_guess(guessed: f64) -> Result<f64> {
    if !guessed.is_finite() || !(0.0..=1.0).contains(&guessed) {
        return Err(EngineError::InvalidGuess(format!(
            "guessed win rate must be between 0 and 1, got {guessed}"
        )));
    }
    Ok(guessed)
}

pub fn accuracy(actual: f64, guessed: f64) -> f64 {
    let raw = (1.0 - (actual - guessed).abs()).clamp(0.0, 1.0);
    snap(raw)
}

fn snap(value: f64) -> f64 {
    (value * ACCURACY_SNAP).round() / ACCURACY_SNAP
}

fn round_half_up(value: f64) -> u32 {
    (snap(value) + 0.5).floor() as u32
}

pub fn score(actual: f64, guessed: f64) -> Result<ScoreResult> {
    let guessed = validate_guess(guessed)?;
    let accuracy = accuracy(actual, guessed);
    let score = round_half_up(accuracy * f64::from(MAX_SCORE)).min(MAX_SCORE);
    let band = ScoreBand::for_accuracy(accuracy);
    Ok(ScoreResult {
        actual_win_rate: actual,
        guessed_win_rate: guessed,
        accuracy,
        score,
        band,
        message: band.message().to_string(),
    })
}
