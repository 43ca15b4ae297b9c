//! Strategy-mode scoring transform.
//!
//! Maps a player and a [`StrategyMode`] to the scalar weight the lineup
//! model maximizes. The transform is total: it never fails, and a missing
//! ceiling projection falls back to the objective score.

use serde::{Deserialize, Serialize};

use crate::domain::{Player, StrategyMode};

/// Ownership-leverage discount coefficients, in score points per unit of
/// ownership fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageConfig {
    /// Balanced mode discount.
    #[serde(default = "default_balanced")]
    pub balanced: f64,

    /// Contrarian mode discount.
    #[serde(default = "default_contrarian")]
    pub contrarian: f64,

    /// Tournament mode discount, applied to the ceiling projection.
    #[serde(default = "default_tournament")]
    pub tournament: f64,
}

fn default_balanced() -> f64 {
    10.0
}

fn default_contrarian() -> f64 {
    25.0
}

fn default_tournament() -> f64 {
    15.0
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            balanced: default_balanced(),
            contrarian: default_contrarian(),
            tournament: default_tournament(),
        }
    }
}

impl LeverageConfig {
    /// Discount coefficient applied to ownership under `mode`.
    pub fn lambda(&self, mode: StrategyMode) -> f64 {
        match mode {
            StrategyMode::Chalk => 0.0,
            StrategyMode::Balanced => self.balanced,
            StrategyMode::Contrarian => self.contrarian,
            StrategyMode::Tournament => self.tournament,
        }
    }

    /// Objective weight of `player` under `mode`.
    pub fn objective_weight(&self, player: &Player, mode: StrategyMode) -> f64 {
        let base = match mode {
            StrategyMode::Tournament => player.ceiling_score.unwrap_or(player.objective_score),
            _ => player.objective_score,
        };
        base - self.lambda(mode) * player.ownership_fraction
    }
}
