//! Contest rule set and its up-front validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::player::PlayerPool;
use super::roster::ContestStructure;
use crate::error::SettingsError;

/// Smallest portfolio a request may ask for.
pub const MIN_LINEUPS: usize = 1;
/// Largest portfolio a request may ask for.
pub const MAX_LINEUPS: usize = 20;

/// Trade-off between raw projection and ownership leverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    /// Raw projection, no ownership penalty.
    Chalk,
    /// Mild ownership discount.
    #[default]
    Balanced,
    /// Strong ownership discount.
    Contrarian,
    /// Ceiling projection with an ownership discount.
    Tournament,
}

impl StrategyMode {
    pub const ALL: [StrategyMode; 4] = [
        StrategyMode::Chalk,
        StrategyMode::Balanced,
        StrategyMode::Contrarian,
        StrategyMode::Tournament,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chalk => "chalk",
            Self::Balanced => "balanced",
            Self::Contrarian => "contrarian",
            Self::Tournament => "tournament",
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown strategy mode '{s}'"))
    }
}

/// Correlation requirements for classic lineups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackingRules {
    /// Require at least one WR/TE from the QB's team.
    #[serde(default)]
    pub qb_wr_stack_enabled: bool,
    /// Require at least one player from the QB's opponent.
    #[serde(default)]
    pub bring_back_enabled: bool,
}

impl StackingRules {
    pub fn any(&self) -> bool {
        self.qb_wr_stack_enabled || self.bring_back_enabled
    }
}

/// Salary, structure and rule constraints for one contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestRules {
    #[serde(default)]
    pub structure: ContestStructure,

    #[serde(default = "default_salary_cap")]
    pub salary_cap: u32,

    /// Classic only. `None` leaves team exposure unconstrained.
    #[serde(default)]
    pub max_players_per_team: Option<usize>,

    /// Classic only. `None` leaves game exposure unconstrained.
    #[serde(default)]
    pub max_players_per_game: Option<usize>,

    /// Cap on the lineup's average ownership fraction.
    #[serde(default = "default_max_avg_ownership")]
    pub max_avg_ownership: f64,

    /// Classic only.
    #[serde(default)]
    pub stacking: StackingRules,

    /// Showdown only.
    #[serde(default)]
    pub locked_captain_id: Option<PlayerId>,

    #[serde(default)]
    pub strategy_mode: StrategyMode,
}

fn default_salary_cap() -> u32 {
    50_000
}

fn default_max_avg_ownership() -> f64 {
    1.0
}

impl Default for ContestRules {
    fn default() -> Self {
        Self {
            structure: ContestStructure::default(),
            salary_cap: default_salary_cap(),
            max_players_per_team: None,
            max_players_per_game: None,
            max_avg_ownership: default_max_avg_ownership(),
            stacking: StackingRules::default(),
            locked_captain_id: None,
            strategy_mode: StrategyMode::default(),
        }
    }
}

impl ContestRules {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn showdown() -> Self {
        Self {
            structure: ContestStructure::Showdown,
            ..Self::default()
        }
    }

    /// Team/game caps and stacking only bind on classic slates.
    pub fn team_limit(&self) -> Option<usize> {
        if self.structure.is_showdown() {
            None
        } else {
            self.max_players_per_team
        }
    }

    pub fn game_limit(&self) -> Option<usize> {
        if self.structure.is_showdown() {
            None
        } else {
            self.max_players_per_game
        }
    }

    pub fn stacking_rules(&self) -> StackingRules {
        if self.structure.is_showdown() {
            StackingRules::default()
        } else {
            self.stacking
        }
    }

    /// Lowest per-team cap that still admits the configured stacking.
    pub fn min_team_limit(&self) -> usize {
        if self.stacking.qb_wr_stack_enabled {
            2
        } else {
            1
        }
    }

    /// Lowest per-game cap that still admits the configured stacking.
    pub fn min_game_limit(&self) -> usize {
        1 + usize::from(self.stacking.qb_wr_stack_enabled)
            + usize::from(self.stacking.bring_back_enabled)
    }

    /// Validate the rules for a request against `pool`.
    ///
    /// Runs before any solve; nothing is started when this fails.
    pub fn validate(&self, pool: &PlayerPool, num_lineups: usize) -> Result<(), SettingsError> {
        if self.salary_cap == 0 {
            return Err(SettingsError::NonPositiveSalaryCap);
        }

        if !(MIN_LINEUPS..=MAX_LINEUPS).contains(&num_lineups) {
            return Err(SettingsError::LineupCountOutOfRange {
                requested: num_lineups,
                min: MIN_LINEUPS,
                max: MAX_LINEUPS,
            });
        }

        if !(0.0..=1.0).contains(&self.max_avg_ownership) {
            return Err(SettingsError::OwnershipCapOutOfRange {
                value: self.max_avg_ownership,
            });
        }

        if !self.structure.is_showdown() {
            if let Some(limit) = self.max_players_per_team {
                let required = self.min_team_limit();
                if limit < required {
                    return Err(SettingsError::TeamLimitTooLow { limit, required });
                }
            }
            if let Some(limit) = self.max_players_per_game {
                let required = self.min_game_limit();
                if limit < required {
                    return Err(SettingsError::GameLimitTooLow { limit, required });
                }
            }
        }

        if let Some(id) = &self.locked_captain_id {
            if !self.structure.is_showdown() {
                return Err(SettingsError::LockedCaptainOnClassic);
            }
            // Every position is captain-eligible, so existence is the only check.
            if !pool.contains(id) {
                return Err(SettingsError::UnknownLockedCaptain { id: id.to_string() });
            }
        }

        Ok(())
    }
}
