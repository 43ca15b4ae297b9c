//! Contest, player and lineup types.
//!
//! Everything here is constructed fresh per optimization request and
//! carries no behavior beyond validation and derived totals.

mod ids;
mod lineup;
mod player;
mod portfolio;
mod roster;
mod rules;

pub use ids::{GameId, PlayerId, TeamId};
pub use lineup::{Lineup, LineupKey, LineupSlot};
pub use player::{Player, PlayerPool, Position};
pub use portfolio::{LineupPortfolio, PortfolioStatus, StopReason};
pub use roster::{captain_salary, ContestStructure, RosterSlot, SlotGroup, CAPTAIN_MULTIPLIER};
pub use rules::{ContestRules, StackingRules, StrategyMode, MAX_LINEUPS, MIN_LINEUPS};
