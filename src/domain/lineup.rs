//! Lineups produced by the optimizer.

use serde::{Deserialize, Serialize};

use super::ids::{PlayerId, TeamId};
use super::player::{Player, Position};
use super::roster::{captain_salary, RosterSlot, CAPTAIN_MULTIPLIER};

/// One filled roster slot. Salary and score already carry the captain multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub slot: String,
    pub player_id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub salary: u32,
    pub score: f64,
    pub ownership: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub captain: bool,
}

impl LineupSlot {
    pub fn new(slot: &RosterSlot, player: &Player) -> Self {
        let (salary, score) = if slot.captain {
            (
                captain_salary(player.salary),
                player.objective_score * CAPTAIN_MULTIPLIER,
            )
        } else {
            (player.salary, player.objective_score)
        };

        Self {
            slot: slot.name.clone(),
            player_id: player.id.clone(),
            name: player.name.clone(),
            team: player.team.clone(),
            position: player.position,
            salary,
            score,
            ownership: player.ownership_fraction,
            captain: slot.captain,
        }
    }
}

/// Identity of a lineup for duplicate detection: its player set plus captain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineupKey {
    players: Vec<PlayerId>,
    captain: Option<PlayerId>,
}

/// A complete, immutable lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub slots: Vec<LineupSlot>,
    pub total_salary: u32,
    /// Projected points, captain at 1.5x.
    pub total_score: f64,
    /// Strategy-weighted objective the solver maximized.
    pub objective: f64,
    pub avg_ownership: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captain_id: Option<PlayerId>,
}

impl Lineup {
    /// Build a lineup from filled slots, deriving its totals.
    pub fn new(slots: Vec<LineupSlot>, objective: f64) -> Self {
        let total_salary = slots.iter().map(|s| s.salary).sum();
        let total_score = slots.iter().map(|s| s.score).sum();
        let avg_ownership = if slots.is_empty() {
            0.0
        } else {
            slots.iter().map(|s| s.ownership).sum::<f64>() / slots.len() as f64
        };
        let captain_id = slots
            .iter()
            .find(|s| s.captain)
            .map(|s| s.player_id.clone());

        Self {
            slots,
            total_salary,
            total_score,
            objective,
            avg_ownership,
            captain_id,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.slots.iter().map(|s| &s.player_id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.slots.iter().any(|s| &s.player_id == id)
    }

    pub fn slot(&self, name: &str) -> Option<&LineupSlot> {
        self.slots.iter().find(|s| s.slot == name)
    }

    pub fn key(&self) -> LineupKey {
        let mut players: Vec<PlayerId> = self.player_ids().cloned().collect();
        players.sort();
        LineupKey {
            players,
            captain: self.captain_id.clone(),
        }
    }
}
