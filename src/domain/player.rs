//! Players and the immutable pool an optimization request runs against.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{GameId, PlayerId, TeamId};
use crate::error::SettingsError;

/// Roster position of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DST,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QB => "QB",
            Self::RB => "RB",
            Self::WR => "WR",
            Self::TE => "TE",
            Self::K => "K",
            Self::DST => "DST",
        }
    }

    /// Pass catchers that count toward a QB stack.
    pub fn is_pass_catcher(&self) -> bool {
        matches!(self, Self::WR | Self::TE)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored player as supplied by the upstream player-pool service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub opponent: TeamId,
    /// Explicit game id; derived from team and opponent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameId>,
    pub position: Position,
    pub salary: u32,
    pub objective_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling_score: Option<f64>,
    pub ownership_fraction: f64,
}

impl Player {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        team: impl Into<TeamId>,
        opponent: impl Into<TeamId>,
        position: Position,
        salary: u32,
        objective_score: f64,
        ownership_fraction: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team: team.into(),
            opponent: opponent.into(),
            game: None,
            position,
            salary,
            objective_score,
            ceiling_score: None,
            ownership_fraction,
        }
    }

    #[must_use]
    pub fn with_ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling_score = Some(ceiling);
        self
    }

    #[must_use]
    pub fn with_game(mut self, game: impl Into<GameId>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn game_id(&self) -> GameId {
        self.game
            .clone()
            .unwrap_or_else(|| GameId::from_matchup(&self.team, &self.opponent))
    }

    /// Projected points per salary unit; used to rank captain candidates.
    pub fn value(&self) -> f64 {
        if self.salary == 0 {
            return 0.0;
        }
        self.objective_score / f64::from(self.salary)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |reason: &str| SettingsError::InvalidPlayer {
            id: self.id.to_string(),
            reason: reason.to_string(),
        };

        if self.id.as_str().is_empty() {
            return Err(invalid("id cannot be empty"));
        }
        if self.salary == 0 {
            return Err(invalid("salary must be positive"));
        }
        if !self.objective_score.is_finite() {
            return Err(invalid("objective score must be finite"));
        }
        if self.ceiling_score.is_some_and(|c| !c.is_finite()) {
            return Err(invalid("ceiling score must be finite"));
        }
        if !(0.0..=1.0).contains(&self.ownership_fraction) {
            return Err(invalid("ownership fraction must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Immutable, id-ordered snapshot of the players available to one request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PlayerPool {
    players: Vec<Player>,
}

impl PlayerPool {
    /// Build a pool, validating every player and rejecting duplicate ids.
    ///
    /// Players are stored sorted by id so that every downstream model is
    /// built in the same order for the same input.
    pub fn new(mut players: Vec<Player>) -> Result<Self, SettingsError> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            player.validate()?;
            if !seen.insert(player.id.clone()) {
                return Err(SettingsError::DuplicatePlayer {
                    id: player.id.to_string(),
                });
            }
        }
        players.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Self { players })
    }

    /// Parse a JSON array of players.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let players: Vec<Player> = serde_json::from_str(json)?;
        Ok(Self::new(players)?)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn index_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.binary_search_by(|p| p.id.cmp(id)).ok()
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.index_of(id).map(|i| &self.players[i])
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.index_of(id).is_some()
    }

    /// Distinct teams in the pool, sorted.
    pub fn teams(&self) -> Vec<TeamId> {
        let mut teams: Vec<TeamId> = self.players.iter().map(|p| p.team.clone()).collect();
        teams.sort();
        teams.dedup();
        teams
    }

    /// Distinct games in the pool, sorted.
    pub fn games(&self) -> Vec<GameId> {
        let mut games: Vec<GameId> = self.players.iter().map(Player::game_id).collect();
        games.sort();
        games.dedup();
        games
    }
}

impl<'de> Deserialize<'de> for PlayerPool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let players = Vec::<Player>::deserialize(deserializer)?;
        PlayerPool::new(players).map_err(serde::de::Error::custom)
    }
}
