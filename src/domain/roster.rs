//! Contest roster shapes.
//!
//! A contest structure is an ordered list of slot groups. Identical slots
//! (the two RB slots of a classic roster, the five FLEX slots of a showdown
//! roster) share a group with a count, which is how the lineup model sees
//! them. [`ContestStructure::slots`] expands groups back into the ordered,
//! individually named slots a lineup is reported with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::player::Position;

/// Salary and scoring multiplier applied to the showdown captain.
pub const CAPTAIN_MULTIPLIER: f64 = 1.5;

/// Captain salary: 1.5x the listed salary, rounded up to a whole unit.
pub fn captain_salary(salary: u32) -> u32 {
    let scaled = (u64::from(salary) * 3).div_ceil(2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

const FLEX_POSITIONS: &[Position] = &[Position::RB, Position::WR, Position::TE];

/// A group of interchangeable roster slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGroup {
    pub name: &'static str,
    pub count: usize,
    pub eligible: &'static [Position],
    pub captain: bool,
}

impl SlotGroup {
    pub fn accepts(&self, position: Position) -> bool {
        self.eligible.contains(&position)
    }
}

const CLASSIC_GROUPS: &[SlotGroup] = &[
    SlotGroup { name: "QB", count: 1, eligible: &[Position::QB], captain: false },
    SlotGroup { name: "RB", count: 2, eligible: &[Position::RB], captain: false },
    SlotGroup { name: "WR", count: 3, eligible: &[Position::WR], captain: false },
    SlotGroup { name: "TE", count: 1, eligible: &[Position::TE], captain: false },
    SlotGroup { name: "FLEX", count: 1, eligible: FLEX_POSITIONS, captain: false },
    SlotGroup { name: "DST", count: 1, eligible: &[Position::DST], captain: false },
];

const SHOWDOWN_GROUPS: &[SlotGroup] = &[
    SlotGroup { name: "CPT", count: 1, eligible: &Position::ALL, captain: true },
    SlotGroup { name: "FLEX", count: 5, eligible: &Position::ALL, captain: false },
];

/// A single named roster slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlot {
    pub name: String,
    pub eligible: Vec<Position>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub captain: bool,
}

impl RosterSlot {
    pub fn accepts(&self, position: Position) -> bool {
        self.eligible.contains(&position)
    }
}

/// Contest roster structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStructure {
    /// Nine-slot main slate: QB, RB x2, WR x3, TE, FLEX, DST.
    #[default]
    #[serde(alias = "main")]
    Classic,
    /// Six-slot single game: CPT plus five FLEX, any position.
    Showdown,
}

impl ContestStructure {
    pub fn groups(&self) -> &'static [SlotGroup] {
        match self {
            Self::Classic => CLASSIC_GROUPS,
            Self::Showdown => SHOWDOWN_GROUPS,
        }
    }

    pub fn is_showdown(&self) -> bool {
        matches!(self, Self::Showdown)
    }

    pub fn slot_count(&self) -> usize {
        self.groups().iter().map(|g| g.count).sum()
    }

    /// Ordered slots with multi-count groups numbered (`RB1`, `RB2`, ...).
    pub fn slots(&self) -> Vec<RosterSlot> {
        let mut slots = Vec::with_capacity(self.slot_count());
        for group in self.groups() {
            for i in 0..group.count {
                let name = if group.count == 1 {
                    group.name.to_string()
                } else {
                    format!("{}{}", group.name, i + 1)
                };
                slots.push(RosterSlot {
                    name,
                    eligible: group.eligible.to_vec(),
                    captain: group.captain,
                });
            }
        }
        slots
    }

    /// Minimum number of players of `position` any valid roster must hold.
    pub fn required_of(&self, position: Position) -> usize {
        self.groups()
            .iter()
            .filter(|g| g.eligible == [position])
            .map(|g| g.count)
            .sum()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Showdown => "showdown",
        }
    }
}

impl fmt::Display for ContestStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContestStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" | "main" => Ok(Self::Classic),
            "showdown" => Ok(Self::Showdown),
            other => Err(format!("unknown contest structure '{other}'")),
        }
    }
}
