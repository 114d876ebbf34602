use super::{Player, Position};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// One team's roster for the duration of a single game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub side: Side,
    pub name: String,
    pub abbrev: String,
    #[serde(default = "default_colors")]
    pub colors: [String; 3],
    /// Ordered by the roster collaborator; depth charts fall back to this
    /// order on rating ties.
    pub players: Vec<Player>,
}

fn default_colors() -> [String; 3] {
    ["#000000".to_string(), "#ffffff".to_string(), "#808080".to_string()]
}

/// Starters per position used for team strength and personnel selection.
pub const DEPTH_SLOTS: [(Position, usize); 11] = [
    (Position::QB, 1),
    (Position::RB, 1),
    (Position::WR, 3),
    (Position::TE, 1),
    (Position::OL, 5),
    (Position::DL, 4),
    (Position::LB, 3),
    (Position::CB, 2),
    (Position::S, 2),
    (Position::K, 1),
    (Position::P, 1),
];

impl Team {
    /// Structural checks only; rating values are taken as given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.is_empty() {
            return Err(ConfigError::EmptyRoster { side: self.side });
        }

        for position in Position::REQUIRED {
            if !self.players.iter().any(|p| p.position == position) {
                return Err(ConfigError::MissingPosition { side: self.side, position });
            }
        }

        Ok(())
    }

    /// Team overall: mean `ovr` of the best players filling each depth slot.
    pub fn ovr(&self) -> f32 {
        let mut total = 0u32;
        let mut count = 0u32;

        for (position, slots) in DEPTH_SLOTS {
            let mut ratings: Vec<u8> = self
                .players
                .iter()
                .filter(|p| p.position == position)
                .map(|p| p.ratings.ovr)
                .collect();
            ratings.sort_unstable_by(|a, b| b.cmp(a));
            for ovr in ratings.into_iter().take(slots) {
                total += ovr as u32;
                count += 1;
            }
        }

        if count == 0 {
            0.0
        } else {
            total as f32 / count as f32
        }
    }

    pub fn find_player(&self, id: super::PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}
