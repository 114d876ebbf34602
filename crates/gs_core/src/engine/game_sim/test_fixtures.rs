//! Test Fixtures Module
//!
//! Roster builders shared by the engine, aggregator, playback and API tests.
//!
//! ## Usage
//! ```ignore
//! #[cfg(test)]
//! use crate::engine::game_sim::test_fixtures::*;
//! ```

use crate::models::{Player, PlayerId, PlayerRatings, Position, Side, Team};

/// Depth chart with backups at every position (40 players).
const FULL_DEPTH: [(Position, usize); 11] = [
    (Position::QB, 2),
    (Position::RB, 3),
    (Position::WR, 5),
    (Position::TE, 2),
    (Position::OL, 8),
    (Position::DL, 6),
    (Position::LB, 5),
    (Position::CB, 4),
    (Position::S, 3),
    (Position::K, 1),
    (Position::P, 1),
];

/// Create a test team with a full depth chart.
///
/// Player ids are `id_base..id_base + 40`. Ratings vary by depth so the
/// starters are distinguishable from the backups.
pub fn create_test_team(side: Side, name: &str, id_base: PlayerId) -> Team {
    build_team(side, name, id_base, &FULL_DEPTH, 70)
}

/// One player per required position and nothing else.
pub fn create_minimal_team(side: Side, name: &str, id_base: PlayerId) -> Team {
    let depth: Vec<(Position, usize)> = Position::REQUIRED.iter().map(|&p| (p, 1)).collect();
    build_team(side, name, id_base, &depth, 70)
}

fn build_team(
    side: Side,
    name: &str,
    id_base: PlayerId,
    depth: &[(Position, usize)],
    overall: u8,
) -> Team {
    let mut players = Vec::new();
    for &(position, count) in depth {
        for rank in 0..count {
            let id = id_base + players.len() as PlayerId;
            let rating = overall.saturating_sub((rank as u8) * 6);
            players.push(Player {
                id,
                name: format!("{} {:?}{}", name, position, rank + 1),
                position,
                ratings: PlayerRatings::uniform(rating),
            });
        }
    }

    Team {
        side,
        name: name.to_string(),
        abbrev: name.chars().take(3).collect::<String>().to_uppercase(),
        colors: ["#112233".to_string(), "#ffffff".to_string(), "#999999".to_string()],
        players,
    }
}
