//! Personnel selection and weighted player draws.

use std::collections::BTreeSet;

use rand::distributions::{Distribution, WeightedIndex};

use super::GameEngine;
use crate::error::InternalError;
use crate::models::{PlayerId, Position, Role, Side};

/// Seconds on the field at which a player's sharpness halves.
pub const FATIGUE_SECS: f64 = 1800.0;

pub const OFFENSE_UNIT: [(Position, usize); 5] = [
    (Position::QB, 1),
    (Position::RB, 1),
    (Position::WR, 3),
    (Position::TE, 1),
    (Position::OL, 5),
];

pub const DEFENSE_UNIT: [(Position, usize); 4] =
    [(Position::DL, 4), (Position::LB, 3), (Position::CB, 2), (Position::S, 2)];

pub const KICKER_UNIT: [(Position, usize); 1] = [(Position::K, 1)];
pub const PUNTER_UNIT: [(Position, usize); 1] = [(Position::P, 1)];
pub const RETURN_UNIT: [(Position, usize); 3] =
    [(Position::WR, 2), (Position::RB, 1), (Position::CB, 1)];

#[inline]
pub fn fatigue(seconds_played: u32) -> f64 {
    1.0 / (1.0 + seconds_played as f64 / FATIGUE_SECS)
}

/// Players on the field for one side on one snap, keyed by the depth slot
/// they fill. A slot may hold a player from another position when the
/// roster has no healthy player left at that position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Personnel {
    slots: Vec<(Position, PlayerId)>,
}

impl Personnel {
    pub fn ids(&self) -> Vec<PlayerId> {
        self.slots.iter().map(|&(_, id)| id).collect()
    }

    pub fn at(&self, positions: &[Position]) -> Vec<PlayerId> {
        self.slots
            .iter()
            .filter(|(slot, _)| positions.contains(slot))
            .map(|&(_, id)| id)
            .collect()
    }

    /// Candidates with a per-slot weight multiplier; unlisted slots are skipped.
    pub fn weighted(&self, weights: &[(Position, f64)]) -> Vec<(PlayerId, f64)> {
        self.slots
            .iter()
            .filter_map(|&(slot, id)| {
                weights.iter().find(|(p, _)| *p == slot).map(|&(_, w)| (id, w))
            })
            .collect()
    }

    /// Every player with the same weight.
    pub fn uniform(&self) -> Vec<(PlayerId, f64)> {
        self.slots.iter().map(|&(_, id)| (id, 1.0)).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl GameEngine {
    /// Best healthy players for each slot of `unit`, ranked by `ovr` scaled
    /// by fatigue. Ties keep roster order.
    pub(super) fn select_personnel(&self, side: Side, unit: &[(Position, usize)]) -> Personnel {
        let mut taken = BTreeSet::new();
        let mut slots = Vec::new();

        for &(position, count) in unit {
            let mut ranked: Vec<_> = self
                .players
                .values()
                .filter(|p| p.side == side && p.is_available() && !taken.contains(&p.id))
                .filter(|p| p.position == position)
                .collect();
            ranked.sort_by(|a, b| {
                b.depth_score().total_cmp(&a.depth_score()).then(a.roster_order.cmp(&b.roster_order))
            });

            let mut filled = 0;
            for player in ranked.into_iter().take(count) {
                taken.insert(player.id);
                slots.push((position, player.id));
                filled += 1;
            }

            // Short at this position: borrow the best healthy player left.
            while filled < count {
                let backup = self
                    .players
                    .values()
                    .filter(|p| p.side == side && p.is_available() && !taken.contains(&p.id))
                    .max_by(|a, b| {
                        a.depth_score()
                            .total_cmp(&b.depth_score())
                            .then(b.roster_order.cmp(&a.roster_order))
                    });
                match backup {
                    Some(player) => {
                        taken.insert(player.id);
                        slots.push((position, player.id));
                        filled += 1;
                    }
                    None => break,
                }
            }
        }

        Personnel { slots }
    }

    /// Weighted draw among `candidates`: slot weight × role rating × fatigue.
    pub(super) fn pick(
        &mut self,
        side: Side,
        candidates: &[(PlayerId, f64)],
        role: Role,
    ) -> Result<PlayerId, InternalError> {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|(id, w)| {
                self.players.get(id).map_or(0.0, |p| {
                    w * (p.ratings.for_role(role) as f64 + 1.0) * fatigue(p.record.seconds_played)
                })
            })
            .collect();

        match WeightedIndex::new(&weights) {
            Ok(dist) => Ok(candidates[dist.sample(&mut self.rng)].0),
            Err(_) => Err(InternalError::NoEligiblePlayer { side, role: role.name() }),
        }
    }

    /// Mean effective role rating of `ids`, scaled by the side's multiplier.
    ///
    /// Fatigue is softened here so a tired unit is weaker without collapsing.
    pub(super) fn unit_strength(&self, side: Side, ids: &[PlayerId], role: Role) -> f64 {
        let ratings: Vec<f64> = ids
            .iter()
            .filter_map(|id| self.players.get(id))
            .map(|p| {
                (p.ratings.for_role(role) as f64 + 1.0)
                    * (0.75 + 0.25 * fatigue(p.record.seconds_played))
            })
            .collect();

        if ratings.is_empty() {
            return 1.0;
        }
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        mean * self.multipliers[side.index()]
    }

    /// Effective rating of a single player for `role`.
    pub(super) fn player_strength(&self, side: Side, id: PlayerId, role: Role) -> f64 {
        self.unit_strength(side, &[id], role)
    }
}
