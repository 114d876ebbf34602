use rand::Rng;
use tracing::debug;

use super::GameEngine;
use crate::engine::probability;
use crate::error::InternalError;
use crate::models::{GameEvent, InjuryState, PlayerId, Side};

/// Share of injuries that keep a player out of future games.
pub const SEVERE_INJURY_SHARE: f64 = 0.25;

/// Minimum games missed for a severe injury.
pub const SEVERE_MIN_GAMES: u16 = 4;

/// Healthy players a side keeps: one full unit, or the whole roster when it
/// is smaller. A side at the floor takes no more injuries.
pub const MIN_HEALTHY: usize = 11;

impl GameEngine {
    /// Injury draw for every player involved in the play just resolved.
    ///
    /// An injured player gets an `Injury` event and is excluded from every
    /// later selection, so nothing after that event credits them.
    pub(super) fn check_injuries(
        &mut self,
        involved: &[PlayerId],
        intensity: f64,
    ) -> Result<(), InternalError> {
        if self.config.base_injury_rate == 0.0 {
            return Ok(());
        }
        let p = (self.config.base_injury_rate * intensity).min(1.0);

        let mut seen: Vec<PlayerId> = Vec::with_capacity(involved.len());
        for &id in involved {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);

            let available = self.players.get(&id).filter(|player| player.is_available());
            let Some(side) = available.map(|player| player.side) else {
                continue;
            };
            if self.at_injury_floor(side) || !probability::roll(&mut self.rng, "injury", p)? {
                continue;
            }

            let severe = probability::roll(&mut self.rng, "injury severity", SEVERE_INJURY_SHARE)?;
            let games_out = if severe {
                self.rng.gen_range(SEVERE_MIN_GAMES..=12)
            } else {
                self.rng.gen_range(0..=3)
            };

            if let Some(player) = self.players.get_mut(&id) {
                player.record.injury = InjuryState::Injured { games_out, severe };
            }

            debug!(
                "{} injured at {} {}s (out {} games, severe: {})",
                self.name(id),
                self.period,
                self.clock,
                games_out,
                severe
            );

            let text = self.describe(|| {
                if games_out == 0 {
                    format!("{} was injured and will not return", self.name(id))
                } else {
                    format!("{} was injured (out {} games)", self.name(id), games_out)
                }
            });
            self.log.append(GameEvent::injury(side, self.now(), id).with_description(text));
        }

        Ok(())
    }

    fn at_injury_floor(&self, side: Side) -> bool {
        let roster = self.teams[side.index()].players.len();
        let healthy = self.players.values().filter(|p| p.side == side && p.is_available()).count();
        healthy <= MIN_HEALTHY.min(roster)
    }
}
