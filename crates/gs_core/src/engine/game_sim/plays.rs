//! Play resolution: kickoffs, scrimmage plays, kicks and tries.
//!
//! Every outcome is a draw against a rating-weighted probability that passes
//! through [`probability::roll`]. Yardage comes from normal distributions
//! centred on the rating edge between the two units involved.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::selection::{
    Personnel, DEFENSE_UNIT, KICKER_UNIT, OFFENSE_UNIT, PUNTER_UNIT, RETURN_UNIT,
};
use super::{Drive, GameEngine, Restart};
use crate::engine::probability::{self, adjust};
use crate::error::InternalError;
use crate::models::{EventKind, GameEvent, PlayerId, Position, Role, Side};

/// Longest field goal a team will attempt.
pub const MAX_FIELD_GOAL_YARDS: i32 = 55;
/// Line of scrimmage to goalposts, added to the distance to the goal line.
pub const FIELD_GOAL_OFFSET: i32 = 17;
pub const KICKOFF_TOUCHBACK_SPOT: i32 = 25;
pub const PUNT_TOUCHBACK_SPOT: i32 = 20;
/// Deficits, after the touchdown, at which a final-period try goes for two.
pub const TWO_POINT_DEFICITS: [i64; 3] = [2, 5, 10];

const PENALTY_RATE: f64 = 0.05;
const FUMBLE_RATE: f64 = 0.011;
/// Reference kicker rating for kick success curves.
const KICKER_BASELINE: f64 = 72.0;

const OFFENSIVE_PENALTIES: [(&str, i32); 4] = [
    ("False start", 5),
    ("Holding", 10),
    ("Illegal formation", 5),
    ("Delay of game", 5),
];

const DEFENSIVE_PENALTIES: [(&str, i32); 4] = [
    ("Offside", 5),
    ("Defensive holding", 5),
    ("Pass interference", 15),
    ("Roughing the passer", 15),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FourthDownCall {
    FieldGoal,
    GoForIt,
    Punt,
}

/// Fourth-down decision.
///
/// A side trailing by more than a field goal late in the final period
/// always goes for it. Otherwise: kick when in range, go for it on
/// 4th-and-short past midfield, punt.
pub fn fourth_down_call(ball_on: i32, to_go: i32, trailing_by: i64, late_in_final: bool) -> FourthDownCall {
    if late_in_final && trailing_by > 3 {
        return FourthDownCall::GoForIt;
    }
    if 100 - ball_on + FIELD_GOAL_OFFSET <= MAX_FIELD_GOAL_YARDS {
        return FourthDownCall::FieldGoal;
    }
    if ball_on > 50 && to_go <= 2 {
        return FourthDownCall::GoForIt;
    }
    FourthDownCall::Punt
}

/// Two-point decision; `trailing_by` is measured after the touchdown.
pub fn go_for_two(trailing_by: i64, final_period: bool) -> bool {
    final_period && TWO_POINT_DEFICITS.contains(&trailing_by)
}

/// A ball carrier's gain or loss on a scrimmage snap.
struct Carry {
    kind: EventKind,
    carrier: PlayerId,
    passer: Option<PlayerId>,
    tackler: Option<PlayerId>,
    yards: i32,
    intensity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CarryEnd {
    Gain,
    Touchdown,
    Safety,
}

impl Carry {
    fn participants(&self, end: CarryEnd) -> Vec<PlayerId> {
        let mut ids = vec![self.carrier];
        ids.extend(self.passer);
        if end != CarryEnd::Touchdown {
            ids.extend(self.tackler);
        }
        ids
    }
}

impl GameEngine {
    pub(super) fn scrimmage(&mut self) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();
        let off = self.select_personnel(offense, &OFFENSE_UNIT);
        let def = self.select_personnel(defense, &DEFENSE_UNIT);

        if probability::roll(&mut self.rng, "penalty", PENALTY_RATE)? {
            return self.penalty(&off, &def);
        }

        if self.drive.down == 4 {
            let trailing_by = self.score[defense.index()] as i64 - self.score[offense.index()] as i64;
            let late = self.is_final_period() && self.clock <= 120;
            match fourth_down_call(self.drive.ball_on, self.drive.to_go, trailing_by, late) {
                FourthDownCall::FieldGoal => return self.field_goal(),
                FourthDownCall::Punt => return self.punt(),
                FourthDownCall::GoForIt => {}
            }
        }

        match self.drive.down {
            3 => self.team_stats[offense.index()].third_down_att += 1,
            4 => self.team_stats[offense.index()].fourth_down_att += 1,
            _ => {}
        }

        let pass_p = self.pass_probability();
        if probability::roll(&mut self.rng, "play call", pass_p)? {
            self.pass_play(&off, &def)
        } else {
            self.run_play(&off, &def)
        }
    }

    fn pass_probability(&self) -> f64 {
        let drive = self.drive;
        let mut p = if drive.to_go >= 8 {
            0.70
        } else if drive.to_go <= 2 {
            0.38
        } else {
            0.55
        };

        if self.is_final_period() && self.clock <= 300 {
            let offense = drive.offense.index();
            let margin = self.score[offense] as i64 - self.score[1 - offense] as i64;
            if margin < 0 {
                p = 0.80;
            } else if margin > 0 {
                p = 0.30;
            }
        }
        p
    }

    fn run_play(&mut self, off: &Personnel, def: &Personnel) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();

        let carriers =
            off.weighted(&[(Position::RB, 1.0), (Position::QB, 0.12), (Position::WR, 0.06)]);
        let carrier = self.pick(offense, &carriers, Role::BallCarrier)?;

        let blocking =
            self.unit_strength(offense, &off.at(&[Position::OL, Position::TE]), Role::RunBlocker);
        let running = self.player_strength(offense, carrier, Role::BallCarrier);
        let stopping = self.unit_strength(defense, &def.ids(), Role::RunStopper);
        let edge = (blocking + running) / 2.0 / stopping - 1.0;

        let mut yards = self.gauss(4.2 + 10.0 * edge, 4.5);
        if probability::roll(&mut self.rng, "breakaway run", adjust(0.025, edge, 3.0))? {
            yards += self.gauss(22.0, 12.0).abs();
        }
        let yards = (yards.round() as i32).max(-6);
        let tackler = Some(self.pick(defense, &def.uniform(), Role::Tackler)?);

        let carry =
            Carry { kind: EventKind::Rush, carrier, passer: None, tackler, yards, intensity: 1.0 };
        self.resolve_carry(carry, off, def, edge)
    }

    fn pass_play(&mut self, off: &Personnel, def: &Personnel) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();

        let passer = self.pick(offense, &off.weighted(&[(Position::QB, 1.0)]), Role::Passer)?;

        let protection = self.unit_strength(
            offense,
            &off.at(&[Position::OL, Position::TE, Position::RB]),
            Role::PassBlocker,
        );
        let rush =
            self.unit_strength(defense, &def.at(&[Position::DL, Position::LB]), Role::PassRusher);
        let rush_edge = rush / protection - 1.0;

        if probability::roll(&mut self.rng, "sack", adjust(0.065, rush_edge, 3.0))? {
            let rushers = def.weighted(&[(Position::DL, 1.0), (Position::LB, 0.5)]);
            let rusher = Some(self.pick(defense, &rushers, Role::PassRusher)?);
            let loss = self.gauss(7.0, 3.0).round().clamp(1.0, 15.0) as i32;
            let carry = Carry {
                kind: EventKind::Sack,
                carrier: passer,
                passer: None,
                tackler: rusher,
                yards: -loss,
                intensity: 1.3,
            };
            return self.resolve_carry(carry, off, def, -rush_edge);
        }

        let targets = off.weighted(&[(Position::WR, 1.0), (Position::TE, 0.6), (Position::RB, 0.4)]);
        let receiver = self.pick(offense, &targets, Role::Receiver)?;

        let coverage = self.unit_strength(
            defense,
            &def.at(&[Position::CB, Position::S, Position::LB]),
            Role::Coverage,
        );
        let passing = (self.player_strength(offense, passer, Role::Passer)
            + self.player_strength(offense, receiver, Role::Receiver))
            / 2.0;
        let edge = passing / coverage - 1.0;

        if probability::roll(&mut self.rng, "interception", adjust(0.025, -edge, 3.0))? {
            return self.interception(passer, receiver, off, def);
        }

        if probability::roll(&mut self.rng, "completion", adjust(0.62, edge, 3.0))? {
            let mut yards = self.gauss(7.0 + 8.0 * edge, 6.0) + self.gauss(4.0, 3.0).max(0.0);
            if probability::roll(&mut self.rng, "big play", adjust(0.05, edge, 3.0))? {
                yards += self.gauss(25.0, 10.0).abs();
            }
            let yards = (yards.round() as i32).max(-3);
            let tacklers = def.weighted(&[
                (Position::CB, 1.0),
                (Position::S, 1.0),
                (Position::LB, 0.8),
                (Position::DL, 0.2),
            ]);
            let tackler = Some(self.pick(defense, &tacklers, Role::Tackler)?);
            let carry = Carry {
                kind: EventKind::PassComplete,
                carrier: receiver,
                passer: Some(passer),
                tackler,
                yards,
                intensity: 0.8,
            };
            return self.resolve_carry(carry, off, def, edge);
        }

        self.incomplete(passer, receiver, off, def)
    }

    fn incomplete(
        &mut self,
        passer: PlayerId,
        receiver: PlayerId,
        off: &Personnel,
        def: &Personnel,
    ) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();
        let at = self.now();

        let defender = if probability::roll(&mut self.rng, "pass defended", 0.35)? {
            let cover = def.weighted(&[(Position::CB, 1.0), (Position::S, 0.7), (Position::LB, 0.4)]);
            Some(self.pick(defense, &cover, Role::Coverage)?)
        } else {
            None
        };

        self.credit(passer, |s| s.pass_att += 1);
        self.credit(receiver, |s| s.targets += 1);
        if let Some(id) = defender {
            self.credit(id, |s| s.passes_defended += 1);
        }

        let mut participants = vec![passer, receiver];
        participants.extend(defender);

        let text = self.describe(|| match defender {
            Some(id) => format!(
                "{} pass incomplete to {}, broken up by {}",
                self.name(passer),
                self.name(receiver),
                self.name(id)
            ),
            None => format!("{} pass incomplete to {}", self.name(passer), self.name(receiver)),
        });
        self.push(
            GameEvent::new(EventKind::PassIncomplete, offense, at)
                .with_yards(0)
                .with_participants(participants.clone())
                .with_description(text),
        );

        self.finish_snap(offense, off, def, false);
        self.advance_chains(0);
        self.check_injuries(&participants, 0.6)
    }

    fn resolve_carry(
        &mut self,
        carry: Carry,
        off: &Personnel,
        def: &Personnel,
        edge: f64,
    ) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();
        let at = self.now();
        let ball_on = self.drive.ball_on;
        let snap_down = self.drive.down;

        if ball_on + carry.yards >= 100 {
            let yards = 100 - ball_on;
            self.credit_carry(&carry, yards, CarryEnd::Touchdown);
            let participants = carry.participants(CarryEnd::Touchdown);
            let text = self.carry_text(&carry, yards, CarryEnd::Touchdown);
            self.push(
                GameEvent::touchdown(carry.kind, offense, at, yards)
                    .with_participants(participants.clone())
                    .with_description(text),
            );
            self.award(offense, 6);
            if yards >= self.drive.to_go {
                self.team_stats[offense.index()].first_downs += 1;
                self.convert(offense, snap_down);
            }
            self.next = Restart::Try { side: offense };
            self.finish_snap(offense, off, def, false);
            return self.check_injuries(&participants, carry.intensity);
        }

        if ball_on + carry.yards <= 0 {
            let yards = -ball_on;
            self.credit_carry(&carry, yards, CarryEnd::Safety);
            let participants = carry.participants(CarryEnd::Safety);
            let text = self.carry_text(&carry, yards, CarryEnd::Safety);
            self.push(
                GameEvent::safety(carry.kind, offense, at, yards)
                    .with_participants(participants.clone())
                    .with_description(text),
            );
            self.award(defense, 2);
            self.team_stats[offense.index()].safeties_allowed += 1;
            self.next = Restart::FreeKick { kicking: offense };
            self.finish_snap(offense, off, def, false);
            return self.check_injuries(&participants, carry.intensity);
        }

        let yards = carry.yards;
        self.credit_carry(&carry, yards, CarryEnd::Gain);
        let participants = carry.participants(CarryEnd::Gain);
        let text = self.carry_text(&carry, yards, CarryEnd::Gain);
        self.push(
            GameEvent::new(carry.kind, offense, at)
                .with_yards(yards)
                .with_participants(participants.clone())
                .with_description(text),
        );
        self.finish_snap(offense, off, def, true);

        if probability::roll(&mut self.rng, "fumble", adjust(FUMBLE_RATE, -edge, 2.0))? {
            let lost = probability::roll(&mut self.rng, "fumble lost", 0.5)?;
            self.fumble(carry.carrier, carry.tackler, ball_on + yards, lost, def)?;
            if lost {
                return self.check_injuries(&participants, carry.intensity);
            }
        }

        self.advance_chains(yards);
        self.check_injuries(&participants, carry.intensity)
    }

    fn credit_carry(&mut self, carry: &Carry, yards: i32, end: CarryEnd) {
        let td = u32::from(end == CarryEnd::Touchdown);
        match carry.kind {
            EventKind::Rush => self.credit(carry.carrier, |s| {
                s.rush_att += 1;
                s.rush_yds += yards;
                s.rush_long = s.rush_long.max(yards);
                s.rush_td += td;
            }),
            EventKind::PassComplete => {
                if let Some(passer) = carry.passer {
                    self.credit(passer, |s| {
                        s.pass_att += 1;
                        s.pass_cmp += 1;
                        s.pass_yds += yards;
                        s.pass_td += td;
                    });
                }
                self.credit(carry.carrier, |s| {
                    s.targets += 1;
                    s.receptions += 1;
                    s.rec_yds += yards;
                    s.rec_long = s.rec_long.max(yards);
                    s.rec_td += td;
                });
            }
            EventKind::Sack => {
                self.credit(carry.carrier, |s| {
                    s.sacked += 1;
                    s.sack_yds_lost += yards.unsigned_abs();
                });
                if let Some(rusher) = carry.tackler {
                    self.credit(rusher, |s| s.sacks += 1);
                }
            }
            _ => {}
        }

        if end != CarryEnd::Touchdown {
            if let Some(tackler) = carry.tackler {
                self.credit(tackler, |s| s.tackles += 1);
            }
        }
    }

    fn carry_text(&self, carry: &Carry, yards: i32, end: CarryEnd) -> Option<String> {
        self.describe(|| {
            let carrier = self.name(carry.carrier);
            let tackler = carry.tackler.map_or("the defense", |id| self.name(id));
            match (carry.kind, end) {
                (EventKind::Rush, CarryEnd::Touchdown) => {
                    format!("{} {} yd touchdown run", carrier, yards)
                }
                (EventKind::PassComplete, CarryEnd::Touchdown) => format!(
                    "{} {} yd touchdown pass to {}",
                    carry.passer.map_or("Unknown", |id| self.name(id)),
                    yards,
                    carrier
                ),
                (EventKind::Sack, CarryEnd::Safety) => {
                    format!("{} sacked in the end zone by {} for a safety", carrier, tackler)
                }
                (_, CarryEnd::Safety) => {
                    format!("{} tackled in the end zone by {} for a safety", carrier, tackler)
                }
                (EventKind::Sack, _) => {
                    format!("{} sacked by {} for a loss of {} yards", carrier, tackler, -yards)
                }
                (EventKind::PassComplete, _) => format!(
                    "{} pass complete to {} for {} yards",
                    carry.passer.map_or("Unknown", |id| self.name(id)),
                    carrier,
                    yards
                ),
                _ => format!("{} rush for {} yards", carrier, yards),
            }
        })
    }

    /// Fumble at `spot` (offense coordinates). A lost fumble flips the drive.
    fn fumble(
        &mut self,
        carrier: PlayerId,
        forcer: Option<PlayerId>,
        spot: i32,
        lost: bool,
        def: &Personnel,
    ) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();

        let recoverer =
            if lost { Some(self.pick(defense, &def.uniform(), Role::Tackler)?) } else { None };

        self.credit(carrier, |s| {
            s.fumbles += 1;
            s.fumbles_lost += u32::from(lost);
        });
        if let Some(id) = forcer {
            self.credit(id, |s| s.fumbles_forced += 1);
        }
        if let Some(id) = recoverer {
            self.credit(id, |s| s.fumbles_recovered += 1);
        }

        let mut participants = vec![carrier];
        participants.extend(forcer);
        participants.extend(recoverer);

        let text = self.describe(|| match recoverer {
            Some(id) => format!(
                "{} fumbled, recovered by {} of {}",
                self.name(carrier),
                self.name(id),
                self.team_name(defense)
            ),
            None => format!("{} fumbled, recovered by {}", self.name(carrier), self.team_name(offense)),
        });
        self.push(
            GameEvent::new(EventKind::Fumble, offense, self.now())
                .with_participants(participants)
                .with_description(text),
        );

        if lost {
            self.team_stats[offense.index()].turnovers += 1;
            self.drive = Drive::first_and_ten(defense, 100 - spot);
            self.next = Restart::Scrimmage;
        }
        Ok(())
    }

    fn interception(
        &mut self,
        passer: PlayerId,
        receiver: PlayerId,
        off: &Personnel,
        def: &Personnel,
    ) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();
        let at = self.now();

        let cover = def.weighted(&[(Position::CB, 1.0), (Position::S, 1.0), (Position::LB, 0.4)]);
        let defender = self.pick(defense, &cover, Role::Coverage)?;

        self.credit(passer, |s| {
            s.pass_att += 1;
            s.pass_int += 1;
        });
        self.credit(receiver, |s| s.targets += 1);
        self.credit(defender, |s| s.def_int += 1);

        let ball_on = self.drive.ball_on;
        let air = (self.gauss(12.0, 6.0).round() as i32).clamp(1, (99 - ball_on).max(1));
        let caught_at = (100 - (ball_on + air)).max(1);
        let ret = (self.gauss(8.0, 9.0).round() as i32).max(0);

        let text = self.describe(|| {
            format!(
                "{} pass intended for {} intercepted by {}",
                self.name(passer),
                self.name(receiver),
                self.name(defender)
            )
        });
        self.push(
            GameEvent::new(EventKind::Interception, offense, at)
                .with_yards(ret)
                .with_participants(vec![passer, receiver, defender])
                .with_description(text),
        );
        self.team_stats[offense.index()].turnovers += 1;
        self.finish_snap(offense, off, def, false);

        if caught_at + ret >= 100 {
            let yards = 100 - caught_at;
            self.credit(defender, |s| s.def_td += 1);
            let text = self.describe(|| {
                format!("{} {} yd interception return touchdown", self.name(defender), yards)
            });
            self.push(
                GameEvent::touchdown(EventKind::Interception, defense, self.now(), yards)
                    .with_participants(vec![defender])
                    .with_description(text),
            );
            self.award(defense, 6);
            self.next = Restart::Try { side: defense };
        } else {
            self.drive = Drive::first_and_ten(defense, caught_at + ret);
            self.next = Restart::Scrimmage;
        }

        self.check_injuries(&[passer, receiver, defender], 0.9)
    }

    fn penalty(&mut self, off: &Personnel, def: &Personnel) -> Result<(), InternalError> {
        let offense = self.drive.offense;
        let defense = offense.other();
        let at = self.now();

        let on_offense = probability::roll(&mut self.rng, "penalty side", 0.55)?;
        let (name, yards) = if on_offense {
            OFFENSIVE_PENALTIES[self.rng.gen_range(0..OFFENSIVE_PENALTIES.len())]
        } else {
            DEFENSIVE_PENALTIES[self.rng.gen_range(0..DEFENSIVE_PENALTIES.len())]
        };
        let penalized = if on_offense { offense } else { defense };

        // Half the distance to the goal when the full penalty would cross it.
        let ball_on = self.drive.ball_on;
        let enforced = if on_offense { yards.min(ball_on / 2) } else { yards.min((100 - ball_on) / 2) };

        let counters = &mut self.team_stats[penalized.index()];
        counters.penalties += 1;
        counters.penalty_yards += enforced.unsigned_abs();

        let text = self.describe(|| {
            format!("Penalty on {}: {}, {} yards", self.team_name(penalized), name, enforced)
        });
        self.push(GameEvent::new(EventKind::Penalty, penalized, at).with_yards(enforced).with_description(text));

        if on_offense {
            self.drive.ball_on -= enforced;
            self.drive.to_go += enforced;
        } else {
            self.drive.ball_on += enforced;
            if enforced >= self.drive.to_go {
                self.team_stats[offense.index()].first_downs += 1;
                self.drive = Drive::first_and_ten(offense, self.drive.ball_on);
            } else {
                self.drive.to_go -= enforced;
            }
        }

        let secs = self.rng.gen_range(3..=6);
        let used = self.run_clock(secs, offense);
        let mut on_field = off.ids();
        on_field.extend(def.ids());
        self.credit_time(&on_field, used);
        Ok(())
    }

    fn punt(&mut self) -> Result<(), InternalError> {
        let kicking = self.drive.offense;
        let receiving = kicking.other();
        let at = self.now();

        let unit = self.select_personnel(kicking, &PUNTER_UNIT);
        let punter = self.pick(kicking, &unit.uniform(), Role::Punter)?;
        let leg = self.player_strength(kicking, punter, Role::Punter);
        let distance = (self.gauss(40.0 + leg * 0.12, 6.0).round() as i32).clamp(20, 75);

        let ball_on = self.drive.ball_on;
        let to_goal = 100 - ball_on;
        let gross = distance.min(to_goal);
        self.credit(punter, |s| {
            s.punts += 1;
            s.punt_yds += gross;
            s.punt_long = s.punt_long.max(gross);
        });

        if distance >= to_goal {
            let text = self.describe(|| {
                format!("{} punts {} yards, touchback", self.name(punter), gross)
            });
            self.push(
                GameEvent::new(EventKind::Punt, kicking, at)
                    .with_yards(gross)
                    .with_participants(vec![punter])
                    .with_description(text),
            );
            let secs = self.rng.gen_range(6..=10);
            let used = self.run_clock(secs, kicking);
            self.credit_time(&[punter], used);
            self.drive = Drive::first_and_ten(receiving, PUNT_TOUCHBACK_SPOT);
            self.next = Restart::Scrimmage;
            return self.check_injuries(&[punter], 0.3);
        }

        let returners = self.select_personnel(receiving, &RETURN_UNIT);
        let returner = self.pick(receiving, &returners.uniform(), Role::BallCarrier)?;
        let landed = 100 - (ball_on + distance);

        let fair_catch = probability::roll(&mut self.rng, "fair catch", 0.35)?;
        let ret = if fair_catch {
            0
        } else if probability::roll(&mut self.rng, "punt return touchdown", 0.005)? {
            100 - landed
        } else {
            (self.gauss(8.0, 6.0).round() as i32).clamp(0, 99 - landed)
        };

        let mut participants = vec![punter];
        if !fair_catch {
            self.credit(returner, |s| {
                s.punt_returns += 1;
                s.punt_return_yds += ret;
            });
            participants.push(returner);
        }

        let text = self.describe(|| {
            if fair_catch {
                format!("{} punts {} yards, fair catch by {}", self.name(punter), distance, self.name(returner))
            } else {
                format!(
                    "{} punts {} yards, {} returns it {} yards",
                    self.name(punter),
                    distance,
                    self.name(returner),
                    ret
                )
            }
        });
        self.push(
            GameEvent::new(EventKind::Punt, kicking, at)
                .with_yards(distance)
                .with_participants(participants.clone())
                .with_description(text),
        );

        let secs = self.rng.gen_range(8..=14);
        let used = self.run_clock(secs, kicking);
        self.credit_time(&[punter, returner], used);

        if landed + ret >= 100 {
            let text = self.describe(|| {
                format!("{} {} yd punt return touchdown", self.name(returner), ret)
            });
            self.push(
                GameEvent::touchdown(EventKind::Punt, receiving, self.now(), ret)
                    .with_participants(vec![returner])
                    .with_description(text),
            );
            self.award(receiving, 6);
            self.next = Restart::Try { side: receiving };
        } else {
            self.drive = Drive::first_and_ten(receiving, landed + ret);
            self.next = Restart::Scrimmage;
        }

        self.check_injuries(&participants, 1.0)
    }

    fn field_goal(&mut self) -> Result<(), InternalError> {
        let kicking = self.drive.offense;
        let at = self.now();
        let ball_on = self.drive.ball_on;

        let unit = self.select_personnel(kicking, &KICKER_UNIT);
        let kicker = self.pick(kicking, &unit.uniform(), Role::Kicker)?;
        let distance = 100 - ball_on + FIELD_GOAL_OFFSET;

        let base = (0.99 - (distance - 20).max(0) as f64 * 0.012).clamp(0.05, 0.99);
        let edge = self.player_strength(kicking, kicker, Role::Kicker) / KICKER_BASELINE - 1.0;
        let good = probability::roll(&mut self.rng, "field goal", adjust(base, edge, 2.0))?;

        self.credit(kicker, |s| {
            s.fg_att += 1;
            if good {
                s.fg_made += 1;
                s.fg_long = s.fg_long.max(distance);
            }
        });

        let text = self.describe(|| {
            let result = if good { "is good" } else { "is no good" };
            format!("{} {} yd field goal {}", self.name(kicker), distance, result)
        });
        self.push(
            GameEvent::field_goal(kicking, at, distance, good)
                .with_participants(vec![kicker])
                .with_description(text),
        );

        if good {
            self.award(kicking, 3);
            self.next = Restart::Kickoff { kicking };
        } else {
            // Defense takes over at the spot of the kick, never inside its 20.
            self.drive = Drive::first_and_ten(kicking.other(), (107 - ball_on).max(20));
            self.next = Restart::Scrimmage;
        }

        let secs = self.rng.gen_range(4..=7);
        let used = self.run_clock(secs, kicking);
        self.credit_time(&[kicker], used);
        self.check_injuries(&[kicker], 0.2)
    }

    /// Untimed conversion attempt after a touchdown.
    pub(super) fn attempt_try(&mut self, side: Side) -> Result<(), InternalError> {
        let at = self.now();
        let trailing_by = self.score[side.other().index()] as i64 - self.score[side.index()] as i64;

        let involved = if go_for_two(trailing_by, self.is_final_period()) {
            let off = self.select_personnel(side, &OFFENSE_UNIT);
            let def = self.select_personnel(side.other(), &DEFENSE_UNIT);
            let options = off.weighted(&[(Position::RB, 1.0), (Position::WR, 0.8), (Position::TE, 0.6)]);
            let player = self.pick(side, &options, Role::BallCarrier)?;
            let edge = self.player_strength(side, player, Role::BallCarrier)
                / self.unit_strength(side.other(), &def.ids(), Role::RunStopper)
                - 1.0;
            let good = probability::roll(&mut self.rng, "two-point conversion", adjust(0.48, edge, 2.0))?;

            self.credit(player, |s| {
                s.two_pt_att += 1;
                s.two_pt_made += u32::from(good);
            });
            let text = self.describe(|| {
                let result = if good { "good" } else { "failed" };
                format!("{} two-point conversion {}", self.name(player), result)
            });
            self.push(
                GameEvent::two_point(side, at, good)
                    .with_participants(vec![player])
                    .with_description(text),
            );
            if good {
                self.award(side, 2);
            }
            player
        } else {
            let unit = self.select_personnel(side, &KICKER_UNIT);
            let kicker = self.pick(side, &unit.uniform(), Role::Kicker)?;
            let edge = self.player_strength(side, kicker, Role::Kicker) / KICKER_BASELINE - 1.0;
            let good = probability::roll(&mut self.rng, "extra point", adjust(0.94, edge, 2.0))?;

            self.credit(kicker, |s| {
                s.xp_att += 1;
                s.xp_made += u32::from(good);
            });
            let text = self.describe(|| {
                let result = if good { "good" } else { "no good" };
                format!("{} extra point {}", self.name(kicker), result)
            });
            self.push(
                GameEvent::extra_point(side, at, good)
                    .with_participants(vec![kicker])
                    .with_description(text),
            );
            if good {
                self.award(side, 1);
            }
            kicker
        };

        self.next = Restart::Kickoff { kicking: side };
        self.check_injuries(&[involved], 0.2)
    }

    /// Kickoff, or the free kick that follows a safety.
    pub(super) fn kickoff(&mut self, kicking: Side, free_kick: bool) -> Result<(), InternalError> {
        let receiving = kicking.other();
        let at = self.now();

        let unit = self.select_personnel(kicking, &KICKER_UNIT);
        let kicker = self.pick(kicking, &unit.uniform(), Role::Kicker)?;
        let edge = self.player_strength(kicking, kicker, Role::Kicker) / KICKER_BASELINE - 1.0;

        if !free_kick && probability::roll(&mut self.rng, "touchback", adjust(0.6, edge, 1.5))? {
            let text = self.describe(|| format!("{} kicks off, touchback", self.name(kicker)));
            self.push(GameEvent::new(EventKind::Kickoff, kicking, at).with_description(text));
            self.drive = Drive::first_and_ten(receiving, KICKOFF_TOUCHBACK_SPOT);
            self.next = Restart::Scrimmage;
            return Ok(());
        }

        let returners = self.select_personnel(receiving, &RETURN_UNIT);
        let returner = self.pick(receiving, &returners.uniform(), Role::BallCarrier)?;

        let caught_at = if free_kick {
            self.gauss(30.0, 6.0).round().clamp(10.0, 50.0) as i32
        } else {
            self.gauss(2.0, 3.0).round().clamp(0.0, 10.0) as i32
        };
        let ret = if probability::roll(&mut self.rng, "kick return touchdown", 0.004)? {
            100 - caught_at
        } else {
            let mean = if free_kick { 9.0 } else { 22.0 };
            (self.gauss(mean, 7.0).round() as i32).clamp(0, 99 - caught_at)
        };

        self.credit(returner, |s| {
            s.kick_returns += 1;
            s.kick_return_yds += ret;
        });

        let text = self.describe(|| {
            let kind = if free_kick { "free kicks" } else { "kicks off" };
            format!("{} {}, {} returns it {} yards", self.name(kicker), kind, self.name(returner), ret)
        });
        self.push(
            GameEvent::new(EventKind::Kickoff, kicking, at)
                .with_yards(ret)
                .with_participants(vec![returner])
                .with_description(text),
        );

        let secs = self.rng.gen_range(5..=8);
        let used = self.run_clock(secs, receiving);
        self.credit_time(&[kicker, returner], used);

        if caught_at + ret >= 100 {
            let text = self.describe(|| {
                format!("{} {} yd kickoff return touchdown", self.name(returner), ret)
            });
            self.push(
                GameEvent::touchdown(EventKind::Kickoff, receiving, self.now(), ret)
                    .with_participants(vec![returner])
                    .with_description(text),
            );
            self.award(receiving, 6);
            self.next = Restart::Try { side: receiving };
        } else {
            self.drive = Drive::first_and_ten(receiving, caught_at + ret);
            self.next = Restart::Scrimmage;
        }

        self.check_injuries(&[returner], 1.5)
    }

    /// Moves the chains after a non-scoring snap that kept possession.
    fn advance_chains(&mut self, yards: i32) {
        let offense = self.drive.offense;
        let snap_down = self.drive.down;
        self.drive.ball_on += yards;
        self.next = Restart::Scrimmage;

        if yards >= self.drive.to_go {
            self.team_stats[offense.index()].first_downs += 1;
            self.convert(offense, snap_down);
            self.drive = Drive::first_and_ten(offense, self.drive.ball_on);
            return;
        }

        self.drive.to_go -= yards;
        self.drive.down += 1;
        if self.drive.down > 4 {
            let text = self.describe(|| format!("{} turn it over on downs", self.team_name(offense)));
            self.push(
                GameEvent::new(EventKind::TurnoverOnDowns, offense, self.now()).with_description(text),
            );
            self.drive = Drive::first_and_ten(offense.other(), 100 - self.drive.ball_on);
        }
    }

    fn convert(&mut self, offense: Side, snap_down: u8) {
        let counters = &mut self.team_stats[offense.index()];
        match snap_down {
            3 => counters.third_down_conv += 1,
            4 => counters.fourth_down_conv += 1,
            _ => {}
        }
    }

    /// Runs the clock for a scrimmage snap and credits time to both units.
    fn finish_snap(&mut self, offense: Side, off: &Personnel, def: &Personnel, clock_running: bool) {
        let secs = if clock_running {
            self.rng.gen_range(26..=40)
        } else {
            self.rng.gen_range(5..=10)
        };
        let used = self.run_clock(secs, offense);
        let mut on_field = off.ids();
        on_field.extend(def.ids());
        self.credit_time(&on_field, used);
    }

    fn gauss(&mut self, mean: f64, sd: f64) -> f64 {
        match Normal::new(mean, sd) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        }
    }
}
