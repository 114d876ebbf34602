use serde::{Deserialize, Serialize};

pub type PlayerId = u32;

/// Player data supplied by the roster collaborator.
///
/// Ratings are a snapshot: nothing in the engine writes to them. Everything
/// that changes during a game lives on `GamePlayer` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub ratings: PlayerRatings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    OL,
    DL,
    LB,
    CB,
    S,
    K,
    P,
}

impl Position {
    /// Positions every roster must carry at least one of.
    pub const REQUIRED: [Position; 10] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::OL,
        Position::DL,
        Position::LB,
        Position::CB,
        Position::S,
        Position::K,
        Position::P,
    ];
}

/// Rating snapshot on a 0-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerRatings {
    pub ovr: u8,
    pub speed: u8,
    pub strength: u8,
    pub elusiveness: u8,
    pub throw_accuracy: u8,
    pub throw_power: u8,
    pub catching: u8,
    pub route_running: u8,
    pub run_blocking: u8,
    pub pass_blocking: u8,
    pub pass_rushing: u8,
    pub run_stopping: u8,
    pub tackling: u8,
    pub coverage: u8,
    pub kick_accuracy: u8,
    pub kick_power: u8,
    pub punting: u8,
}

impl Default for PlayerRatings {
    fn default() -> Self {
        Self::uniform(50)
    }
}

impl PlayerRatings {
    /// Every attribute set to `value`.
    pub fn uniform(value: u8) -> Self {
        Self {
            ovr: value,
            speed: value,
            strength: value,
            elusiveness: value,
            throw_accuracy: value,
            throw_power: value,
            catching: value,
            route_running: value,
            run_blocking: value,
            pass_blocking: value,
            pass_rushing: value,
            run_stopping: value,
            tackling: value,
            coverage: value,
            kick_accuracy: value,
            kick_power: value,
            punting: value,
        }
    }

    /// Rating used when weighting this player for a role.
    pub fn for_role(&self, role: Role) -> u8 {
        let avg = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
        match role {
            Role::BallCarrier => avg(self.elusiveness, self.speed),
            Role::Receiver => avg(self.route_running, self.catching),
            Role::Passer => avg(self.throw_accuracy, self.throw_power),
            Role::RunBlocker => self.run_blocking,
            Role::PassBlocker => self.pass_blocking,
            Role::PassRusher => self.pass_rushing,
            Role::RunStopper => self.run_stopping,
            Role::Tackler => self.tackling,
            Role::Coverage => self.coverage,
            Role::Kicker => avg(self.kick_accuracy, self.kick_power),
            Role::Punter => self.punting,
        }
    }
}

/// What a player is being picked to do on a given play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    BallCarrier,
    Receiver,
    Passer,
    RunBlocker,
    PassBlocker,
    PassRusher,
    RunStopper,
    Tackler,
    Coverage,
    Kicker,
    Punter,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::BallCarrier => "ball carrier",
            Role::Receiver => "receiver",
            Role::Passer => "passer",
            Role::RunBlocker => "run blocker",
            Role::PassBlocker => "pass blocker",
            Role::PassRusher => "pass rusher",
            Role::RunStopper => "run stopper",
            Role::Tackler => "tackler",
            Role::Coverage => "coverage",
            Role::Kicker => "kicker",
            Role::Punter => "punter",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InjuryState {
    #[default]
    Healthy,
    /// Out for the rest of this game. `severe` marks injuries that carry
    /// over into future games via `games_out`.
    Injured { games_out: u16, severe: bool },
}

impl InjuryState {
    pub fn is_injured(&self) -> bool {
        matches!(self, InjuryState::Injured { .. })
    }
}
