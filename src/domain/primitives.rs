//! Domain primitives: identifiers and playing positions.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                $name(id)
            }

            pub fn as_u32(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Upstream player (element) id.
    PlayerId
);
numeric_id!(
    /// Fantasy manager (entry) id.
    ManagerId
);
numeric_id!(
    /// Real-world club id.
    TeamId
);
numeric_id!(
    /// Fixture id.
    FixtureId
);
numeric_id!(
    /// Head-to-head league id.
    LeagueId
);
numeric_id!(
    /// Round (gameweek) number.
    RoundId
);

/// Playing position of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    /// Goalkeeper.
    Gkp,
    /// Defender.
    Def,
    /// Midfielder.
    Mid,
    /// Forward.
    Fwd,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::Gkp, Position::Def, Position::Mid, Position::Fwd];

    /// Map the upstream `element_type` code (1..=4).
    pub fn from_element_type(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Gkp),
            2 => Some(Position::Def),
            3 => Some(Position::Mid),
            4 => Some(Position::Fwd),
            _ => None,
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::Gkp)
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Position::Gkp => 0,
            Position::Def => 1,
            Position::Mid => 2,
            Position::Fwd => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Gkp => write!(f, "GKP"),
            Position::Def => write!(f, "DEF"),
            Position::Mid => write!(f, "MID"),
            Position::Fwd => write!(f, "FWD"),
        }
    }
}
