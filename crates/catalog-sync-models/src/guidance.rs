use crate::genre::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parental guidance ratings (closed set, exact names)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentalGuidance {
    G,
    PG,
    PG13,
    R,
    NC17,
}

impl ParentalGuidance {
    pub const ALL: [ParentalGuidance; 5] = [
        ParentalGuidance::G,
        ParentalGuidance::PG,
        ParentalGuidance::PG13,
        ParentalGuidance::R,
        ParentalGuidance::NC17,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParentalGuidance::G => "G",
            ParentalGuidance::PG => "PG",
            ParentalGuidance::PG13 => "PG13",
            ParentalGuidance::R => "R",
            ParentalGuidance::NC17 => "NC17",
        }
    }
}

impl fmt::Display for ParentalGuidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentalGuidance {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParentalGuidance::ALL
            .iter()
            .copied()
            .find(|guidance| guidance.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "parental guidance",
                value: s.to_string(),
            })
    }
}
