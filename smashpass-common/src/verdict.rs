//! Verdict enumeration and its CSV tokens

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A character's decision about one catalog entity
///
/// `Undecided` doubles as the value read for any pair with no stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Verdict {
    #[default]
    Undecided,
    Smash,
    Pass,
}

impl Verdict {
    /// All verdicts in declaration order
    pub const ALL: [Verdict; 3] = [Verdict::Undecided, Verdict::Smash, Verdict::Pass];

    /// Token written to and read from CSV cells
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Undecided => "Undecided",
            Verdict::Smash => "Smash",
            Verdict::Pass => "Pass",
        }
    }

    /// Result of pressing the `candidate` button while `self` is shown
    ///
    /// Pressing the active button clears it back to `Undecided`.
    pub fn toggled(self, candidate: Verdict) -> Verdict {
        if self == candidate {
            Verdict::Undecided
        } else {
            candidate
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    /// Exact, case-sensitive match on the three tokens
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Undecided" => Ok(Verdict::Undecided),
            "Smash" => Ok(Verdict::Smash),
            "Pass" => Ok(Verdict::Pass),
            other => Err(other.to_string()),
        }
    }
}
