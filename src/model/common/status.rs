use std::fmt::{self, Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// States in the election lifecycle.
///
/// Transitions are admin-controlled and deliberately unconstrained: a closed
/// election may be reopened, and votes already cast remain valid regardless
/// of later transitions. Only `Active` accepts votes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Announced but not yet open for voting.
    Upcoming,
    /// Open for voting.
    Active,
    /// Voting has ended.
    Closed,
}

impl Default for ElectionStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Closed => "closed",
        })
    }
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        to_bson(&status).unwrap() // Infallible.
    }
}
