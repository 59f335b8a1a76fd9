use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{common::ElectionStatus, mongodb::Id};

/// A candidate embedded in an election, carrying its running vote counter.
///
/// Invariant: `votes` equals the number of ledger entries referencing this
/// candidate within this election after every successful vote. The counter
/// is only ever changed by a storage-level `$inc` gated on a successful
/// ledger insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub votes: u64,
}

impl Candidate {
    /// A fresh candidate with zero votes.
    pub fn new(name: String) -> Self {
        Self {
            id: Id::new(),
            name,
            votes: 0,
        }
    }
}

/// Core election data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    pub candidates: Vec<Candidate>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ElectionCore {
    pub fn new(
        title: String,
        description: String,
        status: ElectionStatus,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self {
            title,
            description,
            status,
            candidates,
            created_at: Utc::now(),
        }
    }

    /// Look up a candidate by ID.
    pub fn candidate(&self, candidate_id: Id) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    /// Sum of all candidate counters.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.votes).sum()
    }

    /// Check the preconditions for voting: the election must be active and
    /// the candidate must belong to it. Checked in this order, before any
    /// write is attempted.
    pub fn check_vote(&self, candidate_id: Id) -> Result<&Candidate> {
        if self.status != ElectionStatus::Active {
            return Err(Error::VotingClosed(self.status));
        }
        self.candidate(candidate_id)
            .ok_or(Error::InvalidCandidate(candidate_id))
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl ElectionCore {
        pub fn example() -> Self {
            Self::new(
                "Student Union President".to_string(),
                "Annual SU presidential election.".to_string(),
                ElectionStatus::Active,
                vec![
                    Candidate::new("Sam Okafor".to_string()),
                    Candidate::new("Priya Nair".to_string()),
                    Candidate::new("Jordan Lee".to_string()),
                ],
            )
        }
    }

    impl Election {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                election: ElectionCore::example(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_lookup() {
        let election = ElectionCore::example();
        let id = election.candidates[1].id;
        assert_eq!(election.candidate(id).unwrap().name, "Priya Nair");
        assert!(election.candidate(Id::new()).is_none());
    }

    #[test]
    fn votes_only_accepted_while_active() {
        let mut election = ElectionCore::example();
        let candidate_id = election.candidates[0].id;

        election.status = ElectionStatus::Upcoming;
        assert!(matches!(
            election.check_vote(candidate_id),
            Err(Error::VotingClosed(ElectionStatus::Upcoming))
        ));

        election.status = ElectionStatus::Closed;
        assert!(matches!(
            election.check_vote(candidate_id),
            Err(Error::VotingClosed(ElectionStatus::Closed))
        ));

        election.status = ElectionStatus::Active;
        assert_eq!(election.check_vote(candidate_id).unwrap().id, candidate_id);
    }

    #[test]
    fn foreign_candidate_rejected() {
        let election = ElectionCore::example();
        let foreign = Id::new();
        assert!(matches!(
            election.check_vote(foreign),
            Err(Error::InvalidCandidate(id)) if id == foreign
        ));
    }

    #[test]
    fn total_votes_sums_counters() {
        let mut election = ElectionCore::example();
        assert_eq!(election.total_votes(), 0);
        election.candidates[0].votes = 3;
        election.candidates[2].votes = 4;
        assert_eq!(election.total_votes(), 7);
    }
}
