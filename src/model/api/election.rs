use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    api::id::ApiId,
    common::ElectionStatus,
    db::election::{Candidate, Election, NewElection},
};

/// An election specification as submitted by an admin.
#[derive(Debug, Deserialize)]
pub struct ElectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Candidate names; trimmed, with blank entries dropped.
    pub candidates: Vec<String>,
    #[serde(default)]
    pub status: ElectionStatus,
}

impl TryFrom<ElectionSpec> for NewElection {
    type Error = Error;

    fn try_from(spec: ElectionSpec) -> Result<Self, Self::Error> {
        let title = spec.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("Election title must not be empty".to_string()));
        }

        let candidates: Vec<Candidate> = spec
            .candidates
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| Candidate::new(name.to_string()))
            .collect();
        if candidates.is_empty() {
            return Err(Error::Validation(
                "An election needs at least one candidate".to_string(),
            ));
        }

        Ok(NewElection::new(
            title,
            spec.description.trim().to_string(),
            spec.status,
            candidates,
        ))
    }
}

/// Body of `PATCH /elections/<id>/status`.
///
/// Deserialisation already rejects anything outside the three legal states;
/// any transition between them is allowed.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ElectionStatus,
}

/// An API-friendly description of an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDescription {
    pub id: ApiId,
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    pub candidates: Vec<CandidateDescription>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: ApiId,
    pub name: String,
    pub votes: u64,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.name,
            votes: candidate.votes,
        }
    }
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        Self {
            id: election.id.into(),
            title: election.election.title,
            description: election.election.description,
            status: election.election.status,
            candidates: election
                .election
                .candidates
                .into_iter()
                .map(Into::into)
                .collect(),
            created_at: election.election.created_at,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_spec_converts() {
        let election: NewElection = ElectionSpec::example().try_into().unwrap();
        assert_eq!(election.title, "Student Union President");
        assert_eq!(election.status, ElectionStatus::Upcoming);
        assert_eq!(election.candidates.len(), 2);
        assert!(election.candidates.iter().all(|c| c.votes == 0));
    }

    #[test]
    fn empty_title_rejected() {
        let spec = ElectionSpec {
            title: "   ".to_string(),
            ..ElectionSpec::example()
        };
        assert!(matches!(
            NewElection::try_from(spec),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn blank_candidates_dropped_then_rejected_if_none_left() {
        let spec = ElectionSpec {
            candidates: vec!["  ".to_string(), String::new()],
            ..ElectionSpec::example()
        };
        assert!(matches!(
            NewElection::try_from(spec),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn candidate_names_trimmed() {
        let spec = ElectionSpec {
            candidates: vec!["  Sam Okafor ".to_string(), "".to_string()],
            ..ElectionSpec::example()
        };
        let election = NewElection::try_from(spec).unwrap();
        assert_eq!(election.candidates.len(), 1);
        assert_eq!(election.candidates[0].name, "Sam Okafor");
    }

    #[test]
    fn status_defaults_to_upcoming() {
        let spec: ElectionSpec =
            serde_json::from_str(r#"{"title": "T", "candidates": ["A"]}"#).unwrap();
        assert_eq!(spec.status, ElectionStatus::Upcoming);
    }

    #[test]
    fn description_round_trips_through_json() {
        let description = ElectionDescription::from(Election::example());
        let json = serde_json::to_string(&description).unwrap();
        let parsed: ElectionDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, description);
    }

    #[test]
    fn unknown_status_rejected() {
        let result: Result<StatusUpdate, _> =
            serde_json::from_str(r#"{"status": "cancelled"}"#);
        assert!(result.is_err());
    }
}
