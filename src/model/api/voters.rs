use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::Role, db::user::User, db::vote::Vote};

/// Response of `GET /elections/<id>/my-vote`.
///
/// Deliberately carries no candidate reference: the ledger links votes to
/// choices in storage, but no audit view ever exposes that link.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub has_voted: bool,
    pub voted_at: Option<DateTime<Utc>>,
}

impl VoteStatus {
    pub fn voted(vote: &Vote) -> Self {
        Self {
            has_voted: true,
            voted_at: Some(vote.cast_at),
        }
    }

    pub fn not_voted() -> Self {
        Self {
            has_voted: false,
            voted_at: None,
        }
    }
}

/// Response of `GET /elections/<id>/voters`. Admin-only; like
/// [`VoteStatus`], it never includes candidate choices.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterList {
    pub total_votes: u64,
    pub voters: Vec<VoterDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterDetails {
    pub voter_id: ApiId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub voted_at: DateTime<Utc>,
}

impl VoterDetails {
    pub fn new(user: &User, vote: &Vote) -> Self {
        Self {
            voter_id: user.id.into(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            voted_at: vote.cast_at,
        }
    }
}

/// Confirmation returned after a successful `POST /elections/<id>/vote`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub message: String,
    pub voted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Value;

    use crate::model::db::vote::{Vote, VoteCore};
    use crate::model::mongodb::Id;

    fn example_vote() -> Vote {
        Vote {
            id: Id::new(),
            vote: VoteCore::new(Id::new(), Id::new(), Id::new()),
        }
    }

    /// Audit responses must never leak which candidate was chosen,
    /// under any role.
    #[test]
    fn vote_status_hides_candidate() {
        let json = serde_json::to_value(VoteStatus::voted(&example_vote())).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["hasVoted", "votedAt"]);
    }

    #[test]
    fn voter_list_hides_candidate() {
        let vote = example_vote();
        let user = User::example();
        let list = VoterList {
            total_votes: 1,
            voters: vec![VoterDetails::new(&user, &vote)],
        };
        let json = serde_json::to_string(&list).unwrap();
        assert!(!json.contains("candidateId"));
        assert!(!json.contains(&vote.candidate_id.to_string()));

        let voter = &serde_json::from_str::<Value>(&json).unwrap()["voters"][0];
        let keys: Vec<&String> = voter.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["email", "fullName", "role", "votedAt", "voterId"]);
    }

    #[test]
    fn not_voted_has_null_timestamp() {
        let json = serde_json::to_value(VoteStatus::not_voted()).unwrap();
        assert_eq!(json["hasVoted"], Value::Bool(false));
        assert_eq!(json["votedAt"], Value::Null);
    }
}
