use std::collections::HashMap;

use mongodb::{bson::doc, Client};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::AuthToken,
        voters::{VoteReceipt, VoteStatus, VoterDetails, VoterList},
    },
    db::{
        election::Election,
        user::User,
        vote::{NewVote, Vote},
    },
    mongodb::{is_duplicate_key_error, Coll, Id},
};

use super::elections::election_by_id;

pub fn routes() -> Vec<Route> {
    routes![cast_vote, my_vote_status, election_voters]
}

/// The ballot a voter submits: just the chosen candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BallotSpec {
    candidate_id: Id,
}

/// Cast a vote.
///
/// Correctness under concurrent requests rests on the unique
/// `(voter_id, election_id)` index: the ledger insert and the counter `$inc`
/// run in one transaction, and a duplicate-key failure on the insert is the
/// one and only signal that this voter has already voted. There is no
/// "has voted" pre-check to race against.
#[post("/elections/<election_id>/vote", data = "<ballot>", format = "json")]
async fn cast_vote(
    token: AuthToken,
    election_id: Id,
    ballot: Json<BallotSpec>,
    elections: Coll<Election>,
    votes: Coll<NewVote>,
    db_client: &State<Client>,
) -> Result<Json<VoteReceipt>> {
    let election = election_by_id(election_id, &elections).await?;
    let candidate_id = ballot.candidate_id;
    election.check_vote(candidate_id)?;

    let vote = NewVote::new(token.id(), election_id, candidate_id);
    let cast_at = vote.cast_at;

    // Record the ledger entry and bump the counter atomically, so no reader
    // ever sees a vote without its increment.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    if let Err(err) = votes.insert_one_with_session(&vote, None, &mut session).await {
        session.abort_transaction().await?;
        return Err(if is_duplicate_key_error(&err) {
            Error::AlreadyVoted
        } else {
            err.into()
        });
    }

    // `$inc` at the storage layer, never read-modify-write: near-simultaneous
    // votes for the same candidate from different voters must not lose updates.
    let result = elections
        .update_one_with_session(
            doc! { "_id": *election_id, "candidates._id": *candidate_id },
            doc! { "$inc": { "candidates.$.votes": 1 } },
            None,
            &mut session,
        )
        .await?;
    assert_eq!(result.modified_count, 1);

    session.commit_transaction().await?;

    Ok(Json(VoteReceipt {
        message: "Vote recorded".to_string(),
        voted_at: cast_at,
    }))
}

/// Tell the voter whether they have voted, and when. Never which candidate.
#[get("/elections/<election_id>/my-vote")]
async fn my_vote_status(
    token: AuthToken,
    election_id: Id,
    elections: Coll<Election>,
    votes: Coll<Vote>,
) -> Result<Json<VoteStatus>> {
    // 404 before reporting a status for a non-existent election.
    let _ = election_by_id(election_id, &elections).await?;

    let filter = doc! { "voter_id": *token.id(), "election_id": *election_id };
    let status = match votes.find_one(filter, None).await? {
        Some(vote) => VoteStatus::voted(&vote),
        None => VoteStatus::not_voted(),
    };
    Ok(Json(status))
}

/// Admin audit view: who voted in this election, without candidate choices.
#[get("/elections/<election_id>/voters")]
async fn election_voters(
    token: AuthToken,
    election_id: Id,
    elections: Coll<Election>,
    votes: Coll<Vote>,
    users: Coll<User>,
) -> Result<Json<VoterList>> {
    token.require_admin()?;

    let _ = election_by_id(election_id, &elections).await?;

    let ledger: Vec<Vote> = votes
        .find(doc! { "election_id": *election_id }, None)
        .await?
        .try_collect()
        .await?;

    let voter_ids: Vec<_> = ledger.iter().map(|vote| *vote.voter_id).collect();
    let voters_by_id: HashMap<Id, User> = users
        .find(doc! { "_id": { "$in": voter_ids } }, None)
        .await?
        .map_ok(|user| (user.id, user))
        .try_collect()
        .await?;

    let voters = ledger
        .iter()
        .filter_map(|vote| {
            voters_by_id
                .get(&vote.voter_id)
                .map(|user| VoterDetails::new(user, vote))
        })
        .collect();

    Ok(Json(VoterList {
        total_votes: ledger.len() as u64,
        voters,
    }))
}
