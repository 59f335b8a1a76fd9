use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::AuthToken,
        election::{ElectionDescription, ElectionSpec, StatusUpdate},
        results::ElectionResults,
    },
    db::election::{Election, NewElection},
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        get_elections,
        get_election,
        set_election_status,
        get_election_results,
    ]
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    token: AuthToken,
    spec: Json<ElectionSpec>,
    new_elections: Coll<NewElection>,
    elections: Coll<Election>,
) -> Result<Json<ElectionDescription>> {
    token.require_admin()?;

    // Validation happens entirely before any write.
    let election: NewElection = spec.0.try_into()?;
    let new_id: Id = new_elections
        .insert_one(&election, None)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB.
        .into();

    let db_election = elections
        .find_one(new_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {new_id}")))?;
    Ok(Json(db_election.into()))
}

#[get("/elections")]
async fn get_elections(elections: Coll<Election>) -> Result<Json<Vec<ElectionDescription>>> {
    let all: Vec<Election> = elections.find(None, None).await?.try_collect().await?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

#[get("/elections/<election_id>")]
async fn get_election(
    election_id: Id,
    elections: Coll<Election>,
) -> Result<Json<ElectionDescription>> {
    let election = election_by_id(election_id, &elections).await?;
    Ok(Json(election.into()))
}

#[patch("/elections/<election_id>/status", data = "<update>", format = "json")]
async fn set_election_status(
    token: AuthToken,
    election_id: Id,
    update: Json<StatusUpdate>,
    elections: Coll<Election>,
) -> Result<Json<ElectionDescription>> {
    token.require_admin()?;

    // Any state is reachable from any state; reopening a closed election is
    // legal and never invalidates votes already in the ledger.
    let result = elections
        .update_one(
            election_id.as_doc(),
            doc! { "$set": { "status": update.status } },
            None,
        )
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Election {election_id}")));
    }

    let election = election_by_id(election_id, &elections).await?;
    Ok(Json(election.into()))
}

#[get("/elections/<election_id>/results")]
async fn get_election_results(
    election_id: Id,
    elections: Coll<Election>,
) -> Result<Json<ElectionResults>> {
    let election = election_by_id(election_id, &elections).await?;
    Ok(Json(election.into()))
}

/// Fetch an election or 404.
pub async fn election_by_id(election_id: Id, elections: &Coll<Election>) -> Result<Election> {
    elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))
}
