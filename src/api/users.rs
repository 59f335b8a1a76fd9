use mongodb::{
    bson::doc,
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{auth::AuthToken, user::{RoleUpdate, UserSummary}},
    db::user::User,
    mongodb::{Coll, Id},
};

/// Cap on user-search results.
const MAX_USER_RESULTS: i64 = 500;

pub fn routes() -> Vec<Route> {
    routes![get_users, update_user_role]
}

#[get("/users?<q>")]
async fn get_users(
    token: AuthToken,
    q: Option<String>,
    users: Coll<User>,
) -> Result<Json<Vec<UserSummary>>> {
    token.require_admin()?;

    let query = q.as_deref().map(str::trim).unwrap_or_default();
    let filter = if query.is_empty() {
        None
    } else {
        Some(doc! {
            "$or": [
                { "full_name": { "$regex": query, "$options": "i" } },
                { "email": { "$regex": query, "$options": "i" } },
            ],
        })
    };

    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .limit(MAX_USER_RESULTS)
        .build();
    let matches: Vec<User> = users.find(filter, options).await?.try_collect().await?;
    Ok(Json(matches.into_iter().map(Into::into).collect()))
}

#[patch("/users/<user_id>/role", data = "<update>", format = "json")]
async fn update_user_role(
    token: AuthToken,
    user_id: Id,
    update: Json<RoleUpdate>,
    users: Coll<User>,
) -> Result<Json<UserSummary>> {
    token.require_admin()?;

    let new_role = update.role;
    if !token.role().may_assign(new_role) {
        return Err(Error::Forbidden(
            "Only a superadmin may assign the superadmin role".to_string(),
        ));
    }

    let target = users
        .find_one(user_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;
    if !token.role().may_modify(target.role) {
        return Err(Error::Forbidden(
            "Only a superadmin may modify a superadmin".to_string(),
        ));
    }

    users
        .update_one(user_id.as_doc(), doc! { "$set": { "role": new_role } }, None)
        .await?;

    let updated = users
        .find_one(user_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;
    Ok(Json(updated.into()))
}
