use mongodb::bson::doc;
use rocket::{serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::{AuthToken, LoginRequest, LoginResponse, RegisterRequest},
        user::UserSummary,
    },
    common::Role,
    db::user::{NewUser, User},
    mongodb::{is_duplicate_key_error, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![register, login, get_me]
}

#[post("/auth/register", data = "<request>", format = "json")]
async fn register(
    request: Json<RegisterRequest>,
    new_users: Coll<NewUser>,
    users: Coll<User>,
) -> Result<Json<UserSummary>> {
    let full_name = request.full_name.trim().to_string();
    let email = request.email.trim().to_lowercase();
    if full_name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(Error::Validation(
            "Full name, email and password are required".to_string(),
        ));
    }

    // New accounts always start as plain voters; roles are only ever granted
    // through the user-management endpoints.
    let user = NewUser::new(full_name, email, &request.password, Role::Voter);

    // Email uniqueness comes from the unique index, not a pre-check.
    let new_id: Id = new_users
        .insert_one(&user, None)
        .await
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                Error::AlreadyExists(format!("A user with email {} exists", user.email))
            } else {
                err.into()
            }
        })?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB.
        .into();

    let db_user = users
        .find_one(new_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {new_id}")))?;
    Ok(Json(db_user.into()))
}

#[post("/auth/login", data = "<credentials>", format = "json")]
async fn login(
    credentials: Json<LoginRequest>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>> {
    let email = credentials.email.trim().to_lowercase();
    let user = users
        .find_one(doc! { "email": &email }, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

    let token = AuthToken::new(&user).encode(config);
    Ok(Json(LoginResponse { token }))
}

#[get("/auth/me")]
async fn get_me(token: AuthToken, users: Coll<User>) -> Result<Json<UserSummary>> {
    let user = users
        .find_one(token.id().as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {}", token.id())))?;
    Ok(Json(user.into()))
}
