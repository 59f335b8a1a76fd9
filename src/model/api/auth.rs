use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::Status,
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{common::Role, db::user::User, mongodb::Id};

/// A verified caller identity: user ID plus role, as carried in the JWT.
///
/// The role is always taken from the token the server itself signed, never
/// from anything else the client sends. Handlers that mutate elections or
/// read audit data call [`require_admin`](Self::require_admin) /
/// [`require_superadmin`](Self::require_superadmin) before touching storage.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    id: Id,
    role: Role,
}

impl AuthToken {
    /// Create a token for the given user.
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }

    /// The authenticated user's ID.
    pub fn id(&self) -> Id {
        self.id
    }

    /// The authenticated user's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Reject callers that are neither admin nor superadmin.
    pub fn require_admin(&self) -> Result<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden("Admin access only".to_string()))
        }
    }

    /// Reject callers that are not superadmin.
    pub fn require_superadmin(&self) -> Result<()> {
        if self.role == Role::Superadmin {
            Ok(())
        } else {
            Err(Error::Forbidden("Superadmin access only".to_string()))
        }
    }

    /// Sign this token into a compact JWT, expiring after the configured TTL.
    pub fn encode(self, config: &Config) -> String {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .unwrap() // Infallible.
    }

    /// Verify and decode a JWT, rejecting bad signatures and expired tokens.
    pub fn decode(token: &str, config: &Config) -> std::result::Result<Self, JwtError> {
        jsonwebtoken::decode(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data: TokenData<Claims>| data.claims.token)
    }
}

/// JWT claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = ();

    /// Extract and verify the `Authorization: Bearer <jwt>` header.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        // Valid as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let bearer = req
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix("Bearer "));
        match bearer {
            Some(token) => match Self::decode(token, config) {
                Ok(token) => request::Outcome::Success(token),
                Err(_) => request::Outcome::Failure((Status::Unauthorized, ())),
            },
            None => request::Outcome::Failure((Status::Unauthorized, ())),
        }
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::db::user::UserCore;

    #[test]
    fn token_round_trip() {
        let config = Config::example();
        let user = User {
            id: Id::new(),
            user: UserCore::example(),
        };
        let token = AuthToken::new(&user);
        let jwt = AuthToken::new(&user).encode(&config);
        let decoded = AuthToken::decode(&jwt, &config).unwrap();
        assert_eq!(decoded.id(), token.id());
        assert_eq!(decoded.role(), Role::Voter);
    }

    #[test]
    fn wrong_secret_rejected() {
        let config = Config::example();
        let other = Config::example_other_secret();
        let jwt = AuthToken::new(&User::example()).encode(&config);
        assert!(AuthToken::decode(&jwt, &other).is_err());
    }

    #[test]
    fn role_gates() {
        let voter = AuthToken {
            id: Id::new(),
            role: Role::Voter,
        };
        let admin = AuthToken {
            id: Id::new(),
            role: Role::Admin,
        };
        let superadmin = AuthToken {
            id: Id::new(),
            role: Role::Superadmin,
        };
        assert!(voter.require_admin().is_err());
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_superadmin().is_err());
        assert!(superadmin.require_admin().is_ok());
        assert!(superadmin.require_superadmin().is_ok());
    }
}
