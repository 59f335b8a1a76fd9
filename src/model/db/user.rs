use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{common::Role, mongodb::Id};

/// Core user data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    pub full_name: String,
    /// Lowercased and trimmed; unique across the collection.
    pub email: String,
    /// Argon2 encoded hash. Never serialised into API responses.
    pub password_hash: String,
    pub role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl UserCore {
    /// Create a new user with the given plaintext password and role.
    pub fn new(full_name: String, email: String, password: &str, role: Role) -> Self {
        let salt: [u8; 16] = rand::thread_rng().gen();
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
                .unwrap(); // Infallible with the default config.
        Self {
            full_name,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // Unwrap safe because the only way to create a UserCore is via
        // `new`, so the hash is always well-formed.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap()
    }
}

/// A user without an ID.
pub type NewUser = UserCore;

/// A user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub user: UserCore,
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.user
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl UserCore {
        pub fn example() -> Self {
            Self::new(
                "Alex Park".to_string(),
                "alex.park@campus.example".to_string(),
                "correct horse battery staple",
                Role::Voter,
            )
        }
    }

    impl User {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                user: UserCore::example(),
            }
        }
    }
}
