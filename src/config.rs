use chrono::Duration;
use mongodb::{bson::doc, Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    common::Role,
    db::user::{NewUser, User},
    mongodb::{ensure_indexes_exist, Coll},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth tokens in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // non-secrets
    superadmin_email: String,
    // secrets
    db_uri: String,
    superadmin_password: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the unique indexes and the bootstrap superadmin exist, and
/// places both a `Client` and a `Database` into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(&config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name());

        // The vote ledger's unique index is the voting-integrity guarantee;
        // refuse to launch without it.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to set up database indexes: {e}");
            return Err(rocket);
        }

        // Make sure role escalation is bootstrappable.
        if let Err(e) = ensure_superadmin_exists(&Coll::from_db(&db), &config).await {
            error!("Failed to seed superadmin account: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Insert the configured superadmin account if no superadmin exists yet.
async fn ensure_superadmin_exists(
    users: &Coll<NewUser>,
    config: &DbConfig,
) -> Result<(), mongodb::error::Error> {
    let filter = doc! { "role": Role::Superadmin };
    let existing = users.clone_with_type::<User>().find_one(filter, None).await?;
    if existing.is_none() {
        warn!(
            "No superadmin found, seeding {} from config",
            config.superadmin_email
        );
        let superadmin = NewUser::new(
            "Superadmin".to_string(),
            config.superadmin_email.trim().to_lowercase(),
            &config.superadmin_password,
            Role::Superadmin,
        );
        users.insert_one(superadmin, None).await?;
    }
    Ok(())
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
fn get_database_name() -> String {
    "campus_vote".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}

/// Example config for tests.
#[cfg(test)]
impl Config {
    pub fn example() -> Self {
        Self {
            auth_ttl: 86400,
            jwt_secret: "test-jwt-secret".to_string(),
        }
    }

    pub fn example_other_secret() -> Self {
        Self {
            auth_ttl: 86400,
            jwt_secret: "a-different-secret".to_string(),
        }
    }
}
