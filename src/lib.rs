#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use rocket::{Build, Rocket};

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

/// Construct the server, ready to be ignited and launched.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(LoggerFairing)
}
