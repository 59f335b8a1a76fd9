//! Shared enums used by both the DB-facing and API-facing model types.

mod role;
mod status;

pub use role::Role;
pub use status::ElectionStatus;
