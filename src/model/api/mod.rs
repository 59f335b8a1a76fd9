//! API-facing types: request bodies, response shapes, and the auth guard.
//!
//! These serialise with camelCase field names to match the web client's
//! contract; anything sensitive (password hashes, candidate choices in audit
//! views) is structurally absent rather than merely skipped.

pub mod auth;
pub mod election;
pub mod id;
pub mod results;
pub mod user;
pub mod voters;

pub use auth::AuthToken;
pub use id::ApiId;
