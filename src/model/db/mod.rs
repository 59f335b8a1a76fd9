//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way:
//! snake_case field names, IDs and datetimes in MongoDB's own formats.

pub mod election;
pub mod user;
pub mod vote;

pub use election::{Candidate, Election, NewElection};
pub use user::{NewUser, User};
pub use vote::{NewVote, Vote};
