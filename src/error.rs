use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::common::ElectionStatus;
use crate::model::mongodb::Id;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while serving a request, mapped onto an
/// HTTP status by the `Responder` impl below.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    OidParse(#[from] mongodb::bson::oid::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Voting is not open: election is {0}")]
    VotingClosed(ElectionStatus),
    #[error("Candidate {0} does not belong to this election")]
    InvalidCandidate(Id),
    #[error("This voter has already voted in this election")]
    AlreadyVoted,
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl Error {
    /// Convenience constructor for a 404 naming the missing resource.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match &self {
            Self::Db(_) | Self::Jwt(_) => Status::InternalServerError,
            Self::OidParse(_) | Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::VotingClosed(_) | Self::AlreadyVoted | Self::AlreadyExists(_) => Status::Conflict,
            Self::InvalidCandidate(_) => Status::UnprocessableEntity,
            Self::Forbidden(_) => Status::Forbidden,
            Self::Unauthorized(_) => Status::Unauthorized,
        };
        // Server faults are logged in full for operators; the caller only
        // ever sees the status code.
        if status == Status::InternalServerError {
            error!("{self:?}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}
