//! The mongodb crate doesn't provide error code constants.
//! This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a duplicate key write error.
///
/// Inside a transaction the server reports the violation as a command error
/// rather than a write error, so both shapes are checked.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(ref e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{doc, from_document};
    use mongodb::error::{CommandError, WriteError};

    use super::*;

    // The server-reported error structs are `#[non_exhaustive]`, so build
    // them from their wire representation like the driver does.
    fn write_error(code: i32) -> DbError {
        let inner: WriteError = from_document(doc! {
            "code": code,
            "codeName": "DuplicateKey",
            "errmsg": "E11000 duplicate key error collection: test.votes",
        })
        .unwrap();
        ErrorKind::Write(WriteFailure::WriteError(inner)).into()
    }

    fn command_error(code: i32) -> DbError {
        let inner: CommandError = from_document(doc! {
            "code": code,
            "codeName": "DuplicateKey",
            "errmsg": "E11000 duplicate key error collection: test.votes",
        })
        .unwrap();
        ErrorKind::Command(inner).into()
    }

    #[test]
    fn detects_plain_write_errors() {
        assert!(is_duplicate_key_error(&write_error(DUPLICATE_KEY)));
    }

    #[test]
    fn detects_command_errors_from_transactions() {
        assert!(is_duplicate_key_error(&command_error(DUPLICATE_KEY)));
    }

    #[test]
    fn ignores_other_error_codes() {
        // 121 = DocumentValidationFailure, 112 = WriteConflict.
        assert!(!is_duplicate_key_error(&write_error(121)));
        assert!(!is_duplicate_key_error(&command_error(112)));
    }
}
