//! REST API module.
//!
//! One resource per entity (`/api/boards`, `/api/lines`, `/api/cards`), all
//! exposing the same six operations: create, read-one, read-many with
//! criteria query, full update, partial update and delete.

mod boards;
mod cards;
mod lines;

pub use boards::*;
pub use cards::*;
pub use lines::*;

use crate::errors::AppError;

/// Header carrying the total row count on list responses.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Validate the identifier of a PUT/PATCH body against the path.
fn validate_update_id(path_id: i64, payload_id: Option<i64>, entity: &str) -> Result<(), AppError> {
    match payload_id {
        None => Err(AppError::BadRequest(format!(
            "An updated {} must carry its ID",
            entity
        ))),
        Some(id) if id != path_id => Err(AppError::BadRequest(format!(
            "{} ID {} does not match the path",
            entity, id
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_update_id() {
        assert!(validate_update_id(5, Some(5), "board").is_ok());
        assert!(validate_update_id(5, Some(6), "board").is_err());
        assert!(validate_update_id(5, None, "board").is_err());
    }
}
