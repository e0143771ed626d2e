// src/handlers/mod.rs

use uuid::Uuid;

use crate::error::AppError;

pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod participant;
pub mod question;
pub mod quiz;
pub mod result;

/// Parses a path or query id, reporting `Invalid <entity> ID` on failure.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_garbage() {
        let err = parse_id("abc", "quiz").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid quiz ID"));
        assert!(parse_id("67e55044-10b1-426f-9247-bb680e5fe0c8", "quiz").is_ok());
    }
}
