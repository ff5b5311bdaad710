use thiserror::Error;

use crate::domain::{JournalEntryId, ValidationErrors};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Journal entry not found: {0}")]
    JournalEntryNotFound(JournalEntryId),

    #[error("Invalid order by column: {0}")]
    InvalidOrderBy(String),

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
