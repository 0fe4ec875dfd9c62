use thiserror::Error;

use crate::backend::Status;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No matching keychain item")]
    NotFound,

    #[error("Stored payload is not valid UTF-8 text")]
    MalformedPayload,

    #[error("Failed to encode payload: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    #[error("Failed to decode payload: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    #[error("Unhandled keychain error: {0}")]
    UnhandledStoreError(Status),
}

impl StoreError {
    /// Classify a failed lookup: not-found is expected, anything else is opaque.
    pub fn from_lookup(status: Status) -> Self {
        if status == Status::ITEM_NOT_FOUND {
            StoreError::NotFound
        } else {
            StoreError::UnhandledStoreError(status)
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
