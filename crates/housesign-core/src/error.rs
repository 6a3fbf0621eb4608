use thiserror::Error;

use crate::fields::MAX_SIGNING_FIELDS;

/// Errors from lifecycle and geometry operations.
///
/// Variants fall into four kinds: validation (`FieldLimitReached`,
/// `MissingRecipient`, `InvalidUpload`), authorization (`NotAuthorized`),
/// state (`AlreadySigned`, `NotSigned`, `RevocationWindowExpired`, the
/// not-found variants) and IO (`Serialization`, `Store`). Operations check
/// every precondition before the first mutation, so a returned error means
/// the document is unchanged.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("signing field not found: {0}")]
    FieldNotFound(String),

    #[error("field is already signed")]
    AlreadySigned,

    #[error("field is not signed")]
    NotSigned,

    #[error("not authorized to perform this action")]
    NotAuthorized,

    #[error("signatures can only be revoked within 5 minutes of signing")]
    RevocationWindowExpired,

    #[error("documents are limited to {max} signing fields", max = MAX_SIGNING_FIELDS)]
    FieldLimitReached,

    #[error("recipient email is required")]
    MissingRecipient,

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("invalid signature image: {0}")]
    InvalidSignatureImage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Store(String),
}
