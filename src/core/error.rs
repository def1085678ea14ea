use thiserror::Error;

use crate::services::{IdentityError, StoreError};

/// Errors surfaced by matching, claiming, approval and wishlist operations
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Recipient {0} is already claimed")]
    AlreadyClaimed(String),

    #[error("Recipient {recipient_id} is not claimed by {donor_id}")]
    NotClaimant {
        recipient_id: String,
        donor_id: String,
    },

    #[error("Recipient {0} has not been approved")]
    NotApproved(String),

    #[error("Invalid transition for recipient {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Recipient {0} is already registered")]
    AlreadyRegistered(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Profile store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("Identity provider unavailable: {0}")]
    IdentityUnavailable(IdentityError),
}

impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => MatchError::NotFound(what),
            other => MatchError::StoreUnavailable(other),
        }
    }
}

impl From<IdentityError> for MatchError {
    fn from(err: IdentityError) -> Self {
        MatchError::IdentityUnavailable(err)
    }
}

impl From<validator::ValidationErrors> for MatchError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MatchError::Validation(errors.to_string())
    }
}

impl MatchError {
    /// Short machine-readable code used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::Validation(_) => "validation_failed",
            MatchError::NotFound(_) => "not_found",
            MatchError::AlreadyClaimed(_) => "already_claimed",
            MatchError::NotClaimant { .. } => "not_claimant",
            MatchError::NotApproved(_) => "not_approved",
            MatchError::InvalidTransition { .. } => "invalid_transition",
            MatchError::AlreadyRegistered(_) => "already_registered",
            MatchError::Unauthenticated => "unauthenticated",
            MatchError::Forbidden(_) => "forbidden",
            MatchError::StoreUnavailable(_) => "store_unavailable",
            MatchError::IdentityUnavailable(_) => "identity_unavailable",
        }
    }
}
