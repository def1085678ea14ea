use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DonorPreference, RecipientRecord, Wishlist};

/// Errors raised by a profile store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Persistence boundary for donor preferences and recipient records
///
/// Every write that touches the claim owner is a compare-and-set evaluated by
/// the backend; callers never read-then-write `claimed_by` themselves.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a recipient record, `StoreError::NotFound` if absent.
    async fn get_by_id(&self, id: &str) -> Result<RecipientRecord, StoreError>;

    /// All records that are approved and have no claim owner.
    async fn scan_approved_unclaimed(&self) -> Result<Vec<RecipientRecord>, StoreError>;

    /// All records still waiting for admin review.
    async fn scan_pending(&self) -> Result<Vec<RecipientRecord>, StoreError>;

    /// All records currently claimed by `donor_id`.
    async fn scan_claimed_by(&self, donor_id: &str) -> Result<Vec<RecipientRecord>, StoreError>;

    /// Create a record, `StoreError::PreconditionFailed` if the id is taken.
    async fn insert_recipient(&self, record: RecipientRecord) -> Result<(), StoreError>;

    /// Atomically move `claimed_by` from `expected` to `new`
    ///
    /// Fails with `PreconditionFailed` when the current owner differs from
    /// `expected`. Sets `claimed_at` to now when `new` is some, clears it
    /// otherwise. Returns the updated record.
    async fn conditional_set_claim(
        &self,
        id: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<RecipientRecord, StoreError>;

    /// Store `wishlists` only if the record has none yet. Returns whether it wrote.
    async fn initialize_wishlists(&self, id: &str, wishlists: &[Wishlist]) -> Result<bool, StoreError>;

    /// Replace the record's wishlists wholesale.
    async fn overwrite_wishlists(&self, id: &str, wishlists: &[Wishlist]) -> Result<(), StoreError>;

    /// Mark a pending record approved
    ///
    /// Fails with `PreconditionFailed` when the record is already approved.
    async fn approve_pending(&self, id: &str) -> Result<(), StoreError>;

    /// Remove a record that is still pending review
    ///
    /// Fails with `PreconditionFailed` when the record has been approved in
    /// the meantime; an approved record is never deleted.
    async fn delete_pending(&self, id: &str) -> Result<(), StoreError>;

    /// Record a storage reference for an uploaded proof document.
    async fn set_document(&self, id: &str, label: &str, reference: &str) -> Result<(), StoreError>;

    async fn get_donor_preference(&self, donor_id: &str) -> Result<DonorPreference, StoreError>;

    async fn put_donor_preference(&self, donor_id: &str, preference: &DonorPreference) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
