use serde::{Deserialize, Serialize};

use crate::models::domain::{Ages, Gender, RecipientRecord, Wishlist};

/// What a donor sees of an unclaimed family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientSummary {
    pub id: String,
    #[serde(rename = "kidCount")]
    pub kid_count: u32,
    pub ages: Ages,
    pub gender: Gender,
}

impl From<RecipientRecord> for RecipientSummary {
    fn from(record: RecipientRecord) -> Self {
        Self {
            id: record.id,
            kid_count: record.kid_count,
            ages: record.ages,
            gender: record.gender,
        }
    }
}

/// Response for the eligible recipients endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleRecipientsResponse {
    pub recipients: Vec<RecipientSummary>,
    pub total_candidates: usize,
}

/// A family held by the calling donor, with their wishlists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedRecipient {
    pub id: String,
    #[serde(rename = "kidCount")]
    pub kid_count: u32,
    pub ages: Ages,
    pub gender: Gender,
    #[serde(rename = "claimedAt")]
    pub claimed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub wishlists: Vec<Wishlist>,
}

impl From<RecipientRecord> for ClaimedRecipient {
    fn from(record: RecipientRecord) -> Self {
        Self {
            id: record.id,
            kid_count: record.kid_count,
            ages: record.ages,
            gender: record.gender,
            claimed_at: record.claimed_at,
            wishlists: record.wishlists.unwrap_or_default(),
        }
    }
}

/// Response for the claimed recipients endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedRecipientsResponse {
    pub recipients: Vec<ClaimedRecipient>,
}

/// Response for the pending applications endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRecipientsResponse {
    pub recipients: Vec<RecipientRecord>,
}

/// Response for wishlist reads and writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistsResponse {
    pub wishlists: Vec<Wishlist>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
