use std::sync::Arc;

use crate::core::error::MatchError;
use crate::core::filters::filter_eligible;
use crate::core::wishlist::empty_wishlists;
use crate::models::{DonorPreference, Principal, RecipientRecord, Role};
use crate::services::{ProfileStore, StoreError};

/// Result of an eligibility query
#[derive(Debug)]
pub struct EligibilityResult {
    pub recipients: Vec<RecipientRecord>,
    pub total_candidates: usize,
}

/// Reject callers that do not hold `role`
pub(crate) fn require_role(principal: &Principal, role: Role) -> Result<(), MatchError> {
    if principal.role == role {
        Ok(())
    } else {
        Err(MatchError::Forbidden(format!(
            "{:?} account {} cannot perform {:?} operations",
            principal.role, principal.id, role
        )))
    }
}

/// Entry point for every matching, claim, approval and wishlist operation
///
/// The caller's principal is passed into each call; nothing is read from
/// ambient session state. All persistence goes through the profile store.
#[derive(Clone)]
pub struct Matchmaker {
    store: Arc<dyn ProfileStore>,
    service_area: Vec<String>,
}

impl Matchmaker {
    pub fn new(store: Arc<dyn ProfileStore>, service_area: Vec<String>) -> Self {
        Self {
            store,
            service_area,
        }
    }

    pub(crate) fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    pub(crate) fn service_area(&self) -> &[String] {
        &self.service_area
    }

    pub async fn health_check(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Profile store health check failed: {}", e);
                false
            }
        }
    }

    pub async fn set_preference(
        &self,
        principal: &Principal,
        preference: DonorPreference,
    ) -> Result<DonorPreference, MatchError> {
        require_role(principal, Role::Donor)?;
        self.store
            .put_donor_preference(&principal.id, &preference)
            .await?;

        tracing::info!("Updated preferences for donor {}: {:?}", principal.id, preference);
        Ok(preference)
    }

    pub async fn preference(&self, principal: &Principal) -> Result<DonorPreference, MatchError> {
        require_role(principal, Role::Donor)?;
        Ok(self.store.get_donor_preference(&principal.id).await?)
    }

    /// Recipients the calling donor could sponsor under their stored preferences
    pub async fn eligible(&self, principal: &Principal) -> Result<EligibilityResult, MatchError> {
        let preference = self.preference(principal).await?;
        self.eligible_with(principal, &preference).await
    }

    /// Recipients the calling donor could sponsor under `preference`
    pub async fn eligible_with(
        &self,
        principal: &Principal,
        preference: &DonorPreference,
    ) -> Result<EligibilityResult, MatchError> {
        require_role(principal, Role::Donor)?;

        let mut candidates = self.store.scan_approved_unclaimed().await?;
        let scanned = candidates.len();
        candidates.retain(RecipientRecord::is_visible);
        if candidates.len() != scanned {
            tracing::warn!(
                "Profile store returned {} pending or claimed records in the approved scan",
                scanned - candidates.len()
            );
        }

        let total_candidates = candidates.len();
        let recipients = filter_eligible(preference, candidates);

        tracing::info!(
            "Found {} eligible recipients for donor {} (from {} candidates)",
            recipients.len(),
            principal.id,
            total_candidates
        );

        Ok(EligibilityResult {
            recipients,
            total_candidates,
        })
    }

    /// Assign an approved, unclaimed recipient to the calling donor
    ///
    /// The ownership change is a single conditional write: if another donor
    /// (or this one) already holds the record the call fails with
    /// `AlreadyClaimed` and nothing is overwritten. Wishlists are created
    /// empty, one per child, when the family has none yet.
    pub async fn claim(&self, principal: &Principal, recipient_id: &str) -> Result<RecipientRecord, MatchError> {
        require_role(principal, Role::Donor)?;

        let current = self.store.get_by_id(recipient_id).await?;
        if !current.approved {
            return Err(MatchError::NotApproved(recipient_id.to_string()));
        }
        if current.claimed_by.is_some() {
            return Err(MatchError::AlreadyClaimed(recipient_id.to_string()));
        }

        let mut record = match self
            .store
            .conditional_set_claim(recipient_id, None, Some(&principal.id))
            .await
        {
            Ok(record) => record,
            Err(StoreError::PreconditionFailed(_)) => {
                tracing::info!("Donor {} lost claim race for {}", principal.id, recipient_id);
                return Err(MatchError::AlreadyClaimed(recipient_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if record.wishlists.is_none() {
            let empty = empty_wishlists(record.kid_count);
            if self.store.initialize_wishlists(recipient_id, &empty).await? {
                record.wishlists = Some(empty);
            } else {
                record = self.store.get_by_id(recipient_id).await?;
            }
        }

        tracing::info!("Donor {} claimed recipient {}", principal.id, recipient_id);
        Ok(record)
    }

    /// Give a claimed recipient back to the pool
    ///
    /// Only the current claimant may release, under the same conditional
    /// write discipline as `claim`.
    pub async fn release(&self, principal: &Principal, recipient_id: &str) -> Result<RecipientRecord, MatchError> {
        require_role(principal, Role::Donor)?;

        match self
            .store
            .conditional_set_claim(recipient_id, Some(&principal.id), None)
            .await
        {
            Ok(record) => {
                tracing::info!("Donor {} released recipient {}", principal.id, recipient_id);
                Ok(record)
            }
            Err(StoreError::PreconditionFailed(_)) => Err(MatchError::NotClaimant {
                recipient_id: recipient_id.to_string(),
                donor_id: principal.id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Recipients currently held by the calling donor
    pub async fn claimed(&self, principal: &Principal) -> Result<Vec<RecipientRecord>, MatchError> {
        require_role(principal, Role::Donor)?;
        let claimed = self.store.scan_claimed_by(&principal.id).await?;
        tracing::debug!("Donor {} holds {} recipients", principal.id, claimed.len());
        Ok(claimed)
    }
}
