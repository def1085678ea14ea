use crate::core::error::MatchError;
use crate::core::matcher::{require_role, Matchmaker};
use crate::models::{Principal, RecipientRecord, Role};
use crate::services::StoreError;

/// Review state of a recipient application
///
/// `Pending -> Approved` and `Pending -> Denied` are the only transitions.
/// A denied application is deleted, so `Denied` is never observed on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Pending,
    Approved,
    Denied,
}

impl ApprovalState {
    pub fn of(record: &RecipientRecord) -> Self {
        if record.approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
            ApprovalState::Denied => "denied",
        }
    }

    pub fn can_transition_to(&self, next: ApprovalState) -> bool {
        matches!(
            (self, next),
            (ApprovalState::Pending, ApprovalState::Approved) | (ApprovalState::Pending, ApprovalState::Denied)
        )
    }
}

fn check_transition(record: &RecipientRecord, next: ApprovalState) -> Result<(), MatchError> {
    let current = ApprovalState::of(record);
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(MatchError::InvalidTransition {
            id: record.id.clone(),
            from: current.as_str(),
            to: next.as_str(),
        })
    }
}

/// The record was approved between the read and the conditional write
fn lost_transition(err: StoreError, recipient_id: &str, next: ApprovalState) -> MatchError {
    match err {
        StoreError::PreconditionFailed(_) => MatchError::InvalidTransition {
            id: recipient_id.to_string(),
            from: ApprovalState::Approved.as_str(),
            to: next.as_str(),
        },
        other => other.into(),
    }
}

impl Matchmaker {
    /// Applications waiting for admin review
    pub async fn pending(&self, principal: &Principal) -> Result<Vec<RecipientRecord>, MatchError> {
        require_role(principal, Role::Admin)?;
        let pending = self.store().scan_pending().await?;
        tracing::debug!("{} applications awaiting review", pending.len());
        Ok(pending)
    }

    /// Make a pending recipient visible to donors
    pub async fn approve(&self, principal: &Principal, recipient_id: &str) -> Result<(), MatchError> {
        require_role(principal, Role::Admin)?;
        let record = self.store().get_by_id(recipient_id).await?;
        check_transition(&record, ApprovalState::Approved)?;

        self.store()
            .approve_pending(recipient_id)
            .await
            .map_err(|e| lost_transition(e, recipient_id, ApprovalState::Approved))?;
        tracing::info!("Admin {} approved recipient {}", principal.id, recipient_id);
        Ok(())
    }

    /// Reject a pending application and remove the record
    pub async fn deny(&self, principal: &Principal, recipient_id: &str) -> Result<(), MatchError> {
        require_role(principal, Role::Admin)?;
        let record = self.store().get_by_id(recipient_id).await?;
        check_transition(&record, ApprovalState::Denied)?;

        self.store()
            .delete_pending(recipient_id)
            .await
            .map_err(|e| lost_transition(e, recipient_id, ApprovalState::Denied))?;
        tracing::info!("Admin {} denied recipient {}", principal.id, recipient_id);
        Ok(())
    }
}
