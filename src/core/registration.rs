use std::collections::BTreeMap;

use crate::core::error::MatchError;
use crate::core::matcher::{require_role, Matchmaker};
use crate::models::{Ages, Principal, RecipientApplication, RecipientRecord, Role};
use crate::services::StoreError;

/// Check an application before anything is written
///
/// The number of ages must equal the number of children. An empty service
/// area accepts every zip code.
pub fn validate_application(application: &RecipientApplication, service_area: &[String]) -> Result<(), MatchError> {
    if application.address.trim().is_empty() {
        return Err(MatchError::Validation("address is required".to_string()));
    }

    if application.kid_count == 0 {
        return Err(MatchError::Validation("at least one child is required".to_string()));
    }

    if application.ages.len() != application.kid_count as usize {
        return Err(MatchError::Validation(format!(
            "{} ages given for {} children",
            application.ages.len(),
            application.kid_count
        )));
    }

    let zip = application.zip_code.trim();
    if !service_area.is_empty() && !service_area.iter().any(|allowed| allowed == zip) {
        return Err(MatchError::Validation(format!(
            "zip code {} is outside the service area ({})",
            zip,
            service_area.join(", ")
        )));
    }

    Ok(())
}

impl Matchmaker {
    /// Submit a family's application; it starts out pending review
    pub async fn register_recipient(
        &self,
        principal: &Principal,
        application: RecipientApplication,
    ) -> Result<RecipientRecord, MatchError> {
        require_role(principal, Role::Recipient)?;
        validate_application(&application, self.service_area())?;

        let record = RecipientRecord {
            id: principal.id.clone(),
            address: application.address.trim().to_string(),
            zip_code: application.zip_code.trim().to_string(),
            kid_count: application.kid_count,
            ages: Ages::Parsed(application.ages),
            gender: application.gender,
            approved: false,
            claimed_by: None,
            claimed_at: None,
            wishlists: None,
            documents: BTreeMap::new(),
            created_at: Some(chrono::Utc::now()),
        };

        match self.store().insert_recipient(record.clone()).await {
            Ok(()) => {}
            Err(StoreError::PreconditionFailed(_)) => {
                return Err(MatchError::AlreadyRegistered(principal.id.clone()))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Registered recipient {} with {} children, awaiting approval",
            record.id,
            record.kid_count
        );
        Ok(record)
    }

    /// The caller's own application and matching state
    pub async fn own_record(&self, principal: &Principal) -> Result<RecipientRecord, MatchError> {
        require_role(principal, Role::Recipient)?;
        Ok(self.store().get_by_id(&principal.id).await?)
    }

    /// Record where an uploaded eligibility document lives
    pub async fn attach_document(
        &self,
        principal: &Principal,
        label: &str,
        reference: &str,
    ) -> Result<RecipientRecord, MatchError> {
        require_role(principal, Role::Recipient)?;

        let label = label.trim();
        if label.is_empty() || reference.trim().is_empty() {
            return Err(MatchError::Validation(
                "document label and reference are required".to_string(),
            ));
        }

        self.store()
            .set_document(&principal.id, label, reference.trim())
            .await?;
        tracing::info!("Recipient {} attached document '{}'", principal.id, label);

        Ok(self.store().get_by_id(&principal.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn application(kid_count: u32, ages: Vec<u32>, zip: &str) -> RecipientApplication {
        RecipientApplication {
            address: "42 Ford Rd".to_string(),
            zip_code: zip.to_string(),
            kid_count,
            ages,
            gender: Gender::Female,
        }
    }

    #[test]
    fn test_valid_application() {
        let area = vec!["48187".to_string(), "48188".to_string()];
        assert!(validate_application(&application(2, vec![4, 6], "48188"), &area).is_ok());
    }

    #[test]
    fn test_age_count_must_match_children() {
        let area = vec![];
        assert!(matches!(
            validate_application(&application(2, vec![4], "48188"), &area),
            Err(MatchError::Validation(_))
        ));
        assert!(validate_application(&application(0, vec![], "48188"), &area).is_err());
    }

    #[test]
    fn test_zip_outside_service_area() {
        let area = vec!["48187".to_string()];
        assert!(validate_application(&application(1, vec![4], "90210"), &area).is_err());
        assert!(validate_application(&application(1, vec![4], " 48187 "), &area).is_ok());
    }
}
