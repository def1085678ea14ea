use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::{DonorPreference, RecipientRecord, Wishlist};
use crate::services::store::{ProfileStore, StoreError};

/// In-process profile store
///
/// Used for local development and tests. Conditional writes run under the
/// write lock, which makes them atomic with respect to every other call.
#[derive(Default)]
pub struct MemoryProfileStore {
    recipients: RwLock<HashMap<String, RecipientRecord>>,
    preferences: RwLock<HashMap<String, DonorPreference>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with recipient records
    pub fn with_recipients(records: impl IntoIterator<Item = RecipientRecord>) -> Self {
        let recipients = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();

        Self {
            recipients: RwLock::new(recipients),
            preferences: RwLock::new(HashMap::new()),
        }
    }

    async fn scan<F>(&self, predicate: F) -> Vec<RecipientRecord>
    where
        F: Fn(&RecipientRecord) -> bool,
    {
        let recipients = self.recipients.read().await;
        let mut records: Vec<RecipientRecord> = recipients
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        // HashMap order is arbitrary; keep scans deterministic
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("recipient {}", id))
}

fn already_approved(id: &str) -> StoreError {
    StoreError::PreconditionFailed(format!("recipient {} is already approved", id))
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_by_id(&self, id: &str) -> Result<RecipientRecord, StoreError> {
        self.recipients
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn scan_approved_unclaimed(&self) -> Result<Vec<RecipientRecord>, StoreError> {
        Ok(self.scan(RecipientRecord::is_visible).await)
    }

    async fn scan_pending(&self) -> Result<Vec<RecipientRecord>, StoreError> {
        Ok(self.scan(|record| !record.approved).await)
    }

    async fn scan_claimed_by(&self, donor_id: &str) -> Result<Vec<RecipientRecord>, StoreError> {
        Ok(self.scan(|record| record.is_claimed_by(donor_id)).await)
    }

    async fn insert_recipient(&self, record: RecipientRecord) -> Result<(), StoreError> {
        let mut recipients = self.recipients.write().await;
        if recipients.contains_key(&record.id) {
            return Err(StoreError::PreconditionFailed(format!(
                "recipient {} already exists",
                record.id
            )));
        }
        recipients.insert(record.id.clone(), record);
        Ok(())
    }

    async fn conditional_set_claim(
        &self,
        id: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<RecipientRecord, StoreError> {
        let mut recipients = self.recipients.write().await;
        let record = recipients.get_mut(id).ok_or_else(|| not_found(id))?;

        if record.claimed_by.as_deref() != expected {
            return Err(StoreError::PreconditionFailed(format!(
                "recipient {} claim owner changed",
                id
            )));
        }

        record.claimed_by = new.map(str::to_string);
        record.claimed_at = new.map(|_| chrono::Utc::now());
        Ok(record.clone())
    }

    async fn initialize_wishlists(&self, id: &str, wishlists: &[Wishlist]) -> Result<bool, StoreError> {
        let mut recipients = self.recipients.write().await;
        let record = recipients.get_mut(id).ok_or_else(|| not_found(id))?;

        if record.wishlists.is_some() {
            return Ok(false);
        }
        record.wishlists = Some(wishlists.to_vec());
        Ok(true)
    }

    async fn overwrite_wishlists(&self, id: &str, wishlists: &[Wishlist]) -> Result<(), StoreError> {
        let mut recipients = self.recipients.write().await;
        let record = recipients.get_mut(id).ok_or_else(|| not_found(id))?;
        record.wishlists = Some(wishlists.to_vec());
        Ok(())
    }

    async fn approve_pending(&self, id: &str) -> Result<(), StoreError> {
        let mut recipients = self.recipients.write().await;
        let record = recipients.get_mut(id).ok_or_else(|| not_found(id))?;

        if record.approved {
            return Err(already_approved(id));
        }
        record.approved = true;
        Ok(())
    }

    async fn delete_pending(&self, id: &str) -> Result<(), StoreError> {
        let mut recipients = self.recipients.write().await;
        let record = recipients.get(id).ok_or_else(|| not_found(id))?;

        if record.approved {
            return Err(already_approved(id));
        }
        recipients.remove(id);
        Ok(())
    }

    async fn set_document(&self, id: &str, label: &str, reference: &str) -> Result<(), StoreError> {
        let mut recipients = self.recipients.write().await;
        let record = recipients.get_mut(id).ok_or_else(|| not_found(id))?;
        record
            .documents
            .insert(label.to_string(), reference.to_string());
        Ok(())
    }

    async fn get_donor_preference(&self, donor_id: &str) -> Result<DonorPreference, StoreError> {
        self.preferences
            .read()
            .await
            .get(donor_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("preferences for donor {}", donor_id)))
    }

    async fn put_donor_preference(&self, donor_id: &str, preference: &DonorPreference) -> Result<(), StoreError> {
        self.preferences
            .write()
            .await
            .insert(donor_id.to_string(), preference.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ages, Gender};

    fn record(id: &str, approved: bool) -> RecipientRecord {
        RecipientRecord {
            id: id.to_string(),
            address: String::new(),
            zip_code: "48188".to_string(),
            kid_count: 1,
            ages: Ages::Parsed(vec![5]),
            gender: Gender::Male,
            approved,
            claimed_by: None,
            claimed_at: None,
            wishlists: None,
            documents: Default::default(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_conditional_claim_rejects_second_writer() {
        let store = MemoryProfileStore::with_recipients(vec![record("r1", true)]);

        let claimed = store.conditional_set_claim("r1", None, Some("d1")).await.unwrap();
        assert_eq!(claimed.claimed_by.as_deref(), Some("d1"));
        assert!(claimed.claimed_at.is_some());

        let second = store.conditional_set_claim("r1", None, Some("d2")).await;
        assert!(matches!(second, Err(StoreError::PreconditionFailed(_))));

        let released = store.conditional_set_claim("r1", Some("d1"), None).await.unwrap();
        assert!(released.claimed_by.is_none());
        assert!(released.claimed_at.is_none());
    }

    #[tokio::test]
    async fn test_scans_split_by_state() {
        let store = MemoryProfileStore::with_recipients(vec![
            record("a", true),
            record("b", false),
            record("c", true),
        ]);
        store.conditional_set_claim("c", None, Some("d1")).await.unwrap();

        let visible = store.scan_approved_unclaimed().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "a");

        let pending = store.scan_pending().await.unwrap();
        assert_eq!(pending[0].id, "b");

        let claimed = store.scan_claimed_by("d1").await.unwrap();
        assert_eq!(claimed[0].id, "c");
    }

    #[tokio::test]
    async fn test_initialize_wishlists_only_once() {
        let store = MemoryProfileStore::with_recipients(vec![record("r1", true)]);
        let first = vec![Wishlist { child_id: 1, items: vec![] }];

        assert!(store.initialize_wishlists("r1", &first).await.unwrap());
        assert!(!store.initialize_wishlists("r1", &[]).await.unwrap());
        assert_eq!(store.get_by_id("r1").await.unwrap().wishlists, Some(first));
    }

    #[tokio::test]
    async fn test_approved_records_are_not_deleted() {
        let store = MemoryProfileStore::with_recipients(vec![record("r1", false)]);

        store.approve_pending("r1").await.unwrap();
        store.conditional_set_claim("r1", None, Some("d1")).await.unwrap();

        assert!(matches!(
            store.approve_pending("r1").await,
            Err(StoreError::PreconditionFailed(_))
        ));
        assert!(matches!(
            store.delete_pending("r1").await,
            Err(StoreError::PreconditionFailed(_))
        ));
        assert_eq!(
            store.get_by_id("r1").await.unwrap().claimed_by.as_deref(),
            Some("d1")
        );
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = MemoryProfileStore::new();
        let result = tokio_test::block_on(store.delete_pending("ghost"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
