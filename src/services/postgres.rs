use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::{AgeRange, Ages, DonorPreference, Gender, GenderPref, RecipientRecord, Wishlist};
use crate::services::store::{ProfileStore, StoreError};

const RECIPIENT_COLUMNS: &str = r#"
    id, address, zip_code, kid_count, ages, gender, approved,
    claimed_by, claimed_at, wishlists, documents, created_at
"#;

/// PostgreSQL-backed profile store
///
/// Claim ownership changes are single `UPDATE ... WHERE` statements so the
/// database decides the winner when two donors race for the same family.
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Connect and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store from optional settings values
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL profile store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_recipients(&self, filter: &str, bind: Option<&str>) -> Result<Vec<RecipientRecord>, StoreError> {
        let query = format!(
            "SELECT {} FROM recipients WHERE {} ORDER BY created_at, id",
            RECIPIENT_COLUMNS, filter
        );

        let mut statement = sqlx::query(&query);
        if let Some(value) = bind {
            statement = statement.bind(value);
        }

        let rows = statement.fetch_all(&self.pool).await?;

        // A record that cannot be decoded is left out of the scan, not fatal to it
        Ok(rows
            .iter()
            .filter_map(|row| match recipient_from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping undecodable recipient row: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM recipients WHERE id = $1) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("present"))
    }

    /// Interpret a write guarded by `NOT approved`
    async fn pending_write_outcome(&self, id: &str, rows_affected: u64) -> Result<(), StoreError> {
        if rows_affected > 0 {
            Ok(())
        } else if self.exists(id).await? {
            Err(StoreError::PreconditionFailed(format!(
                "recipient {} is already approved",
                id
            )))
        } else {
            Err(StoreError::NotFound(format!("recipient {}", id)))
        }
    }
}

fn to_i32(value: u32, field: &str) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::InvalidRecord(format!("{} out of range: {}", field, value)))
}

fn to_u32(value: i32, field: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::InvalidRecord(format!("{} out of range: {}", field, value)))
}

fn recipient_from_row(row: &PgRow) -> Result<RecipientRecord, StoreError> {
    let ages: serde_json::Value = row.try_get("ages")?;
    let wishlists: Option<serde_json::Value> = row.try_get("wishlists")?;
    let documents: serde_json::Value = row.try_get("documents")?;
    let gender: String = row.try_get("gender")?;

    Ok(RecipientRecord {
        id: row.try_get("id")?,
        address: row.try_get("address")?,
        zip_code: row.try_get("zip_code")?,
        kid_count: to_u32(row.try_get("kid_count")?, "kid_count")?,
        ages: serde_json::from_value::<Ages>(ages)?,
        gender: Gender::from(gender),
        approved: row.try_get("approved")?,
        claimed_by: row.try_get("claimed_by")?,
        claimed_at: row.try_get("claimed_at")?,
        wishlists: wishlists.map(serde_json::from_value::<Vec<Wishlist>>).transpose()?,
        documents: serde_json::from_value::<BTreeMap<String, String>>(documents)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_by_id(&self, id: &str) -> Result<RecipientRecord, StoreError> {
        let query = format!("SELECT {} FROM recipients WHERE id = $1", RECIPIENT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("recipient {}", id)))?;

        recipient_from_row(&row)
    }

    async fn scan_approved_unclaimed(&self) -> Result<Vec<RecipientRecord>, StoreError> {
        let records = self
            .fetch_recipients("approved AND claimed_by IS NULL", None)
            .await?;
        tracing::debug!("Scanned {} approved, unclaimed recipients", records.len());
        Ok(records)
    }

    async fn scan_pending(&self) -> Result<Vec<RecipientRecord>, StoreError> {
        self.fetch_recipients("NOT approved", None).await
    }

    async fn scan_claimed_by(&self, donor_id: &str) -> Result<Vec<RecipientRecord>, StoreError> {
        self.fetch_recipients("claimed_by = $1", Some(donor_id)).await
    }

    async fn insert_recipient(&self, record: RecipientRecord) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO recipients (id, address, zip_code, kid_count, ages, gender, approved, documents, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()))
            ON CONFLICT (id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&record.id)
            .bind(&record.address)
            .bind(&record.zip_code)
            .bind(to_i32(record.kid_count, "kid_count")?)
            .bind(serde_json::to_value(&record.ages)?)
            .bind(record.gender.as_str())
            .bind(record.approved)
            .bind(serde_json::to_value(&record.documents)?)
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::PreconditionFailed(format!(
                "recipient {} already exists",
                record.id
            )));
        }

        Ok(())
    }

    async fn conditional_set_claim(
        &self,
        id: &str,
        expected: Option<&str>,
        new: Option<&str>,
    ) -> Result<RecipientRecord, StoreError> {
        let query = format!(
            r#"
            UPDATE recipients
            SET claimed_by = $3::TEXT,
                claimed_at = CASE WHEN $3::TEXT IS NULL THEN NULL ELSE NOW() END
            WHERE id = $1 AND claimed_by IS NOT DISTINCT FROM $2::TEXT
            RETURNING {}
            "#,
            RECIPIENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(expected)
            .bind(new)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => recipient_from_row(&row),
            None if self.exists(id).await? => Err(StoreError::PreconditionFailed(format!(
                "recipient {} claim owner changed",
                id
            ))),
            None => Err(StoreError::NotFound(format!("recipient {}", id))),
        }
    }

    async fn initialize_wishlists(&self, id: &str, wishlists: &[Wishlist]) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE recipients SET wishlists = $2 WHERE id = $1 AND wishlists IS NULL")
            .bind(id)
            .bind(serde_json::to_value(wishlists)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.exists(id).await? {
            Ok(false)
        } else {
            Err(StoreError::NotFound(format!("recipient {}", id)))
        }
    }

    async fn overwrite_wishlists(&self, id: &str, wishlists: &[Wishlist]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE recipients SET wishlists = $2 WHERE id = $1")
            .bind(id)
            .bind(serde_json::to_value(wishlists)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("recipient {}", id)));
        }
        Ok(())
    }

    async fn approve_pending(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE recipients SET approved = TRUE WHERE id = $1 AND NOT approved")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.pending_write_outcome(id, result.rows_affected()).await
    }

    async fn delete_pending(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM recipients WHERE id = $1 AND NOT approved")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.pending_write_outcome(id, result.rows_affected()).await
    }

    async fn set_document(&self, id: &str, label: &str, reference: &str) -> Result<(), StoreError> {
        let query = r#"
            UPDATE recipients
            SET documents = documents || jsonb_build_object($2::TEXT, $3::TEXT)
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .bind(label)
            .bind(reference)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("recipient {}", id)));
        }
        Ok(())
    }

    async fn get_donor_preference(&self, donor_id: &str) -> Result<DonorPreference, StoreError> {
        let query = r#"
            SELECT child_count, gender_pref, age_min, age_max
            FROM donor_preferences
            WHERE donor_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(donor_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("preferences for donor {}", donor_id)))?;

        let gender_pref: String = row.try_get("gender_pref")?;
        let age_min: Option<i32> = row.try_get("age_min")?;
        let age_max: Option<i32> = row.try_get("age_max")?;

        let age_range = match (age_min, age_max) {
            (Some(min), Some(max)) => Some(
                AgeRange::new(to_u32(min, "age_min")?, to_u32(max, "age_max")?)
                    .map_err(StoreError::InvalidRecord)?,
            ),
            _ => None,
        };

        Ok(DonorPreference {
            child_count: to_u32(row.try_get("child_count")?, "child_count")?,
            gender_pref: GenderPref::try_from(gender_pref).map_err(StoreError::InvalidRecord)?,
            age_range,
        })
    }

    async fn put_donor_preference(&self, donor_id: &str, preference: &DonorPreference) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO donor_preferences (donor_id, child_count, gender_pref, age_min, age_max, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (donor_id)
            DO UPDATE SET
                child_count = EXCLUDED.child_count,
                gender_pref = EXCLUDED.gender_pref,
                age_min = EXCLUDED.age_min,
                age_max = EXCLUDED.age_max,
                updated_at = EXCLUDED.updated_at
        "#;

        let (age_min, age_max) = match preference.age_range {
            Some(range) => (
                Some(to_i32(range.min(), "age_min")?),
                Some(to_i32(range.max(), "age_max")?),
            ),
            None => (None, None),
        };

        sqlx::query(query)
            .bind(donor_id)
            .bind(to_i32(preference.child_count, "child_count")?)
            .bind(preference.gender_pref.as_str())
            .bind(age_min)
            .bind(age_max)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Stored preferences for donor {}", donor_id);

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
