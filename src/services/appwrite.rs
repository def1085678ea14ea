use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::models::{Principal, Role};
use crate::services::identity::{apply_admin_override, IdentityError, IdentityProvider};

/// Appwrite account-based identity provider
///
/// Resolves a client session JWT by asking Appwrite for the account it
/// belongs to. The role comes from the account labels only: labels are set
/// server-side, while preferences are writable by the account owner.
pub struct AppwriteIdentityProvider {
    base_url: String,
    project_id: String,
    client: Client,
    admin_emails: Vec<String>,
}

impl AppwriteIdentityProvider {
    /// Create a new Appwrite identity provider
    pub fn new(base_url: String, project_id: String, admin_emails: Vec<String>) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            project_id,
            client,
            admin_emails,
        })
    }

    fn account_url(&self) -> String {
        format!("{}/account", self.base_url.trim_end_matches('/'))
    }
}

/// Pick the account role from its labels
fn role_from_account(account: &Value) -> Option<Role> {
    account
        .get("labels")
        .and_then(|labels| labels.as_array())
        .and_then(|labels| {
            labels
                .iter()
                .filter_map(|label| label.as_str())
                .find_map(Role::parse)
        })
}

#[async_trait]
impl IdentityProvider for AppwriteIdentityProvider {
    async fn current_principal(&self, credential: &str) -> Result<Option<Principal>, IdentityError> {
        let response = self
            .client
            .get(self.account_url())
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-JWT", credential)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("Appwrite rejected session JWT");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(IdentityError::ApiError(format!(
                "Failed to fetch account: {}",
                status
            )));
        }

        let account: Value = response.json().await?;

        let id = account
            .get("$id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| IdentityError::InvalidResponse("Missing account $id".into()))?
            .to_string();

        let email = account
            .get("email")
            .and_then(|email| email.as_str())
            .filter(|email| !email.is_empty())
            .map(str::to_string);

        let principal = match role_from_account(&account) {
            Some(role) => Principal { id, role, email },
            None => {
                let candidate = Principal { id, role: Role::Donor, email };
                let elevated = apply_admin_override(candidate, &self.admin_emails);
                if elevated.role != Role::Admin {
                    tracing::warn!("Account {} has no role assigned", elevated.id);
                    return Ok(None);
                }
                return Ok(Some(elevated));
            }
        };

        Ok(Some(apply_admin_override(principal, &self.admin_emails)))
    }
}
