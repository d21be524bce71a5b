//! Thin client for the identity provider's management API.
//!
//! Every call is a live round-trip — no caching, no local persistence.
//! Callers get either the shaped result or an opaque upstream error; the
//! provider's own error bodies never travel further than a log line.

use quill_types::models::{OrganizationMembership, UserProfile};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("upstream request failed")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
}

pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile, IdentityError> {
        let user: ProviderUser = self.get_json(&format!("/users/{user_id}")).await?;
        Ok(shape_profile(user, true))
    }

    /// Batch lookup by id. The provider skips unknown ids rather than
    /// failing, so the result may be shorter than the input.
    pub async fn get_users(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, IdentityError> {
        let query: Vec<(&str, &str)> = user_ids.iter().map(|id| ("user_id", id.as_str())).collect();
        let resp = self
            .http
            .get(format!("{}/users", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await?;
        let users: Vec<ProviderUser> = check(resp).await?.json().await?;
        Ok(users.into_iter().map(|u| shape_profile(u, false)).collect())
    }

    /// Replaces the subject's public metadata wholesale; the provider does
    /// not merge.
    pub async fn update_user_metadata(
        &self,
        user_id: &str,
        metadata: &serde_json::Value,
    ) -> Result<UserProfile, IdentityError> {
        let resp = self
            .http
            .patch(format!("{}/users/{}/metadata", self.base_url, user_id))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "public_metadata": metadata }))
            .send()
            .await?;
        let user: ProviderUser = check(resp).await?.json().await?;
        Ok(shape_profile(user, true))
    }

    pub async fn get_organizations(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrganizationMembership>, IdentityError> {
        let value: serde_json::Value = self
            .get_json(&format!("/users/{user_id}/organization_memberships"))
            .await?;
        Ok(unwrap_list(value))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, IdentityError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = resp.status();
    if !status.is_success() {
        warn!("Identity provider returned {}", status);
        return Err(IdentityError::Status(status));
    }
    Ok(resp)
}

/// List endpoints come back either as a bare array or wrapped in
/// `{"data": [...], "total_count": n}` depending on API version.
fn unwrap_list(value: serde_json::Value) -> Vec<serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email_addresses: Vec<ProviderEmailAddress>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
    created_at: Option<i64>,
    last_sign_in_at: Option<i64>,
    #[serde(default)]
    public_metadata: Option<serde_json::Value>,
    #[serde(default)]
    private_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProviderEmailAddress {
    email_address: String,
}

fn shape_profile(user: ProviderUser, include_metadata: bool) -> UserProfile {
    let full_name = format!(
        "{} {}",
        user.first_name.as_deref().unwrap_or(""),
        user.last_name.as_deref().unwrap_or("")
    )
    .trim()
    .to_string();

    UserProfile {
        id: user.id,
        email: user
            .email_addresses
            .into_iter()
            .next()
            .map(|e| e.email_address),
        first_name: user.first_name,
        last_name: user.last_name,
        full_name,
        image_url: user.image_url,
        created_at: user.created_at,
        last_sign_in_at: user.last_sign_in_at,
        public_metadata: if include_metadata { user.public_metadata } else { None },
        private_metadata: if include_metadata { user.private_metadata } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_user(first: Option<&str>, last: Option<&str>) -> ProviderUser {
        serde_json::from_value(serde_json::json!({
            "id": "user_1",
            "email_addresses": [
                { "email_address": "a@example.com" },
                { "email_address": "b@example.com" }
            ],
            "first_name": first,
            "last_name": last,
            "image_url": "https://img.example.com/u1.png",
            "created_at": 1700000000000i64,
            "last_sign_in_at": 1700000100000i64,
            "public_metadata": { "theme": "dark" },
            "private_metadata": {}
        }))
        .unwrap()
    }

    #[test]
    fn profile_takes_first_email_and_joins_names() {
        let profile = shape_profile(provider_user(Some("Ada"), Some("Lovelace")), true);
        assert_eq!(profile.email.as_deref(), Some("a@example.com"));
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert!(profile.public_metadata.is_some());
    }

    #[test]
    fn full_name_trims_missing_parts() {
        assert_eq!(shape_profile(provider_user(Some("Ada"), None), true).full_name, "Ada");
        assert_eq!(
            shape_profile(provider_user(None, Some("Lovelace")), true).full_name,
            "Lovelace"
        );
        assert_eq!(shape_profile(provider_user(None, None), true).full_name, "");
    }

    #[test]
    fn batch_shaping_drops_metadata() {
        let profile = shape_profile(provider_user(Some("Ada"), Some("Lovelace")), false);
        assert!(profile.public_metadata.is_none());
        assert!(profile.private_metadata.is_none());
    }

    #[test]
    fn membership_lists_unwrap_both_shapes() {
        let bare = serde_json::json!([{ "organization": { "name": "acme" } }]);
        assert_eq!(unwrap_list(bare).len(), 1);

        let wrapped = serde_json::json!({ "data": [{}, {}], "total_count": 2 });
        assert_eq!(unwrap_list(wrapped).len(), 2);

        let neither = serde_json::json!({ "unexpected": true });
        assert!(unwrap_list(neither).is_empty());
    }

    #[test]
    fn profile_tolerates_sparse_provider_records() {
        let user: ProviderUser = serde_json::from_value(serde_json::json!({ "id": "user_2" })).unwrap();
        let profile = shape_profile(user, true);
        assert_eq!(profile.id, "user_2");
        assert!(profile.email.is_none());
        assert_eq!(profile.full_name, "");
        assert!(profile.public_metadata.is_none());
    }
}
