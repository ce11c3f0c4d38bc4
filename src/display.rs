//! External signage display push client.
//!
//! The wire format is fixed: a POST of `{"data": <payload>}` to
//! `https://{domain}/catalog/items/{group}`, authenticated with a static
//! `X-API-Key` header. The payload is either a specific ad's display fields
//! or a sentinel image reference meaning "no active ad". The returned status
//! code is logged but not branched on beyond success/failure.

use crate::config::DisplaySettings;
use crate::errors::{Error, Result};
use crate::models::Advertisement;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Fixed upper bound on a push before it is treated as a failure.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(8);

/// The `ad` object inside a display payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum DisplaySlide {
    /// Sentinel pushed when nothing should be showing.
    NoAd { image_url: String },
    Ad {
        id: String,
        business_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        business_name: Option<String>,
        title: String,
        image_url: Option<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPayload {
    pub ad: DisplaySlide,
}

impl DisplayPayload {
    #[must_use]
    pub fn no_ad(image_url: &str) -> Self {
        Self {
            ad: DisplaySlide::NoAd {
                image_url: image_url.to_string(),
            },
        }
    }

    #[must_use]
    pub fn for_ad(ad: &Advertisement, business_name: Option<String>) -> Self {
        Self {
            ad: DisplaySlide::Ad {
                id: ad.id.clone(),
                business_id: ad.business_id.clone(),
                business_name,
                title: ad.title.clone(),
                image_url: ad.image_path.clone(),
                start_at: ad.start_time,
                end_at: ad.end_time,
            },
        }
    }
}

/// Push surface the scheduler talks to. Implemented by [`DisplayClient`] in
/// production and by recording fakes in tests.
#[allow(async_fn_in_trait)]
pub trait DisplayApi {
    /// Pushes a payload, returning the remote status code on success.
    async fn push(&self, payload: &DisplayPayload) -> Result<u16>;
}

pub struct DisplayClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl DisplayClient {
    pub fn new(settings: &DisplaySettings, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(PUSH_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "https://{}/catalog/items/{}",
                settings.domain, settings.items_group
            ),
            api_key,
        })
    }

    /// Builds a client with the API key taken from `DISPLAY_API_KEY`.
    pub fn from_env(settings: &DisplaySettings) -> Result<Self> {
        let api_key = std::env::var("DISPLAY_API_KEY").map_err(|_| Error::Config {
            message: "DISPLAY_API_KEY environment variable not set".to_string(),
        })?;
        Self::new(settings, api_key)
    }
}

impl DisplayApi for DisplayClient {
    async fn push(&self, payload: &DisplayPayload) -> Result<u16> {
        let body = serde_json::json!({ "data": payload });
        debug!(endpoint = %self.endpoint, "Pushing payload to display API");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::DisplayPush {
                message: format!("display API returned status {status}"),
            });
        }
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_ad;

    #[test]
    fn test_no_ad_payload_shape() {
        let payload = DisplayPayload::no_ad("uploads/no-ad.png");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "ad": { "imageUrl": "uploads/no-ad.png" } })
        );
    }

    #[test]
    fn test_ad_payload_shape() {
        let mut ad = sample_ad("biz-1", "Grand Opening");
        ad.image_path = Some("uploads/opening.png".to_string());
        let payload = DisplayPayload::for_ad(&ad, Some("Cafe Aurora".to_string()));
        let json = serde_json::to_value(&payload).unwrap();
        let slide = json["ad"].as_object().unwrap();

        assert_eq!(slide["id"], ad.id.as_str());
        assert_eq!(slide["businessId"], "biz-1");
        assert_eq!(slide["businessName"], "Cafe Aurora");
        assert_eq!(slide["title"], "Grand Opening");
        assert_eq!(slide["imageUrl"], "uploads/opening.png");
        assert!(slide.contains_key("startAt"));
        assert!(slide.contains_key("endAt"));
    }

    #[test]
    fn test_unresolved_business_name_is_omitted() {
        let ad = sample_ad("biz-1", "Grand Opening");
        let payload = DisplayPayload::for_ad(&ad, None);
        let json = serde_json::to_value(&payload).unwrap();
        let slide = json["ad"].as_object().unwrap();
        assert!(!slide.contains_key("businessName"));
        // A missing image still serializes as an explicit null.
        assert_eq!(slide["imageUrl"], serde_json::Value::Null);
    }
}
