//! Shared test utilities for `adsign`.
//!
//! This module provides common helper functions for setting up temporary
//! collection stores and creating fixture records with sensible defaults.

use crate::config::DisplaySettings;
use crate::core::advertisement::NewAdvertisement;
use crate::errors::Result;
use crate::models::{AdStatus, Advertisement, Business};
use crate::store::CollectionStore;
use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

/// Opens a collection store in a fresh temporary directory. The directory
/// handle must be kept alive for as long as the store is used.
pub fn setup_test_store() -> Result<(CollectionStore, TempDir)> {
    let dir = tempfile::tempdir()?;
    let store = CollectionStore::open(dir.path())?;
    Ok((store, dir))
}

/// A valid business record with a fixed code.
///
/// # Defaults
/// * `business_code`: `"TESTCD01"`
/// * `contact_info`: `"test@example.com"`
#[must_use]
pub fn sample_business(name: &str) -> Business {
    let now = Utc::now();
    Business {
        id: Uuid::new_v4().to_string(),
        business_code: "TESTCD01".to_string(),
        name: name.to_string(),
        contact_info: "test@example.com".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// A valid advertisement record, active and inside its display window.
///
/// # Defaults
/// * window: one hour either side of now
/// * `status`: active, no image, no stop time
#[must_use]
pub fn sample_ad(business_id: &str, title: &str) -> Advertisement {
    let now = Utc::now();
    Advertisement {
        id: Uuid::new_v4().to_string(),
        business_id: business_id.to_string(),
        title: title.to_string(),
        short_text: "Short text".to_string(),
        promo_text: "Longer promotional text".to_string(),
        image_path: None,
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(1),
        stop_time: None,
        status: AdStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

/// Creation-request counterpart of [`sample_ad`], for repository tests.
#[must_use]
pub fn new_ad_request(business_id: &str, title: &str) -> NewAdvertisement {
    let now = Utc::now();
    NewAdvertisement {
        business_id: business_id.to_string(),
        title: title.to_string(),
        short_text: "Short text".to_string(),
        promo_text: "Longer promotional text".to_string(),
        image_path: None,
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(1),
        status: AdStatus::Active,
    }
}

/// Display settings pointing at a non-routable test endpoint.
#[must_use]
pub fn test_display_settings() -> DisplaySettings {
    DisplaySettings {
        domain: "display.invalid".to_string(),
        items_group: "test-group".to_string(),
        tick_seconds: 1,
        no_ad_image: "uploads/no-ad.png".to_string(),
    }
}
