//! Advertisement repository
//!
//! Validation and persistence for advertisements, the active-set derivation
//! the rotation scheduler runs every tick, and display-ready listings with
//! the owning business populated in place of the raw reference.

use crate::errors::{Error, Result};
use crate::models::{AdStatus, Advertisement, Business};
use crate::query::{Cond, FieldValue, Filter, Query, SortDir, populate};
use crate::store::{Collection, CollectionStore};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Fields accepted when creating an advertisement. Shape validation (length
/// constraints, date parsing) is owned by the caller-side validation layer;
/// this repository enforces the business invariants only.
#[derive(Debug, Clone)]
pub struct NewAdvertisement {
    pub business_id: String,
    pub title: String,
    pub short_text: String,
    pub promo_text: String,
    pub image_path: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AdStatus,
}

/// Patch of the caller-editable fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AdvertisementUpdate {
    pub title: Option<String>,
    pub short_text: Option<String>,
    pub promo_text: Option<String>,
    pub status: Option<AdStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Optional listing filters, applied as exact-equality clauses.
#[derive(Debug, Clone, Default)]
pub struct AdFilter {
    pub business_id: Option<String>,
    pub status: Option<AdStatus>,
}

/// Active and upcoming advertisements, populated with the business name.
#[derive(Debug, Clone)]
pub struct AdsSnapshot {
    pub active: Vec<Value>,
    pub upcoming: Vec<Value>,
}

fn validate_advertisement(ad: &Advertisement) -> Result<()> {
    if ad.business_id.trim().is_empty() {
        return Err(Error::Validation {
            message: "business_id is required".to_string(),
        });
    }
    if ad.title.trim().is_empty() {
        return Err(Error::Validation {
            message: "title is required".to_string(),
        });
    }
    if ad.short_text.trim().is_empty() {
        return Err(Error::Validation {
            message: "short_text is required".to_string(),
        });
    }
    if ad.promo_text.trim().is_empty() {
        return Err(Error::Validation {
            message: "promo_text is required".to_string(),
        });
    }
    if ad.end_time <= ad.start_time {
        return Err(Error::Validation {
            message: "end_time must be after start_time".to_string(),
        });
    }
    Ok(())
}

/// Creates an advertisement. The referenced business must exist.
#[instrument(skip(store, request), fields(business_id = %request.business_id))]
pub async fn create_advertisement(
    store: &CollectionStore,
    request: NewAdvertisement,
) -> Result<Advertisement> {
    if crate::core::business::get_business(store, &request.business_id)
        .await
        .is_none()
    {
        return Err(Error::BusinessNotFound {
            id: request.business_id,
        });
    }

    let now = Utc::now();
    let ad = Advertisement {
        id: Uuid::new_v4().to_string(),
        business_id: request.business_id,
        title: request.title,
        short_text: request.short_text,
        promo_text: request.promo_text,
        image_path: request.image_path,
        start_time: request.start_time,
        end_time: request.end_time,
        stop_time: None,
        status: request.status,
        created_at: now,
        updated_at: now,
    };
    save_advertisement(store, ad).await
}

/// Validates and upserts an advertisement, refreshing `updated_at`.
/// Nothing is written when validation fails.
#[instrument(skip(store, ad), fields(id = %ad.id))]
pub async fn save_advertisement(
    store: &CollectionStore,
    mut ad: Advertisement,
) -> Result<Advertisement> {
    validate_advertisement(&ad)?;
    ad.updated_at = Utc::now();
    let saved = ad.clone();

    store.update(Collection::Advertisements, |ads: &mut Vec<Advertisement>| {
        match ads.iter_mut().find(|a| a.id == ad.id) {
            Some(slot) => *slot = ad,
            None => ads.push(ad),
        }
        Ok(())
    })?;

    info!(id = %saved.id, "Advertisement saved");
    Ok(saved)
}

#[instrument(skip(store))]
pub async fn get_advertisement(store: &CollectionStore, id: &str) -> Option<Advertisement> {
    let ads: Vec<Advertisement> = store.read(Collection::Advertisements);
    Query::over(ads)
        .filter(Filter::new().field("_id", Cond::Eq(FieldValue::Str(id.to_string()))))
        .one()
}

/// Display-ready listing, newest first, with the owning business's `name`
/// and `business_code` populated in place of the raw reference.
#[instrument(skip(store))]
pub async fn list_advertisements(store: &CollectionStore, filter: &AdFilter) -> Vec<Value> {
    let ads: Vec<Advertisement> = store.read(Collection::Advertisements);

    let mut query_filter = Filter::new();
    if let Some(business_id) = &filter.business_id {
        query_filter = query_filter.field(
            "business_id",
            Cond::Eq(FieldValue::Str(business_id.clone())),
        );
    }
    if let Some(status) = filter.status {
        query_filter = query_filter.field(
            "status",
            Cond::Eq(FieldValue::Str(status.as_str().to_string())),
        );
    }

    let results = Query::over(ads)
        .filter(query_filter)
        .sort("created_at", SortDir::Desc)
        .all();

    let businesses: Vec<Business> = store.read(Collection::Businesses);
    populate(&results, "business_id", &["name", "business_code"], |id| {
        businesses.iter().find(|b| b.id == id).cloned()
    })
}

/// The set of advertisements that should be rotating right now: status
/// active, window covers `now`, and no early stop has taken effect. Ordered
/// by creation time ascending so rotation is reproducible.
#[instrument(skip(store))]
pub async fn active_advertisements(
    store: &CollectionStore,
    now: DateTime<Utc>,
) -> Vec<Advertisement> {
    let ads: Vec<Advertisement> = store.read(Collection::Advertisements);
    let filter = Filter::new()
        .field(
            "status",
            Cond::Eq(FieldValue::Str(AdStatus::Active.as_str().to_string())),
        )
        .field("start_time", Cond::Lte(now))
        .field("end_time", Cond::Gt(now))
        .any_of(vec![
            Filter::new().field("stop_time", Cond::Eq(FieldValue::Null)),
            Filter::new().field("stop_time", Cond::Gt(now)),
        ]);

    let active = Query::over(ads)
        .filter(filter)
        .sort("created_at", SortDir::Asc)
        .all();
    debug!(count = active.len(), "Derived active advertisement set");
    active
}

/// Active plus upcoming (active-status, not yet started) advertisements,
/// populated with the business name.
#[instrument(skip(store))]
pub async fn snapshot(store: &CollectionStore, now: DateTime<Utc>) -> AdsSnapshot {
    let active = active_advertisements(store, now).await;

    let ads: Vec<Advertisement> = store.read(Collection::Advertisements);
    let upcoming = Query::over(ads)
        .filter(
            Filter::new()
                .field(
                    "status",
                    Cond::Eq(FieldValue::Str(AdStatus::Active.as_str().to_string())),
                )
                .field("start_time", Cond::Gt(now)),
        )
        .sort("created_at", SortDir::Asc)
        .all();

    let businesses: Vec<Business> = store.read(Collection::Businesses);
    AdsSnapshot {
        active: populate(&active, "business_id", &["name"], |id| {
            businesses.iter().find(|b| b.id == id).cloned()
        }),
        upcoming: populate(&upcoming, "business_id", &["name"], |id| {
            businesses.iter().find(|b| b.id == id).cloned()
        }),
    }
}

/// Applies a partial update and re-validates through save.
/// Returns `None` when the id is unknown.
#[instrument(skip(store, update))]
pub async fn update_advertisement(
    store: &CollectionStore,
    id: &str,
    update: AdvertisementUpdate,
) -> Result<Option<Advertisement>> {
    let Some(mut ad) = get_advertisement(store, id).await else {
        return Ok(None);
    };
    if let Some(title) = update.title {
        ad.title = title;
    }
    if let Some(short_text) = update.short_text {
        ad.short_text = short_text;
    }
    if let Some(promo_text) = update.promo_text {
        ad.promo_text = promo_text;
    }
    if let Some(status) = update.status {
        ad.status = status;
    }
    if let Some(start_time) = update.start_time {
        ad.start_time = start_time;
    }
    if let Some(end_time) = update.end_time {
        ad.end_time = end_time;
    }
    save_advertisement(store, ad).await.map(Some)
}

/// Terminates an advertisement early: records the stop time and disables it.
#[instrument(skip(store))]
pub async fn stop_advertisement(
    store: &CollectionStore,
    id: &str,
) -> Result<Option<Advertisement>> {
    let Some(mut ad) = get_advertisement(store, id).await else {
        return Ok(None);
    };
    ad.stop_time = Some(Utc::now());
    ad.status = AdStatus::Disabled;
    save_advertisement(store, ad).await.map(Some)
}

/// Deletes an advertisement, returning the removed record or `None` when the
/// id is unknown.
#[instrument(skip(store))]
pub async fn delete_advertisement(
    store: &CollectionStore,
    id: &str,
) -> Result<Option<Advertisement>> {
    store.update(Collection::Advertisements, |ads: &mut Vec<Advertisement>| {
        let index = ads.iter().position(|a| a.id == id);
        Ok(index.map(|i| ads.remove(i)))
    })
}

/// How many advertisements reference the given business (the delete guard's
/// input).
pub async fn count_for_business(store: &CollectionStore, business_id: &str) -> usize {
    let ads: Vec<Advertisement> = store.read(Collection::Advertisements);
    let filter = Filter::new().field(
        "business_id",
        Cond::Eq(FieldValue::Str(business_id.to_string())),
    );
    ads.iter().filter(|ad| filter.matches(*ad)).count()
}
