//! Business repository
//!
//! Typed operations over the businesses collection: validation on save,
//! business-code uniqueness, server-side code generation, and the
//! referential-integrity guard that refuses to delete a business while
//! advertisements still reference it.

use crate::errors::{Error, Result};
use crate::models::Business;
use crate::query::{Cond, FieldValue, Filter, Query, SortDir};
use crate::store::{Collection, CollectionStore};
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 8;

fn validate_business(business: &Business) -> Result<()> {
    if business.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "name is required".to_string(),
        });
    }
    if business.contact_info.trim().is_empty() {
        return Err(Error::Validation {
            message: "contact_info is required".to_string(),
        });
    }
    let code_ok = business.business_code.len() == CODE_LENGTH
        && business
            .business_code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if !code_ok {
        return Err(Error::Validation {
            message: "business_code must be 8 uppercase alphanumeric characters".to_string(),
        });
    }
    Ok(())
}

/// Generates a business code that does not collide with any existing record.
///
/// The code space (36^8) vastly exceeds any plausible record count, so the
/// retry loop terminates after O(1) attempts in practice.
pub async fn generate_business_code(store: &CollectionStore) -> String {
    let existing: Vec<Business> = store.read(Collection::Businesses);
    let mut rng = rand::thread_rng();
    loop {
        let code: String = (0..CODE_LENGTH)
            .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
            .collect();
        if existing.iter().all(|b| b.business_code != code) {
            debug!(%code, "Generated unique business code");
            return code;
        }
        warn!(%code, "Business code collision, retrying");
    }
}

/// Creates a business with a freshly generated code.
#[instrument(skip(store))]
pub async fn create_business(
    store: &CollectionStore,
    name: &str,
    contact_info: &str,
) -> Result<Business> {
    let business_code = generate_business_code(store).await;
    let now = Utc::now();
    let business = Business {
        id: Uuid::new_v4().to_string(),
        business_code,
        name: name.trim().to_string(),
        contact_info: contact_info.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    save_business(store, business).await
}

/// Validates and upserts a business (insert-if-absent-by-id, else update in
/// place), refreshing `updated_at`. Fails with
/// [`Error::DuplicateBusinessCode`] when another record already carries the
/// same code; nothing is written on any failure.
#[instrument(skip(store, business), fields(id = %business.id))]
pub async fn save_business(store: &CollectionStore, mut business: Business) -> Result<Business> {
    validate_business(&business)?;
    business.updated_at = Utc::now();
    let saved = business.clone();

    store.update(Collection::Businesses, |businesses: &mut Vec<Business>| {
        let duplicate = businesses
            .iter()
            .any(|b| b.business_code == business.business_code && b.id != business.id);
        if duplicate {
            return Err(Error::DuplicateBusinessCode {
                code: business.business_code.clone(),
            });
        }
        match businesses.iter_mut().find(|b| b.id == business.id) {
            Some(slot) => *slot = business,
            None => businesses.push(business),
        }
        Ok(())
    })?;

    info!(id = %saved.id, "Business saved");
    Ok(saved)
}

#[instrument(skip(store))]
pub async fn get_business(store: &CollectionStore, id: &str) -> Option<Business> {
    let businesses: Vec<Business> = store.read(Collection::Businesses);
    Query::over(businesses)
        .filter(Filter::new().field("_id", Cond::Eq(FieldValue::Str(id.to_string()))))
        .one()
}

/// All businesses, newest first.
#[instrument(skip(store))]
pub async fn list_businesses(store: &CollectionStore) -> Vec<Business> {
    let businesses: Vec<Business> = store.read(Collection::Businesses);
    Query::over(businesses)
        .sort("created_at", SortDir::Desc)
        .all()
}

pub async fn count_businesses(store: &CollectionStore) -> usize {
    let businesses: Vec<Business> = store.read(Collection::Businesses);
    businesses.len()
}

/// Updates the caller-editable fields, re-running save validation.
/// Returns `None` when the id is unknown.
#[instrument(skip(store))]
pub async fn update_business(
    store: &CollectionStore,
    id: &str,
    name: &str,
    contact_info: &str,
) -> Result<Option<Business>> {
    let Some(mut business) = get_business(store, id).await else {
        return Ok(None);
    };
    business.name = name.trim().to_string();
    business.contact_info = contact_info.trim().to_string();
    save_business(store, business).await.map(Some)
}

/// Deletes a business, refusing with [`Error::BusinessInUse`] while any
/// advertisement still references it. Returns the removed record, or `None`
/// when the id is unknown.
#[instrument(skip(store))]
pub async fn delete_business(store: &CollectionStore, id: &str) -> Result<Option<Business>> {
    let count = crate::core::advertisement::count_for_business(store, id).await;
    if count > 0 {
        return Err(Error::BusinessInUse { count });
    }

    store.update(Collection::Businesses, |businesses: &mut Vec<Business>| {
        let index = businesses.iter().position(|b| b.id == id);
        Ok(index.map(|i| businesses.remove(i)))
    })
}
