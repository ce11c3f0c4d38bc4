//! Document types persisted in the collection store.
//!
//! Field names (including the `_id` rename) match the JSON layout of the
//! existing collection files, so a store written by the previous deployment
//! reads back unchanged.

use crate::query::{Document, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Draft,
    Active,
    Disabled,
}

impl AdStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    #[serde(rename = "_id")]
    pub id: String,
    /// 8-character uppercase alphanumeric code, unique across the store.
    pub business_code: String,
    pub name: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    #[serde(rename = "_id")]
    pub id: String,
    /// Non-owning reference to the business this ad belongs to.
    pub business_id: String,
    pub title: String,
    pub short_text: String,
    pub promo_text: String,
    /// Path of the uploaded asset, stored opaquely. None if no image.
    pub image_path: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Once set, the ad is terminated regardless of `end_time`.
    pub stop_time: Option<DateTime<Utc>>,
    pub status: AdStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Business {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "_id" => FieldValue::Str(self.id.clone()),
            "business_code" => FieldValue::Str(self.business_code.clone()),
            "name" => FieldValue::Str(self.name.clone()),
            "contact_info" => FieldValue::Str(self.contact_info.clone()),
            "created_at" => FieldValue::Time(self.created_at),
            "updated_at" => FieldValue::Time(self.updated_at),
            _ => FieldValue::Null,
        }
    }
}

impl Document for Advertisement {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "_id" => FieldValue::Str(self.id.clone()),
            "business_id" => FieldValue::Str(self.business_id.clone()),
            "title" => FieldValue::Str(self.title.clone()),
            "short_text" => FieldValue::Str(self.short_text.clone()),
            "promo_text" => FieldValue::Str(self.promo_text.clone()),
            "image_path" => self
                .image_path
                .as_ref()
                .map_or(FieldValue::Null, |p| FieldValue::Str(p.clone())),
            "start_time" => FieldValue::Time(self.start_time),
            "end_time" => FieldValue::Time(self.end_time),
            "stop_time" => self
                .stop_time
                .map_or(FieldValue::Null, FieldValue::Time),
            "status" => FieldValue::Str(self.status.as_str().to_string()),
            "created_at" => FieldValue::Time(self.created_at),
            "updated_at" => FieldValue::Time(self.updated_at),
            _ => FieldValue::Null,
        }
    }
}
