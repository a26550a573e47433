use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The three ranked catalog collections exposed to the reorder endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    PriceCategories,
    ServiceCategories,
    Services,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::PriceCategories => "price_categories",
            Collection::ServiceCategories => "service_categories",
            Collection::Services => "services",
        }
    }
}

/// A section of the price list. `description` is admin-authored rich text and
/// must pass through the sanitizer before rendering.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceCategory {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

/// A single priced entry under a price category. Items are ordered within
/// their category but are not part of the reorder REST surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceItem {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub price: String,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceCategory {
    pub id: String,
    pub title: String,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}

/// A clinic service. `description` is admin-authored rich text; `image_key`
/// references an object in the media store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub image_key: Option<String>,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}
