//! Book model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::refs::{flexible_datetime, CategorySummary, EntityRef};

/// Book as returned by `GET /book`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawBook")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub category: Option<CategorySummary>,
    pub total_copies: i64,
    /// Expected to stay within `total_copies`; the server owns that rule
    pub available_quantity: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_quantity > 0
    }

    /// Copies currently out on loan
    pub fn borrowed_copies(&self) -> i64 {
        (self.total_copies - self.available_quantity).max(0)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBook {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    isbn: Option<String>,
    #[serde(default)]
    category: Option<EntityRef>,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default, alias = "copies")]
    total_copies: i64,
    #[serde(default)]
    available_quantity: Option<i64>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    created_at: Option<DateTime<Utc>>,
}

impl From<RawBook> for Book {
    fn from(raw: RawBook) -> Self {
        let category = match (raw.category, raw.category_id) {
            (Some(mut c), id) => {
                if c.id.is_none() {
                    c.id = id;
                }
                Some(c)
            }
            (None, Some(id)) => Some(EntityRef::from_id(id)),
            (None, None) => None,
        };

        Book {
            id: raw.id,
            title: raw.title,
            author: raw.author,
            isbn: raw.isbn,
            category,
            total_copies: raw.total_copies,
            available_quantity: raw.available_quantity.unwrap_or(raw.total_copies),
            created_at: raw.created_at,
        }
    }
}

/// Create book request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[validate(range(min = 1, message = "A book needs at least one copy"))]
    pub total_copies: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i64>,
}

/// Partial book update, only set fields are sent
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub total_copies: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub available_quantity: Option<i64>,
}
