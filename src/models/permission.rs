//! Permission model, request payloads and grouping helpers

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::refs::flexible_datetime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form grouping label
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Group permissions by category label, keeping first-seen order.
/// Unlabelled permissions are collected last under `None`.
pub fn group_by_category(permissions: &[Permission]) -> IndexMap<Option<String>, Vec<&Permission>> {
    let mut groups: IndexMap<Option<String>, Vec<&Permission>> = IndexMap::new();
    for permission in permissions {
        let label = permission
            .category
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        groups.entry(label).or_default().push(permission);
    }

    if let Some(unlabelled) = groups.shift_remove(&None) {
        groups.insert(None, unlabelled);
    }
    groups
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermission {
    #[validate(length(min = 1, message = "Permission name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermission {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Permission name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
