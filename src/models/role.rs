//! Role model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, OneOrMany};
use validator::Validate;

use super::permission::Permission;
use super::refs::{flexible_datetime, merge_refs, EntityRef, PermissionSummary, RoleSummary};

/// Role as returned by `GET /roles`, with its parent and permissions normalised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRole")]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub parent: Option<RoleSummary>,
    pub permissions: Vec<PermissionSummary>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn summary(&self) -> RoleSummary {
        EntityRef {
            id: Some(self.id),
            name: Some(self.name.clone()),
        }
    }

    /// Whether the role grants `permission`, matched by id or by name
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| p.matches(Some(permission.id), Some(permission.name.as_str())))
    }

    pub fn permission_ids(&self) -> Vec<i64> {
        self.permissions.iter().filter_map(|p| p.id).collect()
    }
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRole {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "parentRole")]
    parent: Option<EntityRef>,
    #[serde(default)]
    parent_id: Option<i64>,
    #[serde_as(as = "Option<OneOrMany<_>>")]
    permissions: Option<Vec<EntityRef>>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    created_at: Option<DateTime<Utc>>,
}

impl From<RawRole> for Role {
    fn from(raw: RawRole) -> Self {
        let parent = raw.parent.or(raw.parent_id.map(EntityRef::from_id));
        Role {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            parent,
            permissions: merge_refs(None, raw.permissions),
            created_at: raw.created_at,
        }
    }
}

/// Create role request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRole {
    #[validate(length(min = 1, message = "Role name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Update role request
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Role name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Body of `POST /roles/{id}/permissions`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPermissions {
    pub permission_ids: Vec<i64>,
}
