//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, OneOrMany};
use std::collections::BTreeSet;
use validator::Validate;

use super::refs::{flexible_datetime, merge_refs, EntityRef, RoleSummary};

/// User as returned by `GET /users` and `GET /users/me`.
///
/// The API sends either a single `role` or a `roles` collection; both are
/// merged into `roles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawUser")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub roles: Vec<RoleSummary>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Ids of the roles currently held, for diffing against a new selection
    pub fn role_ids(&self) -> BTreeSet<i64> {
        self.roles.iter().filter_map(|r| r.id).collect()
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name.as_deref() == Some(name))
    }

    /// The first role, as shown on single-role screens
    pub fn primary_role(&self) -> Option<&RoleSummary> {
        self.roles.first()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

/// The authenticated user behind the current session
pub type CurrentUser = User;

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    email: String,
    #[serde(default, alias = "username")]
    name: Option<String>,
    #[serde(default)]
    role: Option<EntityRef>,
    #[serde_as(as = "Option<OneOrMany<_>>")]
    roles: Option<Vec<EntityRef>>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    created_at: Option<DateTime<Utc>>,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User {
            id: raw.id,
            email: raw.email,
            name: raw.name,
            roles: merge_refs(raw.role, raw.roles),
            created_at: raw.created_at,
        }
    }
}

/// Create user request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Write-only, never returned by the API
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
}

/// Update user request
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body returned by a role assignment; an unreadable body reads as `{}`
pub type RoleAssignment = Map<String, Value>;

/// A single step of a role update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Add(i64),
    Remove(i64),
}

impl RoleChange {
    pub fn role_id(&self) -> i64 {
        match self {
            RoleChange::Add(id) | RoleChange::Remove(id) => *id,
        }
    }
}

impl std::fmt::Display for RoleChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleChange::Add(id) => write!(f, "add role {}", id),
            RoleChange::Remove(id) => write!(f, "remove role {}", id),
        }
    }
}

/// Difference between the roles a user holds and a new selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDiff {
    pub to_remove: Vec<i64>,
    pub to_add: Vec<i64>,
}

impl RoleDiff {
    /// Ids held but not selected are removed, ids selected but not held are added.
    /// Both lists come out in ascending order.
    pub fn compute(current: &BTreeSet<i64>, selected: &BTreeSet<i64>) -> Self {
        Self {
            to_remove: current.difference(selected).copied().collect(),
            to_add: selected.difference(current).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Removals first, then additions
    pub fn changes(&self) -> Vec<RoleChange> {
        self.to_remove
            .iter()
            .map(|id| RoleChange::Remove(*id))
            .chain(self.to_add.iter().map(|id| RoleChange::Add(*id)))
            .collect()
    }
}
