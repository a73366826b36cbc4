//! Normalised references to related entities.
//!
//! The API is inconsistent about how it embeds relations: a role may come back
//! as a nested object, a bare numeric id or just its name, and the same holds
//! for permissions and categories. Everything is folded into [`EntityRef`] here
//! so callers never have to inspect the raw shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reference to a related entity, by id and/or display name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRef")]
pub struct EntityRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub type RoleSummary = EntityRef;
pub type PermissionSummary = EntityRef;
pub type CategorySummary = EntityRef;
pub type BookSummary = EntityRef;
pub type UserSummary = EntityRef;

impl EntityRef {
    pub fn from_id(id: i64) -> Self {
        Self { id: Some(id), name: None }
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Self { id: None, name: Some(name.into()) }
    }

    /// True when this reference points at `id` or is named `name`
    pub fn matches(&self, id: Option<i64>, name: Option<&str>) -> bool {
        match (self.id, id) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.name.as_deref(), name) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Best human-readable label
    pub fn label(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => String::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRef {
    Id(i64),
    Name(String),
    Object {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default, alias = "title", alias = "email")]
        name: Option<String>,
    },
}

impl From<RawRef> for EntityRef {
    fn from(raw: RawRef) -> Self {
        match raw {
            RawRef::Id(id) => EntityRef::from_id(id),
            RawRef::Name(name) => match name.trim().parse::<i64>() {
                Ok(id) => EntityRef::from_id(id),
                Err(_) => EntityRef::from_name(name),
            },
            RawRef::Object { id, name } => EntityRef { id, name },
        }
    }
}

/// Merge a single reference and a collection, dropping duplicates but keeping order
pub(crate) fn merge_refs(single: Option<EntityRef>, many: Option<Vec<EntityRef>>) -> Vec<EntityRef> {
    let mut merged: Vec<EntityRef> = Vec::new();
    for r in single.into_iter().chain(many.unwrap_or_default()) {
        if r.id.is_none() && r.name.is_none() {
            continue;
        }
        if !merged.iter().any(|m| m.matches(r.id, r.name.as_deref())) {
            merged.push(r);
        }
    }
    merged
}

/// Epoch numbers above this are taken as milliseconds
const EPOCH_MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// Timestamps are informational: RFC 3339, offset-less date-times (read as UTC),
/// bare `YYYY-MM-DD` dates and epoch numbers are accepted. Anything else
/// becomes `None` instead of failing the whole record.
pub(crate) fn flexible_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    let parsed = match &raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => parse_datetime(s.trim()),
        Some(Value::Number(n)) => n.as_f64().and_then(from_epoch),
        Some(_) => None,
    };

    if parsed.is_none() {
        tracing::warn!("Ignoring unreadable timestamp {}", raw.unwrap_or(serde_json::Value::Null));
    }
    Ok(parsed)
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() >= EPOCH_MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    Utc.timestamp_millis_opt(millis as i64).single()
}
