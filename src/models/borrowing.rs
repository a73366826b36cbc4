//! Borrowing (book loan) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::refs::{flexible_datetime, BookSummary, EntityRef, UserSummary};

/// Persisted borrowing status. Overdue is never stored, see [`BorrowingState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Active,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Active => "ACTIVE",
            BorrowStatus::Returned => "RETURNED",
        }
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(BorrowStatus::Active),
            "RETURNED" => Ok(BorrowStatus::Returned),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

/// Display state derived from status and due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowingState {
    Active,
    Overdue,
    Returned,
}

/// Borrowing as returned by `GET /book-borrow`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawBorrowing")]
pub struct Borrowing {
    pub id: i64,
    pub book: Option<BookSummary>,
    pub user: Option<UserSummary>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

impl Borrowing {
    pub fn is_returned(&self) -> bool {
        self.status == BorrowStatus::Returned || self.return_date.is_some()
    }

    /// Overdue means still out with a due date strictly in the past
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_returned() && self.due_date.map(|due| due < now).unwrap_or(false)
    }

    pub fn display_state(&self, now: DateTime<Utc>) -> BorrowingState {
        if self.is_returned() {
            BorrowingState::Returned
        } else if self.is_overdue_at(now) {
            BorrowingState::Overdue
        } else {
            BorrowingState::Active
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBorrowing {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    book: Option<EntityRef>,
    #[serde(default)]
    book_id: Option<i64>,
    #[serde(default)]
    user: Option<EntityRef>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    borrow_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<String>,
}

fn with_fallback_id(reference: Option<EntityRef>, id: Option<i64>) -> Option<EntityRef> {
    match (reference, id) {
        (Some(mut r), id) => {
            if r.id.is_none() {
                r.id = id;
            }
            Some(r)
        }
        (None, id) => id.map(EntityRef::from_id),
    }
}

impl From<RawBorrowing> for Borrowing {
    fn from(raw: RawBorrowing) -> Self {
        let status = raw
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(if raw.return_date.is_some() {
                BorrowStatus::Returned
            } else {
                BorrowStatus::Active
            });

        Borrowing {
            id: raw.id,
            book: with_fallback_id(raw.book, raw.book_id),
            user: with_fallback_id(raw.user, raw.user_id),
            borrow_date: raw.borrow_date,
            due_date: raw.due_date,
            return_date: raw.return_date,
            status,
        }
    }
}

/// Create borrowing request
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowing {
    #[validate(range(min = 1, message = "A book must be selected"))]
    pub book_id: i64,
    #[validate(range(min = 1, message = "A borrower must be selected"))]
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrow_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
}

/// Body of `PATCH /book-borrow/{id}` when returning a book
#[derive(Debug, Clone, Serialize)]
pub struct ReturnBorrowing {
    pub status: BorrowStatus,
}

impl Default for ReturnBorrowing {
    fn default() -> Self {
        Self {
            status: BorrowStatus::Returned,
        }
    }
}
