//! Loaders that fetch everything a screen needs in one go.
//!
//! Reads run concurrently and are joined all-or-nothing: one failed read fails
//! the whole load, and the caller retries the load as a unit.

use chrono::{DateTime, Utc};

use crate::{
    api::ApiClients,
    error::ClientResult,
    models::{Book, Borrowing, BorrowingState, Category, Permission, Role, User},
};

/// Figures shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_titles: usize,
    pub total_copies: i64,
    pub available_copies: i64,
    pub categories: usize,
    pub active_borrowings: usize,
    pub overdue_borrowings: usize,
    pub returned_borrowings: usize,
}

impl DashboardSummary {
    pub async fn load(api: &ApiClients) -> ClientResult<Self> {
        let (books, categories, borrowings) = tokio::try_join!(
            api.books.list(),
            api.categories.list(),
            api.borrowings.list()
        )?;
        Ok(Self::compute(&books, &categories, &borrowings, Utc::now()))
    }

    pub fn compute(
        books: &[Book],
        categories: &[Category],
        borrowings: &[Borrowing],
        now: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self {
            total_titles: books.len(),
            total_copies: books.iter().map(|b| b.total_copies).sum(),
            available_copies: books.iter().map(|b| b.available_quantity).sum(),
            categories: categories.len(),
            ..Default::default()
        };

        for borrowing in borrowings {
            match borrowing.display_state(now) {
                BorrowingState::Active => summary.active_borrowings += 1,
                BorrowingState::Overdue => summary.overdue_borrowings += 1,
                BorrowingState::Returned => summary.returned_borrowings += 1,
            }
        }

        summary
    }

    /// Loans still out, late or not
    pub fn outstanding_borrowings(&self) -> usize {
        self.active_borrowings + self.overdue_borrowings
    }
}

/// Users, roles and permissions as needed by the access-control screens
#[derive(Debug, Clone, Default)]
pub struct RbacSnapshot {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl RbacSnapshot {
    pub async fn load(api: &ApiClients) -> ClientResult<Self> {
        let (users, roles, permissions) = tokio::try_join!(
            api.users.list(),
            api.roles.list(),
            api.permissions.list()
        )?;
        Ok(Self {
            users,
            roles,
            permissions,
        })
    }

    /// Roles granting `permission`
    pub fn roles_with_permission(&self, permission: &Permission) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|role| role.has_permission(permission))
            .collect()
    }

    /// Users holding the role with id `role_id`
    pub fn users_with_role(&self, role_id: i64) -> Vec<&User> {
        self.users
            .iter()
            .filter(|user| user.roles.iter().any(|r| r.id == Some(role_id)))
            .collect()
    }
}
