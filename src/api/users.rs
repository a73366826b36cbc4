//! User client (`/users`) and role assignment flows

use std::collections::BTreeSet;
use validator::Validate;

use super::client::ApiClient;
use crate::{
    error::{AssignmentError, ClientResult},
    models::user::{CreateUser, RoleAssignment, RoleChange, RoleDiff, UpdateUser, User},
};

const RESOURCE: &str = "users";

#[derive(Clone, Debug)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get all users. An unreadable body yields an empty list.
    pub async fn list(&self) -> ClientResult<Vec<User>> {
        tracing::debug!("Fetching users");
        let users: Vec<User> = self.client.get_list_lenient("Get users", &[RESOURCE]).await?;
        tracing::debug!("Fetched {} users", users.len());
        Ok(users)
    }

    pub async fn create(&self, user: &CreateUser) -> ClientResult<User> {
        user.validate()?;
        self.client.post("Create user", &[RESOURCE], user).await
    }

    pub async fn update(&self, user_id: i64, user: &UpdateUser) -> ClientResult<User> {
        user.validate()?;
        self.client
            .patch("Update user", &[RESOURCE, user_id.to_string().as_str()], user)
            .await
    }

    pub async fn delete(&self, user_id: i64) -> ClientResult<bool> {
        self.client
            .delete("Delete user", &[RESOURCE, user_id.to_string().as_str()])
            .await
    }

    /// Grant a single role
    pub async fn assign_role(&self, user_id: i64, role_id: i64) -> ClientResult<RoleAssignment> {
        tracing::info!("Assigning role {} to user {}", role_id, user_id);
        self.client
            .post_empty_lenient(
                "Assign role",
                &[
                    RESOURCE,
                    user_id.to_string().as_str(),
                    "role",
                    role_id.to_string().as_str(),
                ],
            )
            .await
    }

    /// Revoke a single role
    pub async fn remove_role(&self, user_id: i64, role_id: i64) -> ClientResult<bool> {
        tracing::info!("Removing role {} from user {}", role_id, user_id);
        self.client
            .delete(
                "Remove role",
                &[
                    RESOURCE,
                    user_id.to_string().as_str(),
                    "role",
                    role_id.to_string().as_str(),
                ],
            )
            .await
    }

    /// Grant several roles one request at a time, in the given order.
    ///
    /// Stops at the first failure. Roles granted before it stay granted.
    pub async fn assign_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
    ) -> Result<Vec<RoleAssignment>, AssignmentError> {
        let changes: Vec<RoleChange> = role_ids.iter().map(|id| RoleChange::Add(*id)).collect();
        let results = self.apply_in_order(user_id, &changes).await?;
        tracing::info!("Assigned {} role(s) to user {}", results.len(), user_id);
        Ok(results)
    }

    /// Move a user from `current` roles to `selected` roles, touching only the difference.
    ///
    /// Removals run before additions. No rollback on partial failure.
    pub async fn update_roles(
        &self,
        user_id: i64,
        current: &BTreeSet<i64>,
        selected: &BTreeSet<i64>,
    ) -> Result<RoleDiff, AssignmentError> {
        let diff = RoleDiff::compute(current, selected);
        if diff.is_empty() {
            tracing::debug!("Roles of user {} unchanged", user_id);
            return Ok(diff);
        }

        self.apply_in_order(user_id, &diff.changes()).await?;
        tracing::info!(
            "Updated roles of user {}: -{:?} +{:?}",
            user_id,
            diff.to_remove,
            diff.to_add
        );
        Ok(diff)
    }

    async fn apply(&self, user_id: i64, change: RoleChange) -> ClientResult<Option<RoleAssignment>> {
        match change {
            RoleChange::Add(role_id) => self.assign_role(user_id, role_id).await.map(Some),
            RoleChange::Remove(role_id) => self.remove_role(user_id, role_id).await.map(|_| None),
        }
    }

    async fn apply_in_order(
        &self,
        user_id: i64,
        changes: &[RoleChange],
    ) -> Result<Vec<RoleAssignment>, AssignmentError> {
        let mut results = Vec::with_capacity(changes.len());

        for (idx, change) in changes.iter().enumerate() {
            match self.apply(user_id, *change).await {
                Ok(Some(body)) => results.push(body),
                Ok(None) => {}
                Err(source) => {
                    tracing::error!("Role update for user {} stopped at {}: {}", user_id, change, source);
                    return Err(AssignmentError {
                        user_id,
                        applied: changes[..idx].to_vec(),
                        failed: *change,
                        skipped: changes[idx + 1..].to_vec(),
                        source,
                    });
                }
            }
        }

        Ok(results)
    }
}
