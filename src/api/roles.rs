//! Role client (`/roles`) and the current-session endpoint

use validator::Validate;

use super::client::ApiClient;
use crate::{
    error::ClientResult,
    models::{
        role::{AssignPermissions, CreateRole, Role, UpdateRole},
        user::CurrentUser,
    },
};

const RESOURCE: &str = "roles";

#[derive(Clone, Debug)]
pub struct RolesApi {
    client: ApiClient,
}

impl RolesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get the authenticated user and their role
    pub async fn current_user(&self) -> ClientResult<CurrentUser> {
        self.client.get("Get current user", &["users", "me"]).await
    }

    pub async fn list(&self) -> ClientResult<Vec<Role>> {
        self.client.get_list("Get roles", &[RESOURCE]).await
    }

    pub async fn create(&self, role: &CreateRole) -> ClientResult<Role> {
        role.validate()?;
        self.client.post("Create role", &[RESOURCE], role).await
    }

    pub async fn update(&self, role_id: i64, role: &UpdateRole) -> ClientResult<Role> {
        role.validate()?;
        self.client
            .patch("Update role", &[RESOURCE, role_id.to_string().as_str()], role)
            .await
    }

    pub async fn delete(&self, role_id: i64) -> ClientResult<bool> {
        self.client
            .delete("Delete role", &[RESOURCE, role_id.to_string().as_str()])
            .await
    }

    /// Replace the permission set granted to a role
    pub async fn assign_permissions(&self, role_id: i64, permission_ids: &[i64]) -> ClientResult<Role> {
        let body = AssignPermissions {
            permission_ids: permission_ids.to_vec(),
        };
        self.client
            .post(
                "Assign permissions",
                &[RESOURCE, role_id.to_string().as_str(), "permissions"],
                &body,
            )
            .await
    }
}
