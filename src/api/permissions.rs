//! Permission client (`/permissions`)

use validator::Validate;

use super::client::ApiClient;
use crate::{
    error::ClientResult,
    models::permission::{CreatePermission, Permission, UpdatePermission},
};

const RESOURCE: &str = "permissions";

#[derive(Clone, Debug)]
pub struct PermissionsApi {
    client: ApiClient,
}

impl PermissionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Vec<Permission>> {
        self.client.get_list("Get permissions", &[RESOURCE]).await
    }

    pub async fn create(&self, permission: &CreatePermission) -> ClientResult<Permission> {
        permission.validate()?;
        self.client.post("Create permission", &[RESOURCE], permission).await
    }

    pub async fn update(&self, permission_id: i64, permission: &UpdatePermission) -> ClientResult<Permission> {
        permission.validate()?;
        self.client
            .patch("Update permission", &[RESOURCE, permission_id.to_string().as_str()], permission)
            .await
    }

    pub async fn delete(&self, permission_id: i64) -> ClientResult<bool> {
        self.client
            .delete("Delete permission", &[RESOURCE, permission_id.to_string().as_str()])
            .await
    }
}
