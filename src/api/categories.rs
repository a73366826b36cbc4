//! Category client (`/categories`)

use validator::Validate;

use super::client::ApiClient;
use crate::{
    error::ClientResult,
    models::category::{Category, CreateCategory, UpdateCategory},
};

const RESOURCE: &str = "categories";

#[derive(Clone, Debug)]
pub struct CategoriesApi {
    client: ApiClient,
}

impl CategoriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Vec<Category>> {
        self.client.get_list("Get categories", &[RESOURCE]).await
    }

    pub async fn create(&self, category: &CreateCategory) -> ClientResult<Category> {
        category.validate()?;
        self.client.post("Create category", &[RESOURCE], category).await
    }

    pub async fn update(&self, category_id: i64, category: &UpdateCategory) -> ClientResult<Category> {
        category.validate()?;
        self.client
            .patch("Update category", &[RESOURCE, category_id.to_string().as_str()], category)
            .await
    }

    pub async fn delete(&self, category_id: i64) -> ClientResult<bool> {
        self.client
            .delete("Delete category", &[RESOURCE, category_id.to_string().as_str()])
            .await
    }
}
