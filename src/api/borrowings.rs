//! Borrow/return client (`/book-borrow`)

use validator::Validate;

use super::client::ApiClient;
use crate::{
    error::ClientResult,
    models::borrowing::{Borrowing, CreateBorrowing, ReturnBorrowing},
};

const RESOURCE: &str = "book-borrow";

#[derive(Clone, Debug)]
pub struct BorrowingsApi {
    client: ApiClient,
}

impl BorrowingsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get all book borrowings
    pub async fn list(&self) -> ClientResult<Vec<Borrowing>> {
        self.client.get_list("Get borrowings", &[RESOURCE]).await
    }

    /// Lend a book to a user
    pub async fn create(&self, borrowing: &CreateBorrowing) -> ClientResult<Borrowing> {
        borrowing.validate()?;
        self.client.post("Create borrowing", &[RESOURCE], borrowing).await
    }

    /// Mark a borrowing as returned
    pub async fn return_book(&self, borrowing_id: i64) -> ClientResult<Borrowing> {
        self.client
            .patch(
                "Return book",
                &[RESOURCE, borrowing_id.to_string().as_str()],
                &ReturnBorrowing::default(),
            )
            .await
    }
}
