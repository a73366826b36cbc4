//! Book catalog client (`/book`)

use validator::Validate;

use super::client::ApiClient;
use crate::{
    error::ClientResult,
    models::book::{Book, CreateBook, UpdateBook},
};

const RESOURCE: &str = "book";

#[derive(Clone, Debug)]
pub struct BooksApi {
    client: ApiClient,
}

impl BooksApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get all books
    pub async fn list(&self) -> ClientResult<Vec<Book>> {
        self.client.get_list("Get books", &[RESOURCE]).await
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> ClientResult<Book> {
        book.validate()?;
        self.client.post("Create book", &[RESOURCE], book).await
    }

    /// Update an existing book
    pub async fn update(&self, book_id: i64, book: &UpdateBook) -> ClientResult<Book> {
        book.validate()?;
        self.client
            .patch("Update book", &[RESOURCE, book_id.to_string().as_str()], book)
            .await
    }

    /// Delete a book
    pub async fn delete(&self, book_id: i64) -> ClientResult<bool> {
        self.client
            .delete("Delete book", &[RESOURCE, book_id.to_string().as_str()])
            .await
    }
}
