//! Typed clients for the library administration REST API

pub mod books;
pub mod borrowings;
pub mod categories;
pub mod client;
pub mod permissions;
pub mod roles;
pub mod users;

pub use client::ApiClient;

/// Container for all resource clients, sharing one connection pool and session
#[derive(Clone, Debug)]
pub struct ApiClients {
    pub books: books::BooksApi,
    pub categories: categories::CategoriesApi,
    pub permissions: permissions::PermissionsApi,
    pub roles: roles::RolesApi,
    pub users: users::UsersApi,
    pub borrowings: borrowings::BorrowingsApi,
}

impl ApiClients {
    pub fn new(client: ApiClient) -> Self {
        Self {
            books: books::BooksApi::new(client.clone()),
            categories: categories::CategoriesApi::new(client.clone()),
            permissions: permissions::PermissionsApi::new(client.clone()),
            roles: roles::RolesApi::new(client.clone()),
            users: users::UsersApi::new(client.clone()),
            borrowings: borrowings::BorrowingsApi::new(client),
        }
    }
}
