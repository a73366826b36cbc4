//! Library Console
//!
//! Typed client for the library and role-based access control administration
//! API: books, categories, borrowings, users, roles and permissions, plus the
//! session handling and route guard that front the protected screens.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod session;
pub mod views;

pub use config::AppConfig;
pub use error::{AssignmentError, ClientError, ClientResult, ErrorKind};

/// Everything a console front-end needs, wired from configuration
#[derive(Clone)]
pub struct Console {
    pub config: Arc<AppConfig>,
    pub session: session::Session,
    pub api: Arc<api::ApiClients>,
    pub guard: guard::RouteGuard,
}

impl Console {
    /// Build the console around an explicit session
    pub fn new(config: AppConfig, session: session::Session) -> ClientResult<Self> {
        let client = api::ApiClient::new(&config.api, session.clone())?;
        let guard = guard::RouteGuard::new(session.clone(), config.guard.login_path.clone());

        Ok(Self {
            config: Arc::new(config),
            session,
            api: Arc::new(api::ApiClients::new(client)),
            guard,
        })
    }

    /// Build the console with the file-backed session named in the configuration
    pub fn from_config(config: AppConfig) -> ClientResult<Self> {
        let store = session::FileTokenStore::new(config.session.store_path.clone());
        Self::new(config, session::Session::new(Arc::new(store)))
    }

    /// React to a server-side 401: drop the session so the next navigation hits login
    pub fn handle_unauthorized(&self, error: &ClientError) -> bool {
        if !error.is_unauthorized() {
            return false;
        }
        if let Err(e) = self.session.logout() {
            tracing::warn!("Failed to clear session after 401: {}", e);
        }
        true
    }
}
