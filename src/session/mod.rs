//! Session lifecycle around the persisted access token

pub mod store;
pub mod token;

use std::sync::Arc;

use crate::error::ClientResult;

pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{decode_claims, TokenClaims, TokenError};

/// Storage key of the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Handle to the current session, passed explicitly to API clients and the guard.
///
/// Created at login, cleared at logout or when the token is found expired.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Session backed by a process-local store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Current bearer token, if any. Store failures read as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn login(&self, token: &str) -> ClientResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, token)?;
        tracing::info!("Session token stored");
        Ok(())
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        tracing::info!("Session token cleared");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
