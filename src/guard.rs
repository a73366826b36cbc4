//! Client-side route guard for protected views.
//!
//! The check is local only: it never asks the server whether the token was
//! revoked. Its purpose is to skip requests that are bound to fail with 401.

use chrono::{DateTime, Utc};

use crate::session::{decode_claims, Session};

/// Why a navigation was sent to the login view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    MissingToken,
    MalformedToken,
    ExpiredToken,
}

impl std::fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RedirectReason::MissingToken => "no session token",
            RedirectReason::MalformedToken => "session token is malformed",
            RedirectReason::ExpiredToken => "session token has expired",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the protected view unchanged
    Render,
    /// Go to `to`; `from` is the attempted location for post-login return
    Redirect {
        to: String,
        from: String,
        reason: RedirectReason,
    },
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }
}

#[derive(Clone, Debug)]
pub struct RouteGuard {
    session: Session,
    login_path: String,
}

impl RouteGuard {
    pub fn new(session: Session, login_path: impl Into<String>) -> Self {
        Self {
            session,
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decide whether `location` may render right now
    pub fn check(&self, location: &str) -> GuardDecision {
        self.check_at(location, Utc::now())
    }

    pub fn check_at(&self, location: &str, now: DateTime<Utc>) -> GuardDecision {
        let Some(token) = self.session.token() else {
            tracing::debug!("No token found, redirecting {} to login", location);
            return self.redirect(location, RedirectReason::MissingToken);
        };

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("Invalid token format ({}), removing it", e);
                self.purge();
                return self.redirect(location, RedirectReason::MalformedToken);
            }
        };

        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        if claims.is_expired_at(now_secs) {
            tracing::warn!("Token expired at {}, removing it", claims.exp);
            self.purge();
            return self.redirect(location, RedirectReason::ExpiredToken);
        }

        tracing::debug!("Token valid until {}, allowing {}", claims.exp, location);
        GuardDecision::Render
    }

    fn purge(&self) {
        if let Err(e) = self.session.logout() {
            tracing::warn!("Failed to remove session token: {}", e);
        }
    }

    fn redirect(&self, location: &str, reason: RedirectReason) -> GuardDecision {
        GuardDecision::Redirect {
            to: self.login_path.clone(),
            from: location.to_string(),
            reason,
        }
    }
}
