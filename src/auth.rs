//! Session lookup.
//!
//! Identity is owned by an external auth collaborator; DevBoard only resolves
//! an opaque session token to the signed-in user so queries can be scoped.

use crate::db::{Database, now_ms};
use crate::error::{AppError, AppResult};
use crate::types::Session;

/// Resolves session tokens.
pub trait AuthProvider: Send + Sync {
    /// Return the live session for `token`, or `None` if unknown or expired.
    fn session(&self, token: &str) -> anyhow::Result<Option<Session>>;
}

impl AuthProvider for Database {
    fn session(&self, token: &str) -> anyhow::Result<Option<Session>> {
        self.find_session(token, now_ms())
    }
}

/// Require a session, failing with `Unauthorized` before any store access.
pub fn require_session(session: Option<&Session>) -> AppResult<&Session> {
    session.ok_or_else(AppError::unauthorized)
}

/// Extract a session token from an `Authorization: Bearer` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extract a named cookie from a `Cookie` header value.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
