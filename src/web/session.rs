//! Session extraction for handlers.

use super::server::AppState;
use crate::auth::{bearer_token, cookie_value};
use crate::error::AppError;
use crate::types::Session;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;

/// The caller's session, if any. Handlers decide whether it is required.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn get(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

/// Bearer header first, then the session cookie.
pub fn session_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    if from_header.is_some() {
        return from_header;
    }
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|header| cookie_value(header, cookie_name))
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts, state.cookie_name()) else {
            return Ok(CurrentSession(None));
        };
        let session = state.auth().session(token)?;
        if session.is_none() {
            tracing::debug!("Unknown or expired session token");
        }
        Ok(CurrentSession(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/tasks");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn header_wins_over_cookie() {
        let p = parts(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "devboard.session-token=from-cookie"),
        ]);
        assert_eq!(
            session_token(&p, "devboard.session-token"),
            Some("from-header")
        );
    }

    #[test]
    fn falls_back_to_named_cookie() {
        let p = parts(&[("cookie", "theme=dark; devboard.session-token=abc")]);
        assert_eq!(session_token(&p, "devboard.session-token"), Some("abc"));
        assert_eq!(session_token(&p, "other"), None);
    }

    #[test]
    fn no_credentials() {
        assert_eq!(session_token(&parts(&[]), "devboard.session-token"), None);
    }
}
