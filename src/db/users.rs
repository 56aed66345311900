//! Users and sessions, as written by the auth collaborator.

use super::{Database, new_id, now_ms};
use crate::types::{Session, User};
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        image: row.get("image")?,
    })
}

impl Database {
    /// Register a user. Emails are unique.
    pub fn create_user(
        &self,
        name: Option<&str>,
        email: &str,
        image: Option<&str>,
    ) -> Result<User> {
        let user = User {
            id: new_id(),
            name: name.map(str::to_string),
            email: email.trim().to_lowercase(),
            image: image.map(str::to_string),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, image, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![&user.id, &user.name, &user.email, &user.image, now_ms()],
            )?;
            Ok(())
        })?;

        Ok(user)
    }

    /// Look up a user by id.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT id, name, email, image FROM users WHERE id = ?1",
                    params![user_id],
                    parse_user_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Look up a user by email (case-insensitive).
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT id, name, email, image FROM users WHERE email = ?1",
                    params![email],
                    parse_user_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Issue a new session token for a user, valid for `ttl_ms`.
    pub fn create_session(&self, user_id: &str, ttl_ms: i64) -> Result<Session> {
        let now = now_ms();
        let token = new_id();
        let expires = now + ttl_ms;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![&token, user_id, expires, now],
            )?;
            Ok(())
        })?;

        let user = self
            .get_user(user_id)?
            .ok_or_else(|| anyhow::anyhow!("user vanished while creating session: {}", user_id))?;

        Ok(Session {
            token,
            user,
            expires,
        })
    }

    /// Resolve a token to its session if it has not expired at `now`.
    pub fn find_session(&self, token: &str, now: i64) -> Result<Option<Session>> {
        self.with_conn(|conn| {
            let session = conn
                .query_row(
                    "SELECT s.token, s.expires_at, u.id, u.name, u.email, u.image
                     FROM sessions s JOIN users u ON u.id = s.user_id
                     WHERE s.token = ?1 AND s.expires_at > ?2",
                    params![token, now],
                    |row| {
                        Ok(Session {
                            token: row.get("token")?,
                            expires: row.get("expires_at")?,
                            user: parse_user_row(row)?,
                        })
                    },
                )
                .optional()?;
            Ok(session)
        })
    }

    /// Revoke a session token. Returns true if it existed.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(deleted > 0)
        })
    }

    /// Drop sessions that expired before `now`.
    pub fn purge_expired_sessions(&self, now: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![now],
            )?;
            Ok(deleted)
        })
    }
}
