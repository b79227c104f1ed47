use rusqlite::{Connection, OptionalExtension};
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};
use thiserror::Error;
use crate::models::{AuthSession, User};
use anyhow::{Context, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Account and session failures reported to the user
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Full name cannot be empty")]
    EmptyName,

    #[error("A user with email '{0}' already exists")]
    EmailTaken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not logged in. Run 'parkcrm auth login' first.")]
    NotLoggedIn,
}

/// User accounts and sign-in sessions
pub struct UserRepo;

// Hashed against when the email is unknown, so a miss costs the same as a bad password
const DUMMY_SALT: &str = "00000000000000000000000000000000";

fn password_digest(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn hash_password(salt: &str, password: &str) -> String {
    format!("{}${}", salt, hex::encode(password_digest(salt, password)))
}

/// Recompute the digest under the stored salt and compare in constant time.
/// A stored value without a `salt$hex` shape never matches.
fn verify_password(stored: &str, password: &str) -> bool {
    let (salt, expected) = stored.split_once('$').unwrap_or((DUMMY_SALT, ""));
    let computed = password_digest(salt, password);
    match hex::decode(expected) {
        Ok(expected) => constant_time_eq(&computed, &expected),
        Err(_) => false,
    }
}

/// Minimal shape check: something@domain.tld
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    }
}

impl UserRepo {
    /// Register a new user
    pub fn sign_up(conn: &Connection, email: &str, password: &str, full_name: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let full_name = full_name.trim();
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail(email).into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort.into());
        }
        if full_name.is_empty() {
            return Err(AuthError::EmptyName.into());
        }
        if Self::get_by_email(conn, &email)?.is_some() {
            return Err(AuthError::EmailTaken(email).into());
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO users (email, password_hash, full_name, created_ts) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![email, hash_password(&salt, password), full_name, now],
        )
        .with_context(|| format!("Failed to create user: {}", email))?;

        let id = conn.last_insert_rowid();
        log::info!("Registered user {} ({})", id, email);
        Ok(User {
            id,
            email,
            full_name: full_name.to_string(),
            created_ts: now,
        })
    }

    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        let mut stmt = conn.prepare(
            "SELECT id, email, full_name, created_ts FROM users WHERE email = ?1"
        )?;
        let user = stmt
            .query_row([email.trim().to_lowercase()], |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    full_name: row.get(2)?,
                    created_ts: row.get(3)?,
                })
            })
            .optional()?;
        Ok(user)
    }

    /// Check credentials and open a new session
    pub fn sign_in(conn: &Connection, email: &str, password: &str) -> Result<AuthSession> {
        let email = email.trim().to_lowercase();
        let stored: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                [&email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let verified = match &stored {
            Some((id, hash)) => verify_password(hash, password).then_some(*id),
            None => {
                verify_password(DUMMY_SALT, password);
                None
            }
        };
        let user_id = match verified {
            Some(id) => id,
            None => {
                log::warn!("Failed sign-in attempt for {}", email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO auth_sessions (token, user_id, created_ts) VALUES (?1, ?2, ?3)",
            rusqlite::params![token, user_id, now],
        )
        .context("Failed to create session")?;

        log::info!("User {} signed in", user_id);
        Self::resolve_session(conn, &token)?.ok_or_else(|| AuthError::NotLoggedIn.into())
    }

    /// Look up the user behind a session token
    pub fn resolve_session(conn: &Connection, token: &str) -> Result<Option<AuthSession>> {
        let mut stmt = conn.prepare(
            "SELECT s.token, s.created_ts, u.id, u.email, u.full_name, u.created_ts
             FROM auth_sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1"
        )?;
        let session = stmt
            .query_row([token], |row| {
                Ok(AuthSession {
                    token: row.get(0)?,
                    created_ts: row.get(1)?,
                    user: User {
                        id: row.get(2)?,
                        email: row.get(3)?,
                        full_name: row.get(4)?,
                        created_ts: row.get(5)?,
                    },
                })
            })
            .optional()?;
        Ok(session)
    }

    /// Close a session. Unknown tokens are ignored.
    pub fn sign_out(conn: &Connection, token: &str) -> Result<()> {
        let deleted = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        if deleted > 0 {
            log::info!("Session closed");
        }
        Ok(())
    }
}
