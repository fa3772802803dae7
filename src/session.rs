//! Login sessions.
//!
//! Sessions live in a token-keyed table. With the default single-session
//! policy a successful login drops every other session, so at most one
//! identity is logged in at any time.
//!
//! ```text
//!   Anonymous ──login ok──▶ Authenticated ──request ok──▶ Authenticated
//!                                 │
//!                                 └─ window elapsed / origin or user mismatch ─▶ Expired
//! ```

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::distributions::{Alphanumeric, DistString};
use thiserror::Error;

/// Cookie carrying the logged-in user name.
pub const USERNAME_COOKIE: &str = "Username";
/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "SessionID";

/// A session is dropped when it has not been used for this long.
pub const SESSION_TTL: Duration = Duration::from_secs(15 * 60);

const TOKEN_LEN: usize = 32;

/// The one username/password pair allowed to log in.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
    pub origin: IpAddr,
    pub last_access: Instant,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("username or password missing")]
    MissingCredentials,
    #[error("bad credentials for user {username:?}")]
    BadCredentials { username: String },
}

/// Outcome of checking a request's cookies against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(Session),
    /// No session cookies, or a token the store does not know.
    Anonymous,
    /// The session was idle longer than the validity window.
    Expired,
    /// The token was presented from another address than it was issued to.
    OriginMismatch,
    /// The token does not belong to the presented user name.
    UserMismatch,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

pub struct SessionStore {
    credentials: Credentials,
    ttl: Duration,
    single_session: bool,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ttl: SESSION_TTL,
            single_session: true,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Allows several sessions to coexist instead of replacing the previous one.
    pub fn allow_concurrent_sessions(mut self) -> Self {
        self.single_session = false;
        self
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    pub fn authenticate(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        origin: IpAddr,
    ) -> Result<Session, AuthFailure> {
        self.authenticate_at(username, password, origin, Instant::now())
    }

    /// Checks the credentials and, on success, issues a fresh session bound
    /// to `origin`.
    pub fn authenticate_at(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        origin: IpAddr,
        now: Instant,
    ) -> Result<Session, AuthFailure> {
        let (Some(username), Some(password)) = (username, password) else {
            return Err(AuthFailure::MissingCredentials);
        };

        if username != self.credentials.username || password != self.credentials.password {
            tracing::info!(user = %username, %origin, "login rejected");
            return Err(AuthFailure::BadCredentials {
                username: username.to_string(),
            });
        }

        let session = Session {
            username: username.to_string(),
            token: Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LEN),
            origin,
            last_access: now,
        };

        let mut sessions = self.lock();
        if self.single_session {
            sessions.clear();
        }
        sessions.insert(session.token.clone(), session.clone());
        tracing::info!(user = %username, %origin, "login accepted");

        Ok(session)
    }

    pub fn validate(&self, cookies: &HashMap<String, String>, origin: IpAddr) -> Validation {
        self.validate_at(cookies, origin, Instant::now())
    }

    /// Looks up the session named by the `Username`/`SessionID` cookies.
    ///
    /// A valid session has its last-access time refreshed. An expired or
    /// mismatching session is removed, so later requests presenting the same
    /// token are anonymous until the next login.
    pub fn validate_at(
        &self,
        cookies: &HashMap<String, String>,
        origin: IpAddr,
        now: Instant,
    ) -> Validation {
        let (Some(username), Some(token)) = (cookies.get(USERNAME_COOKIE), cookies.get(SESSION_COOKIE))
        else {
            return Validation::Anonymous;
        };

        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(token) else {
            return Validation::Anonymous;
        };

        let outcome = if now.saturating_duration_since(session.last_access) > self.ttl {
            Validation::Expired
        } else if session.origin != origin {
            Validation::OriginMismatch
        } else if &session.username != username {
            Validation::UserMismatch
        } else {
            session.last_access = now;
            return Validation::Valid(session.clone());
        };

        tracing::info!(user = %session.username, %origin, ?outcome, "session dropped");
        sessions.remove(token);
        outcome
    }

    /// Removes the session named by the request cookies. Returns whether a
    /// session was removed.
    pub fn logout(&self, cookies: &HashMap<String, String>) -> bool {
        let Some(token) = cookies.get(SESSION_COOKIE) else {
            return false;
        };
        self.lock().remove(token).is_some()
    }

    /// Drops sessions idle for longer than the validity window and returns
    /// how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_access) <= self.ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
