// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle against the Shiori login endpoint.
//!
//! [`SessionManager`] owns the one session token the process uses. The token
//! is reused until its local time-to-live runs out, refreshed on demand, and
//! replaced in a single critical section so that callers racing on an expired
//! token trigger only one login.

use std::time::{Duration, Instant};

use bookrelay_core::RelayError;
use bookrelay_core::text::truncate;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{LoginRequest, LoginResponse};

/// Username and password for the bookmarking service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Expiry and retry policy for logins.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// How long an issued token is trusted without asking the server.
    pub ttl: Duration,
    /// Login attempts before giving up.
    pub max_attempts: u32,
    /// Pause between failed login attempts.
    pub retry_delay: Duration,
}

#[derive(Debug)]
struct Session {
    token: String,
    issued_at: Instant,
}

impl Session {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() < ttl
    }
}

/// Owner of the Shiori session token.
#[derive(Debug)]
pub struct SessionManager {
    http: reqwest::Client,
    login_url: String,
    credentials: Credentials,
    policy: SessionPolicy,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(
        http: reqwest::Client,
        login_url: String,
        credentials: Credentials,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            http,
            login_url,
            credentials,
            policy,
            session: Mutex::new(None),
        }
    }

    /// Returns a usable session token.
    ///
    /// Without `force`, a token younger than the TTL is returned without any
    /// network call. Otherwise a login is performed, with retries, and the new
    /// token replaces the old one.
    pub async fn authenticate(&self, force: bool) -> Result<String, RelayError> {
        let mut session = self.session.lock().await;

        if !force
            && let Some(current) = session.as_ref()
            && current.is_fresh(self.policy.ttl)
        {
            return Ok(current.token.clone());
        }

        let token = self.login().await?;
        *session = Some(Session {
            token: token.clone(),
            issued_at: Instant::now(),
        });
        Ok(token)
    }

    /// Replaces a token the server has just rejected.
    ///
    /// If another caller already swapped `rejected` for a newer token, that
    /// token is returned and no login is made.
    pub async fn reauthenticate(&self, rejected: &str) -> Result<String, RelayError> {
        let mut session = self.session.lock().await;

        if let Some(current) = session.as_ref()
            && current.token != rejected
            && current.is_fresh(self.policy.ttl)
        {
            debug!("session already refreshed by another caller");
            return Ok(current.token.clone());
        }

        let token = self.login().await?;
        *session = Some(Session {
            token: token.clone(),
            issued_at: Instant::now(),
        });
        Ok(token)
    }

    /// Performs the login request, retrying non-200 answers and transport errors.
    async fn login(&self) -> Result<String, RelayError> {
        let body = LoginRequest {
            username: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
            remember: true,
        };

        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.retry_delay).await;
            }

            debug!(attempt, url = %self.login_url, "logging in to Shiori");
            let response = match self.http.post(&self.login_url).json(&body).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(attempt, error = %e, "login request failed");
                    last_error = Some(RelayError::Auth {
                        message: format!("login request failed: {e}"),
                        status: None,
                        source: Some(Box::new(e)),
                    });
                    continue;
                }
            };

            let status = response.status();
            if status != reqwest::StatusCode::OK {
                let text = response.text().await.unwrap_or_default();
                let text = truncate(&text, 100);
                warn!(attempt, status = %status, body = %text, "login rejected");
                last_error = Some(RelayError::Auth {
                    message: format!("login returned {status}: {text}"),
                    status: Some(status.as_u16()),
                    source: None,
                });
                continue;
            }

            let parsed = match response.json::<serde_json::Value>().await {
                Ok(value) => LoginResponse(value),
                Err(e) => {
                    warn!(attempt, error = %e, "login response is not JSON");
                    last_error = Some(RelayError::Auth {
                        message: format!("unreadable login response: {e}"),
                        status: Some(status.as_u16()),
                        source: Some(Box::new(e)),
                    });
                    continue;
                }
            };

            return match parsed.token() {
                Some(token) => {
                    info!("authenticated with Shiori");
                    Ok(token.to_string())
                }
                // A well-formed answer without a token will not change on retry.
                None => Err(RelayError::Auth {
                    message: "login succeeded but the response carried no session token"
                        .into(),
                    status: Some(status.as_u16()),
                    source: None,
                }),
            };
        }

        Err(last_error.unwrap_or_else(|| RelayError::Auth {
            message: "login failed".into(),
            status: None,
            source: None,
        }))
    }
}
