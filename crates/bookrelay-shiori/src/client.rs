// SPDX-FileCopyrightText: 2026 Bookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for saving bookmarks to Shiori.
//!
//! [`BookmarkClient`] saves one URL at a time with bounded retries. Rejected
//! tokens are refreshed through the [`SessionManager`]; a token rejected even
//! right after a refresh moves that save on to the next configured way of
//! presenting it. Only a scheme that actually saved carries over to later
//! saves.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bookrelay_config::model::ShioriConfig;
use bookrelay_core::text::truncate;
use bookrelay_core::{AuthScheme, BookmarkRequest, BookmarkSink, RelayError, SaveOutcome};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::session::{Credentials, SessionManager, SessionPolicy};
use crate::types::BookmarkPayload;

/// Header carrying the token for [`AuthScheme::SessionHeader`].
const SESSION_HEADER: &str = "X-Session-Id";

/// Characters of a response body kept in logs and failure reasons.
const BODY_LOG_LIMIT: usize = 100;

/// Login and bookmark URLs derived from the configured API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub bookmarks: String,
}

impl Endpoints {
    /// `base` is the v1 API base, e.g. `http://host:8080/api/v1`. Login lives
    /// under it; bookmarks live under the server root.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        let root = base.strip_suffix("/api/v1").unwrap_or(base);
        Self {
            login: format!("{base}/auth/login"),
            bookmarks: format!("{root}/api/bookmarks"),
        }
    }
}

/// Retry policy for a single save.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per bookmark.
    pub max_retries: u32,
    /// Pause after a transient failure.
    pub retry_delay: Duration,
}

/// How one HTTP response is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Saved,
    Unauthorized,
    Transient,
    Terminal,
}

fn classify(status: StatusCode) -> StatusClass {
    match status.as_u16() {
        200..=299 => StatusClass::Saved,
        401 | 403 => StatusClass::Unauthorized,
        500..=599 => StatusClass::Transient,
        _ => StatusClass::Terminal,
    }
}

/// Result of one request.
enum Attempt {
    Saved,
    Rejected(StatusCode),
    Failed(SaveOutcome),
}

/// Client for the Shiori bookmark endpoint.
#[derive(Debug, Clone)]
pub struct BookmarkClient {
    http: reqwest::Client,
    bookmarks_url: Url,
    session: Arc<SessionManager>,
    policy: RetryPolicy,
    schemes: Arc<[AuthScheme]>,
    /// Index of the last scheme that saved a bookmark.
    preferred: Arc<AtomicUsize>,
}

impl BookmarkClient {
    /// Builds a client and its session manager from configuration.
    ///
    /// Requires `api_url`, `username` and `password` to be set.
    pub fn from_config(config: &ShioriConfig) -> Result<Self, RelayError> {
        let base = required(config.api_url.as_deref(), "shiori.api_url")?;
        let username = required(config.username.as_deref(), "shiori.username")?;
        let password = required(config.password.as_deref(), "shiori.password")?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RelayError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let endpoints = Endpoints::from_base(base);
        let session = SessionManager::new(
            http.clone(),
            endpoints.login.clone(),
            Credentials::new(username, password),
            SessionPolicy {
                ttl: config.session_ttl(),
                max_attempts: config.auth_max_attempts,
                retry_delay: config.auth_retry_delay(),
            },
        );

        Self::new(
            http,
            &endpoints,
            Arc::new(session),
            RetryPolicy {
                max_retries: config.save_max_retries,
                retry_delay: config.save_retry_delay(),
            },
            config.auth_schemes.clone(),
        )
    }

    pub fn new(
        http: reqwest::Client,
        endpoints: &Endpoints,
        session: Arc<SessionManager>,
        policy: RetryPolicy,
        schemes: Vec<AuthScheme>,
    ) -> Result<Self, RelayError> {
        let bookmarks_url = Url::parse(&endpoints.bookmarks).map_err(|e| {
            RelayError::Config(format!(
                "invalid bookmark endpoint `{}`: {e}",
                endpoints.bookmarks
            ))
        })?;
        let schemes: Arc<[AuthScheme]> = if schemes.is_empty() {
            Arc::from(vec![AuthScheme::Bearer])
        } else {
            schemes.into()
        };

        Ok(Self {
            http,
            bookmarks_url,
            session,
            policy,
            schemes,
            preferred: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The session manager shared by every save.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The scheme the next save starts with: the first configured one until
    /// another scheme has saved a bookmark.
    pub fn preferred_scheme(&self) -> AuthScheme {
        self.schemes[self.preferred_index()]
    }

    fn preferred_index(&self) -> usize {
        self.preferred
            .load(Ordering::Acquire)
            .min(self.schemes.len() - 1)
    }

    /// Saves one bookmark. `Ok(false)` covers both rejected requests and
    /// exhausted retries; `Err` means no session could be obtained.
    pub async fn save(&self, request: &BookmarkRequest) -> Result<bool, RelayError> {
        Ok(self.save_outcome(request).await?.is_success())
    }

    /// Saves one bookmark and reports how the last attempt ended.
    pub async fn save_outcome(&self, request: &BookmarkRequest) -> Result<SaveOutcome, RelayError> {
        let payload = BookmarkPayload::new(&request.url, request.excerpt.as_deref());
        let max_retries = self.policy.max_retries.max(1);

        let start = self.preferred_index();
        let mut step = 0;
        let mut attempts = 0;
        let mut fresh_token = false;
        let mut last = SaveOutcome::TransientFailure("no attempt made".into());

        while attempts < max_retries {
            let token = self.session.authenticate(false).await?;
            let idx = (start + step) % self.schemes.len();
            let scheme = self.schemes[idx];

            match self.attempt(&token, scheme, &payload).await {
                Attempt::Saved => {
                    self.preferred.store(idx, Ordering::Release);
                    info!(url = %request.url, scheme = %scheme, "bookmark saved");
                    return Ok(SaveOutcome::Success);
                }
                Attempt::Rejected(status) => {
                    // A brand-new token being refused points at the scheme,
                    // not the token. Switching scheme does not use up an attempt.
                    if fresh_token && step + 1 < self.schemes.len() {
                        step += 1;
                        info!(
                            from = %scheme,
                            to = %self.schemes[(start + step) % self.schemes.len()],
                            "fresh token rejected, switching auth scheme"
                        );
                        continue;
                    }
                    attempts += 1;
                    last = SaveOutcome::TransientFailure(format!("{status} with {scheme} auth"));
                    if attempts < max_retries {
                        warn!(url = %request.url, status = %status, attempt = attempts, "session rejected, re-authenticating");
                        self.session.reauthenticate(&token).await?;
                        fresh_token = true;
                    }
                }
                Attempt::Failed(SaveOutcome::TransientFailure(reason)) => {
                    attempts += 1;
                    fresh_token = false;
                    warn!(url = %request.url, attempt = attempts, reason = %reason, "transient save failure");
                    last = SaveOutcome::TransientFailure(reason);
                    if attempts < max_retries {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
                Attempt::Failed(outcome) => {
                    warn!(url = %request.url, reason = outcome.reason().unwrap_or_default(), "bookmark rejected");
                    return Ok(outcome);
                }
            }
        }

        warn!(
            url = %request.url,
            attempts = max_retries,
            reason = last.reason().unwrap_or_default(),
            "giving up on bookmark after retries"
        );
        Ok(last)
    }

    /// Sends one save request and classifies the answer.
    async fn attempt(&self, token: &str, scheme: AuthScheme, payload: &BookmarkPayload<'_>) -> Attempt {
        let request = match scheme {
            AuthScheme::Bearer => self.http.post(self.bookmarks_url.clone()).bearer_auth(token),
            AuthScheme::QueryToken => {
                let mut url = self.bookmarks_url.clone();
                url.query_pairs_mut().append_pair("token", token);
                self.http.post(url)
            }
            AuthScheme::SessionHeader => self
                .http
                .post(self.bookmarks_url.clone())
                .header(SESSION_HEADER, token),
        };

        let response = match request.json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Failed(SaveOutcome::TransientFailure(format!(
                    "request failed: {e}"
                )));
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %truncate(&body, BODY_LOG_LIMIT), "save response received");

        match classify(status) {
            StatusClass::Saved => Attempt::Saved,
            StatusClass::Unauthorized => Attempt::Rejected(status),
            StatusClass::Transient => Attempt::Failed(SaveOutcome::TransientFailure(format!(
                "{status}: {}",
                truncate(&body, BODY_LOG_LIMIT)
            ))),
            StatusClass::Terminal => Attempt::Failed(SaveOutcome::TerminalFailure(format!(
                "{status}: {}",
                truncate(&body, BODY_LOG_LIMIT)
            ))),
        }
    }
}

#[async_trait]
impl BookmarkSink for BookmarkClient {
    async fn save(&self, request: &BookmarkRequest) -> Result<bool, RelayError> {
        BookmarkClient::save(self, request).await
    }
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, RelayError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RelayError::Config(format!("{key} is required to talk to Shiori")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_strip_api_version_for_bookmarks() {
        let endpoints = Endpoints::from_base("http://shiori.local:8080/api/v1/");
        assert_eq!(endpoints.login, "http://shiori.local:8080/api/v1/auth/login");
        assert_eq!(endpoints.bookmarks, "http://shiori.local:8080/api/bookmarks");
    }

    #[test]
    fn endpoints_without_version_suffix() {
        let endpoints = Endpoints::from_base("https://links.example.org");
        assert_eq!(endpoints.login, "https://links.example.org/auth/login");
        assert_eq!(endpoints.bookmarks, "https://links.example.org/api/bookmarks");
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify(StatusCode::CREATED), StatusClass::Saved);
        assert_eq!(classify(StatusCode::UNAUTHORIZED), StatusClass::Unauthorized);
        assert_eq!(classify(StatusCode::FORBIDDEN), StatusClass::Unauthorized);
        assert_eq!(classify(StatusCode::SERVICE_UNAVAILABLE), StatusClass::Transient);
        assert_eq!(classify(StatusCode::INTERNAL_SERVER_ERROR), StatusClass::Transient);
        assert_eq!(classify(StatusCode::BAD_REQUEST), StatusClass::Terminal);
        assert_eq!(classify(StatusCode::CONFLICT), StatusClass::Terminal);
        assert_eq!(classify(StatusCode::TOO_MANY_REQUESTS), StatusClass::Terminal);
    }

    #[test]
    fn from_config_requires_credentials() {
        let config = ShioriConfig {
            api_url: Some("http://localhost/api/v1".into()),
            ..ShioriConfig::default()
        };
        let err = BookmarkClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("shiori.username"), "got: {err}");
    }
}
