//! Backend Client
//!
//! Thin typed bindings for the hosted backend: rows, blob storage, auth,
//! and the realtime channel. One client is created by the app root and
//! provided via context; nothing here is a global singleton.

pub mod auth;
pub mod error;
pub mod realtime;
pub mod rows;
pub mod storage;

use leptos::prelude::*;
use serde::de::DeserializeOwned;

use crate::config::Config;
use auth::Session;
pub use error::ApiError;

#[derive(Clone)]
pub struct Supabase {
    pub config: Config,
    /// Installed session, if any. Doubles as the auth-state-change push
    /// channel: every install/clear runs through this signal.
    session: RwSignal<Option<Session>>,
}

impl Supabase {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session: RwSignal::new(None),
        }
    }

    /// Reactive handle to the installed session.
    pub fn session(&self) -> RwSignal<Option<Session>> {
        self.session
    }

    /// Bearer token for requests: the session's access token, or the anon
    /// key while signed out.
    pub(crate) fn access_token(&self) -> String {
        self.session
            .get_untracked()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    pub(crate) fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.config.anon_key.clone())
            .bearer_auth(self.access_token())
    }
}

pub(crate) fn http() -> reqwest::Client {
    reqwest::Client::new()
}

/// Check the status, then deserialize. Non-2xx carries the backend's own
/// message; a body that does not match `T` is a decode error, not trusted.
pub(crate) async fn expect_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(error::backend_error(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like `expect_json` for endpoints whose body we don't care about.
pub(crate) async fn expect_ok(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(error::backend_error(status.as_u16(), &body))
}
