//! Auth API
//!
//! GoTrue bindings: magic-link issuance, session retrieval, code/token
//! exchange, and sign-out. The installed session is mirrored into
//! localStorage so a reload resumes where the magic link left off.

use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use super::{expect_json, expect_ok, http, ApiError, Supabase};

const SESSION_STORAGE_KEY: &str = "checkboard-auth-session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct OtpArgs<'a> {
    email: &'a str,
    create_user: bool,
}

#[derive(Serialize)]
struct ExchangeCodeArgs<'a> {
    auth_code: &'a str,
}

#[derive(Serialize)]
struct RefreshArgs<'a> {
    refresh_token: &'a str,
}

// ========================
// Auth Operations
// ========================

impl Supabase {
    /// Send a passwordless sign-in link to the given address.
    pub async fn sign_in_with_otp(&self, email: &str) -> Result<(), ApiError> {
        let url = format!("{}/otp", self.config.auth_url());
        let response = self
            .authed(http().post(url))
            .query(&[("redirect_to", self.config.redirect_to.as_str())])
            .json(&OtpArgs { email, create_user: true })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        expect_ok(response).await
    }

    /// Redeem a magic-link exchange code for a session and install it.
    pub async fn exchange_code(&self, code: &str) -> Result<Session, ApiError> {
        let url = format!("{}/token", self.config.auth_url());
        let response = self
            .authed(http().post(url))
            .query(&[("grant_type", "pkce")])
            .json(&ExchangeCodeArgs { auth_code: code })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let session: Session = expect_json(response).await?;
        self.install_session(session.clone());
        Ok(session)
    }

    /// Install raw tokens delivered in the callback fragment, validating
    /// them against the user endpoint first.
    pub async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, ApiError> {
        let user = self.fetch_user(access_token).await?;
        let session = Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_in: None,
            user,
        };
        self.install_session(session.clone());
        Ok(session)
    }

    /// Who is signed in right now, if anyone. Revalidates the stored
    /// session; an expired access token gets one refresh attempt before
    /// the session is dropped.
    pub async fn current_user(&self) -> Result<Option<AuthUser>, ApiError> {
        if self.session().get_untracked().is_none() {
            self.load_persisted_session();
        }
        let Some(session) = self.session().get_untracked() else {
            return Ok(None);
        };
        match self.fetch_user(&session.access_token).await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::Backend { status: 401, .. }) => {
                match self.refresh_session(&session.refresh_token).await {
                    Ok(refreshed) => Ok(Some(refreshed.user)),
                    Err(_) => {
                        self.clear_session();
                        Ok(None)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        if self.session().get_untracked().is_some() {
            let url = format!("{}/logout", self.config.auth_url());
            let response = self
                .authed(http().post(url))
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            // The local session is cleared regardless of what the backend said.
            let _ = expect_ok(response).await;
        }
        self.clear_session();
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        let url = format!("{}/token", self.config.auth_url());
        let response = self
            .authed(http().post(url))
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshArgs { refresh_token })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let session: Session = expect_json(response).await?;
        self.install_session(session.clone());
        Ok(session)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, ApiError> {
        let url = format!("{}/user", self.config.auth_url());
        let response = http()
            .get(url)
            .header("apikey", self.config.anon_key.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        expect_json(response).await
    }

    // ========================
    // Session persistence
    // ========================

    pub fn install_session(&self, session: Session) {
        if let Ok(json) = serde_json::to_string(&session) {
            if let Some(storage) = local_storage() {
                let _ = storage.set_item(SESSION_STORAGE_KEY, &json);
            }
        }
        self.session().set(Some(session));
    }

    pub fn clear_session(&self) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(SESSION_STORAGE_KEY);
        }
        self.session().set(None);
    }

    /// Pick up a session persisted by a previous load (or another tab).
    pub fn load_persisted_session(&self) {
        let Some(storage) = local_storage() else { return };
        let Ok(Some(json)) = storage.get_item(SESSION_STORAGE_KEY) else {
            return;
        };
        match serde_json::from_str::<Session>(&json) {
            Ok(session) => self.session().set(Some(session)),
            Err(_) => {
                // Unreadable leftovers would wedge every future load.
                let _ = storage.remove_item(SESSION_STORAGE_KEY);
            }
        }
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_through_json() {
        let session = Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_in: Some(3600),
            user: AuthUser {
                id: "u-1".to_string(),
                email: Some("gilee05@gsenc.com".to_string()),
            },
        };
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(serde_json::from_str::<Session>(&json).unwrap(), session);
    }

    #[test]
    fn token_response_with_extra_fields_still_decodes() {
        let body = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1714552800,
            "refresh_token": "rt",
            "user": {"id": "u-1", "aud": "authenticated", "email": "a@b.c"}
        }"#;
        let session: Session = serde_json::from_str(body).unwrap();
        assert_eq!(session.user.email.as_deref(), Some("a@b.c"));
    }
}
