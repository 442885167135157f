//! Session Glue
//!
//! Reconciles the backend's session signals - the magic-link callback left
//! in the page URL, the persisted session, and a bounded fallback poll -
//! into a single current-user value.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use percent_encoding::percent_decode_str;

use crate::dom::{alert, window};
use crate::supabase::Supabase;

pub const SESSION_POLL_MS: u32 = 3_000;
/// Explicit ceiling on the fallback poll (~2 minutes), instead of an
/// unbounded timer.
pub const SESSION_POLL_MAX_ATTEMPTS: u32 = 40;

/// URL keys the auth callback may leave behind.
const AUTH_PARAM_KEYS: &[&str] = &[
    "code",
    "error",
    "error_code",
    "error_description",
    "access_token",
    "refresh_token",
    "expires_in",
    "expires_at",
    "token_type",
    "provider_token",
    "type",
];

/// What the magic-link callback left in the page URL
#[derive(Debug, Clone, PartialEq)]
pub enum AuthCallback {
    /// Expired or denied link
    Error { code: String },
    /// Exchange code to redeem for a session
    Code(String),
    /// Raw tokens delivered in the fragment
    Tokens {
        access_token: String,
        refresh_token: String,
    },
    None,
}

/// Classify the callback, checking query and fragment. Errors win over
/// codes, codes over raw tokens.
pub fn parse_callback(query: &str, fragment: &str) -> AuthCallback {
    let query_params = parse_params(query);
    let fragment_params = parse_params(fragment);
    let lookup = |key: &str| {
        query_params
            .iter()
            .chain(fragment_params.iter())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if lookup("error").is_some() || lookup("error_code").is_some() {
        let code = lookup("error_code")
            .or_else(|| lookup("error"))
            .unwrap_or_default();
        return AuthCallback::Error { code };
    }
    if let Some(code) = lookup("code") {
        return AuthCallback::Code(code);
    }
    if let (Some(access_token), Some(refresh_token)) =
        (lookup("access_token"), lookup("refresh_token"))
    {
        return AuthCallback::Tokens {
            access_token,
            refresh_token,
        };
    }
    AuthCallback::None
}

/// User-facing explanation for a failed magic link.
pub fn error_explanation(code: &str) -> String {
    match code {
        "access_denied" => "로그인 링크가 거부되었거나 이미 사용되었습니다. 다시 로그인해 주세요.".to_string(),
        "otp_expired" => "로그인 링크가 만료되었습니다. 다시 로그인해 주세요.".to_string(),
        other => format!("로그인에 실패했습니다 ({other}). 다시 시도해 주세요."),
    }
}

/// Drop the auth keys from a raw query/fragment string, keeping everything
/// else, so a reload never reprocesses the callback.
pub fn strip_auth_params(raw: &str) -> String {
    raw.trim_start_matches(['?', '#'])
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or(pair);
            !AUTH_PARAM_KEYS.contains(&key)
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn parse_params(raw: &str) -> Vec<(String, String)> {
    raw.trim_start_matches(['?', '#'])
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let decoded = percent_decode_str(value)
                .decode_utf8()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((key.to_string(), decoded))
        })
        .collect()
}

/// Resolve the current user once, applying the callback policy in order:
/// (a) error parameter, (b) exchange code, (c) raw tokens, (d) plain
/// session query. Successful (b)/(c) strips the processed parameters and
/// forces one full reload so dependent loads pick up the new identity.
pub async fn resolve_session(client: &Supabase) -> Option<String> {
    let location = window().location();
    let query = location.search().unwrap_or_default();
    let fragment = location.hash().unwrap_or_default();

    match parse_callback(&query, &fragment) {
        AuthCallback::Error { code } => {
            alert(&error_explanation(&code));
            clear_callback_params();
        }
        AuthCallback::Code(code) => match client.exchange_code(&code).await {
            Ok(session) => {
                clear_callback_params();
                force_reload();
                return session.user.email;
            }
            Err(err) => {
                alert(&err.to_string());
                clear_callback_params();
            }
        },
        AuthCallback::Tokens {
            access_token,
            refresh_token,
        } => match client.set_session(&access_token, &refresh_token).await {
            Ok(session) => {
                clear_callback_params();
                force_reload();
                return session.user.email;
            }
            Err(err) => {
                alert(&err.to_string());
                clear_callback_params();
            }
        },
        AuthCallback::None => {}
    }

    match client.current_user().await {
        Ok(Some(user)) => user.email,
        Ok(None) => None,
        Err(err) => {
            web_sys::console::warn_1(&format!("[SESSION] session query failed: {err}").into());
            None
        }
    }
}

/// Fixed-interval fallback to the push signal while signed out. Stops on
/// the first confirmed session or after the attempt ceiling.
pub async fn poll_session(
    client: Supabase,
    user_email: ReadSignal<Option<String>>,
    set_user_email: WriteSignal<Option<String>>,
) {
    for _ in 0..SESSION_POLL_MAX_ATTEMPTS {
        TimeoutFuture::new(SESSION_POLL_MS).await;
        if user_email.get_untracked().is_some() {
            return;
        }
        match client.current_user().await {
            Ok(Some(user)) => {
                set_user_email.set(user.email);
                return;
            }
            Ok(None) => {}
            Err(err) => {
                web_sys::console::warn_1(&format!("[SESSION] poll failed: {err}").into());
            }
        }
    }
    web_sys::console::log_1(
        &format!("[SESSION] gave up polling after {SESSION_POLL_MAX_ATTEMPTS} attempts").into(),
    );
}

/// Rewrite the URL without the processed auth parameters.
fn clear_callback_params() {
    let location = window().location();
    let Ok(path) = location.pathname() else { return };
    let query = strip_auth_params(&location.search().unwrap_or_default());
    let fragment = strip_auth_params(&location.hash().unwrap_or_default());

    let mut url = path;
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    if !fragment.is_empty() {
        url.push('#');
        url.push_str(&fragment);
    }
    if let Ok(history) = window().history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url));
    }
}

fn force_reload() {
    let _ = window().location().reload();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_callback_is_an_error() {
        assert_eq!(
            parse_callback("?error=access_denied", ""),
            AuthCallback::Error {
                code: "access_denied".to_string()
            }
        );
        assert!(error_explanation("access_denied").contains("거부"));
    }

    #[test]
    fn error_code_in_fragment_wins_over_tokens() {
        let callback = parse_callback(
            "",
            "#error=access_denied&error_code=otp_expired&access_token=a&refresh_token=r",
        );
        assert_eq!(
            callback,
            AuthCallback::Error {
                code: "otp_expired".to_string()
            }
        );
        assert!(error_explanation("otp_expired").contains("만료"));
    }

    #[test]
    fn exchange_code_is_found_in_the_query() {
        assert_eq!(
            parse_callback("?code=abc-123", ""),
            AuthCallback::Code("abc-123".to_string())
        );
    }

    #[test]
    fn raw_tokens_are_found_in_the_fragment() {
        let callback = parse_callback("", "#access_token=at&refresh_token=rt&token_type=bearer");
        assert_eq!(
            callback,
            AuthCallback::Tokens {
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
            }
        );
    }

    #[test]
    fn plain_urls_carry_no_callback() {
        assert_eq!(parse_callback("", ""), AuthCallback::None);
        assert_eq!(parse_callback("?tab=all", "#top"), AuthCallback::None);
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        assert_eq!(
            parse_callback("?code=a%2Fb", ""),
            AuthCallback::Code("a/b".to_string())
        );
    }

    #[test]
    fn strip_removes_only_auth_keys() {
        assert_eq!(strip_auth_params("?code=x&tab=all"), "tab=all");
        assert_eq!(
            strip_auth_params("#access_token=a&refresh_token=r&expires_in=3600"),
            ""
        );
        assert_eq!(strip_auth_params(""), "");
    }

    #[test]
    fn unknown_error_code_still_explains() {
        let text = error_explanation("server_error");
        assert!(text.contains("server_error"));
    }
}
