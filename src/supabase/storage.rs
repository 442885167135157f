//! Attachment Storage
//!
//! Uploads into the attachments bucket under team-scoped keys and mints
//! time-limited signed URLs for existing keys.

use std::collections::HashMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use super::{expect_json, expect_ok, http, ApiError, Supabase};
use crate::models::AttachmentMeta;

const BUCKET: &str = "attachments";

/// Per-file ceiling, checked before any network call.
pub const MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Validity for the bulk mint done on load and after submit.
pub const SIGNED_URL_TTL_BULK: u32 = 60 * 60 * 24 * 30;
/// Validity for the on-demand refresh of a single stale link.
pub const SIGNED_URL_TTL_REFRESH: u32 = 60 * 60;

/// Keys travel inside a URL path; encode everything a path can't carry,
/// keeping `/` as the separator.
const KEY_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_PATH).to_string()
}

/// The per-file ceiling, applied before any bytes leave the browser.
pub fn ensure_within_limit(size: u64) -> Result<(), ApiError> {
    if size > MAX_FILE_BYTES {
        Err(ApiError::FileTooLarge)
    } else {
        Ok(())
    }
}

/// Collapse every run of characters outside `[A-Za-z0-9_.-() ]` into one
/// underscore before the name goes into a storage key.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '(' | ')' | ' ') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Globally unique, team-scoped storage key for one upload.
pub fn build_object_key(team_id: &str, epoch_ms: u64, token: Uuid, file_name: &str) -> String {
    format!("{team_id}/{epoch_ms}-{token}-{}", sanitize_filename(file_name))
}

#[derive(Serialize)]
struct SignArgs {
    #[serde(rename = "expiresIn")]
    expires_in: u32,
}

#[derive(Deserialize)]
struct SignedUrl {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl Supabase {
    /// Upload every staged file, collecting (name, key, size) triples.
    /// The first failure aborts the whole batch.
    pub async fn upload_files(&self, files: &[File]) -> Result<Vec<AttachmentMeta>, ApiError> {
        let mut uploaded = Vec::with_capacity(files.len());
        for file in files {
            let size = file.size() as u64;
            ensure_within_limit(size)?;
            let key = build_object_key(
                &self.config.team_id,
                js_sys::Date::now() as u64,
                Uuid::new_v4(),
                &file.name(),
            );
            let bytes = read_file_bytes(file).await?;
            let content_type = match file.type_() {
                t if t.is_empty() => "application/octet-stream".to_string(),
                t => t,
            };
            let url = format!("{}/object/{BUCKET}/{}", self.config.storage_url(), encode_key(&key));
            let response = self
                .authed(http().post(url))
                .header("cache-control", "3600")
                .header("x-upsert", "false")
                .header("content-type", content_type)
                .body(bytes)
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            expect_ok(response).await?;
            uploaded.push(AttachmentMeta {
                name: file.name(),
                key,
                size: Some(size),
            });
        }
        Ok(uploaded)
    }

    /// One signed URL per key. Keys that fail to sign are left out of the
    /// map; the table offers a manual refresh for those instead.
    pub async fn create_signed_urls(
        &self,
        keys: &[String],
        expires_in: u32,
    ) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(keys.len());
        for key in keys {
            match self.create_signed_url(key, expires_in).await {
                Ok(url) => {
                    map.insert(key.clone(), url);
                }
                Err(err) => {
                    web_sys::console::warn_1(
                        &format!("[STORAGE] sign failed for {key}: {err}").into(),
                    );
                }
            }
        }
        map
    }

    async fn create_signed_url(&self, key: &str, expires_in: u32) -> Result<String, ApiError> {
        let url = format!(
            "{}/object/sign/{BUCKET}/{}",
            self.config.storage_url(),
            encode_key(key)
        );
        let response = self
            .authed(http().post(url))
            .json(&SignArgs { expires_in })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let signed: SignedUrl = expect_json(response).await?;
        // The backend returns a path relative to the storage root.
        Ok(format!("{}{}", self.config.storage_url(), signed.signed_url))
    }
}

async fn read_file_bytes(file: &File) -> Result<Vec<u8>, ApiError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| ApiError::Network(format!("파일을 읽지 못했습니다: {e:?}")))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_files_are_rejected_before_any_network_call() {
        assert_eq!(
            ensure_within_limit(MAX_FILE_BYTES + 1),
            Err(ApiError::FileTooLarge)
        );
        assert_eq!(ensure_within_limit(MAX_FILE_BYTES), Ok(()));
        assert_eq!(ensure_within_limit(0), Ok(()));
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("report v2 (final).pdf"), "report v2 (final).pdf");
    }

    #[test]
    fn sanitize_collapses_runs_into_one_underscore() {
        assert_eq!(sanitize_filename("견적.png"), "_.png");
        assert_eq!(sanitize_filename("a+=b.png"), "a_b.png");
        assert_eq!(sanitize_filename("도면 v1.dwg"), "_ v1.dwg");
    }

    #[test]
    fn object_key_is_team_scoped_and_unique_per_token() {
        let token = Uuid::nil();
        let key = build_object_key("demo-team", 1714552800000, token, "계약서.pdf");
        assert_eq!(
            key,
            format!("demo-team/1714552800000-{token}-_.pdf")
        );
        assert!(key.starts_with("demo-team/"));
    }

    #[test]
    fn key_encoding_preserves_path_separators() {
        let encoded = encode_key("demo-team/1-aa-b c.png");
        assert_eq!(encoded, "demo-team/1-aa-b%20c.png");
    }

    #[test]
    fn signed_url_response_field_decodes() {
        let signed: SignedUrl =
            serde_json::from_str(r#"{"signedURL":"/object/sign/attachments/k?token=x"}"#).unwrap();
        assert_eq!(signed.signed_url, "/object/sign/attachments/k?token=x");
    }
}
