//! Backend Error Taxonomy

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Transport failure: the request never completed.
    #[error("네트워크 오류: {0}")]
    Network(String),
    /// The backend rejected the request; message is the backend's own.
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// The response arrived but did not match the expected shape.
    #[error("응답 형식 오류: {0}")]
    Decode(String),
    /// Rejected before any network call.
    #[error("파일은 개당 20MB 이하만 허용됩니다.")]
    FileTooLarge,
}

/// Error bodies differ per service (rest/auth/storage); pick whichever
/// message field is present, falling back to the raw body.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

pub(crate) fn backend_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.msg).or(b.error_description).or(b.error))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("요청 실패 (HTTP {status})")
            } else {
                trimmed.to_string()
            }
        });
    ApiError::Backend { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_message_field_first() {
        let err = backend_error(400, r#"{"message":"duplicate key","error":"other"}"#);
        assert_eq!(err.to_string(), "duplicate key");
    }

    #[test]
    fn falls_back_through_auth_style_fields() {
        let err = backend_error(401, r#"{"error":"invalid_grant","error_description":"expired"}"#);
        assert_eq!(err.to_string(), "expired");
    }

    #[test]
    fn non_json_body_is_passed_through() {
        let err = backend_error(502, "bad gateway");
        assert_eq!(err.to_string(), "bad gateway");
    }

    #[test]
    fn empty_body_reports_the_status() {
        let err = backend_error(500, "");
        assert_eq!(err.to_string(), "요청 실패 (HTTP 500)");
    }
}
