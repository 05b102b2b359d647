//! Error taxonomy for the client.
//!
//! Local validation failures, token-exchange rejections, one kind per HTTP
//! status class, plus transport and protocol failures.

use serde::Deserialize;

use crate::http::HttpResponse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Language not on the accepted list. Raised before any network call.
    #[error("{0} is not a valid language")]
    InvalidLanguage(String),
    /// Timezone unknown to the IANA database. Raised before any network call.
    #[error("{0} is not a valid timezone")]
    InvalidTimezone(String),
    /// MIME type outside the media upload allow list. Raised before any
    /// network call.
    #[error("{0} is not an accepted MIME type")]
    MimeTypeNotAllowed(String),
    /// The token endpoint rejected a code or refresh grant, or a refresh was
    /// attempted with no refresh token held.
    #[error("token exchange failed: {0}")]
    AuthExchange(String),
    /// 400, and the fallback for unmapped statuses >= 400.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 401 after the single refresh-and-retry also failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// 403
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// 404
    #[error("not found: {0}")]
    NotFound(String),
    /// 429
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    /// 5xx
    #[error("server error: {0}")]
    ServerError(String),
    /// Network-level failure: timeout, connection refused, TLS.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A 200 response whose body is not valid JSON or lacks the expected
    /// envelope.
    #[error("malformed response: {0}")]
    Protocol(String),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: serde_json::Value,
    message: String,
}

/// Maps a non-success response to the error kind for its status code.
///
/// The message is `"{code} - {message}"` from the first entry of the
/// provider's error envelope when present and well-formed, otherwise
/// `"{status} - {raw body}"`.
pub fn error_from_response(response: &HttpResponse) -> Error {
    let message = envelope_message(&response.body)
        .unwrap_or_else(|| format!("{} - {}", response.status, response.body));

    match response.status {
        400 => Error::BadRequest(message),
        401 => Error::Unauthorized(message),
        403 => Error::Forbidden(message),
        404 => Error::NotFound(message),
        429 => Error::TooManyRequests(message),
        status if status >= 500 => Error::ServerError(message),
        _ => Error::BadRequest(message),
    }
}

fn envelope_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let first = envelope.errors.first()?;

    // Error codes arrive as numbers; render them without JSON quoting
    // either way.
    let code = match &first.code {
        serde_json::Value::String(code) => code.clone(),
        other => other.to_string(),
    };
    Some(format!("{} - {}", code, first.message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    fn envelope_body() -> String {
        serde_json::json!({
            "errors": [{
                "code": 1234,
                "message": "An Error has occurred.",
                "id": "f7d32670-4e6a-48c0-a2a7-87803536a712",
                "resource": {"type": "socialProfile", "id": "7534653235"}
            }]
        })
        .to_string()
    }

    #[test]
    fn status_codes_map_to_their_kinds() {
        let body = envelope_body();
        assert!(matches!(
            error_from_response(&response(400, &body)),
            Error::BadRequest(_)
        ));
        assert!(matches!(
            error_from_response(&response(401, &body)),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            error_from_response(&response(403, &body)),
            Error::Forbidden(_)
        ));
        assert!(matches!(
            error_from_response(&response(404, &body)),
            Error::NotFound(_)
        ));
        assert!(matches!(
            error_from_response(&response(429, &body)),
            Error::TooManyRequests(_)
        ));
        assert!(matches!(
            error_from_response(&response(500, &body)),
            Error::ServerError(_)
        ));
    }

    #[test]
    fn envelope_message_uses_first_error_entry() {
        let error = error_from_response(&response(400, &envelope_body()));
        let Error::BadRequest(message) = error else {
            panic!("expected BadRequest");
        };
        assert_eq!(message, "1234 - An Error has occurred.");
    }

    #[test]
    fn unmapped_status_falls_back_to_bad_request_with_raw_body() {
        let error = error_from_response(&response(430, "An Error has occurred."));
        let Error::BadRequest(message) = error else {
            panic!("expected BadRequest");
        };
        assert_eq!(message, "430 - An Error has occurred.");
    }

    #[test]
    fn five_xx_statuses_are_server_errors() {
        assert!(matches!(
            error_from_response(&response(503, "oops")),
            Error::ServerError(_)
        ));
    }

    #[test]
    fn string_error_codes_render_unquoted() {
        let body = serde_json::json!({
            "errors": [{"code": "RATE_LIMIT", "message": "Slow down."}]
        })
        .to_string();
        let Error::TooManyRequests(message) = error_from_response(&response(429, &body)) else {
            panic!("expected TooManyRequests");
        };
        assert_eq!(message, "RATE_LIMIT - Slow down.");
    }

    #[test]
    fn empty_envelope_falls_back_to_raw_body() {
        let Error::BadRequest(message) = error_from_response(&response(400, "{}")) else {
            panic!("expected BadRequest");
        };
        assert_eq!(message, "400 - {}");
    }
}
