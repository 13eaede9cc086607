//! HTTP status classification for API responses

use raito_domain::RaitoError;
use reqwest::StatusCode;

/// Map a non-success API status to a domain error
///
/// 401 and 403 are authentication failures; every other status is reported
/// as a client error carrying the URL and the response body.
pub fn map_status_error(status: StatusCode, url: &str, body: &str) -> RaitoError {
    let message = if body.is_empty() {
        format!("{url} returned status {status}")
    } else {
        format!("{url} returned status {status}: {body}")
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        RaitoError::Auth(message)
    } else {
        RaitoError::Client(message)
    }
}
