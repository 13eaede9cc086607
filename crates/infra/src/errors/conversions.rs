//! Conversions from external infrastructure errors into domain errors.

use raito_domain::RaitoError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RaitoError);

impl From<InfraError> for RaitoError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RaitoError> for InfraError {
    fn from(value: RaitoError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRaitoError {
    fn into_raito(self) -> RaitoError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RaitoError */
/* -------------------------------------------------------------------------- */

impl IntoRaitoError for HttpError {
    fn into_raito(self) -> RaitoError {
        let url = self.url().map(ToString::to_string).unwrap_or_default();

        if self.is_timeout() {
            return RaitoError::transport(url, "HTTP request timed out");
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return RaitoError::transport(url, format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return RaitoError::Client(format!("failed to decode response from {url:?}: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => RaitoError::Auth(format!("{message} from {url:?}")),
                _ => RaitoError::transport(url, message),
            };
        }

        RaitoError::transport(url, self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_raito())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
