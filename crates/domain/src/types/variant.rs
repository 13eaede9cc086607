//! Closed model of the union results returned by queries and mutations
//!
//! Every operation answers with an object tagged by `__typename`: either the
//! success payload or one of a fixed set of error types. Anything else is
//! kept as [`ResultVariant::Unrecognized`] and surfaces as a client error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{RaitoError, Result};

const TYPENAME_FIELD: &str = "__typename";

/// One union result, classified by `__typename`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultVariant<T> {
    Success(T),
    NotFound { typename: String, message: String },
    PermissionDenied { message: String },
    InvalidInput { message: String },
    AlreadyExists { message: String },
    InvalidEmail { email: String, message: String },
    Unrecognized(String),
}

impl<T: DeserializeOwned> ResultVariant<T> {
    /// Classify `value`, deserializing it as `T` when its typename is one of
    /// `success_typenames`.
    ///
    /// # Errors
    /// Returns `RaitoError::Client` if a success payload does not match `T`.
    pub fn from_value(value: Value, success_typenames: &[&str]) -> Result<Self> {
        let typename = typename_of(&value).unwrap_or_default().to_string();

        if success_typenames.contains(&typename.as_str()) {
            let payload = serde_json::from_value(value).map_err(|e| {
                RaitoError::Client(format!("failed to decode {typename} payload: {e}"))
            })?;
            return Ok(Self::Success(payload));
        }

        let message = string_field(&value, "message");
        let variant = match typename.as_str() {
            "NotFoundError" => Self::NotFound { typename, message },
            "PermissionDeniedError" => Self::PermissionDenied { message },
            "InvalidInputError" => Self::InvalidInput { message },
            "AlreadyExistsError" => Self::AlreadyExists { message },
            "InvalidEmailError" => {
                Self::InvalidEmail { email: string_field(&value, "errEmail"), message }
            }
            _ => Self::Unrecognized(if typename.is_empty() { "<none>".into() } else { typename }),
        };

        Ok(variant)
    }
}

impl<T> ResultVariant<T> {
    /// Map the variant to the success payload or the matching error.
    ///
    /// `operation` names the remote operation for permission errors,
    /// `object_type` and `id` describe the target for not-found errors.
    ///
    /// # Errors
    /// Returns the `RaitoError` matching every non-success variant.
    pub fn into_result(self, operation: &str, object_type: &str, id: &str) -> Result<T> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::NotFound { message, .. } => Err(RaitoError::NotFound {
                object_type: object_type.to_string(),
                id: id.to_string(),
                message,
            }),
            Self::PermissionDenied { message } => {
                Err(RaitoError::PermissionDenied { operation: operation.to_string(), message })
            }
            Self::InvalidInput { message } => Err(RaitoError::InvalidInput(message)),
            Self::AlreadyExists { message } => {
                Err(RaitoError::AlreadyExists { object_type: object_type.to_string(), message })
            }
            Self::InvalidEmail { email, message } => Err(RaitoError::InvalidEmail { email, message }),
            Self::Unrecognized(typename) => {
                Err(RaitoError::Client(format!("unexpected result type: {typename}")))
            }
        }
    }
}

/// Read the `__typename` tag of a GraphQL object
#[must_use]
pub fn typename_of(value: &Value) -> Option<&str> {
    value.get(TYPENAME_FIELD).and_then(Value::as_str)
}

fn string_field(value: &Value, field: &str) -> String {
    value.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    #[test]
    fn success_payload_is_decoded() {
        let variant: ResultVariant<Thing> =
            ResultVariant::from_value(json!({"__typename": "Thing", "id": "t1"}), &["Thing"])
                .unwrap();
        assert_eq!(variant, ResultVariant::Success(Thing { id: "t1".into() }));
        assert_eq!(variant.into_result("getThing", "thing", "t1").unwrap().id, "t1");
    }

    #[test]
    fn error_variants_map_to_typed_errors() {
        let not_found: ResultVariant<Thing> = ResultVariant::from_value(
            json!({"__typename": "NotFoundError", "message": "missing"}),
            &["Thing"],
        )
        .unwrap();
        match not_found.into_result("getThing", "thing", "t1") {
            Err(RaitoError::NotFound { object_type, id, message }) => {
                assert_eq!(object_type, "thing");
                assert_eq!(id, "t1");
                assert_eq!(message, "missing");
            }
            other => panic!("expected not found, got {other:?}"),
        }

        let denied: ResultVariant<Thing> = ResultVariant::from_value(
            json!({"__typename": "PermissionDeniedError", "message": "nope"}),
            &["Thing"],
        )
        .unwrap();
        assert!(matches!(
            denied.into_result("deleteThing", "thing", "t1"),
            Err(RaitoError::PermissionDenied { operation, .. }) if operation == "deleteThing"
        ));

        let email: ResultVariant<Thing> = ResultVariant::from_value(
            json!({"__typename": "InvalidEmailError", "errEmail": "bad@", "message": "invalid"}),
            &["Thing"],
        )
        .unwrap();
        assert!(matches!(
            email.into_result("createUser", "user", ""),
            Err(RaitoError::InvalidEmail { email, .. }) if email == "bad@"
        ));
    }

    #[test]
    fn unknown_typename_is_a_client_error() {
        let variant: ResultVariant<Thing> =
            ResultVariant::from_value(json!({"__typename": "Surprise"}), &["Thing"]).unwrap();
        assert_eq!(variant, ResultVariant::Unrecognized("Surprise".into()));

        let err = variant.into_result("getThing", "thing", "t1").unwrap_err();
        assert!(matches!(err, RaitoError::Client(msg) if msg.contains("Surprise")));
    }

    #[test]
    fn malformed_success_payload_is_rejected() {
        let result: Result<ResultVariant<Thing>> =
            ResultVariant::from_value(json!({"__typename": "Thing"}), &["Thing"]);
        assert!(matches!(result, Err(RaitoError::Client(_))));
    }
}
