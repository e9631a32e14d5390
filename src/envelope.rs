//! Wire envelope decoding.
//!
//! Every GrayLink response body is `{code, message, data}`. A zero code
//! means success and `data` holds the payload; any other code is a
//! business failure and `data` is ignored. The envelope is consumed once
//! by [`decode`](Envelope::decode) and never persisted.

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Fallback shown when a failing envelope carries no message.
const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// The `{code, message, data}` wrapper around every response payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope into the typed payload.
    ///
    /// A non-zero code becomes [`ApiError::Business`]; a zero code with
    /// no `data` field becomes [`ApiError::Decode`], since success
    /// promises a well-typed payload.
    pub fn decode(self) -> ApiResult<T> {
        if self.code != 0 {
            return Err(ApiError::Business {
                code: self.code,
                message: self.failure_message(),
            });
        }
        self.data
            .ok_or_else(|| ApiError::Decode("success envelope without a data payload".to_string()))
    }

    /// Check the envelope code but discard the payload.
    ///
    /// For endpoints that acknowledge with `data: null`.
    pub fn ack(self) -> ApiResult<()> {
        if self.code != 0 {
            return Err(ApiError::Business {
                code: self.code,
                message: self.failure_message(),
            });
        }
        Ok(())
    }

    /// Human-readable failure message, defaulting when the server sent none.
    pub fn failure_message(&self) -> String {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope<T: serde::de::DeserializeOwned>(raw: serde_json::Value) -> Envelope<T> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_decode_success() {
        let env: Envelope<serde_json::Value> =
            envelope(json!({"code": 0, "message": "", "data": {"a": 1}}));
        assert_eq!(env.decode().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_decode_failure_keeps_message() {
        let env: Envelope<serde_json::Value> =
            envelope(json!({"code": 1002, "message": "library not found"}));
        assert_eq!(
            env.decode().unwrap_err(),
            ApiError::Business {
                code: 1002,
                message: "library not found".to_string()
            }
        );
    }

    #[test]
    fn test_missing_message_defaults() {
        let env: Envelope<serde_json::Value> = envelope(json!({"code": 7}));
        assert_eq!(
            env.decode().unwrap_err(),
            ApiError::Business {
                code: 7,
                message: "request failed".to_string()
            }
        );

        // Empty string gets the same treatment as absent.
        let env: Envelope<serde_json::Value> = envelope(json!({"code": 7, "message": ""}));
        assert_eq!(env.failure_message(), "request failed");
    }

    #[test]
    fn test_missing_data_on_failure_is_not_an_error() {
        let env: Envelope<serde_json::Value> = envelope(json!({"code": 3, "message": "nope"}));
        assert!(matches!(
            env.decode().unwrap_err(),
            ApiError::Business { code: 3, .. }
        ));
    }

    #[test]
    fn test_success_without_data_fails_decode() {
        let env: Envelope<serde_json::Value> = envelope(json!({"code": 0, "message": "ok"}));
        assert!(matches!(env.decode().unwrap_err(), ApiError::Decode(_)));
    }

    #[test]
    fn test_ack_ignores_payload() {
        let env: Envelope<serde_json::Value> = envelope(json!({"code": 0, "data": null}));
        assert!(env.ack().is_ok());

        let env: Envelope<serde_json::Value> = envelope(json!({"code": 9, "message": "denied"}));
        assert!(matches!(
            env.ack().unwrap_err(),
            ApiError::Business { code: 9, .. }
        ));
    }
}
