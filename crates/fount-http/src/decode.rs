//! The shared response decoding rule.
//!
//! Every fetched body goes through [`decode`], which classifies the outcome:
//!
//! - body does not parse as JSON ⇒ [`FetchError::Decode`] carrying the raw
//!   body text;
//! - body parses but the status code is 300 or above ⇒ [`FetchError::Api`]
//!   carrying the server-declared `message` field;
//! - otherwise the decoded JSON value is the success payload.

use crate::{FetchError, Response};
use serde_json::Value;

/// Fallback message for error responses without a `message` field.
const GENERIC_FAILURE: &str = "Request failed";

/// Decode a raw response into a payload or a classified failure.
pub fn decode(response: &Response) -> Result<Value, FetchError> {
    let text = response.text();

    let parsed: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => {
            return Err(FetchError::Decode {
                status: response.status,
                body: text,
            })
        }
    };

    if !response.is_success() {
        let message = parsed
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(GENERIC_FAILURE)
            .to_string();
        return Err(FetchError::Api {
            status: response.status,
            message,
        });
    }

    Ok(parsed)
}
