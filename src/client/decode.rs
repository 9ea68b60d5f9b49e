use serde_json::Value;

use crate::error::ApiError;
use crate::http::ApiResponse;

/// Decodes a raw response.
///
/// The body is parsed before the status is looked at, so a non-JSON body
/// reports [`ApiError::UnparsableContent`] even on a failing status.
pub fn decode(response: &ApiResponse) -> Result<Value, ApiError> {
    let value: Value =
        serde_json::from_str(&response.body).map_err(|source| ApiError::UnparsableContent {
            source,
            body: response.body.clone(),
        })?;

    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            text: response.body.clone(),
        });
    }

    Ok(value)
}
