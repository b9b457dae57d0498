//! JSON envelope printed on stdout, one per invocation.
//!
//! ```json
//! { "success": true,  "data": [...] }
//! { "success": true,  "data": [],  "warning": "Persistence failure: ..." }
//! { "success": false, "error": { "code": "NOT_FOUND", "message": "..." } }
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::commands::CommandOutput;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Envelope {
    pub fn success(output: CommandOutput) -> Self {
        Envelope {
            success: true,
            data: Some(output.data),
            warning: output.warning,
            error: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Envelope {
            success: false,
            data: None,
            warning: None,
            error: Some(error),
        }
    }

    pub fn from_result(result: Result<CommandOutput, ApiError>) -> Self {
        match result {
            Ok(output) => Envelope::success(output),
            Err(error) => Envelope::failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success(CommandOutput {
            data: json!([1, 2]),
            warning: None,
        });
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": true, "data": [1, 2] })
        );
    }

    #[test]
    fn test_degraded_shape() {
        let envelope = Envelope::success(CommandOutput {
            data: json!([]),
            warning: Some("store offline".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": true, "data": [], "warning": "store offline" })
        );
    }

    #[test]
    fn test_failure_shape() {
        let envelope = Envelope::failure(ApiError::validation("cart is required"));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": false,
                "error": { "code": "VALIDATION_ERROR", "message": "cart is required" }
            })
        );
    }
}
