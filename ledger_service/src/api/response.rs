use serde::Serialize;

/// Generic response envelope. Exactly one of `result` or `error` is
/// populated; `message` carries optional human-readable context alongside
/// either.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            result: Some(result),
            message: None,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn err(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            result: None,
            message: Some(message.into()),
            error: Some(error.into()),
        }
    }
}
