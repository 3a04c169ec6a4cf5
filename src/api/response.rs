use serde::Serialize;

/// Response envelope shared by every endpoint.
///
/// `data` is serialized even when empty, so a not-found lookup renders as
/// `"data": null` under a success envelope rather than an error.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}
