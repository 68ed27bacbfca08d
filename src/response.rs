use serde::Serialize;

/// Success half of the tagged result object: `{ "success": "...", ...data }`.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize = Empty> {
    pub success: String,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Default, Serialize)]
pub struct Empty {}

impl SuccessResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: message.into(),
            data: Empty {},
        }
    }
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with(message: impl Into<String>, data: T) -> Self {
        Self {
            success: message.into(),
            data,
        }
    }
}

pub const SAVED: &str = "Saved! ✅";
