use serde_json::Value;

pub const GENERIC_ERROR_MESSAGE: &str =
    "An unexpected error occurred. Please try again or check the developer console for more details.";

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("{0}")]
    MissingInput(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    /// Message reported by the generation backend itself.
    #[error("{0}")]
    RemoteError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Preprocessing error: {0}")]
    PreprocessError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("All generation requests failed without a specific error.")]
    AllFailed,
}

impl From<serde_json::Error> for StudioError {
    fn from(e: serde_json::Error) -> Self {
        StudioError::SerializationError(e.to_string())
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(e: reqwest::Error) -> Self {
        StudioError::RequestError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

/// Anything a failed operation can hand back to the caller.
#[derive(Debug, Clone, Copy)]
pub enum Thrown<'a> {
    Error(&'a (dyn std::error::Error + 'static)),
    Value(&'a Value),
    Undefined,
}

/// Turns a thrown value into a message that can be shown to the user.
///
/// Checked in order: a Rust error (its message, without the variant prefix
/// for [`StudioError`]), an object with a string
/// `message`, an object with a string `error`, a bare string. Everything
/// else becomes [`GENERIC_ERROR_MESSAGE`].
pub fn parse_api_error(thrown: Thrown<'_>) -> String {
    match thrown {
        Thrown::Error(err) => match err.downcast_ref::<StudioError>() {
            Some(studio) => studio.user_message(),
            None => err.to_string(),
        },
        Thrown::Value(value) => parse_json_error(value),
        Thrown::Undefined => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

pub fn parse_json_error(value: &Value) -> String {
    if let Value::Object(map) = value {
        if let Some(Value::String(message)) = map.get("message") {
            return message.clone();
        }
        if let Some(Value::String(error)) = map.get("error") {
            return error.clone();
        }
    }

    match value {
        Value::String(s) => s.clone(),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

impl StudioError {
    /// The bare message, as shown to the user. `Display` keeps the variant
    /// prefix for logs.
    pub fn user_message(&self) -> String {
        match self {
            StudioError::ConfigError(message)
            | StudioError::MissingInput(message)
            | StudioError::RequestError(message)
            | StudioError::ResponseError(message)
            | StudioError::RemoteError(message)
            | StudioError::SerializationError(message)
            | StudioError::PreprocessError(message)
            | StudioError::StorageError(message) => message.clone(),
            StudioError::AllFailed => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_field_wins() {
        let value = json!({ "message": "x", "error": "ignored" });
        assert_eq!(parse_api_error(Thrown::Value(&value)), "x");
    }

    #[test]
    fn test_error_field_and_bare_string() {
        let value = json!({ "error": "quota exceeded" });
        assert_eq!(parse_api_error(Thrown::Value(&value)), "quota exceeded");
        assert_eq!(parse_api_error(Thrown::Value(&json!("y"))), "y");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(parse_api_error(Thrown::Undefined), GENERIC_ERROR_MESSAGE);
        assert_eq!(parse_api_error(Thrown::Value(&Value::Null)), GENERIC_ERROR_MESSAGE);
        assert_eq!(parse_api_error(Thrown::Value(&json!(42))), GENERIC_ERROR_MESSAGE);
        // non-string message falls through to the fallback
        let value = json!({ "message": 7 });
        assert_eq!(parse_api_error(Thrown::Value(&value)), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_rust_errors_use_display() {
        let err = StudioError::RemoteError("Internal Server Error: boom".into());
        assert_eq!(err.user_message(), "Internal Server Error: boom");

        let err = StudioError::AllFailed;
        assert_eq!(
            parse_api_error(Thrown::Error(&err)),
            "All generation requests failed without a specific error."
        );
    }

    #[test]
    fn test_user_message_drops_variant_prefix() {
        let err = StudioError::ResponseError("Backend did not return an image URL.".into());
        assert_eq!(err.to_string(), "Response error: Backend did not return an image URL.");
        assert_eq!(err.user_message(), "Backend did not return an image URL.");
        assert_eq!(
            parse_api_error(Thrown::Error(&err)),
            "Backend did not return an image URL."
        );

        let err = StudioError::PreprocessError("could not decode clip.mp4".into());
        assert_eq!(err.user_message(), "could not decode clip.mp4");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(parse_api_error(Thrown::Error(&io)), "disk full");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = parse_api_error(Thrown::Value(&json!({ "error": "bad" })));
        let twice = parse_api_error(Thrown::Value(&Value::String(once.clone())));
        assert_eq!(once, twice);
    }
}
