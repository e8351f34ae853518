//! Failure taxonomy shared by every core operation.

use serde_json::Value;

use crate::models::{Category, ItemId};

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Http,
    Decode,
    Validation,
}

/// Local precondition violations, detected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Select at least one item before running try-on.")]
    NoSelection,

    #[error("Image '{0}' is empty.")]
    EmptyImage(String),

    #[error("Could not read image '{path}': {reason}")]
    UnreadableImage { path: String, reason: String },

    #[error("At least one photo is required.")]
    NoFiles,

    #[error("Item name cannot be empty.")]
    EmptyName,

    #[error("Item #{item_id} is not a {category} in the closet.")]
    ItemNotInCategory { item_id: ItemId, category: Category },

    #[error("Selection index {index} is out of range for {len} {category} item(s).")]
    IndexOutOfRange {
        category: Category,
        index: usize,
        len: usize,
    },
}

/// The single failure value surfaced by the transport and every flow built
/// on it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP status is known (DNS, refused connection, timeout).
    #[error("Network error while calling API: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The body did not have the expected shape.
    #[error("Unexpected response from API: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// HTTP status of the failure, or 0 when none was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } => *status,
            _ => 0,
        }
    }

    pub(crate) fn from_status(status: u16, body: ServerErrorBody) -> Self {
        let message = body
            .into_message()
            .unwrap_or_else(|| format!("Request failed ({})", status));
        ApiError::Http { status, message }
    }
}

/// The documented shapes of a service error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerErrorBody {
    Detail(String),
    Message(String),
    Empty,
}

impl ServerErrorBody {
    /// Reads `detail`, then `message`. Anything else, including non-string
    /// values and unparseable bodies, is `Empty`.
    pub fn parse(bytes: &[u8]) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) else {
            return ServerErrorBody::Empty;
        };

        if let Some(Value::String(detail)) = map.get("detail") {
            return ServerErrorBody::Detail(detail.clone());
        }
        if let Some(Value::String(message)) = map.get("message") {
            return ServerErrorBody::Message(message.clone());
        }
        ServerErrorBody::Empty
    }

    pub fn into_message(self) -> Option<String> {
        match self {
            ServerErrorBody::Detail(text) | ServerErrorBody::Message(text) => Some(text),
            ServerErrorBody::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detail_wins_over_message() {
        let body = ServerErrorBody::parse(br#"{"detail":"bad request","message":"ignored"}"#);
        assert_eq!(body, ServerErrorBody::Detail("bad request".to_string()));
    }

    #[test]
    fn test_parse_message_only() {
        let body = ServerErrorBody::parse(br#"{"message":"owner missing"}"#);
        assert_eq!(body, ServerErrorBody::Message("owner missing".to_string()));
    }

    #[test]
    fn test_parse_unusable_bodies() {
        assert_eq!(ServerErrorBody::parse(b""), ServerErrorBody::Empty);
        assert_eq!(ServerErrorBody::parse(b"[1,2]"), ServerErrorBody::Empty);
        assert_eq!(
            ServerErrorBody::parse(br#"{"detail":[{"loc":["body"],"msg":"x"}]}"#),
            ServerErrorBody::Empty
        );
    }

    #[test]
    fn test_from_status_fallback_message() {
        let err = ApiError::from_status(502, ServerErrorBody::Empty);
        assert_eq!(err.status(), 502);
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.to_string(), "Request failed (502)");
    }

    #[test]
    fn test_validation_has_no_status() {
        let err = ApiError::from(ValidationError::NoSelection);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), 0);
    }
}
