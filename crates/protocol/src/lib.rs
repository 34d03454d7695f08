//! Carousel Host Protocol
//!
//! Shared types for CLI-host communication over stdin/stdout.
//!
//! Each message is one JSON object on its own line. Every [`Signal`] the host
//! reads is answered with exactly one [`Response`] line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a single signal line, in bytes.
pub const MAX_SIGNAL_SIZE: usize = 64 * 1024;

/// Errors that can occur while decoding a protocol line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Line exceeds the maximum signal size")]
    TooLong,

    #[error("Invalid message: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// An element of the mounted carousel a signal is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// The arrow that reveals earlier items.
    LeftArrow,
    /// The arrow that reveals later items.
    RightArrow,
    Wrapper,
    /// The `index`-th focusable control inside the item at `item`.
    Control { item: usize, index: usize },
}

/// Key names for key signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyName {
    Enter,
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Signals sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Click on an element.
    Click { target: Target },
    /// Key pressed while focus is inside the wrapper.
    Key { key: KeyName },
    /// An element received focus.
    Focus { target: Target },
    /// An element lost focus.
    Blur { target: Target },
    /// The wrapper was resized by the browser.
    Resize {
        /// New wrapper width in pixels.
        width: f64,
    },
    /// The content transition finished.
    TransitionEnd,
    /// Query the current carousel state.
    Query,
    /// Detach the carousel and leave the list static.
    Dispose,
    /// Stop the host.
    Stop,
}

/// Focus as reported in a state response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FocusReport {
    Unfocused,
    Wrapper,
    Item { index: usize },
}

/// Responses from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Signal processed.
    Ok,
    /// Signal could not be processed.
    Error {
        /// Error message describing what went wrong.
        message: String,
    },
    /// Carousel state.
    State {
        /// Current content offset in pixels (0 or negative).
        offset: i32,
        current_page: i32,
        page_count: i32,
        /// Indicator text, e.g. "2 of 3".
        pagination: String,
        left_enabled: bool,
        right_enabled: bool,
        /// A jump transition is in flight.
        busy: bool,
        focus: FocusReport,
        item_count: usize,
    },
    /// No carousel is mounted.
    Static,
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Encode a message as one protocol line, including the trailing newline.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)? + "\n")
}

/// Decode a signal from one protocol line.
pub fn decode_signal(line: &str) -> Result<Signal, ProtocolError> {
    if line.len() > MAX_SIGNAL_SIZE {
        return Err(ProtocolError::TooLong);
    }
    Ok(serde_json::from_str(line.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serialization() {
        let signal = Signal::Click {
            target: Target::RightArrow,
        };
        let json = serde_json::to_string(&signal).unwrap();
        assert_eq!(json, r#"{"type":"click","target":{"kind":"right_arrow"}}"#);

        let parsed: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, signal);
    }

    #[test]
    fn test_control_target_serialization() {
        let signal = Signal::Focus {
            target: Target::Control { item: 5, index: 1 },
        };
        let json = serde_json::to_string(&signal).unwrap();
        assert!(json.contains(r#""kind":"control""#));
        assert!(json.contains(r#""item":5"#));
        assert_eq!(decode_signal(&json).unwrap(), signal);
    }

    #[test]
    fn test_key_serialization() {
        let signal = Signal::Key {
            key: KeyName::ArrowLeft,
        };
        let json = serde_json::to_string(&signal).unwrap();
        assert_eq!(json, r#"{"type":"key","key":"arrow_left"}"#);
    }

    #[test]
    fn test_state_response_serialization() {
        let resp = Response::State {
            offset: -948,
            current_page: 2,
            page_count: 2,
            pagination: "2 of 2".to_string(),
            left_enabled: true,
            right_enabled: false,
            busy: false,
            focus: FocusReport::Item { index: 5 },
            item_count: 8,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""status":"state""#));
        assert!(json.contains(r#""pagination":"2 of 2""#));
        assert!(json.contains(r#""focus":{"state":"item","index":5}"#));

        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, resp);
    }

    #[test]
    fn test_error_response() {
        let resp = Response::error("Something went wrong");
        if let Response::Error { message } = resp {
            assert_eq!(message, "Something went wrong");
        } else {
            panic!("Expected Error response");
        }
    }

    #[test]
    fn test_line_delimited_protocol() {
        let line = encode_line(&Signal::Resize { width: 698.0 }).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let parsed = decode_signal(&line).unwrap();
        assert_eq!(parsed, Signal::Resize { width: 698.0 });
    }

    #[test]
    fn test_invalid_json_handling() {
        assert!(matches!(
            decode_signal("not valid json"),
            Err(ProtocolError::Invalid(_))
        ));
        assert!(decode_signal(r#"{"type": "unknown_signal"}"#).is_err());
        assert!(serde_json::from_str::<Response>(r#"{"status": "invalid"}"#).is_err());
    }

    #[test]
    fn test_oversized_line_rejected() {
        let line = " ".repeat(MAX_SIGNAL_SIZE + 1);
        assert!(matches!(decode_signal(&line), Err(ProtocolError::TooLong)));
    }
}
