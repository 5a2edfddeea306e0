//! Error taxonomy shared by every layer.
//!
//! - [`TransportError`]: the host rejected a call, or the bridge itself failed.
//! - [`PayloadError`]: an event payload did not match its schema.
//! - [`ConvertError`]: an integer sequence could not become a byte buffer.
//! - [`BridgeError`]: what the command facade returns to callers.

/// Failure reported by the command or event transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The host executed the command and reported a failure. Reads of a
    /// content kind that is not on the clipboard end up here.
    #[error("host rejected `{command}`: {message}")]
    Rejected { command: String, message: String },

    /// The host does not provide this command.
    #[error("`{0}` is not implemented by this host")]
    NotImplemented(String),

    #[error("invalid arguments for `{command}`: {message}")]
    InvalidArguments { command: String, message: String },

    #[error("failed to subscribe to `{event}`: {message}")]
    Subscribe { event: String, message: String },

    #[error("failed to emit `{event}`: {message}")]
    Emit { event: String, message: String },

    #[error("host transport closed")]
    Closed,
}

impl TransportError {
    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// An event payload failed strict decoding.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed `{event}` payload: {source}")]
    Schema {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PayloadError {
    pub fn event(&self) -> &str {
        match self {
            PayloadError::Schema { event, .. } => event,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("value {value} at index {index} does not fit in a byte")]
    OutOfRange { index: usize, value: i64 },
}

/// Result error of every command facade call.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected result from `{command}`: {source}")]
    UnexpectedResult {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content kind `{0}`")]
pub struct ParseKindError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_names_the_command() {
        let err = TransportError::rejected("plugin:clipboard|read_text", "no text");
        assert_eq!(
            err.to_string(),
            "host rejected `plugin:clipboard|read_text`: no text"
        );
    }

    #[test]
    fn bridge_error_is_transparent_over_transport() {
        let err: BridgeError = TransportError::NotImplemented("plugin:clipboard|x".into()).into();
        assert_eq!(
            err.to_string(),
            "`plugin:clipboard|x` is not implemented by this host"
        );
    }
}
