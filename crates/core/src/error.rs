// Error handling for the video player

use std::fmt;

/// Video player error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// Command argument out of range
    InvalidArgument(String),

    /// Native decoder refused the data source or the async prepare
    Prepare(String),

    /// Native decoder reported a fatal error code pair
    Decoder { what: i32, extra: i32 },

    /// Command not valid in the current playback state
    InvalidState(String),

    /// Player or kernel was already released
    Released,

    /// System setting could not be read or written (best effort)
    Settings(String),

    /// IO error
    Io(String),

    /// Generic error
    Other(String),
}

impl PlayerError {
    /// Whether this error should move the player into `Error`. Non-fatal
    /// errors from the kernel are logged and dropped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PlayerError::Settings(_))
    }
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlayerError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            PlayerError::Prepare(msg) => write!(f, "Prepare error: {}", msg),
            PlayerError::Decoder { what, extra } => {
                write!(f, "Decoder error what:{}, extra:{}", what, extra)
            }
            PlayerError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            PlayerError::Released => write!(f, "Player already released"),
            PlayerError::Settings(msg) => write!(f, "Settings error: {}", msg),
            PlayerError::Io(msg) => write!(f, "IO error: {}", msg),
            PlayerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PlayerError {}

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;

impl From<std::io::Error> for PlayerError {
    fn from(err: std::io::Error) -> Self {
        PlayerError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_error_message() {
        let err = PlayerError::Decoder { what: 1, extra: -1004 };
        assert_eq!(err.to_string(), "Decoder error what:1, extra:-1004");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_settings_error_is_not_fatal() {
        assert!(!PlayerError::Settings("brightness".into()).is_fatal());
    }
}
