//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A transport is already registered under this key
    #[error("Transport with key '{key}' is already declared")]
    DuplicateTransport { key: String },

    /// Operation on a pipe that was destroyed
    #[error("Pipe '{id}' has been destroyed")]
    PipeDestroyed { id: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File transport error with path
    #[error("File transport error for '{path}': {message}")]
    FileTransportError { path: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a duplicate transport error
    pub fn duplicate_transport(key: impl Into<String>) -> Self {
        LoggerError::DuplicateTransport { key: key.into() }
    }

    /// Create a destroyed pipe error
    pub fn pipe_destroyed(id: impl Into<String>) -> Self {
        LoggerError::PipeDestroyed { id: id.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file transport error
    pub fn file_transport(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileTransportError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::duplicate_transport("console");
        assert!(matches!(err, LoggerError::DuplicateTransport { .. }));

        let err = LoggerError::config("LoggerBuilder", "Invalid format");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_transport("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileTransportError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::duplicate_transport("console");
        assert_eq!(
            err.to_string(),
            "Transport with key 'console' is already declared"
        );

        let err = LoggerError::pipe_destroyed("pipe-3");
        assert_eq!(err.to_string(), "Pipe 'pipe-3' has been destroyed");

        let err = LoggerError::file_transport("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File transport error for '/var/log/app.log': Disk full"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }
}
