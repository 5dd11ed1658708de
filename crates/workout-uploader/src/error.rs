use thiserror::Error;

/// Main error type for workout-uploader
#[derive(Error, Debug)]
pub enum UploaderError {
    #[error("Client ID must be a number, got '{0}'")]
    InvalidClientId(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Authentication required. Please run 'workout-uploader auth login' first.")]
    NotAuthenticated,

    #[error("Token exchange failed ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Activity creation failed ({status}): {body}")]
    ActivityCreation { status: u16, body: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid value '{value}' in column '{column}' on line {line}")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error("CSV is missing required column '{0}'")]
    MissingColumn(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UploaderError>;

impl UploaderError {
    /// Create a missing-credentials error from a message
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingCredentials(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid response error from a message
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create an invalid parameter error from a message
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Map a transport failure, keeping timeouts distinct from other HTTP errors
    pub fn transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else {
            Self::Http(err)
        }
    }

    /// Whether the remote side rejected the request (as opposed to a local or transport failure)
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::ActivityCreation { .. })
    }
}

/// Render an error the way the CLI shows it to the user
pub fn format_user_error(err: &UploaderError) -> String {
    match err {
        UploaderError::Auth { status, body } => format!(
            "The authorization server rejected the request (HTTP {}).\n{}\nTry 'workout-uploader auth init' to authorize again.",
            status,
            body.trim()
        ),
        UploaderError::ActivityCreation { status, body } => format!(
            "Could not create the activity (HTTP {}). Check your API limits.\n{}",
            status,
            body.trim()
        ),
        UploaderError::Timeout(secs) => format!(
            "The remote service did not answer within {} seconds. Please try again.",
            secs
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UploaderError::InvalidClientId("abc".to_string());
        assert_eq!(err.to_string(), "Client ID must be a number, got 'abc'");
    }

    #[test]
    fn test_not_authenticated_error() {
        let err = UploaderError::NotAuthenticated;
        assert!(err.to_string().contains("auth login"));
    }

    #[test]
    fn test_parse_error_names_column_and_value() {
        let err = UploaderError::Parse {
            line: 3,
            column: "Load".to_string(),
            value: "heavy".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Load"));
        assert!(msg.contains("heavy"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            UploaderError::missing("no secret"),
            UploaderError::MissingCredentials(_)
        ));
        assert!(matches!(
            UploaderError::config("bad"),
            UploaderError::Config(_)
        ));
        assert!(matches!(
            UploaderError::invalid_response("bad response"),
            UploaderError::InvalidResponse(_)
        ));
        assert!(matches!(
            UploaderError::invalid_param("bad param"),
            UploaderError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_rejections() {
        let auth = UploaderError::Auth {
            status: 400,
            body: "invalid_grant".to_string(),
        };
        assert!(auth.is_rejection());
        assert!(!UploaderError::Timeout(10).is_rejection());
    }

    #[test]
    fn test_format_user_error_keeps_raw_body() {
        let err = UploaderError::ActivityCreation {
            status: 429,
            body: "Rate Limit Exceeded\n".to_string(),
        };
        let msg = format_user_error(&err);
        assert!(msg.contains("HTTP 429"));
        assert!(msg.contains("Rate Limit Exceeded"));
    }
}
