use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed ({status}): {detail}")]
    Http { status: u16, detail: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("State error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type CivicResult<T> = Result<T, CivicError>;

impl CivicError {
    /// True for anything that counts as a failed or non-2xx request.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CivicError::Network(_) | CivicError::Http { .. } | CivicError::Request(_)
        )
    }

    /// Message shown to the user. Server detail is passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            CivicError::Http { detail, .. } if !detail.trim().is_empty() => detail.clone(),
            CivicError::Http { status, .. } => format!("Request failed with status {}", status),
            CivicError::Network(msg) => msg.clone(),
            CivicError::Request(e) if e.is_timeout() => "Request timed out".to_string(),
            CivicError::Request(_) => "Request failed".to_string(),
            other => other.to_string(),
        }
    }
}

pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> CivicResult<T>;
    fn with_context<F>(self, f: F) -> CivicResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + 'static,
{
    fn context(self, msg: &str) -> CivicResult<T> {
        self.map_err(|e| CivicError::Unknown(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> CivicResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| CivicError::Unknown(format!("{}: {}", f(), e)))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, msg: &str) -> CivicResult<T> {
        self.ok_or_else(|| CivicError::Unknown(msg.to_string()))
    }

    fn with_context<F>(self, f: F) -> CivicResult<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| CivicError::Unknown(f()))
    }
}

#[macro_export]
macro_rules! civic_error {
    ($error_type:ident, $msg:expr) => {
        $crate::error::CivicError::$error_type($msg.to_string())
    };
    ($error_type:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::error::CivicError::$error_type(format!($fmt, $($arg)*))
    };
}
