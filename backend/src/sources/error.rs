//! Error types for data-source operations.
//!
//! Failures to fetch or decode a snapshot belong to the source layer; the
//! engine itself has no error path.

use std::fmt;

/// Result type for data-source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Structured context for source errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch_restaurant_rows")
    pub operation: Option<String>,
    /// The upstream entity involved (e.g., "rpc:search_restaurants", "restaurant")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether this error is retryable
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for data-source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure talking to the upstream (DNS, TLS, reset, timeout).
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// Upstream answered with a non-success status.
    #[error("Query error (status {status}): {message} {context}")]
    QueryError {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("Decode error: {message} {context}")]
    DecodeError {
        message: String,
        context: ErrorContext,
    },

    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// Caller-supplied input rejected before reaching the upstream.
    #[error("Validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },
}

impl SourceError {
    pub fn connection(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(status: u16, message: impl Into<String>, context: ErrorContext) -> Self {
        // 5xx and 429 are worth another attempt
        let context = if status >= 500 || status == 429 {
            context.retryable()
        } else {
            context
        };
        Self::QueryError {
            status,
            message: message.into(),
            context,
        }
    }

    pub fn decode(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::DecodeError {
            message: message.into(),
            context,
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::DecodeError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::ValidationError { context, .. } => context,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    /// True when the failure happened upstream (transport, status or payload).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError { .. } | Self::QueryError { .. } | Self::DecodeError { .. }
        )
    }
}

#[cfg(any(feature = "rpc-source", feature = "rest-source"))]
impl SourceError {
    /// Map a transport-level reqwest failure.
    pub(crate) fn from_reqwest(err: reqwest::Error, context: ErrorContext) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string(), context)
        } else if let Some(status) = err.status() {
            Self::query(status.as_u16(), err.to_string(), context)
        } else {
            Self::connection(err.to_string(), context)
        }
    }
}
