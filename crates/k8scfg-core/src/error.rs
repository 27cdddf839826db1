//! Error types for k8scfg
//!
//! Every failure carries its kind, the reference being resolved (when known),
//! the underlying cause and an actionable help message.

use std::fmt;

use crate::reference::SEGMENT_COUNT;

/// Result type alias for k8scfg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for k8scfg operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// The reference URI being resolved, if known
    pub uri: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The reference string was rejected by the parser
    Reference(ReferenceErrorKind),
    /// The cluster object could not be fetched
    Fetch(FetchErrorKind),
    /// The addressed key yielded zero bytes.
    ///
    /// An absent key and a key holding an empty value are indistinguishable.
    EmptyValue { field: String, key: String },
    /// The resolve context was cancelled or its deadline passed
    Cancelled,
    /// Retrieved content could not be decoded
    Decode,
    /// No provider registered for the scheme
    UnknownScheme { scheme: String },
    /// Provider already registered for the scheme
    AlreadyRegistered { scheme: String },
    /// Internal error (bug in k8scfg)
    Internal,
}

/// Reasons a reference string fails to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceErrorKind {
    /// The scheme segment does not match the provider's scheme
    UnsupportedScheme { scheme: String, expected: String },
    /// Wrong number of colon-separated segments
    Malformed { segments: usize },
    /// Kind token is neither `configmap` nor `secret`
    UnknownObjectKind { token: String },
    /// Field token is neither `data` nor `binaryData`
    InvalidField { token: String },
    /// Namespace, name or key segment is empty
    EmptySegment { segment: String },
}

/// Failures reported by the cluster client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The object does not exist
    NotFound { resource: String },
    /// The cluster could not be reached or rejected the request
    Connection { resource: String },
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            uri: None,
            help: None,
            cause: None,
        }
    }

    /// Create an unsupported scheme error
    pub fn unsupported_scheme(scheme: impl Into<String>, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self::new(ErrorKind::Reference(ReferenceErrorKind::UnsupportedScheme {
            scheme: scheme.into(),
            expected: expected.clone(),
        }))
        .with_help(format!("References handled here must start with '{}:'", expected))
    }

    /// Create a malformed reference error reporting the observed segment count
    pub fn malformed_reference(segments: usize) -> Self {
        Self::new(ErrorKind::Reference(ReferenceErrorKind::Malformed {
            segments,
        }))
        .with_help(
            "Use <scheme>:<configmap|secret>:<namespace>:<name>:<data|binaryData>:<key> \
             (colons inside segments are not supported)",
        )
    }

    /// Create an unknown object kind error
    pub fn unknown_object_kind(token: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference(ReferenceErrorKind::UnknownObjectKind {
            token: token.into(),
        }))
        .with_help("The object kind must be 'configmap' or 'secret'")
    }

    /// Create an invalid field error
    pub fn invalid_field(token: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference(ReferenceErrorKind::InvalidField {
            token: token.into(),
        }))
        .with_help("The field must be exactly 'data' or 'binaryData'")
    }

    /// Create an empty segment error
    pub fn empty_segment(segment: impl Into<String>) -> Self {
        let segment = segment.into();
        Self::new(ErrorKind::Reference(ReferenceErrorKind::EmptySegment {
            segment: segment.clone(),
        }))
        .with_help(format!("Provide a non-empty {}", segment))
    }

    /// Create a not found error for a cluster object
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::new(ErrorKind::Fetch(FetchErrorKind::NotFound {
            resource: resource.clone(),
        }))
        .with_help(format!(
            "Check that {} exists and is readable by this service account",
            resource
        ))
    }

    /// Create a connection error for a cluster request
    pub fn connection(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch(FetchErrorKind::Connection {
            resource: resource.into(),
        }))
        .with_cause(message)
    }

    /// Create an empty value error
    pub fn empty_value(field: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(ErrorKind::EmptyValue {
            field: field.into(),
            key: key.clone(),
        })
        .with_help(format!(
            "Check that '{}' is present and non-empty in the selected field",
            key
        ))
    }

    /// Create a cancellation error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled).with_cause(reason)
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode).with_cause(message)
    }

    /// Create an unknown scheme error
    pub fn unknown_scheme(scheme: impl Into<String>) -> Self {
        let scheme = scheme.into();
        Self::new(ErrorKind::UnknownScheme {
            scheme: scheme.clone(),
        })
        .with_help(format!("Register a provider for '{}' or check for typos", scheme))
    }

    /// Create a provider already registered error
    pub fn provider_already_registered(scheme: impl Into<String>) -> Self {
        let scheme = scheme.into();
        Self::new(ErrorKind::AlreadyRegistered {
            scheme: scheme.clone(),
        })
        .with_help(format!(
            "Use register_with_force(..., true) to override the '{}' provider",
            scheme
        ))
    }

    /// Create an internal error (bug in k8scfg)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal)
            .with_cause(message)
            .with_help("This is likely a bug in k8scfg. Please report it.")
    }

    /// Add the reference URI to the error
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add the underlying cause to the error
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// True when the cluster reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::Fetch(FetchErrorKind::NotFound { .. }))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Reference(r) => match r {
                ReferenceErrorKind::UnsupportedScheme { scheme, expected } => write!(
                    f,
                    "Unsupported scheme '{}' (expected '{}')",
                    scheme, expected
                )?,
                ReferenceErrorKind::Malformed { segments } => write!(
                    f,
                    "Malformed reference: expected {} segments, got {}",
                    SEGMENT_COUNT, segments
                )?,
                ReferenceErrorKind::UnknownObjectKind { token } => {
                    write!(f, "Unknown object kind: {}", token)?
                }
                ReferenceErrorKind::InvalidField { token } => {
                    write!(f, "Invalid field: {}", token)?
                }
                ReferenceErrorKind::EmptySegment { segment } => {
                    write!(f, "Empty {} segment in reference", segment)?
                }
            },
            ErrorKind::Fetch(e) => match e {
                FetchErrorKind::NotFound { resource } => {
                    write!(f, "Cluster object not found: {}", resource)?
                }
                FetchErrorKind::Connection { resource } => {
                    write!(f, "Cluster request failed: {}", resource)?
                }
            },
            ErrorKind::EmptyValue { field, key } => write!(f, "{}[{}] is empty", field, key)?,
            ErrorKind::Cancelled => write!(f, "Resolution cancelled")?,
            ErrorKind::Decode => write!(f, "Decode error")?,
            ErrorKind::UnknownScheme { scheme } => {
                write!(f, "No provider registered for scheme: {}", scheme)?
            }
            ErrorKind::AlreadyRegistered { scheme } => {
                write!(f, "Provider for scheme '{}' is already registered", scheme)?
            }
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        if let Some(uri) = &self.uri {
            write!(f, "\n  URI: {}", uri)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_reference_reports_count() {
        let err = Error::malformed_reference(4).with_uri("k8scfg:secret:ns:name");
        let display = format!("{}", err);

        assert_eq!(SEGMENT_COUNT, 6);
        assert!(display.contains("expected 6 segments, got 4"));
        assert!(display.contains("URI: k8scfg:secret:ns:name"));
        assert!(display.contains("Help:"));
    }

    #[test]
    fn test_unsupported_scheme_display() {
        let err = Error::unsupported_scheme("vault", "k8scfg");
        let display = format!("{}", err);

        assert!(display.contains("Unsupported scheme 'vault' (expected 'k8scfg')"));
        assert!(display.contains("must start with 'k8scfg:'"));
    }

    #[test]
    fn test_empty_value_names_field_and_key() {
        let err = Error::empty_value("binaryData", "tls.crt");

        assert_eq!(format!("{}", err).lines().next(), Some("binaryData[tls.crt] is empty"));
        assert_eq!(
            err.kind,
            ErrorKind::EmptyValue {
                field: "binaryData".into(),
                key: "tls.crt".into()
            }
        );
    }

    #[test]
    fn test_connection_error_keeps_cause() {
        let err = Error::connection("configmap default/app", "connection refused");
        let display = format!("{}", err);

        assert!(display.contains("Cluster request failed: configmap default/app"));
        assert!(display.contains("connection refused"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_error() {
        let err = Error::not_found("secret prod/db");

        assert!(err.is_not_found());
        assert!(format!("{}", err).contains("Cluster object not found: secret prod/db"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("Unexpected state");
        let display = format!("{}", err);

        assert!(display.contains("Internal error"));
        assert!(display.contains("Unexpected state"));
    }
}
