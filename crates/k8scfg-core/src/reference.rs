//! Reference grammar
//!
//! A reference names one key inside one cluster object:
//!
//! ```text
//! <scheme>:<configmap|secret>:<namespace>:<name>:<data|binaryData>:<key>
//! ```
//!
//! Segments are split on every colon; there is no escaping, so a colon inside a
//! segment changes the segment count and the reference is rejected.

use std::fmt;

use crate::error::{Error, Result};

/// Number of colon-separated segments in a reference
pub const SEGMENT_COUNT: usize = 6;

/// Which cluster resource type a reference targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A config map
    ConfigObject,
    /// A secret
    SecretObject,
}

impl ObjectKind {
    /// Parse a kind token, ignoring case
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("configmap") {
            Some(ObjectKind::ConfigObject)
        } else if token.eq_ignore_ascii_case("secret") {
            Some(ObjectKind::SecretObject)
        } else {
            None
        }
    }

    /// Canonical token used when rendering a reference
    pub fn token(&self) -> &'static str {
        match self {
            ObjectKind::ConfigObject => "configmap",
            ObjectKind::SecretObject => "secret",
        }
    }
}

/// Which sub-map of the object a reference reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The `data` field
    PlainData,
    /// The `binaryData` field
    BinaryData,
}

impl Field {
    /// Parse a field token. Matching is case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "data" => Some(Field::PlainData),
            "binaryData" => Some(Field::BinaryData),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Field::PlainData => "data",
            Field::BinaryData => "binaryData",
        }
    }
}

/// A fully validated reference to one key of one cluster object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub scheme: String,
    pub kind: ObjectKind,
    pub namespace: String,
    pub name: String,
    pub field: Field,
    pub key: String,
}

impl Reference {
    /// Parse `uri` against the registered `scheme`.
    ///
    /// Checks run in order: segment count, scheme, object kind, field, then
    /// non-empty namespace, name and key. The first failure is returned.
    pub fn parse(uri: &str, scheme: &str) -> Result<Self> {
        let parts: Vec<&str> = uri.split(':').collect();
        if parts.len() != SEGMENT_COUNT {
            return Err(Error::malformed_reference(parts.len()).with_uri(uri));
        }

        if parts[0] != scheme {
            return Err(Error::unsupported_scheme(parts[0], scheme).with_uri(uri));
        }

        let kind = ObjectKind::from_token(parts[1])
            .ok_or_else(|| Error::unknown_object_kind(parts[1]).with_uri(uri))?;

        let field =
            Field::from_token(parts[4]).ok_or_else(|| Error::invalid_field(parts[4]).with_uri(uri))?;

        for (segment, value) in [("namespace", parts[2]), ("name", parts[3]), ("key", parts[5])] {
            if value.is_empty() {
                return Err(Error::empty_segment(segment).with_uri(uri));
            }
        }

        log::trace!("Parsed reference {}", uri);

        Ok(Self {
            scheme: scheme.to_string(),
            kind,
            namespace: parts[2].to_string(),
            name: parts[3].to_string(),
            field,
            key: parts[5].to_string(),
        })
    }

    /// Human-readable object identity, e.g. `secret prod/db-credentials`
    pub fn resource(&self) -> String {
        format!("{} {}/{}", self.kind.token(), self.namespace, self.name)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.scheme,
            self.kind.token(),
            self.namespace,
            self.name,
            self.field.token(),
            self.key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ReferenceErrorKind};
    use pretty_assertions::assert_eq;

    fn reference_error(uri: &str) -> ReferenceErrorKind {
        match Reference::parse(uri, "k8scfg").unwrap_err().kind {
            ErrorKind::Reference(kind) => kind,
            other => panic!("expected reference error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_configmap_reference() {
        let r = Reference::parse("k8scfg:configmap:default:app:data:log_level", "k8scfg").unwrap();

        assert_eq!(
            r,
            Reference {
                scheme: "k8scfg".into(),
                kind: ObjectKind::ConfigObject,
                namespace: "default".into(),
                name: "app".into(),
                field: Field::PlainData,
                key: "log_level".into(),
            }
        );
    }

    #[test]
    fn test_parse_secret_binary_reference() {
        let r = Reference::parse("k8scfg:secret:prod:tls:binaryData:tls.key", "k8scfg").unwrap();

        assert_eq!(r.kind, ObjectKind::SecretObject);
        assert_eq!(r.field, Field::BinaryData);
        assert_eq!(r.resource(), "secret prod/tls");
    }

    #[test]
    fn test_kind_token_is_case_insensitive() {
        for token in ["ConfigMap", "configmap", "CONFIGMAP", "configMap"] {
            let uri = format!("k8scfg:{}:ns:name:data:k", token);
            let r = Reference::parse(&uri, "k8scfg").unwrap();
            assert_eq!(r.kind, ObjectKind::ConfigObject, "token {}", token);
        }
        let r = Reference::parse("k8scfg:Secret:ns:name:data:k", "k8scfg").unwrap();
        assert_eq!(r.kind, ObjectKind::SecretObject);
    }

    #[test]
    fn test_wrong_segment_count_reports_count() {
        for (uri, count) in [
            ("k8scfg", 1),
            ("k8scfg:configmap:ns:name:data", 5),
            ("k8scfg:configmap:ns:name:data:k:extra", 7),
            ("k8scfg:configmap:ns:name:data:host:8080", 7),
            ("", 1),
        ] {
            assert_eq!(
                reference_error(uri),
                ReferenceErrorKind::Malformed { segments: count },
                "uri {:?}",
                uri
            );
        }
    }

    #[test]
    fn test_segment_count_checked_before_scheme() {
        assert_eq!(
            reference_error("env:HOME"),
            ReferenceErrorKind::Malformed { segments: 2 }
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        assert_eq!(
            reference_error("vault:configmap:ns:name:data:k"),
            ReferenceErrorKind::UnsupportedScheme {
                scheme: "vault".into(),
                expected: "k8scfg".into()
            }
        );
        assert!(matches!(
            reference_error("K8SCFG:configmap:ns:name:data:k"),
            ReferenceErrorKind::UnsupportedScheme { .. }
        ));
    }

    #[test]
    fn test_unknown_object_kind_is_rejected() {
        assert_eq!(
            reference_error("k8scfg:deployment:ns:name:data:k"),
            ReferenceErrorKind::UnknownObjectKind {
                token: "deployment".into()
            }
        );
    }

    #[test]
    fn test_invalid_field_for_both_kinds() {
        for kind in ["configmap", "secret"] {
            for field in ["stringData", "Data", "binarydata", "BINARYDATA", ""] {
                let uri = format!("k8scfg:{}:ns:name:{}:k", kind, field);
                assert_eq!(
                    reference_error(&uri),
                    ReferenceErrorKind::InvalidField {
                        token: field.into()
                    },
                    "uri {}",
                    uri
                );
            }
        }
    }

    #[test]
    fn test_empty_segments_rejected_at_parse() {
        assert_eq!(
            reference_error("k8scfg:configmap::name:data:k"),
            ReferenceErrorKind::EmptySegment {
                segment: "namespace".into()
            }
        );
        assert_eq!(
            reference_error("k8scfg:secret:ns::data:k"),
            ReferenceErrorKind::EmptySegment {
                segment: "name".into()
            }
        );
        assert_eq!(
            reference_error("k8scfg:secret:ns:name:data:"),
            ReferenceErrorKind::EmptySegment {
                segment: "key".into()
            }
        );
    }

    #[test]
    fn test_error_carries_uri() {
        let err = Reference::parse("k8scfg:configmap:ns", "k8scfg").unwrap_err();
        assert_eq!(err.uri.as_deref(), Some("k8scfg:configmap:ns"));
    }

    #[test]
    fn test_display_renders_canonical_uri() {
        let r = Reference::parse("custom:SECRET:ns:name:data:password", "custom").unwrap();
        assert_eq!(r.to_string(), "custom:secret:ns:name:data:password");
    }
}
