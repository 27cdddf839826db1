//! Retrieved documents
//!
//! Providers hand back raw bytes; the host decodes them as YAML against the
//! surrounding configuration schema.

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Bytes returned by a provider, decodable as a YAML document
#[derive(Clone, PartialEq, Eq)]
pub struct Retrieved {
    bytes: Vec<u8>,
    /// Whether the content is sensitive (should be redacted in logs/exports)
    pub sensitive: bool,
}

impl std::fmt::Debug for Retrieved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Retrieved");
        if self.sensitive {
            s.field("bytes", &"[REDACTED]");
        } else {
            s.field("bytes", &String::from_utf8_lossy(&self.bytes));
        }
        s.field("sensitive", &self.sensitive).finish()
    }
}

impl Retrieved {
    /// Wrap bytes that the host should decode as YAML
    pub fn from_yaml(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            sensitive: false,
        }
    }

    /// Wrap bytes and mark them sensitive
    pub fn sensitive(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            sensitive: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The content as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Decode the content as a YAML value.
    ///
    /// Text that is not a valid YAML document is returned as a plain string
    /// scalar. Content that is not UTF-8 cannot be represented and fails.
    pub fn as_value(&self) -> Result<Value> {
        let text = self
            .as_str()
            .ok_or_else(|| Error::decode("Retrieved content is not valid UTF-8"))?;
        match serde_yaml::from_str::<Value>(text) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::trace!("Content is not a YAML document, using raw text: {}", e);
                Ok(Value::String(text.to_string()))
            }
        }
    }

    /// Decode the content into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.as_value()?;
        serde_yaml::from_value(value)
            .map_err(|e| Error::decode(format!("Failed to decode YAML: {}", e)))
    }
}
