//! Payloads sent and expected by the payload-based checks.

use serde::{Deserialize, Serialize};

/// Payload given either as text or as raw bytes.
///
/// Binary content wins over text when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Text payload.
    #[serde(default)]
    pub text: String,
    /// Binary payload.
    #[serde(default)]
    pub binary: Vec<u8>,
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            binary: Vec::new(),
        }
    }

    pub fn binary(binary: impl Into<Vec<u8>>) -> Self {
        Self {
            text: String::new(),
            binary: binary.into(),
        }
    }

    /// Bytes carried by this payload.
    pub fn data(&self) -> &[u8] {
        if self.binary.is_empty() {
            self.text.as_bytes()
        } else {
            &self.binary
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }
}

/// Bytes of an optional payload, or `default` when it is absent or empty.
pub fn payload_or<'a>(payload: Option<&'a Payload>, default: &'a [u8]) -> &'a [u8] {
    match payload {
        Some(payload) if !payload.is_empty() => payload.data(),
        _ => default,
    }
}
