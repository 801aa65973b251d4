//! Core types shared across blobtext modules

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse verdict on what a byte sequence contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Binary,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Binary => "binary",
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ContentKind::Binary)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading byte pattern identifying a known binary format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicSignature {
    pub name: String,
    pub prefix: Vec<u8>,
}

impl MagicSignature {
    pub fn new(name: impl Into<String>, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, sample: &[u8]) -> bool {
        !self.prefix.is_empty() && sample.starts_with(&self.prefix)
    }
}

/// Decoded text together with the encoding label that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeResult {
    pub text: String,
    /// The label exactly as the caller supplied it
    pub encoding: String,
}

impl DecodeResult {
    pub fn new(text: String, encoding: impl Into<String>) -> Self {
        Self {
            text,
            encoding: encoding.into(),
        }
    }

    pub fn into_parts(self) -> (String, String) {
        (self.text, self.encoding)
    }
}

/// Text read through the full fetch-and-decode pipeline
#[derive(Debug, Clone, Serialize)]
pub struct TextDocument {
    pub name: String,
    pub text: String,
    pub encoding: String,
    pub requested_encoding: String,
}

impl TextDocument {
    /// True when a fallback encoding was needed instead of the requested one
    pub fn fell_back(&self) -> bool {
        self.encoding != self.requested_encoding
    }
}

/// Lowercase hex of at most `limit` leading bytes
pub fn hex_preview(data: &[u8], limit: usize) -> String {
    hex::encode(&data[..data.len().min(limit)])
}
