//! Decode-retry loop: primary encoding first, then each fallback in order.

use super::classify::Classifier;
use super::encoding::Codec;
use super::types::{DecodeResult, hex_preview};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_FALLBACKS: &[&str] = &["latin1", "cp1252", "ascii"];

const BINARY_PREVIEW_BYTES: usize = 20;
const EXHAUSTED_PREVIEW_BYTES: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error(
        "content appears to be binary data, not text (first bytes: {preview}); read it as raw bytes instead"
    )]
    BinaryContent { preview: String },

    #[error(
        "failed to decode content as text, tried encodings: {}; first bytes: {preview}",
        .attempted.join(", ")
    )]
    Exhausted {
        attempted: Vec<String>,
        preview: String,
    },
}

pub fn default_fallbacks() -> Vec<String> {
    DEFAULT_FALLBACKS.iter().map(|s| s.to_string()).collect()
}

/// Gates on the classifier, then tries candidate encodings in priority order
#[derive(Debug, Clone, Default)]
pub struct EncodingResolver {
    pub classifier: Classifier,
}

impl EncodingResolver {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// An empty `fallbacks` slice means the default list.
    pub fn decode<S: AsRef<str>>(
        &self,
        data: &[u8],
        primary: &str,
        fallbacks: &[S],
    ) -> Result<DecodeResult, DecodeError> {
        if self.classifier.classify(data).is_binary() {
            return Err(DecodeError::BinaryContent {
                preview: hex_preview(data, BINARY_PREVIEW_BYTES),
            });
        }

        let fallbacks: Vec<&str> = if fallbacks.is_empty() {
            DEFAULT_FALLBACKS.to_vec()
        } else {
            fallbacks.iter().map(AsRef::as_ref).collect()
        };

        let candidates = std::iter::once(primary).chain(fallbacks.iter().copied());
        for label in candidates.clone() {
            let Some(codec) = Codec::for_label(label) else {
                warn!(encoding = label, "unknown encoding label, skipping");
                continue;
            };
            match codec.decode(data) {
                Some(text) => {
                    debug!(encoding = label, codec = codec.name(), "decoded");
                    return Ok(DecodeResult::new(text, label));
                }
                None => debug!(encoding = label, "decode attempt failed"),
            }
        }

        Err(DecodeError::Exhausted {
            attempted: candidates.map(String::from).collect(),
            preview: hex_preview(data, EXHAUSTED_PREVIEW_BYTES),
        })
    }
}

/// Decodes with the default classifier.
pub fn safe_decode<S: AsRef<str>>(
    data: &[u8],
    primary: &str,
    fallbacks: &[S],
) -> Result<DecodeResult, DecodeError> {
    EncodingResolver::default().decode(data, primary, fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn test_valid_utf8_uses_primary() {
        let result = safe_decode("héllo wörld".as_bytes(), "utf-8", NONE).unwrap();
        assert_eq!(result.into_parts(), ("héllo wörld".to_string(), "utf-8".to_string()));
    }

    #[test]
    fn test_latin1_fallback() {
        let result = safe_decode(b"caf\xe9", "utf-8", &["latin1"]).unwrap();
        assert_eq!(result.text, "café");
        assert_eq!(result.encoding, "latin1");
    }

    #[test]
    fn test_default_fallbacks_pick_latin1() {
        let result = safe_decode(b"na\xefve r\xe9sum\xe9", "utf-8", NONE).unwrap();
        assert_eq!(result.encoding, "latin1");
        assert_eq!(result.text, "naïve résumé");
    }

    #[test]
    fn test_label_is_returned_verbatim() {
        let result = safe_decode(b"caf\xe9", "UTF-8", &["Windows_1252"]).unwrap();
        assert_eq!(result.encoding, "Windows_1252");
    }

    #[test]
    fn test_binary_is_rejected_before_decoding() {
        let err = safe_decode(b"\x89PNG\r\n\x1a\n", "latin1", NONE).unwrap_err();
        assert_eq!(
            err,
            DecodeError::BinaryContent {
                preview: "89504e470d0a1a0a".to_string()
            }
        );
    }

    #[test]
    fn test_binary_preview_is_bounded() {
        let data = vec![0u8; 64];
        match safe_decode(&data, "utf-8", NONE) {
            Err(DecodeError::BinaryContent { preview }) => assert_eq!(preview.len(), 40),
            other => panic!("expected binary error, got {:?}", other),
        }
    }

    #[test]
    fn test_exhausted_lists_every_attempt() {
        // odd length keeps utf-16 from accepting it
        let err = safe_decode(b"caf\xe9!", "utf-8", &["ascii", "utf-16"]).unwrap_err();
        match err {
            DecodeError::Exhausted { attempted, preview } => {
                assert_eq!(attempted, vec!["utf-8", "ascii", "utf-16"]);
                assert_eq!(preview, "636166e921");
            }
            other => panic!("expected exhausted error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_label_counts_as_failed_attempt() {
        let err = safe_decode(b"caf\xe9", "klingon", &["ascii"]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Exhausted { ref attempted, .. } if attempted == &["klingon", "ascii"]
        ));

        let ok = safe_decode(b"plain", "klingon", &["ascii"]).unwrap();
        assert_eq!(ok.encoding, "ascii");
    }

    #[test]
    fn test_empty_input() {
        let result = safe_decode(b"", "utf-8", NONE).unwrap();
        assert_eq!(result.into_parts(), (String::new(), "utf-8".to_string()));
    }

    #[test]
    fn test_error_messages() {
        let err = DecodeError::Exhausted {
            attempted: vec!["utf-8".into(), "ascii".into()],
            preview: "e9".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to decode content as text, tried encodings: utf-8, ascii; first bytes: e9"
        );
    }
}
