//! Core module for blobtext
//!
//! Content-type classification, the strict codec registry and the
//! decode-retry loop built on them.

pub mod classify;
pub mod decode;
pub mod encoding;
mod types;

pub use classify::{Classifier, classify, guess_content_type};
pub use decode::{DecodeError, EncodingResolver, safe_decode};
pub use encoding::Codec;
pub use types::*;
