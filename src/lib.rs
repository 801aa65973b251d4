pub mod config;
pub mod core;
pub mod fs;
pub mod policy;
pub mod runner;

// Re-export key items for convenience
pub use config::BlobTextConfig;
pub use crate::core::{
    Classifier, ContentKind, DecodeError, DecodeResult, EncodingResolver, TextDocument, classify,
    guess_content_type, safe_decode,
};
pub use fs::{ByteSource, DirSource};
pub use policy::FallbackPolicy;
pub use runner::TextReader;
