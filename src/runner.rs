use crate::config::BlobTextConfig;
use crate::core::{
    Classifier, ContentKind, DecodeError, DecodeResult, EncodingResolver, TextDocument,
    hex_preview,
};
use crate::fs::{ByteSource, DirSource};
use crate::policy::FallbackPolicy;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Human readable size, one decimal place.
pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} GB", size)
}

/// Fetch-and-decode pipeline with the extension fallback policy applied
#[derive(Debug, Clone)]
pub struct TextReader {
    pub resolver: EncodingResolver,
    pub policy: FallbackPolicy,
    pub primary: String,
    pub default_fallbacks: Vec<String>,
}

impl Default for TextReader {
    fn default() -> Self {
        Self {
            resolver: EncodingResolver::default(),
            policy: FallbackPolicy::default(),
            primary: "utf-8".to_string(),
            default_fallbacks: crate::core::decode::default_fallbacks(),
        }
    }
}

impl TextReader {
    pub fn from_config(config: &BlobTextConfig) -> Result<Self> {
        Ok(Self {
            resolver: config.resolver()?,
            policy: config.fallback_policy(),
            primary: config.primary_encoding.clone(),
            default_fallbacks: config.fallback_encodings.clone(),
        })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.resolver.classifier
    }

    /// Decodes already fetched bytes; `name` only feeds the extension policy.
    pub fn decode_bytes(
        &self,
        name: &str,
        data: &[u8],
        primary: Option<&str>,
        fallbacks: &[String],
    ) -> Result<DecodeResult, DecodeError> {
        let primary = primary.unwrap_or(&self.primary);
        let fallbacks = self
            .policy
            .resolve(name, primary, fallbacks, &self.default_fallbacks);
        debug!(name, primary, ?fallbacks, "decoding");
        self.resolver.decode(data, primary, &fallbacks)
    }

    pub fn read_text(
        &self,
        source: &dyn ByteSource,
        name: &str,
        primary: Option<&str>,
        fallbacks: &[String],
    ) -> Result<TextDocument> {
        let data = source.fetch(name)?;
        let requested = primary.unwrap_or(&self.primary).to_string();
        let decoded = self.decode_bytes(name, &data, Some(requested.as_str()), fallbacks)?;

        let doc = TextDocument {
            name: name.to_string(),
            text: decoded.text,
            encoding: decoded.encoding,
            requested_encoding: requested,
        };
        if doc.fell_back() {
            info!(
                name,
                used = %doc.encoding,
                requested = %doc.requested_encoding,
                "decoded with fallback encoding"
            );
        }
        Ok(doc)
    }
}

#[derive(Debug, Serialize)]
struct Classification<'a> {
    name: &'a str,
    kind: ContentKind,
    size: u64,
    signature: Option<&'a str>,
    control_bytes: usize,
}

#[derive(Debug, Serialize)]
struct BinaryReport<'a> {
    name: &'a str,
    kind: ContentKind,
    size: u64,
    head: String,
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Options shared by the CLI commands
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub json: bool,
    pub encoding: Option<String>,
    pub fallbacks: Vec<String>,
    pub max_preview: usize,
}

pub fn run_list<W: Write>(
    config: &BlobTextConfig,
    prefix: Option<&str>,
    limit: usize,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let source = DirSource::new(&config.root, config.ignore_patterns.clone());
    let names = source.list(prefix)?;

    if json {
        return write_json(out, &names);
    }

    writeln!(
        out,
        "Found {} object(s) under {:?} prefix={}",
        names.len(),
        source.root(),
        prefix.unwrap_or("(none)")
    )?;
    for name in names.iter().take(limit) {
        writeln!(out, " - {}", name)?;
    }
    if names.len() > limit {
        writeln!(out, "... and {} more", names.len() - limit)?;
    }
    Ok(())
}

pub fn run_classify<W: Write>(
    config: &BlobTextConfig,
    file: &Path,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read file: {:?}", file))?;
    let classifier = config.classifier()?;
    let name = file.to_string_lossy();

    let report = Classification {
        name: &name,
        kind: classifier.classify(&data),
        size: data.len() as u64,
        signature: classifier
            .matching_signature(&data)
            .map(|s| s.name.as_str()),
        control_bytes: classifier.control_bytes(&data),
    };

    if json {
        return write_json(out, &report);
    }
    match report.signature {
        Some(sig) => writeln!(out, "{} ({} signature)", report.kind, sig)?,
        None => writeln!(out, "{}", report.kind)?,
    }
    Ok(())
}

pub fn run_decode<W: Write>(
    config: &BlobTextConfig,
    file: &Path,
    opts: &RunOptions,
    out: &mut W,
) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read file: {:?}", file))?;
    let reader = TextReader::from_config(config)?;
    let name = file.to_string_lossy();
    let requested = opts.encoding.as_deref().unwrap_or(&reader.primary).to_string();

    let decoded = reader.decode_bytes(&name, &data, Some(requested.as_str()), &opts.fallbacks)?;
    let doc = TextDocument {
        name: name.to_string(),
        text: decoded.text,
        encoding: decoded.encoding,
        requested_encoding: requested,
    };
    show_document(&doc, opts, out)
}

/// Reads an object through the local source; binary content is reported
/// instead of failing.
pub fn run_read<W: Write>(
    config: &BlobTextConfig,
    name: &str,
    opts: &RunOptions,
    out: &mut W,
) -> Result<()> {
    let source = DirSource::new(&config.root, config.ignore_patterns.clone());
    let reader = TextReader::from_config(config)?;

    let err = match reader.read_text(&source, name, opts.encoding.as_deref(), &opts.fallbacks) {
        Ok(doc) => return show_document(&doc, opts, out),
        Err(err) => err,
    };
    if !matches!(
        err.downcast_ref::<DecodeError>(),
        Some(DecodeError::BinaryContent { .. })
    ) {
        return Err(err);
    }

    let data = source.fetch(name)?;
    let report = BinaryReport {
        name,
        kind: reader.classifier().classify(&data),
        size: data.len() as u64,
        head: hex_preview(&data, 32),
    };
    if opts.json {
        return write_json(out, &report);
    }
    writeln!(out, "Detected binary content: {}", report.name)?;
    writeln!(out, "Content type: {}", report.kind)?;
    writeln!(out, "Size: {}", format_size(report.size))?;
    writeln!(out, "First 32 bytes (hex): {}", report.head)?;
    Ok(())
}

fn show_document<W: Write>(doc: &TextDocument, opts: &RunOptions, out: &mut W) -> Result<()> {
    if opts.json {
        return write_json(out, doc);
    }

    if doc.fell_back() {
        writeln!(
            out,
            "Note: decoded using {} (not {})",
            doc.encoding, doc.requested_encoding
        )?;
    }

    let total = doc.text.chars().count();
    let preview: String = doc.text.chars().take(opts.max_preview).collect();
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(out, "{}", preview)?;
    if total > opts.max_preview {
        writeln!(out, "... ({} chars total)", total)?;
    }
    writeln!(out, "{}", "-".repeat(40))?;
    Ok(())
}
