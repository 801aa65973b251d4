use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::classify::{DEFAULT_CONTROL_THRESHOLD, DEFAULT_SAMPLE_SIZE, builtin_signatures};
use crate::core::decode::default_fallbacks;
use crate::core::{Classifier, EncodingResolver, MagicSignature};
use crate::policy::FallbackPolicy;

pub const CONFIG_FILE: &str = "blobtext.toml";

/// Extra magic signature as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub name: String,
    /// Prefix bytes as hex, e.g. "7f454c46"
    pub hex: String,
}

impl SignatureEntry {
    pub fn to_signature(&self) -> Result<MagicSignature> {
        let digits: String = self.hex.split_whitespace().collect();
        if digits.is_empty() {
            anyhow::bail!("Empty hex for signature {:?}", self.name);
        }
        let prefix = hex::decode(&digits)
            .with_context(|| format!("Invalid hex for signature {:?}", self.name))?;
        Ok(MagicSignature::new(self.name.clone(), prefix))
    }
}

/// Main configuration for blobtext
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobTextConfig {
    /// Directory served by the local byte source
    pub root: PathBuf,
    /// Glob patterns hidden from listings (e.g. "*.tmp")
    pub ignore_patterns: Vec<String>,
    /// Number of leading bytes inspected by the classifier
    pub sample_size: usize,
    /// Fraction of control bytes above which content is binary
    pub control_threshold: f64,
    /// Signatures checked in addition to the built-in table
    pub extra_signatures: Vec<SignatureEntry>,
    /// Encoding tried first
    pub primary_encoding: String,
    /// Encodings tried in order when the primary fails
    pub fallback_encodings: Vec<String>,
    /// Extension -> fallback list, replaces the built-in csv/tsv table when set
    pub extension_fallbacks: Option<BTreeMap<String, Vec<String>>>,
    /// Enable debug logging
    pub verbose: bool,
}

impl BlobTextConfig {
    /// Validates tunables and signature hex.
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            anyhow::bail!("sample_size must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.control_threshold) {
            anyhow::bail!(
                "control_threshold must be within [0, 1], got {}",
                self.control_threshold
            );
        }
        if self.primary_encoding.trim().is_empty() {
            anyhow::bail!("primary_encoding must not be empty");
        }
        for entry in &self.extra_signatures {
            entry.to_signature()?;
        }
        Ok(())
    }

    /// Loads `blobtext.toml` from the current directory, `Ok(None)` when absent.
    pub fn load_from_file() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    /// Loads an explicitly requested config file; unlike `load_from_file`, errors surface.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn classifier(&self) -> Result<Classifier> {
        let mut signatures = builtin_signatures();
        for entry in &self.extra_signatures {
            signatures.push(entry.to_signature()?);
        }
        Ok(Classifier {
            sample_size: self.sample_size,
            control_threshold: self.control_threshold,
            signatures,
        })
    }

    pub fn resolver(&self) -> Result<EncodingResolver> {
        Ok(EncodingResolver::new(self.classifier()?))
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        match &self.extension_fallbacks {
            Some(table) => FallbackPolicy::from_table(table.clone()),
            None => FallbackPolicy::default(),
        }
    }
}

impl Default for BlobTextConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignore_patterns: vec![".git".to_string(), "*.swp".to_string()],
            sample_size: DEFAULT_SAMPLE_SIZE,
            control_threshold: DEFAULT_CONTROL_THRESHOLD,
            extra_signatures: Vec::new(),
            primary_encoding: "utf-8".to_string(),
            fallback_encodings: default_fallbacks(),
            extension_fallbacks: None,
            verbose: false,
        }
    }
}
