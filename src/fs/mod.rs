//! Byte sources feeding the decode pipeline.
//!
//! Object stores are reached through their own SDKs; `DirSource` serves the
//! same list/fetch contract from a local directory.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Anything that can list named objects and hand back their bytes
pub trait ByteSource {
    /// Object names starting with `prefix`, sorted.
    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>>;

    fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Serves files under `root`, named by their `/`-separated relative path
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    ignore_patterns: Vec<String>,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>, ignore_patterns: Vec<String>) -> Self {
        Self {
            root: root.into(),
            ignore_patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files under the root, honouring .gitignore, hidden-file rules and
    /// the configured ignore globs.
    fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut excludes = OverrideBuilder::new(&self.root);
        for glob in &self.ignore_patterns {
            // overrides whitelist by default, "!" flips a glob to exclude
            excludes.add(&format!("!{}", glob))?;
        }

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(true)
            .overrides(excludes.build()?)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                    files.push(entry.into_path())
                }
                Ok(_) => {}
                Err(err) => warn!(root = ?self.root, "skipping unreadable entry: {}", err),
            }
        }
        Ok(files)
    }

    fn object_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            anyhow::bail!("Object name escapes the source root: {:?}", name);
        }
        Ok(self.root.join(relative))
    }
}

impl ByteSource for DirSource {
    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let paths = self
            .walk()
            .with_context(|| format!("Failed to list directory: {:?}", self.root))?;

        let mut names: Vec<String> = paths
            .iter()
            .filter_map(|p| self.object_name(p))
            .filter(|name| prefix.is_none_or(|pre| name.starts_with(pre)))
            .collect();
        names.sort();
        Ok(names)
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        std::fs::read(&path).with_context(|| format!("Failed to read object {:?}", name))
    }
}
