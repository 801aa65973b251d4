//! Caller-side fallback policy keyed by file extension.
//!
//! Tabular exports are often written by spreadsheet tools in legacy or
//! 16-bit encodings, so their fallback list is widened when the caller asked
//! for plain UTF-8.

use crate::core::encoding::normalize_label;
use std::collections::BTreeMap;
use std::path::Path;

pub const TABULAR_FALLBACKS: &[&str] = &["latin1", "cp1252", "utf-16", "ascii"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Lowercase extension without the dot -> fallback list
    pub by_extension: BTreeMap<String, Vec<String>>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        let tabular: Vec<String> = TABULAR_FALLBACKS.iter().map(|s| s.to_string()).collect();
        let by_extension = ["csv", "tsv"]
            .into_iter()
            .map(|ext| (ext.to_string(), tabular.clone()))
            .collect();
        Self { by_extension }
    }
}

impl FallbackPolicy {
    pub fn empty() -> Self {
        Self {
            by_extension: BTreeMap::new(),
        }
    }

    pub fn from_table(table: BTreeMap<String, Vec<String>>) -> Self {
        let by_extension = table
            .into_iter()
            .map(|(ext, list)| (ext.trim_start_matches('.').to_ascii_lowercase(), list))
            .collect();
        Self { by_extension }
    }

    /// Widened fallbacks for `name`, only consulted when `primary` is UTF-8.
    pub fn lookup(&self, name: &str, primary: &str) -> Option<&[String]> {
        if !matches!(normalize_label(primary).as_str(), "utf-8" | "utf8") {
            return None;
        }
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        self.by_extension.get(&ext).map(Vec::as_slice)
    }

    /// Explicit fallbacks win, then the extension table, then the given default.
    pub fn resolve(
        &self,
        name: &str,
        primary: &str,
        explicit: &[String],
        default: &[String],
    ) -> Vec<String> {
        if !explicit.is_empty() {
            return explicit.to_vec();
        }
        match self.lookup(name, primary) {
            Some(list) => list.to_vec(),
            None => default.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_widens_for_utf8() {
        let policy = FallbackPolicy::default();
        let list = policy.lookup("exports/Report.CSV", "utf-8").unwrap();
        assert_eq!(list, TABULAR_FALLBACKS);
        assert!(policy.lookup("data.tsv", "UTF8").is_some());
    }

    #[test]
    fn test_no_widening_for_other_primary_or_extension() {
        let policy = FallbackPolicy::default();
        assert!(policy.lookup("data.csv", "latin1").is_none());
        assert!(policy.lookup("notes.txt", "utf-8").is_none());
        assert!(policy.lookup("Makefile", "utf-8").is_none());
    }

    #[test]
    fn test_resolve_priority() {
        let policy = FallbackPolicy::default();
        let explicit = vec!["cp1252".to_string()];
        let default = vec!["ascii".to_string()];

        assert_eq!(policy.resolve("a.csv", "utf-8", &explicit, &default), explicit);
        assert_eq!(policy.resolve("a.csv", "utf-8", &[], &default), TABULAR_FALLBACKS);
        assert_eq!(policy.resolve("a.txt", "utf-8", &[], &default), default);
    }

    #[test]
    fn test_from_table_normalizes_keys() {
        let mut table = BTreeMap::new();
        table.insert(".LOG".to_string(), vec!["utf-16".to_string()]);
        let policy = FallbackPolicy::from_table(table);
        assert_eq!(policy.lookup("app.log", "utf-8").unwrap(), ["utf-16".to_string()]);
    }
}
