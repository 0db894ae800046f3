//! In-memory reference provider
//!
//! Holds whole contig sequences in a map. Used by tests and by the command
//! line, which loads it from a small JSON map (`{"chr1": "ACGT..."}`) or a
//! two-column `contig<TAB>sequence` text file.

use std::collections::HashMap;
use std::path::Path;

use crate::error::FerroError;
use crate::reference::provider::ReferenceProvider;

/// Mock reference provider backed by a contig map
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    contigs: HashMap<String, String>,
}

impl MockProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a contig sequence
    pub fn add_contig(&mut self, contig: impl Into<String>, sequence: impl Into<String>) {
        self.contigs
            .insert(contig.into(), sequence.into().to_ascii_uppercase());
    }

    /// Builder-style [`add_contig`](Self::add_contig)
    pub fn with_contig(mut self, contig: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.add_contig(contig, sequence);
        self
    }

    /// Load contigs from a JSON object mapping names to sequences
    pub fn from_json(path: &Path) -> Result<Self, FerroError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse contigs from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, FerroError> {
        let map: HashMap<String, String> = serde_json::from_str(content)?;
        let mut provider = Self::new();
        for (contig, sequence) in map {
            provider.add_contig(contig, sequence);
        }
        Ok(provider)
    }

    /// Load contigs from `contig<TAB>sequence` lines (`#` comments allowed)
    pub fn from_tsv(path: &Path) -> Result<Self, FerroError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_tsv_str(&content)
    }

    /// Parse contigs from `contig<TAB>sequence` text
    pub fn from_tsv_str(content: &str) -> Result<Self, FerroError> {
        let mut provider = Self::new();
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (contig, sequence) = line.split_once('\t').ok_or_else(|| FerroError::Io {
                msg: format!("line {}: expected 'contig<TAB>sequence'", line_num + 1),
            })?;
            provider.add_contig(contig.trim(), sequence.trim());
        }
        Ok(provider)
    }

    /// Load from a path, choosing the format by extension (`.json` or text)
    pub fn load(path: &Path) -> Result<Self, FerroError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(path),
            _ => Self::from_tsv(path),
        }
    }

    /// Get the number of contigs
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    /// Check if provider is empty
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Get all contig names, sorted
    pub fn contig_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contigs.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl ReferenceProvider for MockProvider {
    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, FerroError> {
        let seq = self
            .contigs
            .get(contig)
            .ok_or_else(|| FerroError::ReferenceUnavailable {
                contig: contig.to_string(),
                pos: start.saturating_add(1),
            })?;

        let (s, e) = (start as usize, end as usize);
        if s > e || e > seq.len() {
            return Err(FerroError::ReferenceUnavailable {
                contig: contig.to_string(),
                pos: end,
            });
        }
        Ok(seq[s..e].to_string())
    }

    fn has_contig(&self, contig: &str) -> bool {
        self.contigs.contains_key(contig)
    }
}
