//! ## sparhund-detection::signatures
//! **Aho-Corasick pattern matching with thread-safe updates**
//!
//! Patterns are matched ASCII case-insensitively, so `UNION SELECT` and
//! `union select` hit the same signature. Reported indices are the
//! positions in which patterns were added.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use parking_lot::RwLock;

use crate::error::DetectionError;

pub struct SignatureEngine {
    patterns: RwLock<Vec<String>>,
    matcher: RwLock<Option<AhoCorasick>>,
}

impl SignatureEngine {
    pub fn new() -> Self {
        Self {
            patterns: RwLock::new(Vec::new()),
            matcher: RwLock::new(None),
        }
    }

    /// Engine preloaded with `patterns`, compiled once.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self, DetectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = Self::new();
        engine
            .patterns
            .write()
            .extend(patterns.into_iter().map(Into::into));
        engine.rebuild_matcher()?;
        Ok(engine)
    }

    pub fn pattern_add(&self, pattern: &str) -> Result<(), DetectionError> {
        {
            let mut patterns = self.patterns.write();
            patterns.push(pattern.to_string());
        }
        self.rebuild_matcher()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.read().len()
    }

    pub fn pattern(&self, index: usize) -> Option<String> {
        self.patterns.read().get(index).cloned()
    }

    fn rebuild_matcher(&self) -> Result<(), DetectionError> {
        let patterns = self.patterns.read();
        if patterns.iter().any(|p| p.is_empty()) {
            return Err(DetectionError::PatternError("empty pattern".into()));
        }
        let matcher = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(patterns.iter())
            .map_err(|e| DetectionError::PatternError(e.to_string()))?;

        *self.matcher.write() = Some(matcher);
        Ok(())
    }

    /// Indices of every (overlapping) pattern occurrence in `data`.
    #[inline]
    pub fn buffer_scan(&self, data: &[u8]) -> Vec<usize> {
        let matcher = self.matcher.read();
        matcher.as_ref().map_or(Vec::new(), |matcher| {
            matcher
                .find_overlapping_iter(data)
                .map(|m| m.pattern().as_usize())
                .collect()
        })
    }

    /// Whether any pattern occurs in `data`.
    #[inline]
    pub fn buffer_matches(&self, data: &[u8]) -> bool {
        let matcher = self.matcher.read();
        matcher.as_ref().is_some_and(|matcher| matcher.is_match(data))
    }
}

impl Default for SignatureEngine {
    fn default() -> Self {
        Self::new()
    }
}
