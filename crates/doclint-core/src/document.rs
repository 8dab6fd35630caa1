//! Runbook document loading and section splitting.

use crate::error::{DocLintError, Result};
use crate::extract::{bash_blocks, BashBlocks};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Default location of the runbook, relative to the working directory.
pub const DEFAULT_DOC_PATH: &str = "docs/troubleshooting.md";

/// Marker that opens a troubleshooting scenario.
pub const PROBLEM_MARKER: &str = "#### Problem:";

/// A loaded markdown document. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Where the text was read from (`<memory>` for in-process text).
    pub path: PathBuf,

    /// Raw document text.
    pub text: String,

    /// SHA-256 of the raw bytes, hex encoded.
    pub digest: String,
}

impl Document {
    /// Read a document from disk.
    ///
    /// A missing file is reported as [`DocLintError::DocumentNotFound`] so the
    /// caller can turn it into a skipped run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DocLintError::DocumentNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let digest = compute_digest(&bytes);
        let text = String::from_utf8(bytes).map_err(|e| {
            DocLintError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            text,
            digest,
        })
    }

    /// Wrap text that did not come from a file.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let digest = compute_digest(text.as_bytes());
        Self {
            path: PathBuf::from("<memory>"),
            text,
            digest,
        }
    }

    /// Fenced bash blocks in document order.
    pub fn bash_blocks(&self) -> BashBlocks<'_> {
        bash_blocks(&self.text)
    }

    /// Sections that follow each occurrence of `marker` (normally
    /// [`PROBLEM_MARKER`]); text before the first marker is not a section.
    pub fn problem_sections<'a>(&'a self, marker: &str) -> Vec<ProblemSection<'a>> {
        let mut sections = Vec::new();
        if marker.is_empty() {
            return sections;
        }
        let mut starts = self.text.match_indices(marker).map(|(i, _)| i).peekable();

        while let Some(start) = starts.next() {
            let body_start = start + marker.len();
            let end = starts.peek().copied().unwrap_or(self.text.len());
            let body = &self.text[body_start..end];
            sections.push(ProblemSection {
                title: body.lines().next().unwrap_or("").trim(),
                body,
                line: line_at(&self.text, start),
            });
        }

        sections
    }
}

/// One troubleshooting scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemSection<'a> {
    /// Text after the marker on the same line.
    pub title: &'a str,

    /// Everything up to the next marker or end of document.
    pub body: &'a str,

    /// 1-based line of the marker.
    pub line: usize,
}

/// 1-based line number of a byte offset.
pub fn line_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
