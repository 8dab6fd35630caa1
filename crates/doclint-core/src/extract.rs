//! Fenced block and inline pattern extraction.
//!
//! Everything here is a plain regex scan over the document text. Extractors
//! borrow from the text and yield matches in document order.

use crate::document::line_at;
use regex::Regex;
use std::sync::OnceLock;

/// Opening fence of a bash block, as counted by the balance rule.
pub const BASH_FENCE: &str = "```bash";

/// Any fence marker.
pub const FENCE: &str = "```";

fn bash_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```bash\n(.*?)```").expect("valid bash block regex"))
}

fn localhost_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"http://localhost:\d+[^\s"'`)]*"#).expect("valid localhost url regex")
    })
}

fn docker_command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"docker\s+[A-Za-z-]+").expect("valid docker command regex"))
}

fn compose_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"-f\s+([^\s]+docker-compose\.yml)").expect("valid compose path regex")
    })
}

fn expansion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\(([^)]+)\)|\$\{([^}]+)\}").expect("valid expansion regex")
    })
}

fn continuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\n`]*\\\s*\n[^\n`]*").expect("valid continuation regex"))
}

/// A trimmed bash block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlock<'a> {
    /// Position among the document's bash blocks, starting at 0.
    pub index: usize,

    /// 1-based document line of the first non-blank content line.
    pub line: usize,

    /// Block content without fences and surrounding whitespace.
    pub text: &'a str,
}

impl<'a> CodeBlock<'a> {
    /// Lines of the block.
    pub fn lines(&self) -> impl Iterator<Item = &'a str> {
        self.text.lines()
    }

    /// Lines that are not shell comments.
    pub fn code_lines(&self) -> impl Iterator<Item = &'a str> {
        self.text.lines().filter(|line| !is_comment(line))
    }

    /// Document line of the `offset`-th line inside the block.
    pub fn doc_line(&self, offset: usize) -> usize {
        self.line + offset
    }
}

/// Whether a shell line is a comment.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Lazy iterator over bash blocks.
pub struct BashBlocks<'a> {
    text: &'a str,
    inner: regex::CaptureMatches<'static, 'a>,
    index: usize,
}

impl<'a> Iterator for BashBlocks<'a> {
    type Item = CodeBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        let body = caps.get(1)?;
        let raw = body.as_str();
        let leading = raw.len() - raw.trim_start().len();

        let block = CodeBlock {
            index: self.index,
            line: line_at(self.text, body.start() + leading),
            text: raw.trim(),
        };
        self.index += 1;
        Some(block)
    }
}

/// Locate every non-overlapping ```` ```bash ```` ... ```` ``` ```` pair.
///
/// An empty iterator is not an error.
pub fn bash_blocks(text: &str) -> BashBlocks<'_> {
    BashBlocks {
        text,
        inner: bash_block_re().captures_iter(text),
        index: 0,
    }
}

/// `http://localhost:<port>...` references.
pub fn localhost_urls(text: &str) -> impl Iterator<Item = &str> {
    localhost_url_re().find_iter(text).map(|m| m.as_str())
}

/// `docker <subcommand>` invocations.
pub fn docker_commands(text: &str) -> impl Iterator<Item = &str> {
    docker_command_re().find_iter(text).map(|m| m.as_str())
}

/// Paths passed as `-f <path>docker-compose.yml`.
pub fn compose_paths(text: &str) -> impl Iterator<Item = &str> {
    compose_path_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// A `$( ... )` or `${ ... }` expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion<'a> {
    /// The full match, delimiters included.
    pub raw: &'a str,

    /// Byte offset of the match in the scanned text.
    pub start: usize,

    /// Text between the delimiters.
    pub content: &'a str,
}

/// Command substitutions and parameter expansions.
pub fn expansions(text: &str) -> impl Iterator<Item = Expansion<'_>> {
    expansion_re().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let content = caps.get(1).or_else(|| caps.get(2))?.as_str();
        Some(Expansion {
            raw: whole.as_str(),
            start: whole.start(),
            content,
        })
    })
}

/// Multi-line spans joined by a backslash, with their starting byte offset.
pub fn continuation_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    continuation_re()
        .find_iter(text)
        .map(|m| (m.start(), m.as_str()))
}
