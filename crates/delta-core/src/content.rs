//! Side text storage and line ending helpers.
//!
//! Both sides of a diff are stored internally using LF (`'\n'`) newlines on top of a
//! [`Rope`], so line/char conversion and splicing stay O(log n) on large files.
//! When a side is loaded from CRLF (`"\r\n"`) content it is normalized, and the original
//! line ending is kept as metadata for saving.
//!
//! All offsets are character offsets (Unicode scalar values).

use ropey::Rope;
use std::ops::Range;

/// The newline sequence a side should be written back with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the dominant line ending from a source text.
    ///
    /// Policy: if the input contains any CRLF (`"\r\n"`), returns [`LineEnding::Crlf`],
    /// otherwise [`LineEnding::Lf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Normalize a source text to LF newlines.
    pub fn normalize(text: &str) -> String {
        text.replace("\r\n", "\n")
    }

    /// Convert an LF-normalized text to this line ending for saving.
    pub fn apply_to_text(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => text.replace('\n', "\r\n"),
        }
    }
}

/// Number of `'\n'` characters in `text`.
pub fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

/// Number of lines in `text`, counting a trailing partial line and not counting the empty
/// remainder after a final `'\n'`.
///
/// This matches `text.split_inclusive('\n').count()`, the line model edit scripts use.
pub fn count_lines(text: &str) -> usize {
    let newlines = count_newlines(text);
    if text.is_empty() || text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Character lengths of every line of `text`, each including its `'\n'`.
pub(crate) fn line_lengths(text: &str) -> Vec<usize> {
    text.split_inclusive('\n')
        .map(|line| line.chars().count())
        .collect()
}

/// One side (OLD or NEW) of a diff.
#[derive(Debug, Clone)]
pub struct SideText {
    rope: Rope,
    line_ending: LineEnding,
}

impl SideText {
    /// Load a side from raw content, normalizing CRLF newlines.
    pub fn new(text: &str) -> Self {
        let line_ending = LineEnding::detect_in_text(text);
        let rope = match line_ending {
            LineEnding::Lf => Rope::from_str(text),
            LineEnding::Crlf => Rope::from_str(&LineEnding::normalize(text)),
        };
        Self { rope, line_ending }
    }

    /// Line ending the side was loaded with.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// The underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line count using the edit script line model (see [`count_lines`]).
    pub fn line_count(&self) -> usize {
        let len = self.rope.len_chars();
        if len == 0 {
            return 0;
        }
        let lines = self.rope.len_lines();
        if self.rope.char(len - 1) == '\n' {
            lines - 1
        } else {
            lines
        }
    }

    /// Character offset where `line` starts; `line_count()` maps to the text length.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.line_count() {
            self.rope.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }

    /// Index of the line containing `offset`.
    ///
    /// An offset at the very end of a text without trailing newline stays on the last line.
    pub fn line_at(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Line boundary index for an insertion point: like [`SideText::line_at`], except the
    /// end of a text without trailing newline maps to `line_count()`.
    pub fn line_boundary(&self, offset: usize) -> usize {
        let len = self.rope.len_chars();
        if offset >= len {
            self.line_count()
        } else {
            self.rope.char_to_line(offset)
        }
    }

    /// Whether `offset` is the first character of a line.
    pub fn is_line_start(&self, offset: usize) -> bool {
        offset == 0 || (offset <= self.rope.len_chars() && self.rope.char(offset - 1) == '\n')
    }

    /// Whether `offset` separates two lines: a line start or the end of the text.
    pub fn is_line_boundary(&self, offset: usize) -> bool {
        offset == self.rope.len_chars() || self.is_line_start(offset)
    }

    /// Grow `text` outwards to the nearest line boundaries.
    pub fn expand_to_lines(&self, text: &Range<usize>) -> Range<usize> {
        let start = if self.is_line_boundary(text.start) {
            text.start
        } else {
            self.line_start(self.line_at(text.start))
        };
        let end = if self.is_line_boundary(text.end) {
            text.end
        } else {
            self.line_start(self.line_at(text.end) + 1)
        };
        start..end
    }

    /// End-exclusive line range covering the characters of `text`.
    ///
    /// An empty range yields an empty line range at the insertion point's line boundary.
    pub fn line_range(&self, text: &Range<usize>) -> Range<usize> {
        if text.is_empty() {
            let line = self.line_boundary(text.start);
            return line..line;
        }
        self.line_at(text.start)..self.line_at(text.end - 1) + 1
    }

    /// Number of `'\n'` in the character range.
    pub fn newlines_in(&self, range: &Range<usize>) -> usize {
        self.rope
            .slice(range.clone())
            .chars()
            .filter(|c| *c == '\n')
            .count()
    }

    /// Copy of the characters in `range`.
    pub fn slice(&self, range: &Range<usize>) -> String {
        self.rope.slice(range.clone()).to_string()
    }

    /// Replace `deleted_length` characters at `offset` with `text`.
    ///
    /// Callers validate bounds beforehand.
    pub(crate) fn splice(&mut self, offset: usize, deleted_length: usize, text: &str) {
        if deleted_length > 0 {
            self.rope.remove(offset..offset + deleted_length);
        }
        if !text.is_empty() {
            self.rope.insert(offset, text);
        }
    }

    /// The full LF-normalized text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The full text converted back to the side's line ending.
    pub fn text_for_saving(&self) -> String {
        self.line_ending.apply_to_text(&self.text())
    }
}

impl PartialEq for SideText {
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope
    }
}

impl Eq for SideText {}
