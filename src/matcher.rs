//! Multi-pattern line matching over a byte buffer.
//!
//! Each pattern keeps a [`Cursor`] holding its next known match in the
//! remaining, not yet consumed, part of the buffer. Every step picks one
//! winning match, consumes the full lines it covers, and resynchronizes the
//! cursors:
//!
//! - the winner is searched again from the new position;
//! - every other cursor is shifted left by the consumed length and is only
//!   searched again when its match fell inside the consumed region.
//!
//! Patterns whose next match lies ahead of the consumed lines are therefore
//! not searched again on every step.
//!
//! # Winner selection
//!
//! Among primed cursors the winner has the smallest start; on equal starts
//! the larger end (the longer match) wins; remaining ties go to the pattern
//! given first. See [`Span::precedes`].

use crate::format::{count_newlines, line_expand, LineGroup};
use regex::bytes::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
#[error("invalid pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Half-open byte range `[start, end)` relative to the remaining buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether this span beats `other` in winner selection: earlier start,
    /// then longer end. Equal spans do not precede each other.
    pub const fn precedes(&self, other: &Span) -> bool {
        self.start < other.start || (self.start == other.start && self.end > other.end)
    }

    fn shift(self, consumed: usize) -> Option<Span> {
        Some(Span {
            start: self.start.checked_sub(consumed)?,
            end: self.end.checked_sub(consumed)?,
        })
    }
}

/// Per-pattern match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Primed(Span),
    Exhausted,
}

impl Cursor {
    /// Search `pattern` in `buf` from `offset`, expressing the match relative
    /// to `offset`.
    fn search(pattern: &Regex, buf: &[u8], offset: usize) -> Self {
        match pattern.find_at(buf, offset) {
            Some(m) => Cursor::Primed(Span::new(m.start() - offset, m.end() - offset)),
            None => Cursor::Exhausted,
        }
    }

    /// Shift the cursor left past `consumed` bytes.
    ///
    /// Returns `false` when the known match lay inside the consumed region;
    /// the cursor must then be searched again.
    pub fn seek(&mut self, consumed: usize) -> bool {
        match *self {
            Cursor::Exhausted => true,
            Cursor::Primed(span) => match span.shift(consumed) {
                Some(shifted) => {
                    *self = Cursor::Primed(shifted);
                    true
                }
                None => false,
            },
        }
    }

    pub const fn span(&self) -> Option<Span> {
        match self {
            Cursor::Primed(span) => Some(*span),
            Cursor::Exhausted => None,
        }
    }
}

/// The winning match of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Winner {
    /// Index of the pattern that produced the match.
    pub pattern: usize,
    pub span: Span,
}

/// A compiled, immutable set of patterns.
#[derive(Debug, Clone)]
pub struct MultiMatcher {
    patterns: Vec<Regex>,
}

impl MultiMatcher {
    /// Compile every pattern. `^` and `$` match at line boundaries.
    ///
    /// Fails on the first pattern that does not compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                RegexBuilder::new(pattern)
                    .multi_line(true)
                    .build()
                    .map_err(|source| PatternError {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Start matching a buffer. Every pattern is primed once.
    pub fn session<'m, 'b>(&'m self, buf: &'b [u8]) -> MatchSession<'m, 'b> {
        MatchSession::new(&self.patterns, buf)
    }
}

/// Matching state for one buffer.
///
/// Iterating yields one [`LineGroup`] per winning match, in source order.
#[derive(Debug)]
pub struct MatchSession<'m, 'b> {
    patterns: &'m [Regex],
    buf: &'b [u8],
    /// Start of the remaining buffer.
    offset: usize,
    /// Line number at `offset`.
    line: usize,
    cursors: Vec<Cursor>,
    searches: usize,
}

impl<'m, 'b> MatchSession<'m, 'b> {
    fn new(patterns: &'m [Regex], buf: &'b [u8]) -> Self {
        let cursors = patterns
            .iter()
            .map(|pattern| Cursor::search(pattern, buf, 0))
            .collect();

        Self {
            patterns,
            buf,
            offset: 0,
            line: 1,
            cursors,
            searches: patterns.len(),
        }
    }

    /// The unconsumed part of the buffer.
    pub fn remaining(&self) -> &'b [u8] {
        let buf = self.buf;
        &buf[self.offset..]
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// Number of pattern searches run so far, priming included.
    pub fn search_count(&self) -> usize {
        self.searches
    }

    /// The next winning match without consuming it.
    pub fn peek(&self) -> Option<Winner> {
        let mut best: Option<Winner> = None;
        for (pattern, cursor) in self.cursors.iter().enumerate() {
            let Some(span) = cursor.span() else {
                continue;
            };
            match best {
                Some(winner) if !span.precedes(&winner.span) => {}
                _ => best = Some(Winner { pattern, span }),
            }
        }
        best
    }

    /// Consume `consumed` bytes after `winner` matched.
    fn advance(&mut self, winner: usize, consumed: usize) {
        self.offset += consumed;
        for (idx, cursor) in self.cursors.iter_mut().enumerate() {
            if idx != winner && cursor.seek(consumed) {
                continue;
            }
            trace!(pattern = idx, offset = self.offset, "search");
            *cursor = Cursor::search(&self.patterns[idx], self.buf, self.offset);
            self.searches += 1;
        }
    }

    fn exhaust(&mut self) {
        self.offset = self.buf.len();
        self.cursors.fill(Cursor::Exhausted);
    }
}

impl<'m, 'b> Iterator for MatchSession<'m, 'b> {
    type Item = LineGroup<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.remaining();
        if remaining.is_empty() {
            return None;
        }
        let winner = self.peek()?;

        let (line_start, line_end) = line_expand(winner.span.start, winner.span.end, remaining);
        if line_start >= remaining.len() {
            // Empty match past the final newline.
            self.exhaust();
            return None;
        }

        let first_line = self.line + count_newlines(&remaining[..line_start]);
        let bytes = &remaining[line_start..line_end];
        let terminated = line_end < remaining.len();
        let group = LineGroup {
            first_line,
            offset: self.offset + line_start,
            bytes,
        };

        self.line = first_line + count_newlines(bytes) + usize::from(terminated);
        self.advance(winner.pattern, line_end + usize::from(terminated));
        Some(group)
    }
}
