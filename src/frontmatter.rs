//! Splits content files into a frontmatter block and a body, and feeds the
//! frontmatter's `key: value` lines into typed records.
//!
//! A content file looks like this:
//!
//! ```md
//! ---
//! title: "Hello, world!"
//! date: 2024-06-01
//! ---
//! # Hello
//! ```
//!
//! Every loader (books, blog posts) shares the same routine: the caller
//! supplies a [`Fields`] implementation that knows which keys it recognizes
//! and how to coerce their values. Unknown keys never cause an error.

use chrono::NaiveDate;

/// The fence that opens and closes the frontmatter block.
pub const FENCE: &str = "---";

/// The only accepted format for date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A content file split into its frontmatter block and body.
#[derive(Debug, PartialEq)]
pub struct Document<'a> {
    /// The raw text between the first two fences.
    pub frontmatter: &'a str,

    /// Everything after the second fence, trimmed. Later fences are kept
    /// verbatim.
    pub body: &'a str,
}

impl<'a> Document<'a> {
    /// Splits `input` on the first two occurrences of [`FENCE`]. Anything
    /// before the first fence is discarded. Fails with
    /// [`Error::MalformedDocument`] when fewer than two fences are present.
    pub fn parse(input: &'a str) -> Result<Document<'a>> {
        let mut segments = input.splitn(3, FENCE);
        let _preamble = segments.next();
        match (segments.next(), segments.next()) {
            (Some(frontmatter), Some(body)) => Ok(Document {
                frontmatter,
                body: body.trim(),
            }),
            _ => Err(Error::MalformedDocument),
        }
    }

    /// Iterates over the `(key, value)` pairs of the frontmatter block in
    /// order of appearance. Blank lines and lines without a `:` are skipped.
    /// Keys and values are trimmed and one layer of double quotes is removed
    /// from values.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.frontmatter.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let (key, value) = line.split_once(':')?;
            Some((key.trim(), unquote(value.trim())))
        })
    }

    /// Feeds every frontmatter field into `target`. Later duplicates of a
    /// key overwrite earlier ones.
    pub fn apply<F: Fields>(&self, target: &mut F) {
        for (key, value) in self.fields() {
            target.set(key, value);
        }
    }
}

/// A record that can be populated from frontmatter fields.
pub trait Fields {
    /// Receives a single field. Implementations ignore keys they don't
    /// recognize and must not fail on malformed values.
    fn set(&mut self, key: &str, value: &str);
}

fn unquote(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Parses a `YYYY-MM-DD` date. Returns `None` for anything else, including
/// unpadded or signed fields that chrono alone would accept.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
}

/// Scans the leading decimal digits of `value` (after an optional `+`).
/// Returns 0 when there are none, when the value is negative, or when it
/// overflows.
pub fn parse_count(value: &str) -> u32 {
    let digits = value.strip_prefix('+').unwrap_or(value);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

/// The result of splitting a document.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a document that can't be split into frontmatter and body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Returned when the document has fewer than two `---` fences.
    #[error("invalid frontmatter format: expected a `---` delimited block")]
    MalformedDocument,
}
