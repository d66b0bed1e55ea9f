//! Defines the [`Post`] type and the logic that turns a single post source
//! file into one. See [`crate::parser`] for loading a whole directory.

use crate::frontmatter::{self, parse_date, Document, Fields};
use crate::markdown;
use chrono::NaiveDate;

/// Words per minute used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Represents a blog post.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Post {
    /// The title of the post.
    pub title: String,

    /// The file name of the post's source file without the `.md`
    /// extension. Used in the post's URL.
    pub slug: String,

    /// The date exactly as written in the frontmatter.
    pub date: String,

    /// The parsed `date`, or `None` when it isn't a valid `YYYY-MM-DD` date.
    pub raw_date: Option<NaiveDate>,

    /// A short description used on the index page and in the feed.
    pub excerpt: String,

    /// The rendered HTML body.
    pub content: String,

    /// The estimated reading time in minutes, never less than 1.
    pub reading_time: usize,
}

impl Post {
    /// Parses a post from the contents of its source file. Fails when the
    /// frontmatter block is missing or when the body can't be rendered.
    pub fn from_str(slug: &str, input: &str) -> Result<Post> {
        let document = Document::parse(input)?;
        let mut post = Post {
            slug: slug.to_owned(),
            ..Post::default()
        };
        document.apply(&mut post);
        if post.excerpt.is_empty() {
            post.excerpt = first_paragraph(document.body);
        }
        post.content = markdown::to_html(document.body)?;
        post.reading_time = reading_minutes(document.body);
        Ok(post)
    }

    /// The reading time as displayed, e.g. `"3 min read"`.
    pub fn reading_time_label(&self) -> String {
        format!("{} min read", self.reading_time)
    }
}

impl Fields for Post {
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "title" => self.title = value.to_owned(),
            "date" => {
                self.date = value.to_owned();
                self.raw_date = parse_date(value);
            }
            "excerpt" => self.excerpt = value.to_owned(),
            _ => {}
        }
    }
}

/// Estimates reading time from the whitespace-separated words of the raw
/// markdown. Markup and code count as words.
pub fn reading_minutes(markdown: &str) -> usize {
    std::cmp::max(markdown.split_whitespace().count() / WORDS_PER_MINUTE, 1)
}

/// Sorts posts newest first. Posts without a valid date go last; ties keep
/// their relative order.
pub fn sort_by_date(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.raw_date.cmp(&a.raw_date));
}

// The first paragraph of the body with its whitespace collapsed, skipping
// headings and raw HTML blocks.
// Blocks are runs of non-blank lines; `lines()` also strips `\r`.
fn first_paragraph(body: &str) -> String {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in body.lines().map(str::trim) {
        match blocks.last_mut() {
            Some(block) if !line.is_empty() => block.push(line),
            Some(block) if block.is_empty() => {}
            _ => blocks.push(Vec::new()),
        }
    }
    blocks
        .into_iter()
        .find(|block| {
            block.first().is_some_and(|first| {
                !first.starts_with('#') && !first.starts_with('<') && !first.starts_with("```")
            })
        })
        .map(|block| block.join(" ").split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] from its source text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the source has no frontmatter block.
    #[error(transparent)]
    Frontmatter(#[from] frontmatter::Error),

    /// Returned when the body can't be converted to HTML.
    #[error("rendering markdown: {0}")]
    Markdown(#[from] markdown::Error),
}
