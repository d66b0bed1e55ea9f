//! Defines the [`Parser`] which loads every [`Post`] in a source directory.

use crate::log;
use crate::post::{self, sort_by_date, Post};
use crate::util::{markdown_files, read_file};
use std::fs::read_dir;
use std::io;
use std::path::{Component, Path, PathBuf};

/// The extension of post source files.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `source_directory` is the directory holding one `{slug}.md` file per
    /// post.
    source_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser for the posts in `source_directory`.
    pub fn new(source_directory: &'a Path) -> Parser<'a> {
        Parser { source_directory }
    }

    /// Parses a single post file. The slug is the file name less the `.md`
    /// extension and must be a plain path segment (not `.` or `..`).
    pub fn parse_post(&self, path: &Path) -> Result<Post> {
        let slug = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| is_plain_name(stem))
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?;
        let contents = read_file(path)?;
        Post::from_str(slug, &contents)
            .map_err(|e| Error::Annotated(format!("parsing post `{}`", path.display()), e))
    }

    /// Searches the source directory (non-recursively) for `.md` files and
    /// returns the posts sorted by date, most recent first. Files that fail to
    /// parse are logged and skipped; only a failure to list the directory is
    /// an error.
    ///
    /// Each post file must be structured as follows:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// excerpt: Saying hello
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self) -> Result<Vec<Post>> {
        let entries = read_dir(self.source_directory).map_err(|err| Error::ListDirectory {
            path: self.source_directory.to_owned(),
            err,
        })?;

        let mut posts = Vec::new();
        for path in markdown_files(entries)? {
            match self.parse_post(&path) {
                Ok(post) => posts.push(post),
                Err(e) => log!("blog"; "skipping {}: {}", path.display(), e),
            }
        }

        sort_by_date(&mut posts);
        Ok(posts)
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Represents the result of loading posts.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading [`Post`]s from disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the posts directory can't be listed.
    #[error("reading directory `{}`: {err}", path.display())]
    ListDirectory { path: PathBuf, err: io::Error },

    /// Returned when a post's file name isn't valid UTF-8 or doesn't make a
    /// usable slug.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A post error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, post::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::write_file;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_posts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "older.md", "---\ntitle: Older\ndate: 2024-01-01\n---\nold");
        write_file(dir.path(), "newer.md", "---\ntitle: Newer\ndate: 2024-06-01\n---\nnew");
        write_file(dir.path(), "undated.md", "---\ntitle: Undated\n---\nwhenever");
        write_file(dir.path(), "broken.md", "---\ntitle: Broken\nno closing fence");
        write_file(dir.path(), "notes.txt", "---\ntitle: Not a post\n---\n");
        write_file(dir.path(), "SHOUTING.MD", "---\ntitle: Wrong case\n---\n");

        let posts = Parser::new(dir.path()).parse_posts()?;
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(vec!["newer", "older", "undated"], slugs);
        assert_eq!("Newer", posts[0].title);
        assert_eq!("<p>new</p>\n", posts[0].content);
        Ok(())
    }

    #[test]
    fn test_parse_posts_skips_dot_slugs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "..md", "---\ntitle: Dot\n---\nhidden");
        write_file(dir.path(), "...md", "---\ntitle: Dots\n---\nhidden");
        write_file(dir.path(), "real.md", "---\ntitle: Real\n---\nshown");

        let posts = Parser::new(dir.path()).parse_posts()?;
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(vec!["real"], slugs);
        assert!(matches!(
            Parser::new(dir.path()).parse_post(&dir.path().join("..md")),
            Err(Error::InvalidFileName(_))
        ));
        Ok(())
    }

    #[test]
    fn test_parse_posts_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("blog");
        assert!(matches!(
            Parser::new(&missing).parse_posts(),
            Err(Error::ListDirectory { .. })
        ));
    }

    #[test]
    fn test_parse_post_annotates_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "broken.md", "no frontmatter here");
        let err = Parser::new(dir.path())
            .parse_post(&dir.path().join("broken.md"))
            .unwrap_err();
        assert!(err.to_string().starts_with("parsing post `"));
        assert!(err.to_string().contains("broken.md"));
    }
}
