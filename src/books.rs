//! The reading list: [`Book`] records loaded from markdown files and the
//! [`ReadingStats`] aggregated over them.
//!
//! Books live in two directories under the books root:
//!
//! * `reading/` for books in progress;
//! * `finished/` for books that are done.
//!
//! Each file carries only frontmatter; the body is ignored:
//!
//! ```md
//! ---
//! title: "The Rust Programming Language"
//! author: Steve Klabnik
//! pages: 560
//! current_page: 212
//! started: 2024-05-02
//! last_updated: 2024-06-11
//! ---
//! ```

use crate::frontmatter::{self, parse_count, parse_date, Document, Fields};
use crate::log;
use crate::util::{markdown_files, read_file};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

/// Minutes of reading time credited per page read.
pub const MINUTES_PER_PAGE: f64 = 1.25;

/// The directory (under the books root) holding books in progress.
pub const READING_DIRECTORY: &str = "reading";

/// The directory (under the books root) holding finished books.
pub const FINISHED_DIRECTORY: &str = "finished";

/// Where a book stands. Determined by the directory it was loaded from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Reading,
    Finished,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Reading => "reading",
            Status::Finished => "finished",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single book on the reading list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub pages: u32,
    pub current_page: u32,

    /// Percentage read, within `0.0..=100.0`. Always `100.0` for finished
    /// books.
    pub progress: f64,
    pub status: Status,
    pub started: Option<NaiveDate>,

    /// From the `last_updated` frontmatter key.
    pub last_read: Option<NaiveDate>,
    pub finished: Option<NaiveDate>,

    /// Minutes spent reading, `current_page * MINUTES_PER_PAGE` truncated.
    pub total_reading_time: u32,
}

impl Book {
    /// Parses a book from the contents of its source file and derives
    /// progress and reading time. Fails only when the frontmatter block is
    /// missing; malformed values are left at zero.
    pub fn from_str(input: &str, status: Status) -> frontmatter::Result<Book> {
        let document = Document::parse(input)?;
        let mut book = Book::default();
        document.apply(&mut book);

        if book.pages > 0 {
            book.progress = (book.current_page as f64 / book.pages as f64 * 100.0).min(100.0);
        }
        book.total_reading_time = (book.current_page as f64 * MINUTES_PER_PAGE) as u32;
        book.status = status;
        if status == Status::Finished {
            book.progress = 100.0;
        }
        Ok(book)
    }

    /// Reads and parses a book file.
    pub fn load(path: &Path, status: Status) -> Result<Book> {
        let contents = read_file(path)?;
        Ok(Book::from_str(&contents, status)?)
    }
}

impl Fields for Book {
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "title" => self.title = value.to_owned(),
            "author" => self.author = value.to_owned(),
            "pages" => self.pages = parse_count(value),
            "current_page" => self.current_page = parse_count(value),
            "started" => self.started = parse_date(value),
            "last_updated" => self.last_read = parse_date(value),
            "finished" => self.finished = parse_date(value),
            _ => {}
        }
    }
}

/// Loads every `.md` file in `dir` as a book with the given status. A
/// missing directory holds no books. Files that fail to parse are logged and
/// skipped.
pub fn load_books(dir: &Path, status: Status) -> Result<Vec<Book>> {
    let entries = match read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(Error::ListDirectory {
                path: dir.to_owned(),
                err,
            })
        }
    };

    let mut books = Vec::new();
    for path in markdown_files(entries)? {
        match Book::load(&path, status) {
            Ok(book) => books.push(book),
            Err(e) => log!("books"; "skipping {}: {}", path.display(), e),
        }
    }
    Ok(books)
}

/// Aggregate statistics over the whole reading list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadingStats {
    /// Books in progress, most recently read first.
    pub current_books: Vec<Book>,

    /// Finished books, most recently finished first.
    pub finished_books: Vec<Book>,
    pub total_books: usize,

    /// Sum of `current_page` over all books.
    pub total_pages_read: u64,

    /// Sum of `total_reading_time` over all books, in minutes.
    pub total_reading_time: u64,

    /// Finished books whose `finished` date falls in the current year.
    pub books_this_year: usize,
}

impl ReadingStats {
    /// Loads both book directories under `books_directory` and aggregates
    /// them. `today` decides which year counts as "this year".
    pub fn load(books_directory: &Path, today: NaiveDate) -> Result<ReadingStats> {
        let current = load_books(&books_directory.join(READING_DIRECTORY), Status::Reading)?;
        let finished = load_books(&books_directory.join(FINISHED_DIRECTORY), Status::Finished)?;
        Ok(ReadingStats::from_books(current, finished, today))
    }

    /// Aggregates already-loaded books. Books without a date sort last.
    pub fn from_books(
        mut current_books: Vec<Book>,
        mut finished_books: Vec<Book>,
        today: NaiveDate,
    ) -> ReadingStats {
        current_books.sort_by(|a, b| b.last_read.cmp(&a.last_read));
        finished_books.sort_by(|a, b| b.finished.cmp(&a.finished));

        let all = || current_books.iter().chain(finished_books.iter());
        let total_books = all().count();
        let total_pages_read = all().map(|b| u64::from(b.current_page)).sum();
        let total_reading_time = all().map(|b| u64::from(b.total_reading_time)).sum();
        let books_this_year = finished_books
            .iter()
            .filter(|b| b.finished.map(|d| d.year()) == Some(today.year()))
            .count();

        ReadingStats {
            current_books,
            finished_books,
            total_books,
            total_pages_read,
            total_reading_time,
            books_this_year,
        }
    }

    /// The title of the most recently read book in progress, if any.
    pub fn currently_reading(&self) -> Option<&str> {
        self.current_books.first().map(|b| b.title.as_str())
    }
}

/// The result of loading books.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the reading list.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when an existing book directory can't be listed.
    #[error("failed to read {} directory: {err}", path.display())]
    ListDirectory { path: PathBuf, err: io::Error },

    /// Returned when a book file has no frontmatter block.
    #[error(transparent)]
    Frontmatter(#[from] frontmatter::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::write_file;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    #[test]
    fn test_from_str() -> frontmatter::Result<()> {
        let book = Book::from_str(
            "---\ntitle: \"Dune\"\nauthor: Frank Herbert\npages: 400\ncurrent_page: 100\nstarted: 2024-05-02\nlast_updated: 2024-06-11\nrating: 5\n---\n",
            Status::Reading,
        )?;
        assert_eq!(
            Book {
                title: "Dune".to_owned(),
                author: "Frank Herbert".to_owned(),
                pages: 400,
                current_page: 100,
                progress: 25.0,
                status: Status::Reading,
                started: date(2024, 5, 2),
                last_read: date(2024, 6, 11),
                finished: None,
                total_reading_time: 125,
            },
            book
        );
        Ok(())
    }

    #[test]
    fn test_progress_is_clamped() -> frontmatter::Result<()> {
        let book = Book::from_str("---\npages: 100\ncurrent_page: 250\n---\n", Status::Reading)?;
        assert_eq!(100.0, book.progress);
        assert_eq!(312, book.total_reading_time);
        Ok(())
    }

    #[test]
    fn test_progress_without_pages() -> frontmatter::Result<()> {
        let book = Book::from_str("---\ncurrent_page: 40\n---\n", Status::Reading)?;
        assert_eq!(0.0, book.progress);
        Ok(())
    }

    #[test]
    fn test_finished_forces_full_progress() -> frontmatter::Result<()> {
        let book = Book::from_str(
            "---\npages: 300\ncurrent_page: 3\nfinished: 2024-02-01\n---\n",
            Status::Finished,
        )?;
        assert_eq!(100.0, book.progress);
        assert_eq!(Status::Finished, book.status);
        assert_eq!(date(2024, 2, 1), book.finished);
        Ok(())
    }

    #[test]
    fn test_malformed_values_fall_back_to_zero() -> frontmatter::Result<()> {
        let book = Book::from_str(
            "---\ntitle: Odd\npages: many\ncurrent_page: ?\nlast_updated: yesterday\n---\n",
            Status::Reading,
        )?;
        assert_eq!("Odd", book.title);
        assert_eq!(0, book.pages);
        assert_eq!(0, book.current_page);
        assert_eq!(None, book.last_read);
        Ok(())
    }

    #[test]
    fn test_load_books_missing_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(Vec::<Book>::new(), load_books(&dir.path().join("nope"), Status::Reading)?);
        Ok(())
    }

    #[test]
    fn test_load_books_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "reading", "a file, not a directory");
        assert!(matches!(
            load_books(&dir.path().join("reading"), Status::Reading),
            Err(Error::ListDirectory { .. })
        ));
    }

    #[test]
    fn test_load_aggregates_and_skips_malformed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(
            dir.path(),
            "reading/older.md",
            "---\ntitle: Older\npages: 200\ncurrent_page: 100\nlast_updated: 2024-03-01\n---\n",
        );
        write_file(
            dir.path(),
            "reading/newer.md",
            "---\ntitle: Newer\npages: 300\ncurrent_page: 40\nlast_updated: 2024-07-01\n---\n",
        );
        write_file(dir.path(), "reading/untouched.md", "---\ntitle: Untouched\n---\n");
        write_file(
            dir.path(),
            "reading/broken.md",
            "---\ntitle: Broken\ncurrent_page: 999\n",
        );
        write_file(dir.path(), "reading/notes.txt", "---\ncurrent_page: 999\n---\n");
        write_file(
            dir.path(),
            "finished/last-year.md",
            "---\ntitle: Last Year\ncurrent_page: 80\nfinished: 2023-12-31\n---\n",
        );
        write_file(
            dir.path(),
            "finished/this-year.md",
            "---\ntitle: This Year\ncurrent_page: 20\nfinished: 2024-01-02\n---\n",
        );

        let stats = ReadingStats::load(dir.path(), today())?;

        let titles = |books: &[Book]| books.iter().map(|b| b.title.clone()).collect::<Vec<_>>();
        assert_eq!(vec!["Newer", "Older", "Untouched"], titles(&stats.current_books));
        assert_eq!(vec!["This Year", "Last Year"], titles(&stats.finished_books));
        assert_eq!(5, stats.total_books);
        assert_eq!(240, stats.total_pages_read);
        assert_eq!(125 + 50 + 100 + 25, stats.total_reading_time);
        assert_eq!(1, stats.books_this_year);
        assert_eq!(Some("Newer"), stats.currently_reading());
        Ok(())
    }

    #[test]
    fn test_books_this_year_follows_today() {
        let finished = vec![
            Book {
                finished: date(2025, 3, 1),
                ..Book::default()
            },
            Book {
                finished: None,
                ..Book::default()
            },
        ];
        let in_2024 = ReadingStats::from_books(Vec::new(), finished.clone(), today());
        let in_2025 = ReadingStats::from_books(
            Vec::new(),
            finished,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert_eq!(0, in_2024.books_this_year);
        assert_eq!(1, in_2025.books_this_year);
    }

    #[test]
    fn test_empty_stats() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let stats = ReadingStats::load(dir.path(), today())?;
        assert_eq!(ReadingStats::default(), stats);
        assert_eq!(None, stats.currently_reading());
        Ok(())
    }
}
