//! Conversions from the site's data into template [`Value`]s. Dates are
//! rendered as `YYYY-MM-DD` strings and absent values as `nil`, so templates
//! can test them with `{{if}}`.

use crate::books::{Book, ReadingStats};
use crate::config::{Profile, ProjectItem, SiteConfig, WorkItem};
use crate::frontmatter::DATE_FORMAT;
use crate::github::{ContributionCalendar, ContributionDay, ContributionWeek};
use crate::post::Post;
use chrono::NaiveDate;
use gtmpl_value::Value;
use std::collections::HashMap;

fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    let m: HashMap<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect();
    Value::Object(m)
}

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn number<N: Into<i64>>(n: N) -> Value {
    Value::from(n.into())
}

fn date(date: Option<NaiveDate>) -> Value {
    match date {
        Some(date) => Value::String(date.format(DATE_FORMAT).to_string()),
        None => Value::Nil,
    }
}

fn array<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>) -> Value
where
    Value: From<&'a T>,
{
    Value::Array(items.into_iter().map(Value::from).collect())
}

impl From<&SiteConfig> for Value {
    fn from(site: &SiteConfig) -> Value {
        object([
            ("base_url", string(site.base())),
            ("title", string(&site.title)),
            ("description", string(&site.description)),
            ("language", string(&site.language)),
        ])
    }
}

impl From<&Post> for Value {
    fn from(post: &Post) -> Value {
        object([
            ("title", string(&post.title)),
            ("slug", string(&post.slug)),
            ("url", Value::String(format!("/blog/{}", post.slug))),
            ("date", string(&post.date)),
            ("excerpt", string(&post.excerpt)),
            ("content", string(&post.content)),
            ("reading_time", Value::String(post.reading_time_label())),
        ])
    }
}

impl From<&Book> for Value {
    fn from(book: &Book) -> Value {
        object([
            ("title", string(&book.title)),
            ("author", string(&book.author)),
            ("pages", number(book.pages)),
            ("current_page", number(book.current_page)),
            ("progress", Value::from(book.progress)),
            ("progress_percent", Value::from(book.progress as i64)),
            ("status", string(book.status.as_str())),
            ("started", date(book.started)),
            ("last_read", date(book.last_read)),
            ("finished", date(book.finished)),
            ("total_reading_time", number(book.total_reading_time)),
        ])
    }
}

impl From<&ReadingStats> for Value {
    fn from(stats: &ReadingStats) -> Value {
        object([
            ("current_books", array(&stats.current_books)),
            ("finished_books", array(&stats.finished_books)),
            ("total_books", Value::from(stats.total_books as i64)),
            ("total_pages_read", Value::from(stats.total_pages_read as i64)),
            ("total_reading_time", Value::from(stats.total_reading_time as i64)),
            ("books_this_year", Value::from(stats.books_this_year as i64)),
        ])
    }
}

impl From<&WorkItem> for Value {
    fn from(work: &WorkItem) -> Value {
        object([
            ("company", string(&work.company)),
            ("title", string(&work.title)),
            ("period", string(&work.period)),
            ("description", string(&work.description)),
            ("url", string(&work.url)),
        ])
    }
}

impl From<&ProjectItem> for Value {
    fn from(project: &ProjectItem) -> Value {
        object([
            ("name", string(&project.name)),
            ("description", string(&project.description)),
            ("url", string(&project.url)),
        ])
    }
}

impl From<&ContributionDay> for Value {
    fn from(day: &ContributionDay) -> Value {
        object([
            ("date", string(&day.date)),
            ("count", number(day.count)),
            ("level", number(day.level)),
        ])
    }
}

impl From<&ContributionWeek> for Value {
    fn from(week: &ContributionWeek) -> Value {
        object([("days", array(&week.days))])
    }
}

impl From<&ContributionCalendar> for Value {
    fn from(calendar: &ContributionCalendar) -> Value {
        object([
            ("total", number(calendar.total)),
            ("weeks", array(&calendar.weeks)),
        ])
    }
}

/// Everything shown on the home page.
pub struct Home<'a> {
    pub profile: &'a Profile,
    pub reading_stats: &'a ReadingStats,
    pub contributions: Option<&'a ContributionCalendar>,

    /// The contents of the ASCII art file, or empty.
    pub ascii_art: &'a str,
}

impl From<&Home<'_>> for Value {
    fn from(home: &Home) -> Value {
        let profile = home.profile;
        object([
            ("name", string(&profile.name)),
            ("nickname", string(&profile.nickname)),
            ("location", string(&profile.location)),
            ("role", string(&profile.role)),
            ("status", string(&profile.status)),
            ("bio", string(&profile.bio)),
            (
                "currently_reading",
                string(home.reading_stats.currently_reading().unwrap_or_default()),
            ),
            ("ascii_art", string(home.ascii_art)),
            ("work", array(&profile.work)),
            ("projects", array(&profile.projects)),
            ("reading_stats", Value::from(home.reading_stats)),
            (
                "contributions",
                home.contributions.map(Value::from).unwrap_or(Value::Nil),
            ),
        ])
    }
}

/// The blog index lists every post under `posts`.
pub fn blog(posts: &[Post]) -> Value {
    object([("posts", array(posts))])
}

/// A post page exposes its post under `post`.
pub fn post(post: &Post) -> Value {
    object([("post", Value::from(post))])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::books::Status;

    fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
        match value {
            Value::Object(m) => &m[key],
            other => panic!("not an object: {}", other),
        }
    }

    fn text(value: &Value, key: &str) -> String {
        field(value, key).to_string()
    }

    #[test]
    fn test_book_value() {
        let book = Book {
            title: "Dune".to_owned(),
            pages: 3,
            current_page: 2,
            progress: 66.666,
            status: Status::Reading,
            started: NaiveDate::from_ymd_opt(2024, 5, 2),
            ..Book::default()
        };
        let value = Value::from(&book);
        assert_eq!("66", text(&value, "progress_percent"));
        assert_eq!("reading", text(&value, "status"));
        assert_eq!("2024-05-02", text(&value, "started"));
        assert!(matches!(field(&value, "finished"), Value::Nil));
    }

    #[test]
    fn test_home_value() {
        let profile = Profile {
            name: "Ada".to_owned(),
            ..Profile::default()
        };
        let stats = ReadingStats {
            current_books: vec![Book {
                title: "Dune".to_owned(),
                ..Book::default()
            }],
            total_books: 1,
            ..ReadingStats::default()
        };
        let home = Home {
            profile: &profile,
            reading_stats: &stats,
            contributions: None,
            ascii_art: "",
        };
        let value = Value::from(&home);
        assert_eq!("Ada", text(&value, "name"));
        assert_eq!("Dune", text(&value, "currently_reading"));
        assert!(matches!(field(&value, "contributions"), Value::Nil));
        assert_eq!("1", text(field(&value, "reading_stats"), "total_books"));
    }

    #[test]
    fn test_post_value() {
        let value = post(&Post {
            slug: "hello".to_owned(),
            reading_time: 3,
            ..Post::default()
        });
        let post = field(&value, "post");
        assert_eq!("/blog/hello", text(post, "url"));
        assert_eq!("3 min read", text(post, "reading_time"));
    }
}
