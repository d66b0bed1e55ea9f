//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the reading list and the
//! posts, rendering the pages ([`crate::write`]), copying the static source
//! directory into the output directory, and generating the feed, the sitemap
//! and the auxiliary files.
//!
//! The loaders here are shared with the live server ([`crate::serve`]), which
//! calls them on every request.

use crate::books::ReadingStats;
use crate::config::{Config, PROJECT_FILE};
use crate::feed::{self, write_feed};
use crate::github::ContributionCalendar;
use crate::log;
use crate::markdown::{self, theme_css};
use crate::parser::Parser;
use crate::post::Post;
use crate::sitemap::Sitemap;
use crate::util::{copy_dir, read_file};
use crate::value::{self, Home};
use crate::write::{self, Page, Renderer, Writer};
use chrono::{Local, NaiveDate};
use gtmpl::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Security headers and cache rules for hosts that read a `_headers` file.
pub const HEADERS: &str = "/*
  X-Frame-Options: DENY
  X-Content-Type-Options: nosniff
  X-XSS-Protection: 1; mode=block
  Referrer-Policy: strict-origin-when-cross-origin

/*.css
  Cache-Control: public, max-age=31536000, immutable

/*.js
  Cache-Control: public, max-age=31536000, immutable

/*.svg
  Cache-Control: public, max-age=31536000, immutable

/*.png
  Cache-Control: public, max-age=31536000, immutable

/*.ico
  Cache-Control: public, max-age=31536000, immutable

/*.webmanifest
  Content-Type: application/manifest+json
  Cache-Control: public, max-age=86400

/*.woff2
  Cache-Control: public, max-age=31536000, immutable
  Access-Control-Allow-Origin: *

/robots.txt
  Content-Type: text/plain
  Cache-Control: public, max-age=3600
";

/// Where the syntax highlighting stylesheet is served from, relative to the
/// site root.
pub const SYNTAX_CSS_PATH: &str = "static/css/syntax.css";

/// Loads the reading list. A failed load is logged and yields empty
/// statistics.
pub fn load_reading_stats(config: &Config, today: NaiveDate) -> ReadingStats {
    match ReadingStats::load(&config.books_directory, today) {
        Ok(stats) => {
            log!("books"; "loaded {} books", stats.total_books);
            stats
        }
        Err(e) => {
            log!("books"; "failed to load books: {}", e);
            ReadingStats::default()
        }
    }
}

/// Loads the posts, newest first. A failed load is logged and yields no
/// posts.
pub fn load_posts(config: &Config) -> Vec<Post> {
    match Parser::new(&config.blog_directory).parse_posts() {
        Ok(posts) => {
            log!("blog"; "loaded {} posts", posts.len());
            posts
        }
        Err(e) => {
            log!("blog"; "failed to load posts: {}", e);
            Vec::new()
        }
    }
}

/// The home page ASCII art, or an empty string when the file can't be read.
pub fn read_ascii_art(config: &Config) -> String {
    read_file(&config.ascii_art_file).unwrap_or_else(|e| {
        log!("build"; "no ascii art at {}: {}", config.ascii_art_file.display(), e);
        String::new()
    })
}

/// Builds the template value for the home page.
pub fn home_value(
    config: &Config,
    reading_stats: &ReadingStats,
    contributions: Option<&ContributionCalendar>,
) -> Value {
    let ascii_art = read_ascii_art(config);
    Value::from(&Home {
        profile: &config.profile,
        reading_stats,
        contributions,
        ascii_art: &ascii_art,
    })
}

/// Builds the site from a [`Config`] object into its output directory, which
/// is removed first.
pub fn build_site(config: &Config) -> Result<()> {
    let output = &config.output_directory;

    // The output directory is deleted wholesale; refuse to do that to the
    // project itself.
    if output.join(PROJECT_FILE).exists() {
        return Err(Error::UnsafeOutputDirectory(output.to_owned()));
    }
    rmdir(output)?;
    fs::create_dir_all(output)?;

    let renderer = Renderer {
        templates_directory: &config.templates_directory,
        site: &config.site,
    };
    let writer = Writer {
        renderer: &renderer,
        output_directory: output,
    };

    let today = Local::now().date_naive();
    let stats = load_reading_stats(config, today);
    let contributions = config.github.contributions();
    writer.write_page(
        Page::Home,
        home_value(config, &stats, contributions.as_ref()),
        "index.html",
    )?;
    writer.write_page(Page::Books, Value::from(&stats), "books/index.html")?;

    let posts = load_posts(config);
    writer.write_page(Page::Blog, value::blog(&posts), "blog/index.html")?;
    for post in &posts {
        writer.write_page(
            Page::Post,
            value::post(post),
            &format!("blog/{}/index.html", post.slug),
        )?;
    }

    write_feed(&config.site, &posts, &output.join("rss.xml"))?;

    if config.static_directory.is_dir() {
        copy_dir(&config.static_directory, &output.join("static")).map_err(|err| {
            Error::CopyStatic {
                path: config.static_directory.clone(),
                err,
            }
        })?;
        log!("build"; "static/");
    }

    let robots = config.static_directory.join("robots.txt");
    if robots.is_file() {
        fs::copy(&robots, output.join("robots.txt"))?;
        log!("build"; "robots.txt");
    }

    write_syntax_css(output)?;

    fs::write(output.join("_headers"), HEADERS)?;
    log!("build"; "_headers");

    Sitemap::from_posts(&config.site, &posts).write(&output.join("sitemap.xml"))?;

    log!("build"; "built {} posts into {}", posts.len(), output.display());
    Ok(())
}

fn write_syntax_css(output: &Path) -> Result<()> {
    let path = output.join(SYNTAX_CSS_PATH);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&path, theme_css()?)?;
    log!("build"; "{}", SYNTAX_CSS_PATH);
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Clean {
            path: dir.to_owned(),
            err: e,
        }),
    }
}

/// The result of building the site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors rendering or writing pages.
    #[error(transparent)]
    Write(#[from] write::Error),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] feed::Error),

    /// Returned when the syntax stylesheet can't be generated.
    #[error(transparent)]
    Markdown(#[from] markdown::Error),

    /// Returned when the output directory holds the project file.
    #[error("refusing to clean `{}`: it contains the project file", .0.display())]
    UnsafeOutputDirectory(PathBuf),

    /// Returned for I/O problems while cleaning the output directory.
    #[error("cleaning directory `{}`: {err}", path.display())]
    Clean { path: PathBuf, err: io::Error },

    /// Returned when the static directory can't be copied.
    #[error("copying `{}`: {err}", path.display())]
    CopyStatic { path: PathBuf, err: io::Error },

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] io::Error),
}
