//! Live server.
//!
//! Renders every page on request from the content on disk, so edits to
//! posts, books, templates or static files show up on the next reload. Built
//! on `tiny_http`; Ctrl+C unblocks the server and ends the request loop.
//!
//! Routes:
//!
//! | path                     | response                               |
//! |--------------------------|----------------------------------------|
//! | `/`                      | home page                              |
//! | `/books`                 | reading list                           |
//! | `/blog`                  | post index                             |
//! | `/blog/<slug>`           | a single post                          |
//! | `/rss.xml`               | the feed                               |
//! | `/sitemap.xml`           | the sitemap                            |
//! | `/static/css/syntax.css` | the syntax highlighting stylesheet     |
//! | `/static/<path>`         | a file from the static directory       |

use crate::build::{home_value, load_posts, load_reading_stats};
use crate::config::Config;
use crate::feed;
use crate::log;
use crate::markdown::theme_css;
use crate::parser::{Parser, MARKDOWN_EXTENSION};
use crate::sitemap::Sitemap;
use crate::value;
use crate::write::{Page, Renderer};
use anyhow::{anyhow, Context, Result};
use chrono::{Local, Utc};
use gtmpl::Value;
use std::fmt::Display;
use std::fs;
use std::net::SocketAddr;
use std::path::{Component, Path};
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Start the server and handle requests until Ctrl+C is received.
pub fn serve_site(config: &Config, addr: SocketAddr) -> Result<()> {
    let server = Server::http(addr).map_err(|e| anyhow!("failed to bind {}: {}", addr, e))?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

fn handle_request(request: Request, config: &Config) -> Result<()> {
    let reply = respond(config, request.url());
    log!("serve"; "{} {} {}", request.method(), request.url(), reply.status);

    let content_type = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        .map_err(|_| anyhow!("invalid content type {}", reply.content_type))?;
    let response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(content_type);
    request.respond(response)?;
    Ok(())
}

/// A response, independent of the HTTP transport.
#[derive(Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Reply {
        Reply {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    fn html(body: String) -> Reply {
        Reply::ok("text/html; charset=utf-8", body)
    }

    fn not_found() -> Reply {
        Reply {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            body: b"404 Not Found".to_vec(),
        }
    }

    fn error(e: impl Display) -> Reply {
        log!("error"; "{}", e);
        Reply {
            status: 500,
            content_type: "text/plain; charset=utf-8",
            body: b"500 Internal Server Error".to_vec(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Route<'a> {
    Home,
    Books,
    Blog,
    Post(&'a str),
    Feed,
    Sitemap,
    SyntaxCss,
    Static(&'a str),
    NotFound,
}

// Query strings and fragments are dropped and trailing slashes ignored.
fn route(url: &str) -> Route<'_> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => Route::Home,
        "/books" => Route::Books,
        "/blog" => Route::Blog,
        "/rss.xml" => Route::Feed,
        "/sitemap.xml" => Route::Sitemap,
        "/static/css/syntax.css" => Route::SyntaxCss,
        path => {
            if let Some(slug) = path.strip_prefix("/blog/") {
                if is_relative_path(slug) && !slug.contains('/') {
                    return Route::Post(slug);
                }
            } else if let Some(relative) = path.strip_prefix("/static/") {
                if is_relative_path(relative) {
                    return Route::Static(relative);
                }
            }
            Route::NotFound
        }
    }
}

// Only plain names: no `..`, no root, no `.`.
fn is_relative_path(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Produces the response for a request URL, loading content from disk.
pub fn respond(config: &Config, url: &str) -> Reply {
    let renderer = Renderer {
        templates_directory: &config.templates_directory,
        site: &config.site,
    };
    let render = |page: Page, value: Value| match renderer.render(page, value) {
        Ok(html) => Reply::html(html),
        Err(e) => Reply::error(e),
    };

    match route(url) {
        Route::Home => {
            let stats = load_reading_stats(config, Local::now().date_naive());
            let contributions = config.github.contributions();
            render(
                Page::Home,
                home_value(config, &stats, contributions.as_ref()),
            )
        }
        Route::Books => {
            let stats = load_reading_stats(config, Local::now().date_naive());
            render(Page::Books, Value::from(&stats))
        }
        Route::Blog => render(Page::Blog, value::blog(&load_posts(config))),
        Route::Post(slug) => {
            let path = config
                .blog_directory
                .join(format!("{}.{}", slug, MARKDOWN_EXTENSION));
            if !path.is_file() {
                return Reply::not_found();
            }
            match Parser::new(&config.blog_directory).parse_post(&path) {
                Ok(post) => render(Page::Post, value::post(&post)),
                Err(e) => {
                    log!("blog"; "skipping {}: {}", path.display(), e);
                    Reply::not_found()
                }
            }
        }
        Route::Feed => {
            let channel = feed::channel(&config.site, &load_posts(config), Utc::now());
            match feed::to_xml(&channel) {
                Ok(xml) => Reply::ok("application/rss+xml; charset=utf-8", xml),
                Err(e) => Reply::error(e),
            }
        }
        Route::Sitemap => {
            let sitemap = Sitemap::from_posts(&config.site, &load_posts(config));
            Reply::ok("application/xml; charset=utf-8", sitemap.to_xml())
        }
        Route::SyntaxCss => match theme_css() {
            Ok(css) => Reply::ok(guess_content_type(Path::new("syntax.css")), css),
            Err(e) => Reply::error(e),
        },
        Route::Static(relative) => {
            let path = config.static_directory.join(relative);
            if !path.is_file() {
                return Reply::not_found();
            }
            match fs::read(&path) {
                Ok(data) => Reply::ok(guess_content_type(&path), data),
                Err(e) => Reply::error(format!("reading {}: {}", path.display(), e)),
            }
        }
        Route::NotFound => Reply::not_found(),
    }
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::write_site;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn site() -> (TempDir, Config) {
        let root = tempfile::tempdir().unwrap();
        write_site(root.path());
        let config = Config::from_directory(root.path()).unwrap();
        (root, config)
    }

    fn body(reply: &Reply) -> String {
        String::from_utf8(reply.body.clone()).unwrap()
    }

    #[test]
    fn test_route() {
        assert_eq!(Route::Home, route("/"));
        assert_eq!(Route::Home, route("/?ref=feed"));
        assert_eq!(Route::Books, route("/books/"));
        assert_eq!(Route::Blog, route("/blog?page=2"));
        assert_eq!(Route::Post("hello"), route("/blog/hello/"));
        assert_eq!(Route::NotFound, route("/blog/a/b"));
        assert_eq!(Route::NotFound, route("/blog/.."));
        assert_eq!(Route::Static("css/site.css"), route("/static/css/site.css"));
        assert_eq!(Route::NotFound, route("/static/../quire.yaml"));
        assert_eq!(Route::NotFound, route("/static/"));
        assert_eq!(Route::SyntaxCss, route("/static/css/syntax.css"));
        assert_eq!(Route::NotFound, route("/about"));
    }

    #[test]
    fn test_pages() {
        let (_root, config) = site();

        let home = respond(&config, "/");
        assert_eq!(200, home.status);
        assert_eq!("text/html; charset=utf-8", home.content_type);
        assert!(body(&home).contains("<p>Reading Dune</p>"));

        assert!(body(&respond(&config, "/books/")).contains("<li>Emma done</li>"));
        assert_eq!(
            "<a href=\"/blog/hello\">Hello</a><a href=\"/blog/older\">Older</a>",
            body(&respond(&config, "/blog"))
        );
        assert!(body(&respond(&config, "/blog/older")).starts_with("<h1>Older</h1>"));
        assert_eq!(404, respond(&config, "/blog/missing").status);
        assert_eq!(404, respond(&config, "/nowhere").status);
    }

    #[test]
    fn test_feed_and_sitemap() {
        let (_root, config) = site();

        let feed = respond(&config, "/rss.xml");
        assert_eq!("application/rss+xml; charset=utf-8", feed.content_type);
        assert_eq!(2, body(&feed).matches("<item>").count());

        let sitemap = respond(&config, "/sitemap.xml");
        assert_eq!(200, sitemap.status);
        assert_eq!(5, body(&sitemap).matches("<url>").count());
    }

    #[test]
    fn test_static_files() {
        let (_root, config) = site();

        let css = respond(&config, "/static/css/site.css?v=2");
        assert_eq!(200, css.status);
        assert_eq!("text/css; charset=utf-8", css.content_type);
        assert_eq!(b"body { margin: 0; }".to_vec(), css.body);

        let syntax = respond(&config, "/static/css/syntax.css");
        assert_eq!(200, syntax.status);
        assert_eq!("text/css; charset=utf-8", syntax.content_type);

        assert_eq!(404, respond(&config, "/static/missing.png").status);
        assert_eq!(404, respond(&config, "/static/../quire.yaml").status);
    }

    #[test]
    fn test_template_failure() {
        let (root, config) = site();
        fs::remove_file(root.path().join("templates/books.html")).unwrap();
        assert_eq!(500, respond(&config, "/books").status);
    }
}
