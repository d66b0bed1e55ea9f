//! Templating of pages and writing them to disk.

use crate::config::SiteConfig;
use crate::log;
use crate::util::read_file;
use gtmpl::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The pages of the site, one template each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Books,
    Blog,
    Post,
}

impl Page {
    /// The template file for the page, relative to the templates directory.
    pub fn template_name(&self) -> &'static str {
        match self {
            Page::Home => "index.html",
            Page::Books => "books.html",
            Page::Blog => "blog.html",
            Page::Post => "blog-post.html",
        }
    }
}

/// Applies page templates to their values. Templates are read from disk on
/// every render so that edits show up without a restart.
pub struct Renderer<'a> {
    /// The directory holding one template per [`Page`].
    pub templates_directory: &'a Path,

    /// Made available to every template as `site`.
    pub site: &'a SiteConfig,
}

impl Renderer<'_> {
    /// Renders `page` with `value`. When `value` is an object, the site
    /// settings are added to it under `site`.
    pub fn render(&self, page: Page, mut value: Value) -> Result<String> {
        let path = self.templates_directory.join(page.template_name());
        let source = read_file(&path).map_err(|err| Error::OpenTemplateFile {
            path: path.clone(),
            err,
        })?;

        if let Value::Object(obj) = &mut value {
            obj.insert("site".to_owned(), Value::from(self.site));
        }
        gtmpl::template(&source, value).map_err(|e| Error::Template {
            name: page.template_name(),
            message: e.to_string(),
        })
    }
}

/// Writes rendered pages under an output directory.
pub struct Writer<'a> {
    pub renderer: &'a Renderer<'a>,
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders `page` and writes it to `relative_path` under the output
    /// directory, creating parent directories as needed.
    pub fn write_page(&self, page: Page, value: Value, relative_path: &str) -> Result<PathBuf> {
        let html = self.renderer.render(page, value)?;
        let path = self.output_directory.join(relative_path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, html)?;
        log!("build"; "{}", relative_path);
        Ok(path)
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a template file can't be read.
    #[error("opening template file `{}`: {err}", path.display())]
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// An error during templating.
    #[error("rendering `{name}`: {message}")]
    Template { name: &'static str, message: String },

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::write_file;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn site() -> SiteConfig {
        serde_yaml::from_str("base_url: https://example.com\ntitle: Example\n").unwrap()
    }

    fn value(key: &str, s: &str) -> Value {
        let mut m = HashMap::new();
        m.insert(key.to_owned(), Value::String(s.to_owned()));
        Value::Object(m)
    }

    #[test]
    fn test_render_adds_site() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "blog.html", "{{.site.title}}: {{.greeting}}");
        let site = site();
        let renderer = Renderer {
            templates_directory: dir.path(),
            site: &site,
        };
        assert_eq!("Example: hi", renderer.render(Page::Blog, value("greeting", "hi"))?);
        Ok(())
    }

    #[test]
    fn test_render_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let site = site();
        let renderer = Renderer {
            templates_directory: dir.path(),
            site: &site,
        };
        assert!(matches!(
            renderer.render(Page::Home, Value::Nil),
            Err(Error::OpenTemplateFile { .. })
        ));
    }

    #[test]
    fn test_render_invalid_template() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "books.html", "{{if .x}}never closed");
        let site = site();
        let renderer = Renderer {
            templates_directory: dir.path(),
            site: &site,
        };
        assert!(matches!(
            renderer.render(Page::Books, value("x", "y")),
            Err(Error::Template { name: "books.html", .. })
        ));
    }

    #[test]
    fn test_write_page() -> Result<()> {
        let templates = tempfile::tempdir()?;
        let output = tempfile::tempdir()?;
        write_file(templates.path(), "blog-post.html", "<h1>{{.title}}</h1>");
        let site = site();
        let renderer = Renderer {
            templates_directory: templates.path(),
            site: &site,
        };
        let writer = Writer {
            renderer: &renderer,
            output_directory: output.path(),
        };

        let path = writer.write_page(Page::Post, value("title", "Hello"), "blog/hello/index.html")?;
        assert_eq!(output.path().join("blog/hello/index.html"), path);
        assert_eq!("<h1>Hello</h1>", fs::read_to_string(path)?);
        Ok(())
    }
}
