//! Loads the project configuration from a `quire.yaml` file and derives the
//! locations of the content, template, static and output directories from
//! the directory that holds it.
//!
//! ```yaml
//! site:
//!   base_url: https://example.com
//!   title: Example
//!   description: Notes and books
//! profile:
//!   name: Ada
//!   work:
//!     - company: Engines Ltd
//!       title: analyst
//!       period: 1842 - 1843
//! github:
//!   username: ada
//! ```

use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "quire.yaml";

/// Overrides `github.token`.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Overrides `github.username`.
pub const GITHUB_USERNAME_VAR: &str = "GITHUB_USERNAME";

fn default_language() -> String {
    "en-us".to_owned()
}

/// Site-wide settings used for absolute links, the feed channel and the
/// sitemap.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SiteConfig {
    pub base_url: Url,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_language")]
    pub language: String,
}

impl SiteConfig {
    /// The base URL without a trailing slash, e.g. `https://example.com`.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// The absolute URL for a site-relative `path` starting with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base(), path)
    }

    /// The absolute URL of the post with the given slug.
    pub fn post_url(&self, slug: &str) -> String {
        self.url(&format!("/blog/{}", slug))
    }

    /// The absolute URL of the RSS feed.
    pub fn feed_url(&self) -> String {
        self.url("/rss.xml")
    }
}

/// The owner of the site, shown on the home page.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub nickname: String,
    pub location: String,
    pub role: String,
    pub status: String,
    pub bio: String,
    pub work: Vec<WorkItem>,
    pub projects: Vec<ProjectItem>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkItem {
    pub company: String,
    pub title: String,
    pub period: String,
    pub description: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectItem {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Credentials for the contribution graph. The graph is skipped unless both
/// are present.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GithubConfig {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl GithubConfig {
    /// The username and token, when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|s| !s.is_empty())?;
        let token = self.token.as_deref().filter(|s| !s.is_empty())?;
        Some((username, token))
    }
}

#[derive(Deserialize)]
struct Project {
    site: SiteConfig,

    #[serde(default)]
    profile: Profile,

    #[serde(default)]
    github: GithubConfig,
}

/// The resolved configuration for building or serving a site.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub site: SiteConfig,
    pub profile: Profile,
    pub github: GithubConfig,

    /// The directory containing the project file.
    pub root_directory: PathBuf,

    /// `content/blog`, one `.md` file per post.
    pub blog_directory: PathBuf,

    /// `content/books`, holding the `reading` and `finished` directories.
    pub books_directory: PathBuf,

    /// `templates`, holding one template per page.
    pub templates_directory: PathBuf,

    /// `static`, copied verbatim into the output.
    pub static_directory: PathBuf,

    /// The ASCII art shown on the home page (`assets/logo.ascii`).
    pub ascii_art_file: PathBuf,

    /// Where the build writes the site. Defaults to `public`.
    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a `quire.yaml` file
    /// and loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    /// Loads the project file at `path`. All other paths are resolved
    /// relative to the directory containing it.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::OpenProjectFile {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
            _ => PathBuf::from("."),
        };
        Ok(Config::new(project, root))
    }

    fn new(project: Project, root: PathBuf) -> Config {
        let content = root.join("content");
        Config {
            site: project.site,
            profile: project.profile,
            github: project.github,
            blog_directory: content.join("blog"),
            books_directory: content.join("books"),
            templates_directory: root.join("templates"),
            static_directory: root.join("static"),
            ascii_art_file: root.join("assets").join("logo.ascii"),
            output_directory: root.join("public"),
            root_directory: root,
        }
    }

    /// Overrides the GitHub credentials with the `GITHUB_TOKEN` and
    /// `GITHUB_USERNAME` variables found by `lookup`. Empty values are
    /// ignored.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(token) = var(GITHUB_TOKEN_VAR) {
            self.github.token = Some(token);
        }
        if let Some(username) = var(GITHUB_USERNAME_VAR) {
            self.github.username = Some(username);
        }
    }
}

/// The result of loading the configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no ancestor of the starting directory holds a project
    /// file.
    #[error("could not find `{PROJECT_FILE}` in any parent directory")]
    ProjectFileNotFound,

    /// Returned when the project file exists but can't be opened.
    #[error("opening project file `{}`: {err}", path.display())]
    OpenProjectFile { path: PathBuf, err: io::Error },

    /// Returned when the project file isn't valid.
    #[error("parsing project file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
