//! The library code for the `quire` personal site generator. Both entry
//! points share one content pipeline:
//!
//! 1. Loading content from disk: posts ([`crate::parser`], [`crate::post`])
//!    and the reading list ([`crate::books`]), both built on the shared
//!    frontmatter routine in [`crate::frontmatter`] and, for posts, the
//!    markdown renderer in [`crate::markdown`].
//! 2. Projecting it: template values ([`crate::value`]), the RSS feed
//!    ([`crate::feed`]) and the sitemap ([`crate::sitemap`]), optionally
//!    enriched with the GitHub contribution graph ([`crate::github`]).
//! 3. Emitting it: [`crate::build`] renders everything once into an output
//!    directory, while [`crate::serve`] renders each page on request.
//!
//! Nothing is cached between builds or requests.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod books;
pub mod build;
pub mod cli;
pub mod config;
pub mod feed;
pub mod frontmatter;
pub mod github;
pub mod log;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod serve;
pub mod sitemap;
pub mod util;
pub mod value;
pub mod write;

#[cfg(test)]
mod testutil;
