//! Support for creating the RSS 2.0 feed from a list of posts.

use crate::config::SiteConfig;
use crate::log;
use crate::post::Post;
use chrono::{DateTime, NaiveDate, Utc};
use rss::extension::atom::{self, AtomExtensionBuilder, Link};
use rss::validation::Validate;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// RFC-1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Creates the feed for `posts`, which are expected to be sorted newest
/// first, validates it and writes it to `path`.
pub fn write_feed(site: &SiteConfig, posts: &[Post], path: &Path) -> Result<()> {
    let xml = to_xml(&channel(site, posts, Utc::now()))?;
    fs::write(path, xml)?;
    log!("rss"; "{} ({} items)", path.display(), posts.len());
    Ok(())
}

/// Validates the channel and serializes it, XML declaration included.
pub fn to_xml(channel: &Channel) -> Result<String> {
    channel
        .validate()
        .map_err(|e| Error::Validation(e.to_string()))?;
    Ok(channel.to_string())
}

/// Projects `posts` into a channel. The last build date is the date of the
/// newest dated post, or `now` when no post has a date.
pub fn channel(site: &SiteConfig, posts: &[Post], now: DateTime<Utc>) -> Channel {
    let last_build_date = posts
        .iter()
        .filter_map(|p| p.raw_date)
        .max()
        .map(format_date)
        .unwrap_or_else(|| now.format(DATE_FORMAT).to_string());

    let self_link = Link {
        href: site.feed_url(),
        rel: "self".to_owned(),
        mime_type: Some("application/rss+xml".to_owned()),
        ..Default::default()
    };

    let mut namespaces = BTreeMap::new();
    namespaces.insert("atom".to_owned(), atom::NAMESPACE.to_owned());

    ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.base().to_owned())
        .description(site.description.clone())
        .language(Some(site.language.clone()))
        .last_build_date(Some(last_build_date))
        .namespaces(namespaces)
        .atom_ext(Some(AtomExtensionBuilder::default().links(vec![self_link]).build()))
        .items(posts.iter().map(|p| item(site, p)).collect::<Vec<Item>>())
        .build()
}

// A post without a valid date has no `pubDate`.
fn item(site: &SiteConfig, post: &Post) -> Item {
    let link = site.post_url(&post.slug);
    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
        .description(Some(post.excerpt.clone()))
        .pub_date(post.raw_date.map(format_date))
        .build()
}

/// Formats a date as midnight UTC in [`DATE_FORMAT`].
pub fn format_date(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .format(DATE_FORMAT)
        .to_string()
}

/// The result of a feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating the feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the generated channel isn't valid RSS, e.g. because the
    /// configured base URL produces unparseable links.
    #[error("rss validation failed: {0}")]
    Validation(String),

    /// Returned when the feed file can't be written.
    #[error(transparent)]
    Io(#[from] io::Error),
}
