//! Sitemap generation.
//!
//! Lists the three top-level pages followed by every post:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <changefreq>weekly</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```

use crate::config::SiteConfig;
use crate::frontmatter::DATE_FORMAT;
use crate::log;
use crate::post::Post;
use std::fs;
use std::io;
use std::path::Path;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Single URL entry in the sitemap
#[derive(Clone, Debug, PartialEq)]
pub struct UrlEntry {
    pub loc: String,

    /// `YYYY-MM-DD`, omitted for undated posts and the fixed pages.
    pub lastmod: Option<String>,
    pub changefreq: &'static str,
    pub priority: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sitemap {
    pub urls: Vec<UrlEntry>,
}

impl Sitemap {
    pub fn from_posts(site: &SiteConfig, posts: &[Post]) -> Sitemap {
        let fixed = |path: &str, changefreq: &'static str, priority: f32| UrlEntry {
            loc: site.url(path),
            lastmod: None,
            changefreq,
            priority,
        };

        let mut urls = vec![
            fixed("/", "weekly", 1.0),
            fixed("/blog", "weekly", 0.9),
            fixed("/books", "monthly", 0.8),
        ];
        urls.extend(posts.iter().map(|post| UrlEntry {
            loc: site.post_url(&post.slug),
            lastmod: post.raw_date.map(|d| d.format(DATE_FORMAT).to_string()),
            changefreq: "monthly",
            priority: 0.7,
        }));
        Sitemap { urls }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 * (self.urls.len() + 1));

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = &entry.lastmod {
                xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
            xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_xml())?;
        log!("sitemap"; "{} ({} urls)", path.display(), self.urls.len());
        Ok(())
    }
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
