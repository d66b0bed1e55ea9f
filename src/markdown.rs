//! Converts post bodies from markdown to HTML.
//!
//! The parser runs with the GitHub-flavored extensions (tables,
//! strikethrough, task lists, footnotes) and the event stream is rewritten
//! before it reaches [`pulldown_cmark::html::push_html`]:
//!
//! * every soft break becomes a hard break (`<br />`);
//! * headings get `id` anchors slugified from their text;
//! * bare `http(s)://` URLs in text become links;
//! * fenced code blocks with a language are highlighted with `syntect` into
//!   class-based spans (see [`theme_css`] for the matching stylesheet).
//!
//! Raw HTML in the source passes through untouched. Posts are written by the
//! site owner, so the input is trusted.

use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
    TextMergeStream,
};
use std::collections::HashSet;
use std::sync::LazyLock;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// The color theme the highlighting stylesheet is generated from.
pub const THEME: &str = "base16-ocean.dark";

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Converts markdown to HTML.
pub fn to_html(markdown: &str) -> Result<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut converter = EventConverter::default();
    for ev in TextMergeStream::new(Parser::new_ext(markdown, options)) {
        converter.convert(ev)?;
    }

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, converter.events.into_iter());
    Ok(out)
}

/// Returns the stylesheet for the classes emitted by highlighted code blocks.
pub fn theme_css() -> Result<String> {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(THEME)
        .ok_or_else(|| Error::MissingTheme(THEME.to_owned()))?;
    Ok(css_for_theme_with_class_style(theme, CLASS_STYLE)?)
}

/// A heading whose events are held back until its text is known.
struct PendingHeading<'a> {
    level: HeadingLevel,
    id: Option<CowStr<'a>>,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    text: String,
    events: Vec<Event<'a>>,
}

/// A fenced code block being collected for highlighting.
struct PendingCode {
    lang: String,
    source: String,
}

#[derive(Default)]
struct EventConverter<'a> {
    events: Vec<Event<'a>>,
    heading: Option<PendingHeading<'a>>,
    code: Option<PendingCode>,
    link_depth: usize,

    /// Set inside code blocks that are rendered without highlighting.
    verbatim: bool,

    /// Every heading id used so far, explicit ones included.
    anchors: HashSet<String>,
}

impl<'a> EventConverter<'a> {
    fn convert(&mut self, ev: Event<'a>) -> Result<()> {
        if let Some(code) = self.code.as_mut() {
            match ev {
                Event::Text(text) => code.source.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(code) = self.code.take() {
                        let highlighted = highlight(&code.lang, &code.source)?;
                        self.push(Event::Html(highlighted.into()));
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        match ev {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                match info.split_whitespace().next() {
                    Some(lang) => {
                        self.code = Some(PendingCode {
                            lang: lang.to_owned(),
                            source: String::new(),
                        })
                    }
                    None => {
                        self.verbatim = true;
                        self.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
                    }
                }
            }
            Event::Start(tag @ Tag::CodeBlock(CodeBlockKind::Indented)) => {
                self.verbatim = true;
                self.push(Event::Start(tag));
            }
            Event::End(TagEnd::CodeBlock) => {
                self.verbatim = false;
                self.push(Event::End(TagEnd::CodeBlock));
            }
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                self.heading = Some(PendingHeading {
                    level,
                    id,
                    classes,
                    attrs,
                    text: String::new(),
                    events: Vec::new(),
                })
            }
            Event::End(TagEnd::Heading(level)) => match self.heading.take() {
                Some(heading) => {
                    let id = match heading.id {
                        Some(id) => {
                            self.anchors.insert(id.to_string());
                            id
                        }
                        None => self.anchor(&heading.text).into(),
                    };
                    self.events.push(Event::Start(Tag::Heading {
                        level: heading.level,
                        id: Some(id),
                        classes: heading.classes,
                        attrs: heading.attrs,
                    }));
                    self.events.extend(heading.events);
                    self.events.push(Event::End(TagEnd::Heading(level)));
                }
                None => self.events.push(Event::End(TagEnd::Heading(level))),
            },
            Event::Text(text) => {
                if let Some(heading) = self.heading.as_mut() {
                    heading.text.push_str(&text);
                }
                if self.link_depth > 0 || self.verbatim {
                    self.push(Event::Text(text));
                } else {
                    self.autolink(text);
                }
            }
            Event::Code(code) => {
                if let Some(heading) = self.heading.as_mut() {
                    heading.text.push_str(&code);
                }
                self.push(Event::Code(code));
            }
            Event::SoftBreak => self.push(Event::HardBreak),
            Event::Start(tag @ Tag::Link { .. }) => {
                self.link_depth += 1;
                self.push(Event::Start(tag));
            }
            Event::End(TagEnd::Link) => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.push(Event::End(TagEnd::Link));
            }
            ev => self.push(ev),
        }
        Ok(())
    }

    fn push(&mut self, ev: Event<'a>) {
        match self.heading.as_mut() {
            Some(heading) => heading.events.push(ev),
            None => self.events.push(ev),
        }
    }

    /// Hands out a unique anchor for a heading's text. A taken anchor gets
    /// the first free `-1`, `-2`, ... suffix.
    fn anchor(&mut self, text: &str) -> String {
        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = String::from("heading");
        }
        let mut anchor = base.clone();
        let mut n = 0;
        while self.anchors.contains(&anchor) {
            n += 1;
            anchor = format!("{}-{}", base, n);
        }
        self.anchors.insert(anchor.clone());
        anchor
    }

    fn autolink(&mut self, text: CowStr<'a>) {
        let segments = split_urls(&text);
        if !segments.iter().any(|s| matches!(s, Segment::Url(_))) {
            self.push(Event::Text(text));
            return;
        }
        for segment in segments {
            match segment {
                Segment::Text(text) => self.push(Event::Text(text.to_owned().into())),
                Segment::Url(url) => {
                    let url: CowStr<'a> = url.to_owned().into();
                    self.push(Event::Start(Tag::Link {
                        link_type: LinkType::Autolink,
                        dest_url: url.clone(),
                        title: CowStr::Borrowed(""),
                        id: CowStr::Borrowed(""),
                    }));
                    self.push(Event::Text(url));
                    self.push(Event::End(TagEnd::Link));
                }
            }
        }
    }
}

/// A piece of text that is either plain or a bare URL.
#[derive(Debug, PartialEq)]
enum Segment<'t> {
    Text(&'t str),
    Url(&'t str),
}

/// Splits `text` around bare `http://` and `https://` URLs. A URL must start
/// at the beginning of the text or after whitespace or `(`, and runs until
/// whitespace or `<`. Trailing punctuation is left out of the URL.
fn split_urls(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = next_scheme(&text[cursor..]) {
        let start = cursor + offset;
        let boundary = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || c == '(');
        let end = text[start..]
            .find(|c: char| c.is_whitespace() || c == '<')
            .map_or(text.len(), |n| start + n);
        let url = trim_url(&text[start..end]);

        if !boundary || url.ends_with("://") {
            cursor = start + 1;
            continue;
        }
        if start > plain_start {
            segments.push(Segment::Text(&text[plain_start..start]));
        }
        segments.push(Segment::Url(url));
        plain_start = start + url.len();
        cursor = plain_start;
    }

    if plain_start < text.len() {
        segments.push(Segment::Text(&text[plain_start..]));
    }
    segments
}

fn next_scheme(text: &str) -> Option<usize> {
    match (text.find("http://"), text.find("https://")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn trim_url(url: &str) -> &str {
    let mut url = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'']);
    while url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
        url = url[..url.len() - 1].trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'']);
    }
    url
}

/// Highlights `source` as `lang` into a `<pre><code>` block. Unknown
/// languages are rendered as plain text.
fn highlight(lang: &str, source: &str) -> Result<String> {
    let syntax = SYNTAXES
        .find_syntax_by_token(lang)
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, CLASS_STYLE);
    for line in LinesWithEndings::from(source) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(format!(
        "<pre class=\"highlight\"><code class=\"language-{}\">{}</code></pre>\n",
        escape_attr(lang),
        generator.finalize()
    ))
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The result of a markdown conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error converting markdown to HTML.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a code block can't be highlighted.
    #[error("highlighting code block: {0}")]
    Highlight(#[from] syntect::Error),

    /// Returned when the highlighting theme isn't bundled with `syntect`.
    #[error("unknown highlighting theme `{0}`")]
    MissingTheme(String),
}
