//! Generic markdown rendering for the Confluence pipeline.
//!
//! Thin wrapper over `pulldown-cmark` that produces the plain HTML fragment
//! the transformation passes consume, plus the heading records the anchor
//! index is built from and an optionally extracted page title.

use mdconf_transform::Heading;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

/// Result of rendering one markdown document.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    /// Generic HTML fragment.
    pub html: String,
    /// Title extracted from the first H1 heading, if enabled and present.
    pub title: Option<String>,
    /// Document headings in source order, title excluded.
    pub headings: Vec<Heading>,
}

/// Markdown renderer with tables, strikethrough, tasklists and footnotes
/// enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownRenderer {
    extract_title: bool,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the first H1 heading as the page title and omit it from the
    /// rendered HTML. Confluence renders the page title itself; keeping the
    /// H1 in the body would show it twice.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Render markdown to an HTML fragment with heading records.
    #[must_use]
    pub fn render(&self, markdown: &str) -> RenderedPage {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES;
        let events: Vec<Event<'_>> = Parser::new_ext(markdown, options).collect();

        let mut headings = Vec::new();
        let mut title = None;
        let mut title_span = None;

        let mut pos = 0;
        while pos < events.len() {
            if let Event::Start(Tag::Heading { level, .. }) = &events[pos] {
                let level = heading_level_to_num(*level);
                let end = heading_end(&events, pos);
                let text = flatten_text(&events[pos + 1..end]);

                if self.extract_title && level == 1 && title.is_none() {
                    title = Some(text);
                    title_span = Some((pos, end));
                } else {
                    headings.push(Heading {
                        level,
                        text,
                        index: headings.len(),
                    });
                }
                pos = end + 1;
            } else {
                pos += 1;
            }
        }

        let mut out = String::with_capacity(markdown.len() * 2);
        let body = events.into_iter().enumerate().filter_map(|(i, event)| {
            match title_span {
                Some((start, end)) if i >= start && i <= end => None,
                _ => Some(event),
            }
        });
        html::push_html(&mut out, body);

        RenderedPage {
            html: out.trim_end().to_owned(),
            title,
            headings,
        }
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Index of the matching heading end event.
fn heading_end(events: &[Event<'_>], start: usize) -> usize {
    events[start..]
        .iter()
        .position(|event| matches!(event, Event::End(TagEnd::Heading(_))))
        .map_or(events.len() - 1, |offset| start + offset)
}

/// Flatten a heading's inline events to plain text.
fn flatten_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}
