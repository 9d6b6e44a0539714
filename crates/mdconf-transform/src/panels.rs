//! Panel detection and conversion.
//!
//! Three independent source syntaxes become Confluence panel macros:
//!
//! - Custom tilde markers (`~?...?~`, `~%...%~`, `~^...^~`, `~$...$~`,
//!   `~!...!~`)
//! - GitHub-style alert blockquotes (`> [!NOTE]`, `> [!TIP]`, ...)
//! - Prefix-keyword blockquotes (`> Warning: ...`, `> Note: ...`)
//!
//! Each detection pass scans the body exactly once, left to right, and a
//! region converted by one syntax is never rescanned by another: tilde
//! output contains no `<blockquote>` and macro output contains no tilde
//! markers, so a second run over converted output is a no-op.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Panel severity. For standard panels the kind doubles as the macro name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PanelKind {
    Info,
    Warning,
    Success,
    Error,
    Note,
}

impl PanelKind {
    fn macro_name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Error => "error",
            Self::Note => "note",
        }
    }
}

/// Which syntax produced a panel.
///
/// The origin decides the output shape for `note` panels: a GitHub
/// `[!IMPORTANT]` alert renders as an ADF note panel, while tilde and
/// keyword notes render as a standard `note` macro. The two forms are not
/// interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PanelOrigin {
    Tilde,
    GithubAlert,
    BlockquoteKeyword,
}

/// Transient panel produced by one of the detection passes.
struct Panel {
    kind: PanelKind,
    origin: PanelOrigin,
    body: String,
}

impl Panel {
    fn render(&self) -> String {
        if self.kind == PanelKind::Note && self.origin == PanelOrigin::GithubAlert {
            format!(
                "<ac:adf-extension><ac:adf-node type=\"panel\">\
                 <ac:adf-attribute key=\"panel-type\">note</ac:adf-attribute>\
                 <ac:adf-content>{}</ac:adf-content>\
                 </ac:adf-node></ac:adf-extension>",
                self.body
            )
        } else {
            format!(
                "<p><ac:structured-macro ac:name=\"{}\" ac:schema-version=\"1\">\
                 <ac:rich-text-body>{}</ac:rich-text-body>\
                 </ac:structured-macro></p>",
                self.kind.macro_name(),
                self.body
            )
        }
    }
}

/// Tilde marker pairs in detection order.
const TILDE_RULES: [(&str, &str, PanelKind); 5] = [
    ("~?", "?~", PanelKind::Info),
    ("~%", "%~", PanelKind::Warning),
    ("~^", "^~", PanelKind::Success),
    ("~$", "$~", PanelKind::Error),
    ("~!", "!~", PanelKind::Note),
];

static TILDE_PATTERNS: LazyLock<Vec<(Regex, PanelKind)>> = LazyLock::new(|| {
    TILDE_RULES
        .iter()
        .map(|(open, close, kind)| {
            let pattern = format!(
                "(?s)<p>{}(.*?){}</p>",
                regex::escape(open),
                regex::escape(close)
            );
            (
                Regex::new(&pattern).expect("invalid tilde panel regex"),
                *kind,
            )
        })
        .collect()
});

static BLOCKQUOTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<blockquote>(.*?)</blockquote>").expect("invalid blockquote regex"));

static GITHUB_ALERT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<p>\[!(NOTE|TIP|IMPORTANT|WARNING|CAUTION)\]")
        .expect("invalid github alert regex")
});

static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // The colon may sit inside or outside an emphasis wrapper:
    // "Warning: x", "<strong>Warning:</strong> x", "<em>Warning</em>: x".
    Regex::new(r"(?i)^\s*<p>\s*(?:<(?:em|strong)>)?(note|warning|success|error)\b\s*:?\s*(?:</(?:em|strong)>)?\s*:?\s*")
        .expect("invalid keyword panel regex")
});

/// Convert all panel syntaxes in the body.
pub(crate) fn convert_panels(html: &str) -> String {
    let html = convert_tilde_panels(html);
    convert_blockquote_panels(&html)
}

/// Rewrite `<p>~X...X~</p>` blocks into panel macros.
///
/// An opening marker with no matching close in the same paragraph block is
/// left as ordinary content.
fn convert_tilde_panels(html: &str) -> String {
    let mut result = html.to_owned();
    for (pattern, kind) in TILDE_PATTERNS.iter() {
        if !pattern.is_match(&result) {
            continue;
        }
        result = pattern
            .replace_all(&result, |caps: &regex::Captures<'_>| {
                let panel = Panel {
                    kind: *kind,
                    origin: PanelOrigin::Tilde,
                    body: format!("<p>{}</p>", &caps[1]),
                };
                panel.render()
            })
            .into_owned();
    }
    result
}

/// Classify and rewrite blockquotes.
///
/// First match wins per blockquote: GitHub alert markers take precedence
/// over keyword prefixes; a blockquote with neither becomes an info panel
/// with the body retained verbatim.
fn convert_blockquote_panels(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for caps in BLOCKQUOTE_PATTERN.captures_iter(html) {
        let whole = caps.get(0).expect("match group 0");
        let quote = &caps[1];

        let panel = classify_blockquote(quote);
        debug!(kind = ?panel.kind, origin = ?panel.origin, "converting blockquote");

        result.push_str(&html[last_end..whole.start()]);
        result.push_str(&panel.render());
        last_end = whole.end();
    }
    result.push_str(&html[last_end..]);
    result
}

fn classify_blockquote(quote: &str) -> Panel {
    if let Some(panel) = parse_github_alert(quote) {
        return panel;
    }
    if let Some(panel) = parse_keyword_blockquote(quote) {
        return panel;
    }
    // No recognized keyword: default to an info panel with the full body.
    Panel {
        kind: PanelKind::Info,
        origin: PanelOrigin::BlockquoteKeyword,
        body: quote.trim().to_owned(),
    }
}

/// Parse a GitHub alert blockquote (`<p>[!KEYWORD]...`).
fn parse_github_alert(quote: &str) -> Option<Panel> {
    let caps = GITHUB_ALERT_PATTERN.captures(quote)?;
    let kind = match caps[1].to_ascii_uppercase().as_str() {
        "NOTE" => PanelKind::Info,
        "TIP" => PanelKind::Success,
        "IMPORTANT" => PanelKind::Note,
        "WARNING" => PanelKind::Warning,
        "CAUTION" => PanelKind::Error,
        _ => return None,
    };

    let marker_end = caps.get(0).expect("match group 0").end();
    let first_paragraph_end = quote[marker_end..].find("</p>")? + marker_end;
    let first_line = quote[marker_end..first_paragraph_end].trim();
    let remaining = quote[first_paragraph_end + "</p>".len()..].trim();

    let mut body = String::new();
    if !first_line.is_empty() {
        body.push_str("<p>");
        body.push_str(first_line);
        body.push_str("</p>");
    }
    body.push_str(remaining);
    if body.is_empty() {
        body.push_str("<p></p>");
    }

    Some(Panel {
        kind,
        origin: PanelOrigin::GithubAlert,
        body,
    })
}

/// Parse a keyword-prefixed blockquote (`<p>Warning: ...`).
fn parse_keyword_blockquote(quote: &str) -> Option<Panel> {
    let caps = KEYWORD_PATTERN.captures(quote)?;
    let kind = match caps[1].to_ascii_lowercase().as_str() {
        "note" => PanelKind::Note,
        "warning" => PanelKind::Warning,
        "success" => PanelKind::Success,
        "error" => PanelKind::Error,
        _ => return None,
    };

    let body = KEYWORD_PATTERN.replace(quote, "<p>").trim().to_owned();
    Some(Panel {
        kind,
        origin: PanelOrigin::BlockquoteKeyword,
        body,
    })
}
