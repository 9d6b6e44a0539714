//! Anchor link rewriting and local image resolution.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::anchors::{AnchorIndex, SourceFormat};
use crate::code::escape_cdata;
use crate::error::TransformError;

/// Confluence editor generation the page is rendered for.
///
/// The two editors disagree on how intra-page anchors are expressed: the
/// legacy editor wants structured link markup, the new editor wants a plain
/// hyperlink carrying the full page URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorVersion {
    /// Legacy editor, `<ac:link ac:anchor=…>` markup.
    V1,
    /// New editor, full-URL hyperlinks.
    #[default]
    V2,
}

/// Attachment resolution failure reported by the collaborator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AttachmentError {
    /// The referenced file does not exist next to the source document.
    #[error("attachment file not found: {path}")]
    Missing { path: String },

    /// The upload or lookup against the remote API failed.
    #[error("attachment upload failed")]
    Upload(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Collaborator that turns local image paths into attachment URLs.
///
/// Implementations are expected to upload the file as a side effect when the
/// remote copy is missing or stale, hence `&mut self`.
pub trait AttachmentResolver {
    /// Full URL of the page being published, used as the base for
    /// new-editor anchor links.
    fn page_base_url(&self) -> &str;

    /// Resolve a local image path to a download URL, uploading if needed.
    fn resolve_attachment(&mut self, path: &str) -> Result<String, AttachmentError>;
}

static ANCHOR_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a href="(#[^"]{1,256})">(.+?)</a>"#).expect("invalid anchor link regex")
});

static IMG_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img ([^>]{1,1024}?)/?>").expect("invalid img tag regex"));

static SRC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"]{1,1024})""#).expect("invalid src regex"));

static MARKUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *<[^>]{1,256}> *").expect("invalid markup regex"));

const PLAIN_TEXT_OPEN: &str = "<ac:plain-text-body>";
const PLAIN_TEXT_CLOSE: &str = "</ac:plain-text-body>";

/// Rewrite intra-document anchors and local image references.
///
/// Anchors that do not resolve through the index are left exactly as the
/// renderer produced them. Image resolution failure aborts the conversion;
/// a published page with a dead image is worse than no page.
///
/// Code macro bodies are raw text and must not be rewritten: anything
/// between `<ac:plain-text-body>` tags is carried through untouched.
pub(crate) fn rewrite_links(
    html: &str,
    index: &AnchorIndex,
    format: SourceFormat,
    editor: EditorVersion,
    resolver: &mut dyn AttachmentResolver,
) -> Result<String, TransformError> {
    let base_url = resolver.page_base_url().to_owned();
    let rewritten = map_outside_plain_text(html, |segment| {
        Ok(rewrite_anchors(segment, index, format, editor, &base_url))
    })?;
    map_outside_plain_text(&rewritten, |segment| resolve_images(segment, resolver))
}

/// Apply `rewrite` to the parts of the body outside plain-text macro bodies.
fn map_outside_plain_text<F>(html: &str, mut rewrite: F) -> Result<String, TransformError>
where
    F: FnMut(&str) -> Result<String, TransformError>,
{
    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(PLAIN_TEXT_OPEN) {
        result.push_str(&rewrite(&rest[..start])?);
        let body = &rest[start..];
        let end = body
            .find(PLAIN_TEXT_CLOSE)
            .map_or(body.len(), |i| i + PLAIN_TEXT_CLOSE.len());
        result.push_str(&body[..end]);
        rest = &body[end..];
    }
    result.push_str(&rewrite(rest)?);
    Ok(result)
}

fn rewrite_anchors(
    html: &str,
    index: &AnchorIndex,
    format: SourceFormat,
    editor: EditorVersion,
    base_url: &str,
) -> String {
    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for caps in ANCHOR_LINK_PATTERN.captures_iter(html) {
        let whole = caps.get(0).expect("match group 0");
        let fragment = &caps[1];
        let text = &caps[2];

        let Some(slug) = index.resolve(fragment, format) else {
            debug!(%fragment, "anchor did not resolve, leaving link untouched");
            result.push_str(&html[last_end..whole.end()]);
            last_end = whole.end();
            continue;
        };

        result.push_str(&html[last_end..whole.start()]);
        match editor {
            EditorVersion::V1 => {
                // The plain-text body cannot carry markup.
                let plain = MARKUP_PATTERN.replace_all(text, " ");
                result.push_str(&format!(
                    "<ac:link ac:anchor=\"{slug}\"><ac:plain-text-link-body>\
                     <![CDATA[{}]]></ac:plain-text-link-body></ac:link>",
                    escape_cdata(&plain)
                ));
            }
            EditorVersion::V2 => {
                // The renderer leaves quotes in text content unescaped.
                let title = text.replace('"', "&quot;");
                result.push_str(&format!(
                    "<a href=\"{base_url}#{slug}\" title=\"{title}\">{text}</a>"
                ));
            }
        }
        last_end = whole.end();
    }
    result.push_str(&html[last_end..]);
    result
}

fn resolve_images(
    html: &str,
    resolver: &mut dyn AttachmentResolver,
) -> Result<String, TransformError> {
    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for caps in IMG_TAG_PATTERN.captures_iter(html) {
        let whole = caps.get(0).expect("match group 0");
        let attrs = &caps[1];

        let Some(src) = SRC_PATTERN.captures(attrs).map(|src| src[1].to_owned()) else {
            result.push_str(&html[last_end..whole.end()]);
            last_end = whole.end();
            continue;
        };

        if src.starts_with("http://") || src.starts_with("https://") {
            result.push_str(&html[last_end..whole.end()]);
            last_end = whole.end();
            continue;
        }

        let url = resolver.resolve_attachment(&src).map_err(|source| {
            TransformError::AttachmentResolution {
                path: src.clone(),
                source,
            }
        })?;
        debug!(path = %src, %url, "resolved local image to attachment");

        result.push_str(&html[last_end..whole.start()]);
        result.push_str(&whole.as_str().replacen(src.as_str(), &url, 1));
        last_end = whole.end();
    }
    result.push_str(&html[last_end..]);
    Ok(result)
}
