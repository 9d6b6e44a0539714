//! HTML comment conversion to hidden placeholders.

/// Turn every HTML comment into an `<ac:placeholder>` pair.
///
/// Placeholders render as empty, editor-only markers in Confluence. Doctoc
/// delimiters must already have been consumed by the TOC pass, otherwise
/// they leak through here as visible placeholders.
pub(crate) fn convert_comments(html: &str) -> String {
    html.replace("<!--", "<ac:placeholder>")
        .replace("-->", "</ac:placeholder>")
}
