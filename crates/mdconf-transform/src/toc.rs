//! Table-of-contents marker replacement and full-contents injection.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::anchors::AnchorIndex;
use crate::links::EditorVersion;

/// Minimal TOC macro for the new (v2) editor, wrapped in a toc-zone.
const TOC_ZONE_MACRO: &str = "<p><ac:structured-macro ac:name=\"toc-zone\" \
     ac:schema-version=\"1\" data-layout=\"default\"><ac:rich-text-body>\
     <ac:structured-macro ac:name=\"toc\" ac:schema-version=\"1\" \
     data-layout=\"default\"/></ac:rich-text-body></ac:structured-macro></p>";

/// Minimal TOC macro for the legacy (v1) editor.
const TOC_MACRO_V1: &str = "<p><ac:structured-macro ac:name=\"toc\" ac:schema-version=\"1\"/></p>";

/// Fully parameterized contents macro prepended by the opt-in trigger.
const CONTENTS_MACRO: &str = "<ac:structured-macro ac:name=\"toc\" ac:schema-version=\"1\">\
     <ac:parameter ac:name=\"printable\">true</ac:parameter>\
     <ac:parameter ac:name=\"style\">disc</ac:parameter>\
     <ac:parameter ac:name=\"maxLevel\">5</ac:parameter>\
     <ac:parameter ac:name=\"minLevel\">1</ac:parameter>\
     <ac:parameter ac:name=\"class\">rm-contents</ac:parameter>\
     <ac:parameter ac:name=\"exclude\"></ac:parameter>\
     <ac:parameter ac:name=\"type\">list</ac:parameter>\
     <ac:parameter ac:name=\"outline\">false</ac:parameter>\
     <ac:parameter ac:name=\"include\"></ac:parameter>\
     </ac:structured-macro>";

/// Doctoc delimiter pair. The lazy repeat stops at the first end marker;
/// an unterminated begin marker matches nothing and stays in the document.
static DOCTOC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!-- START doctoc.*?END doctoc -->").expect("invalid doctoc regex")
});

/// Replace `[TOC]` tokens and doctoc comment blocks with a TOC macro.
///
/// The raw markdown is consulted as well: when a renderer consumed a `[TOC]`
/// line that therefore never reached the HTML, the macro is prepended so the
/// author's marker is still honored.
pub(crate) fn replace_markers(html: &str, markdown: &str, editor: EditorVersion) -> String {
    let macro_markup = match editor {
        EditorVersion::V1 => TOC_MACRO_V1,
        EditorVersion::V2 => TOC_ZONE_MACRO,
    };

    let had_marker = html.contains("<p>[TOC]</p>");
    let mut result = html.replace("<p>[TOC]</p>", macro_markup);
    result = DOCTOC_PATTERN.replace_all(&result, macro_markup).into_owned();

    if !had_marker
        && !result.contains("ac:name=\"toc")
        && markdown.lines().any(|line| line.trim() == "[TOC]")
    {
        debug!("TOC marker consumed by renderer, prepending macro");
        result = format!("{macro_markup}\n{result}");
    }

    result
}

/// Prepend the fully parameterized contents macro before the first element.
///
/// Fires regardless of whether a marker was already replaced; the two
/// triggers are independent and no deduplication is performed.
pub(crate) fn prepend_contents(html: &str, anchors: &AnchorIndex) -> String {
    debug!(headings = anchors.len(), "prepending contents macro");
    format!("{CONTENTS_MACRO}\n{html}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn empty_index() -> AnchorIndex {
        AnchorIndex::build(Vec::new())
    }

    #[test]
    fn test_toc_marker_replaced_v2() {
        let result = replace_markers("<p>[TOC]</p><h1>A</h1>", "[TOC]\n# A", EditorVersion::V2);
        assert!(result.contains("ac:name=\"toc-zone\""));
        assert!(!result.contains("[TOC]"));
    }

    #[test]
    fn test_toc_marker_replaced_v1() {
        let result = replace_markers("<p>[TOC]</p><h1>A</h1>", "[TOC]\n# A", EditorVersion::V1);
        assert!(result.contains("<ac:structured-macro ac:name=\"toc\" ac:schema-version=\"1\"/>"));
        assert!(!result.contains("toc-zone"));
    }

    #[test]
    fn test_doctoc_block_replaced() {
        let html = "<p>intro</p>\
            <!-- START doctoc generated TOC -->\
            <ul><li><a href=\"#a\">A</a></li></ul>\
            <!-- END doctoc -->\
            <h1>A</h1>";
        let result = replace_markers(html, "", EditorVersion::V2);
        assert!(result.contains("ac:name=\"toc-zone\""));
        assert!(!result.contains("doctoc"));
        assert!(result.contains("<p>intro</p>"));
    }

    #[test]
    fn test_large_doctoc_block_replaced() {
        let entries: String = (0..5_000)
            .map(|i| format!("<li><a href=\"#h{i}\">Heading {i}</a></li>"))
            .collect();
        let html = format!(
            "<!-- START doctoc -->\n<ul>{entries}</ul>\n<!-- END doctoc -->\n<h1>A</h1>"
        );
        let result = replace_markers(&html, "", EditorVersion::V2);
        assert!(result.contains("ac:name=\"toc-zone\""));
        assert!(!result.contains("doctoc"));
        assert!(result.ends_with("<h1>A</h1>"));
    }

    #[test]
    fn test_unterminated_doctoc_left_alone() {
        let html = "<!-- START doctoc -->\n<ul><li>orphan</li></ul>\n<h1>A</h1>";
        assert_eq!(replace_markers(html, "", EditorVersion::V2), html);
    }

    #[test]
    fn test_marker_consumed_by_renderer_prepends() {
        // The HTML no longer carries the marker, but the raw markdown does.
        let result = replace_markers("<h1>A</h1>", "[TOC]\n\n# A", EditorVersion::V2);
        assert!(result.starts_with("<p><ac:structured-macro ac:name=\"toc-zone\""));
    }

    #[test]
    fn test_no_marker_no_change() {
        let html = "<h1>A</h1><p>body</p>";
        assert_eq!(replace_markers(html, "# A\n\nbody", EditorVersion::V2), html);
    }

    #[test]
    fn test_replacement_is_idempotent() {
        let once = replace_markers("<p>[TOC]</p><h1>A</h1>", "[TOC]\n# A", EditorVersion::V2);
        let twice = replace_markers(&once, "[TOC]\n# A", EditorVersion::V2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prepend_contents_parameters() {
        let result = prepend_contents("<h1>A</h1>", &empty_index());
        assert!(result.starts_with("<ac:structured-macro ac:name=\"toc\""));
        assert!(result.contains("<ac:parameter ac:name=\"printable\">true</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"style\">disc</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"maxLevel\">5</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"minLevel\">1</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"class\">rm-contents</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"type\">list</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"outline\">false</ac:parameter>"));
        assert!(result.ends_with("<h1>A</h1>"));
    }

    #[test]
    fn test_marker_and_contents_both_fire() {
        // Dual-TOC output is the documented behavior, not an error.
        let replaced = replace_markers("<p>[TOC]</p><h1>A</h1>", "[TOC]\n# A", EditorVersion::V2);
        let result = prepend_contents(&replaced, &empty_index());
        assert_eq!(result.matches("ac:name=\"toc").count(), 3); // zone + inner + contents
    }
}
