//! Fenced code block conversion to Confluence code macros.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static CODE_BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<pre><code([^>]{0,256})>(.*?)</code></pre>").expect("invalid code block regex")
});

static LANGUAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="language-([^"]{1,64})""#).expect("invalid language regex")
});

/// Rewrite every `<pre><code>` block into a Confluence code macro.
///
/// The macro body is a raw-text CDATA container, so the renderer's entity
/// escaping is undone first. Unknown language strings are passed through
/// verbatim; a fence without a language tag gets the literal `none`.
pub(crate) fn convert_code_blocks(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for caps in CODE_BLOCK_PATTERN.captures_iter(html) {
        let whole = caps.get(0).expect("match group 0");
        let language = LANGUAGE_PATTERN
            .captures(&caps[1])
            .map_or_else(|| "none".to_owned(), |lang| lang[1].to_owned());
        let content = unescape_entities(&caps[2]);

        debug!(%language, "converting code block");

        result.push_str(&html[last_end..whole.start()]);
        result.push_str("<ac:structured-macro ac:name=\"code\" ac:schema-version=\"1\">");
        result.push_str("<ac:parameter ac:name=\"theme\">Midnight</ac:parameter>");
        result.push_str("<ac:parameter ac:name=\"linenumbers\">true</ac:parameter>");
        result.push_str("<ac:parameter ac:name=\"language\">");
        result.push_str(&language);
        result.push_str("</ac:parameter>");
        result.push_str("<ac:plain-text-body><![CDATA[");
        result.push_str(&escape_cdata(&content));
        result.push_str("]]></ac:plain-text-body></ac:structured-macro>");
        last_end = whole.end();
    }
    result.push_str(&html[last_end..]);
    result
}

/// Undo the HTML entity escaping applied by the markdown renderer.
///
/// `&amp;` must be replaced last so pre-existing double escapes survive.
fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Split CDATA terminators so the wrapper stays well-formed.
pub(crate) fn escape_cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_code_block_with_language() {
        let html = "<pre><code class=\"language-javascript\">var x = 1;\n</code></pre>";
        let result = convert_code_blocks(html);
        assert!(result.contains("<ac:parameter ac:name=\"language\">javascript</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"theme\">Midnight</ac:parameter>"));
        assert!(result.contains("<ac:parameter ac:name=\"linenumbers\">true</ac:parameter>"));
        assert!(result.contains("<![CDATA[var x = 1;\n]]>"));
    }

    #[test]
    fn test_code_block_without_language() {
        let html = "<pre><code>plain text</code></pre>";
        let result = convert_code_blocks(html);
        assert!(result.contains("<ac:parameter ac:name=\"language\">none</ac:parameter>"));
    }

    #[test]
    fn test_unknown_language_passed_through() {
        let html = "<pre><code class=\"language-klingon\">nuqneH</code></pre>";
        let result = convert_code_blocks(html);
        assert!(result.contains("<ac:parameter ac:name=\"language\">klingon</ac:parameter>"));
    }

    #[test]
    fn test_entities_unescaped_in_body() {
        let html = "<pre><code>if (a &lt; b &amp;&amp; c &gt; d) { s = &quot;x&quot;; }</code></pre>";
        let result = convert_code_blocks(html);
        assert!(result.contains("<![CDATA[if (a < b && c > d) { s = \"x\"; }]]>"));
    }

    #[test]
    fn test_cdata_terminator_split() {
        let html = "<pre><code>data]]&gt;more</code></pre>";
        let result = convert_code_blocks(html);
        // The literal "]]>" inside the body must not close the CDATA section.
        assert!(result.contains("]]]]><![CDATA[>more"));
    }

    #[test]
    fn test_multiple_code_blocks() {
        let html = "<pre><code class=\"language-rust\">a</code></pre>\
                    <p>text</p>\
                    <pre><code>b</code></pre>";
        let result = convert_code_blocks(html);
        assert!(result.contains(">rust</ac:parameter>"));
        assert!(result.contains(">none</ac:parameter>"));
        assert!(result.contains("<p>text</p>"));
        assert!(!result.contains("<pre>"));
    }

    #[test]
    fn test_no_code_blocks_unchanged() {
        let html = "<p>nothing to do</p>";
        assert_eq!(convert_code_blocks(html), html);
    }

    #[test]
    fn test_multiline_body_preserved() {
        let html = "<pre><code class=\"language-python\">def f():\n    return 1\n</code></pre>";
        let result = convert_code_blocks(html);
        assert!(result.contains("def f():\n    return 1\n"));
    }
}
