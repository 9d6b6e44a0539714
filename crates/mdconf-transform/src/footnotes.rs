//! Footnote reference and definition normalization.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static FOOTNOTE_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"<sup class="footnote-reference"><a href="#([^"]{1,64})">([^<]{1,8})</a></sup>"##)
        .expect("invalid footnote reference regex")
});

static FOOTNOTE_DEF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"(?s)<div class="footnote-definition" id="([^"]{1,64})"><sup class="footnote-definition-label">([^<]{1,8})</sup>(.*?)</div>"##,
    )
    .expect("invalid footnote definition regex")
});

/// Normalize the renderer's footnote markup into superscript anchor links.
///
/// Every reference to a footnote id links to the same definition anchor.
/// The definition backlinks to the first reference occurrence only; later
/// references to the same id carry no id of their own.
pub(crate) fn convert_footnotes(html: &str) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for caps in FOOTNOTE_REF_PATTERN.captures_iter(html) {
        let whole = caps.get(0).expect("match group 0");
        let id = &caps[1];
        let label = &caps[2];

        result.push_str(&html[last_end..whole.start()]);
        if seen.insert(id.to_owned()) {
            result.push_str(&format!(
                "<a id=\"fnref-{id}\" href=\"#fn-{id}\"><sup>{label}</sup></a>"
            ));
        } else {
            result.push_str(&format!("<a href=\"#fn-{id}\"><sup>{label}</sup></a>"));
        }
        last_end = whole.end();
    }
    result.push_str(&html[last_end..]);

    convert_definitions(&result)
}

fn convert_definitions(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut last_end = 0;

    for caps in FOOTNOTE_DEF_PATTERN.captures_iter(html) {
        let whole = caps.get(0).expect("match group 0");
        let id = &caps[1];
        let label = &caps[2];
        let body = caps[3].trim();

        debug!(%id, "normalizing footnote definition");

        result.push_str(&html[last_end..whole.start()]);
        result.push_str(&format!(
            "<p id=\"fn-{id}\"><sup>{label}</sup> {} \
             <a href=\"#fnref-{id}\">&#8617;</a></p>",
            strip_paragraph(body)
        ));
        last_end = whole.end();
    }
    result.push_str(&html[last_end..]);
    result
}

/// Unwrap a single-paragraph definition body so the rebuilt item stays flat.
fn strip_paragraph(body: &str) -> &str {
    body.strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
        .filter(|inner| !inner.contains("<p>"))
        .unwrap_or(body)
}
