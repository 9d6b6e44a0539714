//! Heading anchor index with deduplicated slugs.
//!
//! Built once per document before any pass runs and shared read-only by the
//! table-of-contents and link-rewriting passes.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Markup tags inside heading text, stripped before slug derivation.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]{0,256}>").expect("invalid tag regex"));

/// Named HTML entities like `&amp;`, stripped before slug derivation.
static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-z]{1,16};").expect("invalid entity regex"));

/// Anchor fragment convention of the source markdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceFormat {
    /// Fragments are already slug-shaped (`#my-heading`).
    #[default]
    Default,
    /// Bitbucket-style fragments (`#markdown-header-my-heading`).
    Bitbucket,
}

impl SourceFormat {
    /// Fragment prefix stripped before slug lookup.
    fn ref_prefix(self) -> &'static str {
        match self {
            Self::Default => "#",
            Self::Bitbucket => "#markdown-header-",
        }
    }
}

/// A document heading in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1-6.
    pub level: u8,
    /// Plain heading text with inline markup flattened.
    pub text: String,
    /// Source-order index within the document.
    pub index: usize,
}

/// A heading together with its unique slug.
#[derive(Clone, Debug)]
pub struct Anchor {
    /// Deduplicated slug, unique within the document.
    pub slug: String,
    /// The heading the slug was derived from.
    pub heading: Heading,
}

/// Derive an anchor slug from heading text.
///
/// Lowercases, strips markup tags and entities, drops characters outside
/// `[a-z0-9 -]` and collapses whitespace runs to single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let stripped = TAG_PATTERN.replace_all(text, "");
    let stripped = ENTITY_PATTERN.replace_all(&stripped, "");
    let lower = stripped.to_lowercase();

    let mut slug = String::with_capacity(lower.len());
    let mut pending_dash = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            pending_dash = !slug.is_empty();
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    slug
}

/// Immutable slug table built from document headings.
///
/// Duplicate heading text receives a numeric suffix (`_1`, `_2`, ...)
/// assigned in first-seen order, so slugs are unique within a document.
#[derive(Debug, Default)]
pub struct AnchorIndex {
    entries: Vec<Anchor>,
    by_slug: HashMap<String, usize>,
}

impl AnchorIndex {
    /// Build the index, assigning a unique slug per heading.
    #[must_use]
    pub fn build(headings: Vec<Heading>) -> Self {
        let mut entries = Vec::with_capacity(headings.len());
        let mut by_slug = HashMap::with_capacity(headings.len());
        let mut collisions: HashMap<String, usize> = HashMap::new();

        for heading in headings {
            let base = slugify(&heading.text);
            let slug = match collisions.get_mut(&base) {
                Some(count) => {
                    let deduped = format!("{base}_{count}");
                    *count += 1;
                    deduped
                }
                None => {
                    collisions.insert(base.clone(), 1);
                    base
                }
            };
            by_slug.insert(slug.clone(), entries.len());
            entries.push(Anchor { slug, heading });
        }

        Self { entries, by_slug }
    }

    /// Resolve a link fragment to a heading slug.
    ///
    /// Returns `None` when the fragment does not carry the expected prefix
    /// for the source format or no heading matches; unresolved references
    /// are left for the caller to pass through unchanged.
    #[must_use]
    pub fn resolve(&self, fragment: &str, format: SourceFormat) -> Option<&str> {
        let candidate = fragment.strip_prefix(format.ref_prefix())?;
        self.by_slug
            .get(candidate)
            .map(|&i| self.entries[i].slug.as_str())
    }

    /// Anchors in source order.
    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.entries.iter()
    }

    /// Number of indexed headings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no headings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn headings(texts: &[&str]) -> Vec<Heading> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Heading {
                level: 2,
                text: (*text).to_owned(),
                index,
            })
            .collect()
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Heading 3-2"), "heading-3-2");
        assert_eq!(slugify("Simple"), "simple");
    }

    #[test]
    fn test_slugify_strips_special_chars() {
        assert_eq!(slugify("What's new? (2024)"), "whats-new-2024");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("a   b\t c"), "a-b-c");
        assert_eq!(slugify("  leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_strips_markup_and_entities() {
        assert_eq!(slugify("<em>Fancy</em> Title"), "fancy-title");
        assert_eq!(slugify("Salt &amp; Pepper"), "salt-pepper");
    }

    #[test]
    fn test_duplicate_headings_suffixed_in_first_seen_order() {
        let index = AnchorIndex::build(headings(&["Heading", "Heading", "Heading"]));
        let slugs: Vec<_> = index.anchors().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["heading", "heading_1", "heading_2"]);
    }

    #[test]
    fn test_slugs_are_unique() {
        let index = AnchorIndex::build(headings(&["A", "B", "A", "B", "A"]));
        let mut slugs: Vec<_> = index.anchors().map(|a| a.slug.clone()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 5);
    }

    #[test]
    fn test_resolve_default_format() {
        let index = AnchorIndex::build(headings(&["Heading 3-2"]));
        assert_eq!(
            index.resolve("#heading-3-2", SourceFormat::Default),
            Some("heading-3-2")
        );
    }

    #[test]
    fn test_resolve_bitbucket_format() {
        let index = AnchorIndex::build(headings(&["Heading 3-2"]));
        assert_eq!(
            index.resolve("#markdown-header-heading-3-2", SourceFormat::Bitbucket),
            Some("heading-3-2")
        );
        // Same slug as the default-format case.
        assert_eq!(
            index.resolve("#markdown-header-heading-3-2", SourceFormat::Bitbucket),
            index.resolve("#heading-3-2", SourceFormat::Default)
        );
    }

    #[test]
    fn test_resolve_unknown_fragment() {
        let index = AnchorIndex::build(headings(&["Heading"]));
        assert_eq!(index.resolve("#missing", SourceFormat::Default), None);
    }

    #[test]
    fn test_resolve_wrong_prefix() {
        let index = AnchorIndex::build(headings(&["Heading"]));
        // A default-shaped fragment does not resolve under bitbucket rules.
        assert_eq!(index.resolve("#heading", SourceFormat::Bitbucket), None);
    }

    #[test]
    fn test_empty_index() {
        let index = AnchorIndex::build(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.resolve("#anything", SourceFormat::Default), None);
    }
}
