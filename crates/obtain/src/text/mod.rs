// ABOUTME: String utilities shared by every obtainer: whitespace, tag stripping, legacy artifact removal.
// ABOUTME: Submodules cover entity decoding, encoding repair, transliteration, casing and truncation.

//! Text helpers for cleaning extracted values.

pub mod casing;
pub mod encoding;
pub mod entities;
pub mod transliterate;
pub mod truncate;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</p\s*>|<p(\s[^>]*)?>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static HORIZONTAL_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Fragments left behind by word processors and CMS exports.
const LEGACY_ARTIFACTS: &[&str] = &[
    "<o:p>",
    "</o:p>",
    "<o:p/>",
    "<![CDATA[",
    "]]>",
    "\u{feff}",
    "\u{200b}",
    "\r",
];

/// Collapses runs of whitespace into single spaces and trims.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes markup, returning the text content (entities decoded by the parser).
pub fn strip_tags(html: &str) -> String {
    if !html.contains('<') {
        return html.to_string();
    }
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect::<Vec<_>>().join("")
}

/// Removes known legacy artifacts and turns non-breaking spaces into spaces.
pub fn strip_legacy_artifacts(s: &str) -> String {
    let mut out = s.replace("Â\u{a0}", " ").replace('\u{a0}', " ");
    for artifact in LEGACY_ARTIFACTS {
        if out.contains(artifact) {
            out = out.replace(artifact, "");
        }
    }
    out
}

/// Converts paragraph and line-break markup to newlines, then strips tags.
///
/// Paragraph boundaries become a blank line, `<br>` a single newline.
/// Consecutive boundaries never produce more than one blank line.
pub fn html_to_text_with_breaks(html: &str) -> String {
    let with_breaks = BR_RE.replace_all(html, "\n");
    let with_paragraphs = PARAGRAPH_RE.replace_all(&with_breaks, "\n\n");
    // A parser would fold the newlines away, so remaining tags go by pattern.
    let stripped = entities::decode_entities(&TAG_RE.replace_all(&with_paragraphs, ""));
    let collapsed = HORIZONTAL_WS_RE.replace_all(&stripped, " ");
    let trimmed_lines = collapsed
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_LINES_RE
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("no\textra\nspaces"), "no extra spaces");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn strip_tags_keeps_text() {
        assert_eq!(strip_tags("<b>Bold</b> and <i>it</i>"), "Bold and it");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn legacy_artifacts_removed() {
        assert_eq!(
            strip_legacy_artifacts("A\u{a0}B<o:p></o:p>\r\n"),
            "A B\n"
        );
        assert_eq!(strip_legacy_artifacts("<![CDATA[x]]>"), "x");
    }

    #[test]
    fn paragraphs_become_single_blank_line() {
        let html = "<p>First</p><p>Second<br>line</p>\n\n<p></p><p>Third</p>";
        assert_eq!(
            html_to_text_with_breaks(html),
            "First\n\nSecond\nline\n\nThird"
        );
    }

    #[test]
    fn breaks_decode_entities() {
        assert_eq!(
            html_to_text_with_breaks("Fish &amp; chips<br/>Tea"),
            "Fish & chips\nTea"
        );
    }
}
