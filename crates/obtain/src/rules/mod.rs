// ABOUTME: Rule registries keyed by method name, one per obtainer kind family.
// ABOUTME: Jobs resolve method names here once, at construction time.

pub mod array;
pub mod content_type;
pub mod date;
pub mod links;
pub mod scalar;
pub mod table;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::rule::RuleDef;
use crate::text::normalize_whitespace;

/// Method name to rule definition.
#[derive(Debug, Default)]
pub struct Registry {
    rules: HashMap<&'static str, RuleDef>,
}

impl Registry {
    fn from_groups(groups: &[&[RuleDef]]) -> Self {
        let rules = groups
            .iter()
            .flat_map(|g| g.iter())
            .map(|def| (def.name, *def))
            .collect();
        Self { rules }
    }

    pub fn get(&self, method: &str) -> Option<RuleDef> {
        self.rules.get(method).copied()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.rules.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

pub static SCALAR: Lazy<Registry> =
    Lazy::new(|| Registry::from_groups(&[scalar::RULES, scalar::UNTIL_VALID, table::CELL_RULES]));

pub static DATE: Lazy<Registry> = Lazy::new(|| {
    Registry::from_groups(&[
        scalar::RULES,
        scalar::UNTIL_VALID,
        table::CELL_RULES,
        date::RULES,
    ])
});

pub static CONTENT_TYPE: Lazy<Registry> = Lazy::new(|| Registry::from_groups(&[content_type::RULES]));

pub static ARRAY: Lazy<Registry> =
    Lazy::new(|| Registry::from_groups(&[array::RULES, scalar::UNTIL_VALID]));

pub static TABLE: Lazy<Registry> =
    Lazy::new(|| Registry::from_groups(&[table::CELL_RULES, table::TABLE_RULES]));

pub static LINK: Lazy<Registry> = Lazy::new(|| Registry::from_groups(&[links::LINK_RULES]));

pub static IMAGE: Lazy<Registry> = Lazy::new(|| Registry::from_groups(&[links::IMAGE_RULES]));

/// Attribute selector matching one class token, safe for arbitrary names.
pub(crate) fn class_selector(class: &str) -> String {
    format!("[class~=\"{}\"]", css_string(class.trim()))
}

/// Escapes a value for use inside a double-quoted CSS string.
pub(crate) fn css_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Case-insensitive literal matcher for a label.
pub(crate) fn label_regex(label: &str) -> Option<Regex> {
    let label = normalize_whitespace(label);
    if label.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(&label))
        .case_insensitive(true)
        .build()
        .ok()
}

static LEADING_SEPARATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s|[:|–—-]|</[a-zA-Z][^>]*>)+").unwrap());

/// Whitespace-normalized content following the first occurrence of `label`,
/// with leading separators such as `:` or `-` removed.
///
/// `content` is element text or inner markup; closing tags right after the
/// label (`<b>Posted by:</b> Jane`) count as separators.
pub(crate) fn text_after(label: &Regex, content: &str) -> Option<String> {
    let text = normalize_whitespace(content);
    let found = label.find(&text)?;
    let rest = LEADING_SEPARATORS_RE.replace(&text[found.end()..], "");
    Some(rest.trim_end().to_string())
}

static URL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").unwrap());

/// True for hrefs that point nowhere useful (fragments, scripts, mail links).
pub(crate) fn is_dead_link(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    lower.is_empty()
        || lower.starts_with('#')
        || (URL_PREFIX_RE.is_match(&lower)
            && !lower.starts_with("http:")
            && !lower.starts_with("https:"))
}
