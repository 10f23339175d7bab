// ABOUTME: Pre-compiled CSS selector cache shared by every Page query.
// ABOUTME: Compiles each selector string once and reports invalid selectors as configuration errors.

//! Selector caching for repeated rule execution.
//!
//! The same job configuration runs against thousands of pages, so every
//! selector string is compiled at most once per process. Invalid selectors
//! are cached too, as `None`, so a bad rule fails fast on every page.

use std::collections::HashMap;
use std::sync::RwLock;

use dom_query::Matcher;
use once_cell::sync::Lazy;

use crate::error::{ObtainError, Result};

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Matcher>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Matcher)` if the selector is valid, `None` if invalid.
pub fn get_or_compile(css: &str) -> Option<Matcher> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Matcher::new(css).ok();
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    // Another thread may have inserted while we compiled.
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Like [`get_or_compile`], but an invalid selector is an error.
pub fn matcher(css: &str) -> Result<Matcher> {
    get_or_compile(css).ok_or_else(|| ObtainError::selector(css, "compile selector", None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_selector_is_cached() {
        assert!(get_or_compile("div.container").is_some());
        assert!(get_or_compile("div.container").is_some());
    }

    #[test]
    fn invalid_selector_is_an_error() {
        assert!(get_or_compile("[[[invalid").is_none());
        let err = matcher("[[[invalid").unwrap_err();
        assert!(err.is_selector());
    }
}
