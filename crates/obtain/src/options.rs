// ABOUTME: Configuration options for the obtainer engine: per-kind thresholds, bounds and encodings.
// ABOUTME: EngineBuilder provides a fluent API for constructing Engine instances with custom settings.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::engine::Engine;
use crate::error::{ObtainError, Result};

/// Resolves a link to its final target, e.g. by following a redirect.
///
/// Implementations live outside this crate (network access is the
/// orchestrator's business). Failures are treated by link rules as
/// "no match for this candidate" and never propagate.
pub trait LinkResolver: Send + Sync {
    fn resolve(&self, href: &str) -> anyhow::Result<String>;
}

/// Title cleaning and truncation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TitleOptions {
    pub max_length: usize,
    pub min_word_length: usize,
    /// Uppercase-letter ratio above which a title is treated as shouting.
    pub shouting_threshold: f64,
    /// Substrings removed from titles, matched case-insensitively.
    pub junk: Vec<String>,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            max_length: 255,
            min_word_length: 2,
            shouting_threshold: 0.955,
            junk: vec![
                "printer-friendly version".to_string(),
                "printer friendly version".to_string(),
                "| print".to_string(),
                "»".to_string(),
                "&raquo;".to_string(),
            ],
        }
    }
}

/// Date cleaning and validation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DateOptions {
    pub min_year: u32,
    pub max_year: u32,
    pub min_length: usize,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self {
            min_year: 1995,
            max_year: 2050,
            min_length: 6,
        }
    }
}

/// Length and word-count bounds for a location-like scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationBounds {
    pub min_chars: usize,
    pub max_chars: usize,
    pub max_words: usize,
}

impl LocationBounds {
    pub const fn new(min_chars: usize, max_chars: usize, max_words: usize) -> Self {
        Self {
            min_chars,
            max_chars,
            max_words,
        }
    }

    /// True if `s` falls within these bounds (chars counted, not bytes).
    pub fn admits(&self, s: &str) -> bool {
        let chars = s.chars().count();
        let words = s.split_whitespace().count();
        chars >= self.min_chars && chars <= self.max_chars && words <= self.max_words
    }
}

/// Bounds as written in an options file; missing fields keep the kind's default.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct BoundsOverride {
    min_chars: Option<usize>,
    max_chars: Option<usize>,
    max_words: Option<usize>,
}

impl BoundsOverride {
    fn over(self, base: LocationBounds) -> LocationBounds {
        LocationBounds {
            min_chars: self.min_chars.unwrap_or(base.min_chars),
            max_chars: self.max_chars.unwrap_or(base.max_chars),
            max_words: self.max_words.unwrap_or(base.max_words),
        }
    }
}

/// Identifier length bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IdentifierOptions {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for IdentifierOptions {
    fn default() -> Self {
        Self {
            min_chars: 2,
            max_chars: 10,
        }
    }
}

/// All tunables consumed by the typed obtainers.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawOptions")]
pub struct ObtainOptions {
    pub title: TitleOptions,
    pub date: DateOptions,
    pub city: LocationBounds,
    pub state: LocationBounds,
    pub country: LocationBounds,
    pub identifier: IdentifierOptions,
    /// Encoding labels tried in order when page bytes are not valid UTF-8.
    pub encodings: Vec<String>,
}

impl Default for ObtainOptions {
    fn default() -> Self {
        Self {
            title: TitleOptions::default(),
            date: DateOptions::default(),
            city: LocationBounds::new(2, 97, 2),
            state: LocationBounds::new(2, 13, 2),
            country: LocationBounds::new(2, 48, 2),
            identifier: IdentifierOptions::default(),
            encodings: vec![
                "windows-1252".to_string(),
                "iso-8859-15".to_string(),
                "shift_jis".to_string(),
            ],
        }
    }
}

/// The options file layout, before per-kind defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOptions {
    title: TitleOptions,
    date: DateOptions,
    city: BoundsOverride,
    state: BoundsOverride,
    country: BoundsOverride,
    identifier: IdentifierOptions,
    encodings: Option<Vec<String>>,
}

impl From<RawOptions> for ObtainOptions {
    fn from(raw: RawOptions) -> Self {
        let defaults = ObtainOptions::default();
        Self {
            title: raw.title,
            date: raw.date,
            city: raw.city.over(defaults.city),
            state: raw.state.over(defaults.state),
            country: raw.country.over(defaults.country),
            identifier: raw.identifier,
            encodings: raw.encodings.unwrap_or(defaults.encodings),
        }
    }
}

impl ObtainOptions {
    /// Loads options from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ObtainError::io(&display, "read options", Some(e.into())))?;
        serde_json::from_str(&raw)
            .map_err(|e| ObtainError::config(&display, "parse options", Some(e.into())))
    }
}

/// Builder for constructing Engine instances with custom configuration.
#[derive(Clone, Default)]
pub struct EngineBuilder {
    opts: ObtainOptions,
    resolver: Option<Arc<dyn LinkResolver>>,
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("opts", &self.opts)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl EngineBuilder {
    /// Create a new EngineBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: ObtainOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Set the maximum title length.
    pub fn title_max_length(mut self, max_length: usize) -> Self {
        self.opts.title.max_length = max_length;
        self
    }

    /// Set the minimum word length kept by word-safe title truncation.
    pub fn title_min_word_length(mut self, min_word_length: usize) -> Self {
        self.opts.title.min_word_length = min_word_length;
        self
    }

    /// Set the uppercase ratio above which titles are treated as shouting.
    pub fn shouting_threshold(mut self, threshold: f64) -> Self {
        self.opts.title.shouting_threshold = threshold;
        self
    }

    /// Set the accepted year range for date truncation.
    pub fn year_range(mut self, min_year: u32, max_year: u32) -> Self {
        self.opts.date.min_year = min_year;
        self.opts.date.max_year = max_year;
        self
    }

    /// Set the candidate encodings tried on non-UTF-8 input.
    pub fn encodings<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.encodings = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Install a resolver used by link rules that request resolution.
    pub fn resolver(mut self, resolver: Arc<dyn LinkResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the Engine with the configured options.
    pub fn build(self) -> Engine {
        Engine::new(self.opts, self.resolver)
    }
}
