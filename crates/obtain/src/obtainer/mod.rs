// ABOUTME: Obtainer kinds and their clean/validate/process policies, composed from strategy traits.
// ABOUTME: Defines Outcome, the single value shape an obtain call returns for each kind.

//! Typed obtainers.
//!
//! An [`Obtainer`] bundles the three policies the engine runs on every rule
//! result, plus the rule registry and retrieval mode of its kind:
//!
//! - [`Cleaner`] normalizes a raw rule result into the kind's shape.
//! - [`Validator`] decides whether the cleaned value is acceptable.
//! - [`Processor`] post-transforms an accepted value (e.g. truncation).

pub mod base;
pub mod content_type;
pub mod date;
pub mod identifier;
pub mod location;
pub mod structured;
pub mod title;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::Reporter;
use crate::error::ObtainError;
use crate::options::ObtainOptions;
use crate::rules::{self, Registry};

/// The value produced by one obtain call.
///
/// Each kind fixes its shape: scalar kinds return `Text`, the content-type
/// kind returns `Tag`, structured kinds return `Records`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Text(String),
    Tag(String),
    Records(Vec<Value>),
}

impl Outcome {
    pub fn text(s: impl Into<String>) -> Self {
        Outcome::Text(s.into())
    }

    pub fn empty_text() -> Self {
        Outcome::Text(String::new())
    }

    /// The string payload of `Text` or `Tag`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Outcome::Text(s) | Outcome::Tag(s) => Some(s),
            Outcome::Records(_) => None,
        }
    }

    pub fn records(&self) -> Option<&[Value]> {
        match self {
            Outcome::Records(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Outcome::Text(s) | Outcome::Tag(s) => s.is_empty(),
            Outcome::Records(r) => r.is_empty(),
        }
    }
}

/// Outcome shape fixed by a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Tag,
    Records,
}

/// What scalar rules read from a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    Text,
    Markup,
}

/// The field kinds a Job can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObtainerKind {
    Text,
    Html,
    PlainText,
    Title,
    Date,
    LocaleDate,
    City,
    State,
    Country,
    Identifier,
    ContentType,
    Array,
    Table,
    Link,
    Image,
}

impl ObtainerKind {
    pub const ALL: [ObtainerKind; 15] = [
        ObtainerKind::Text,
        ObtainerKind::Html,
        ObtainerKind::PlainText,
        ObtainerKind::Title,
        ObtainerKind::Date,
        ObtainerKind::LocaleDate,
        ObtainerKind::City,
        ObtainerKind::State,
        ObtainerKind::Country,
        ObtainerKind::Identifier,
        ObtainerKind::ContentType,
        ObtainerKind::Array,
        ObtainerKind::Table,
        ObtainerKind::Link,
        ObtainerKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObtainerKind::Text => "text",
            ObtainerKind::Html => "html",
            ObtainerKind::PlainText => "plain_text",
            ObtainerKind::Title => "title",
            ObtainerKind::Date => "date",
            ObtainerKind::LocaleDate => "locale_date",
            ObtainerKind::City => "city",
            ObtainerKind::State => "state",
            ObtainerKind::Country => "country",
            ObtainerKind::Identifier => "identifier",
            ObtainerKind::ContentType => "content_type",
            ObtainerKind::Array => "array",
            ObtainerKind::Table => "table",
            ObtainerKind::Link => "link",
            ObtainerKind::Image => "image",
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            ObtainerKind::ContentType => Shape::Tag,
            ObtainerKind::Array | ObtainerKind::Table | ObtainerKind::Link | ObtainerKind::Image => {
                Shape::Records
            }
            _ => Shape::Scalar,
        }
    }

    pub fn retrieval(&self) -> Retrieval {
        match self {
            ObtainerKind::Html | ObtainerKind::PlainText => Retrieval::Markup,
            _ => Retrieval::Text,
        }
    }

    /// The canonical empty value: `""`, the empty tag, or `[]`.
    pub fn empty_outcome(&self) -> Outcome {
        match self.shape() {
            Shape::Scalar => Outcome::empty_text(),
            Shape::Tag => Outcome::Tag(String::new()),
            Shape::Records => Outcome::Records(Vec::new()),
        }
    }

    /// Rules available to jobs of this kind.
    pub fn registry(&self) -> &'static Registry {
        match self {
            ObtainerKind::Date | ObtainerKind::LocaleDate => &rules::DATE,
            ObtainerKind::ContentType => &rules::CONTENT_TYPE,
            ObtainerKind::Array => &rules::ARRAY,
            ObtainerKind::Table => &rules::TABLE,
            ObtainerKind::Link => &rules::LINK,
            ObtainerKind::Image => &rules::IMAGE,
            _ => &rules::SCALAR,
        }
    }
}

impl fmt::Display for ObtainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ObtainerKind {
    type Err = ObtainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ObtainerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ObtainError::config(s, "parse obtainer kind", None))
    }
}

/// Normalizes a raw rule result into the kind's shape.
pub trait Cleaner: Send + Sync {
    fn clean(&self, raw: Outcome) -> Outcome;
}

/// Accepts or rejects a cleaned value.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Outcome) -> bool;
}

/// Post-transforms an accepted value; may report but never fails.
pub trait Processor: Send + Sync {
    fn process(&self, value: Outcome, report: &mut Reporter<'_>) -> Outcome;
}

/// Leaves accepted values untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProcessing;

impl Processor for NoProcessing {
    fn process(&self, value: Outcome, _report: &mut Reporter<'_>) -> Outcome {
        value
    }
}

/// A kind's complete policy.
pub struct Obtainer {
    kind: ObtainerKind,
    cleaner: Box<dyn Cleaner>,
    validator: Box<dyn Validator>,
    processor: Box<dyn Processor>,
}

impl fmt::Debug for Obtainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obtainer").field("kind", &self.kind).finish()
    }
}

impl Obtainer {
    pub fn new(
        kind: ObtainerKind,
        cleaner: Box<dyn Cleaner>,
        validator: Box<dyn Validator>,
        processor: Box<dyn Processor>,
    ) -> Self {
        Self {
            kind,
            cleaner,
            validator,
            processor,
        }
    }

    /// Builds the standard policy for `kind`.
    pub fn for_kind(kind: ObtainerKind, opts: &ObtainOptions) -> Self {
        use self::base::{BaseCleaner, MarkupCleaner, MarkupValidator, NonEmptyText, PlainTextCleaner};

        let none = || Box::new(NoProcessing) as Box<dyn Processor>;
        match kind {
            ObtainerKind::Text => Self::new(kind, Box::new(BaseCleaner), Box::new(NonEmptyText), none()),
            ObtainerKind::Html => {
                Self::new(kind, Box::new(MarkupCleaner), Box::new(MarkupValidator), none())
            }
            ObtainerKind::PlainText => {
                Self::new(kind, Box::new(PlainTextCleaner), Box::new(NonEmptyText), none())
            }
            ObtainerKind::Title => Self::new(
                kind,
                Box::new(title::TitleCleaner::new(&opts.title)),
                Box::new(NonEmptyText),
                Box::new(title::TitleTruncator::new(&opts.title)),
            ),
            ObtainerKind::Date => Self::new(
                kind,
                Box::new(date::DateCleaner::new(&opts.date)),
                Box::new(date::DateValidator::new(&opts.date)),
                none(),
            ),
            ObtainerKind::LocaleDate => Self::new(
                kind,
                Box::new(date::LocaleDateCleaner::new(&opts.date)),
                Box::new(date::DateValidator::new(&opts.date)),
                none(),
            ),
            ObtainerKind::City => Self::new(
                kind,
                Box::new(location::LocationCleaner::plain()),
                Box::new(location::BoundsValidator::new(opts.city)),
                none(),
            ),
            ObtainerKind::Country => Self::new(
                kind,
                Box::new(location::LocationCleaner::plain()),
                Box::new(location::BoundsValidator::new(opts.country)),
                none(),
            ),
            ObtainerKind::State => Self::new(
                kind,
                Box::new(location::LocationCleaner::state()),
                Box::new(location::StateValidator::new(opts.state)),
                none(),
            ),
            ObtainerKind::Identifier => Self::new(
                kind,
                Box::new(identifier::IdentifierCleaner),
                Box::new(identifier::IdentifierValidator::new(&opts.identifier)),
                none(),
            ),
            ObtainerKind::ContentType => Self::new(
                kind,
                Box::new(content_type::TagCleaner),
                Box::new(content_type::TagValidator),
                none(),
            ),
            ObtainerKind::Array | ObtainerKind::Table | ObtainerKind::Link | ObtainerKind::Image => {
                Self::new(
                    kind,
                    Box::new(structured::ListCleaner),
                    Box::new(structured::ListValidator::for_kind(kind)),
                    none(),
                )
            }
        }
    }

    pub fn kind(&self) -> ObtainerKind {
        self.kind
    }

    pub fn clean(&self, raw: Outcome) -> Outcome {
        self.cleaner.clean(raw)
    }

    pub fn validate(&self, value: &Outcome) -> bool {
        self.validator.validate(value)
    }

    pub fn process(&self, value: Outcome, report: &mut Reporter<'_>) -> Outcome {
        self.processor.process(value, report)
    }

    /// Clean followed by validate; used by rules that scan until a candidate is acceptable.
    pub fn accepts(&self, raw: Outcome) -> bool {
        self.validate(&self.clean(raw))
    }
}
