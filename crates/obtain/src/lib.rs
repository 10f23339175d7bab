// ABOUTME: Main library entry point for the rule-driven HTML field obtainer.
// ABOUTME: Re-exports the public API: Engine, EngineBuilder, Job, Page, Outcome, ObtainError, diagnostics.

//! Sitemove obtain - rule-driven field extraction from legacy HTML pages.
//!
//! A [`Job`] binds a field name to an [`ObtainerKind`] and an ordered list of
//! rules. The [`Engine`] runs the rules in order against a [`Page`], cleans
//! and validates each result with the kind's policy, and returns the first
//! value that validates. When the winning rule is a plucker, the element it
//! matched is removed from the page so later jobs cannot harvest it again.
//!
//! # Example
//!
//! ```
//! use sitemove_obtain::{Engine, Job, MemorySink, ObtainerKind, Outcome, Page};
//!
//! let engine = Engine::builder().title_max_length(80).build();
//! let mut page = Page::parse("<h1>CITY COUNCIL MINUTES</h1><p>Body</p>");
//! let mut sink = MemorySink::new();
//!
//! let job = Job::new("title", ObtainerKind::Title)
//!     .add_rule("pluck_selector", vec!["h1".into()]);
//! let title = engine.obtain(&job, &mut page, &mut sink, "minutes.html").unwrap();
//!
//! assert_eq!(title, Outcome::text("City Council Minutes"));
//! assert!(page.query_first("h1").unwrap().is_none());
//! ```

pub mod diagnostics;
pub mod dom;
pub mod engine;
pub mod error;
pub mod job;
pub mod obtainer;
pub mod options;
pub mod rule;
pub mod rules;
pub mod text;

pub use crate::diagnostics::{Diagnostic, DiagnosticSink, MemorySink, Severity, TracingSink};
pub use crate::dom::{Element, ElementId, Page};
pub use crate::engine::Engine;
pub use crate::error::{ErrorCode, ObtainError, Result};
pub use crate::job::{Job, JobConfig, RuleConfig};
pub use crate::obtainer::{Obtainer, ObtainerKind, Outcome};
pub use crate::options::{EngineBuilder, LinkResolver, ObtainOptions};
pub use crate::rule::{Arg, RuleContext, RuleDef, RuleRole};
