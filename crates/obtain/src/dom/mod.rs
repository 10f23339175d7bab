// ABOUTME: Document adapter over dom_query: querying by CSS and XPath, element access and removal.
// ABOUTME: Also hosts the compiled selector cache and the XPath-to-CSS translator.

//! DOM adapter for the obtainer engine.
//!
//! The engine only ever talks to [`Page`] and [`Element`]. Queries are
//! read-only; the single mutation is [`Page::remove`], which the engine calls
//! after a candidate has been cleaned and validated.

pub mod compiled;
pub mod page;
pub mod xpath;

pub use page::{Element, ElementId, Page};
