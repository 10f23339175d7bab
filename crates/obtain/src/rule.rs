// ABOUTME: Rule model: scalar arguments, typed rule definitions and the context a rule runs in.
// ABOUTME: Rules never mutate the Page; pluckers mark elements and the engine commits removal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::{Element, ElementId, Page};
use crate::error::{ObtainError, Result};
use crate::obtainer::{Obtainer, Outcome, Retrieval};
use crate::options::LinkResolver;

/// A positional rule argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => write!(f, "null"),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Int(n) => write!(f, "{}", n),
            Arg::Str(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(i64::from(n))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Arg::Null)
    }
}

/// Whether a rule consumes what it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleRole {
    /// Read-only; any marks it makes are discarded.
    Finder,
    /// Marks the matched element(s) for removal on success.
    Plucker,
}

pub type RuleFn = fn(&mut RuleContext<'_>) -> Result<Outcome>;

/// A named rule implementation, as held by a registry.
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub name: &'static str,
    pub role: RuleRole,
    pub func: RuleFn,
}

impl RuleDef {
    pub const fn finder(name: &'static str, func: RuleFn) -> Self {
        Self {
            name,
            role: RuleRole::Finder,
            func,
        }
    }

    pub const fn plucker(name: &'static str, func: RuleFn) -> Self {
        Self {
            name,
            role: RuleRole::Plucker,
            func,
        }
    }
}

/// A resolved rule bound to its arguments.
#[derive(Debug, Clone)]
pub struct Rule {
    def: RuleDef,
    arguments: Vec<Arg>,
}

impl Rule {
    pub fn new(def: RuleDef, arguments: Vec<Arg>) -> Self {
        Self { def, arguments }
    }

    pub fn method(&self) -> &'static str {
        self.def.name
    }

    pub fn arguments(&self) -> &[Arg] {
        &self.arguments
    }

    pub fn role(&self) -> RuleRole {
        self.def.role
    }

    pub fn def(&self) -> RuleDef {
        self.def
    }

    /// Arguments rendered for diagnostics, e.g. `'h1', 2`.
    pub fn arguments_display(&self) -> String {
        self.arguments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything one rule invocation can see.
pub struct RuleContext<'a> {
    page: &'a Page,
    rule: &'static str,
    args: &'a [Arg],
    obtainer: &'a Obtainer,
    resolver: Option<&'a dyn LinkResolver>,
    marked: Vec<ElementId>,
    notes: Vec<String>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        page: &'a Page,
        rule: &'a Rule,
        obtainer: &'a Obtainer,
        resolver: Option<&'a dyn LinkResolver>,
    ) -> Self {
        Self {
            page,
            rule: rule.method(),
            args: rule.arguments(),
            obtainer,
            resolver,
            marked: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn page(&self) -> &'a Page {
        self.page
    }

    pub fn method(&self) -> &'static str {
        self.rule
    }

    fn bad_arg(&self, index: usize, expected: &str) -> ObtainError {
        let got = self
            .args
            .get(index)
            .map(ToString::to_string)
            .unwrap_or_else(|| "nothing".to_string());
        ObtainError::argument(
            self.rule,
            format!("argument {}", index + 1),
            Some(anyhow::anyhow!("expected {}, got {}", expected, got)),
        )
    }

    /// A required string argument.
    pub fn str_arg(&self, index: usize) -> Result<&'a str> {
        match self.args.get(index) {
            Some(Arg::Str(s)) => Ok(s.as_str()),
            _ => Err(self.bad_arg(index, "a string")),
        }
    }

    /// An optional string argument; missing, null and empty are all `None`.
    pub fn opt_str_arg(&self, index: usize) -> Result<Option<&'a str>> {
        match self.args.get(index) {
            None | Some(Arg::Null) => Ok(None),
            Some(Arg::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Arg::Str(s)) => Ok(Some(s.as_str())),
            _ => Err(self.bad_arg(index, "a string or null")),
        }
    }

    /// A 1-based index, returned 0-based. Numeric strings are accepted.
    pub fn index_arg(&self, index: usize, default: usize) -> Result<usize> {
        let n = match self.args.get(index) {
            None | Some(Arg::Null) => return Ok(default.saturating_sub(1)),
            Some(Arg::Int(n)) => *n,
            Some(Arg::Str(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.bad_arg(index, "a positive integer"))?,
            Some(Arg::Bool(_)) => return Err(self.bad_arg(index, "a positive integer")),
        };
        if n < 1 {
            return Err(self.bad_arg(index, "a positive integer"));
        }
        usize::try_from(n - 1).map_err(|_| self.bad_arg(index, "a positive integer"))
    }

    pub fn bool_arg(&self, index: usize, default: bool) -> Result<bool> {
        match self.args.get(index) {
            None | Some(Arg::Null) => Ok(default),
            Some(Arg::Bool(b)) => Ok(*b),
            Some(Arg::Int(n)) => Ok(*n != 0),
            Some(Arg::Str(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" | "" => Ok(false),
                _ => Err(self.bad_arg(index, "a boolean")),
            },
        }
    }

    /// Elements matching `css` from the current root.
    pub fn query(&self, css: &str) -> Result<Vec<Element<'a>>> {
        self.page.query_all(css)
    }

    /// What a scalar rule reads from `element` under this kind.
    pub fn content(&self, element: &Element<'_>) -> String {
        match self.obtainer.kind().retrieval() {
            Retrieval::Text => element.text(),
            Retrieval::Markup => element.inner_html(),
        }
    }

    /// True if `raw` would survive this kind's clean and validate steps.
    pub fn accepts(&self, raw: Outcome) -> bool {
        self.obtainer.accepts(raw)
    }

    pub fn mark(&mut self, element: &Element<'_>) {
        self.marked.push(element.id());
    }

    pub fn mark_all(&mut self, elements: &[Element<'_>]) {
        self.marked.extend(elements.iter().map(Element::id));
    }

    /// Runs `href` through the configured resolver.
    ///
    /// Resolution failures are noted and yield `None` so the caller skips
    /// the candidate; they never propagate.
    pub fn resolve(&mut self, href: &str) -> Option<String> {
        let Some(resolver) = self.resolver else {
            self.note(format!("no link resolver configured; kept {}", href));
            return Some(href.to_string());
        };
        match resolver.resolve(href) {
            Ok(target) => Some(target),
            Err(e) => {
                self.note(format!("could not resolve {}: {}", href, e));
                None
            }
        }
    }

    /// Records a message the engine reports at debug severity.
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    /// Marked element ids and notes, in the order they were recorded.
    pub fn into_parts(self) -> (Vec<ElementId>, Vec<String>) {
        (self.marked, self.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obtainer::ObtainerKind;
    use crate::options::ObtainOptions;

    fn noop(_: &mut RuleContext<'_>) -> Result<Outcome> {
        Ok(Outcome::empty_text())
    }

    fn with_ctx<F: FnOnce(&mut RuleContext<'_>)>(args: Vec<Arg>, f: F) {
        let page = Page::parse("<p>x</p>");
        let obtainer = Obtainer::for_kind(ObtainerKind::Text, &ObtainOptions::default());
        let rule = Rule::new(RuleDef::finder("noop", noop), args);
        let mut ctx = RuleContext::new(&page, &rule, &obtainer, None);
        f(&mut ctx);
    }

    #[test]
    fn args_deserialize_untagged() {
        let args: Vec<Arg> = serde_json::from_str(r#"["h1", 2, true, null]"#).unwrap();
        assert_eq!(
            args,
            vec![Arg::from("h1"), Arg::Int(2), Arg::Bool(true), Arg::Null]
        );
    }

    #[test]
    fn index_args_are_one_based() {
        with_ctx(vec![Arg::Int(3), Arg::from("2"), Arg::Int(0)], |ctx| {
            assert_eq!(ctx.index_arg(0, 1).unwrap(), 2);
            assert_eq!(ctx.index_arg(1, 1).unwrap(), 1);
            assert!(ctx.index_arg(2, 1).unwrap_err().is_argument());
            assert_eq!(ctx.index_arg(5, 1).unwrap(), 0);
        });
    }

    #[test]
    fn missing_required_string_is_an_argument_error() {
        with_ctx(vec![Arg::Int(1)], |ctx| {
            let err = ctx.str_arg(0).unwrap_err();
            assert!(err.is_argument());
            assert!(err.to_string().contains("noop"));
            assert!(ctx.str_arg(1).is_err());
            assert_eq!(ctx.opt_str_arg(1).unwrap(), None);
        });
    }

    #[test]
    fn resolver_failures_become_notes() {
        struct Failing;
        impl LinkResolver for Failing {
            fn resolve(&self, _href: &str) -> anyhow::Result<String> {
                anyhow::bail!("timed out")
            }
        }

        let page = Page::parse("<p>x</p>");
        let obtainer = Obtainer::for_kind(ObtainerKind::Link, &ObtainOptions::default());
        let rule = Rule::new(RuleDef::finder("noop", noop), vec![]);
        let failing = Failing;
        let resolver: &dyn LinkResolver = &failing;
        let mut ctx = RuleContext::new(&page, &rule, &obtainer, Some(resolver));
        assert_eq!(ctx.resolve("/a"), None);
        let (marked, notes) = ctx.into_parts();
        assert!(marked.is_empty());
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("timed out"));
    }
}
