// ABOUTME: Job: a field bound to an obtainer kind and an ordered rule stack, plus its JSON form.
// ABOUTME: Method names resolve against the kind's registry when added; unknown names are dropped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ObtainError, Result};
use crate::obtainer::ObtainerKind;
use crate::rule::{Arg, Rule, RuleDef};

/// An ordered rule stack for one field.
#[derive(Debug, Clone)]
pub struct Job {
    field: String,
    kind: ObtainerKind,
    rules: Vec<Rule>,
    skipped: Vec<String>,
}

impl Job {
    pub fn new(field: impl Into<String>, kind: ObtainerKind) -> Self {
        Self {
            field: field.into(),
            kind,
            rules: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Appends a rule by method name.
    ///
    /// Names the kind does not know are dropped and remembered in
    /// [`Job::skipped`]; they never run.
    pub fn add_rule(mut self, method: &str, arguments: Vec<Arg>) -> Self {
        match self.kind.registry().get(method) {
            Some(def) => self.rules.push(Rule::new(def, arguments)),
            None => {
                tracing::debug!(field = %self.field, kind = %self.kind, method, "dropping unknown rule");
                self.skipped.push(method.to_string());
            }
        }
        self
    }

    /// Appends an already-resolved rule, e.g. one defined outside the built-in registries.
    pub fn add_resolved_rule(mut self, def: RuleDef, arguments: Vec<Arg>) -> Self {
        self.rules.push(Rule::new(def, arguments));
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ObtainerKind {
        self.kind
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Method names dropped at construction, in the order they were added.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// Declarative form of a rule: `{"method": "...", "arguments": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub method: String,
    #[serde(default)]
    pub arguments: Vec<Arg>,
}

/// Declarative form of a job: `{"field": "...", "kind": "...", "rules": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub field: String,
    pub kind: ObtainerKind,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl JobConfig {
    pub fn build(&self) -> Job {
        self.rules.iter().fold(Job::new(&self.field, self.kind), |job, r| {
            job.add_rule(&r.method, r.arguments.clone())
        })
    }

    /// Parses a JSON array of job configs.
    pub fn parse_list(json: &str) -> Result<Vec<JobConfig>> {
        serde_json::from_str(json)
            .map_err(|e| ObtainError::config("job list", "parse jobs", Some(e.into())))
    }

    /// Reads and parses a JSON job list file.
    pub fn load_list(path: impl AsRef<Path>) -> Result<Vec<JobConfig>> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ObtainError::io(&display, "read jobs", Some(e.into())))?;
        serde_json::from_str(&raw)
            .map_err(|e| ObtainError::config(&display, "parse jobs", Some(e.into())))
    }
}
