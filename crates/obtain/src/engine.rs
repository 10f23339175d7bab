// ABOUTME: The obtain loop: runs a job's rules in order against a Page until one validates.
// ABOUTME: Removal marks from the winning plucker are committed only after validation succeeds.

use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{DiagnosticSink, Reporter, Severity};
use crate::dom::Page;
use crate::error::Result;
use crate::job::Job;
use crate::obtainer::{Obtainer, ObtainerKind, Outcome};
use crate::options::{EngineBuilder, LinkResolver, ObtainOptions};
use crate::rule::{RuleContext, RuleRole};

/// Runs jobs against pages with one fixed set of options.
///
/// An Engine holds no per-page state and can be shared across threads; the
/// Page is the only thing an obtain call mutates.
pub struct Engine {
    opts: ObtainOptions,
    resolver: Option<Arc<dyn LinkResolver>>,
    /// One obtainer per kind, in `ObtainerKind::ALL` order.
    obtainers: Vec<Obtainer>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("opts", &self.opts)
            .field("resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ObtainOptions::default(), None)
    }
}

impl Engine {
    pub fn new(opts: ObtainOptions, resolver: Option<Arc<dyn LinkResolver>>) -> Self {
        let obtainers = ObtainerKind::ALL
            .iter()
            .map(|kind| Obtainer::for_kind(*kind, &opts))
            .collect();
        Self {
            opts,
            resolver,
            obtainers,
        }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn options(&self) -> &ObtainOptions {
        &self.opts
    }

    pub fn obtainer(&self, kind: ObtainerKind) -> &Obtainer {
        &self.obtainers[kind as usize]
    }

    /// Runs `job` against `page` and returns the first rule result that validates.
    ///
    /// Returns the kind's empty outcome when no rule validates. Errors are
    /// configuration problems (bad arguments, selectors or XPath) and stop
    /// the job; the page is left unchanged by the rule that failed.
    pub fn obtain(
        &self,
        job: &Job,
        page: &mut Page,
        sink: &mut dyn DiagnosticSink,
        source_tag: &str,
    ) -> Result<Outcome> {
        let obtainer = self.obtainer(job.kind());
        let mut report = Reporter::new(sink, source_tag, job.field());

        if job.field().trim().is_empty() {
            report.error("Job of kind @kind has no field name", &[("kind", job.kind().as_str())]);
        }
        for method in job.skipped() {
            report.debug(
                "Skipped unknown rule @method for @field",
                &[("method", method.as_str())],
            );
        }

        for rule in job.rules() {
            page.reset_to_root();
            let arguments = rule.arguments_display();
            report.debug(
                "Trying @method(@arguments) for @field",
                &[("method", rule.method()), ("arguments", arguments.as_str())],
            );

            let (raw, marked, notes) = {
                let mut ctx = RuleContext::new(page, rule, obtainer, self.resolver.as_deref());
                let raw = (rule.def().func)(&mut ctx);
                let (marked, notes) = ctx.into_parts();
                (raw, marked, notes)
            };
            // A scoped rule may have narrowed the page.
            page.reset_to_root();
            let raw = raw?;
            for note in &notes {
                report.debug("@method: @note", &[("method", rule.method()), ("note", note.as_str())]);
            }

            let cleaned = obtainer.clean(raw);
            if !obtainer.validate(&cleaned) {
                report.debug("No valid match from @method for @field", &[("method", rule.method())]);
                continue;
            }

            let value = obtainer.process(cleaned, &mut report);
            if rule.role() == RuleRole::Plucker && !marked.is_empty() {
                page.remove(&marked);
            }
            let count = marked.len().to_string();
            report.report(
                Severity::Debug,
                "Matched @field with @method(@arguments); removed @count element(s)",
                &[
                    ("method", rule.method()),
                    ("arguments", arguments.as_str()),
                    (
                        "count",
                        if rule.role() == RuleRole::Plucker { count.as_str() } else { "0" },
                    ),
                ],
            );
            return Ok(value);
        }

        report.debug("No match for @field", &[]);
        Ok(job.kind().empty_outcome())
    }

    /// Runs `jobs` in order against one page; earlier plucks are visible to later jobs.
    pub fn obtain_all(
        &self,
        jobs: &[Job],
        page: &mut Page,
        sink: &mut dyn DiagnosticSink,
        source_tag: &str,
    ) -> Result<Vec<(String, Outcome)>> {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let outcome = self.obtain(job, page, sink, source_tag)?;
            results.push((job.field().to_string(), outcome));
        }
        Ok(results)
    }
}
