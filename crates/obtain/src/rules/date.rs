// ABOUTME: Date rules: text next to a label, and numeric D/M/Y patterns scanned forward or backward.
// ABOUTME: Candidates are checked against the date policy so a stray match does not end the scan.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::obtainer::Outcome;
use crate::rule::{RuleContext, RuleDef};
use crate::rules::{label_regex, text_after};
use crate::text::normalize_whitespace;

pub const RULES: &[RuleDef] = &[
    RuleDef::finder("find_date_near_label", find_date_near_label),
    RuleDef::plucker("pluck_date_near_label", pluck_date_near_label),
    RuleDef::finder("find_numeric_date", find_numeric_date),
    RuleDef::plucker("pluck_numeric_date", pluck_numeric_date),
    RuleDef::finder("find_numeric_date_from_end", find_numeric_date_from_end),
];

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-](?:\d{4}|\d{2})\b").unwrap());

/// Date text after `label`, or in the element right after the labelled one.
fn date_near_label(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let label = ctx.str_arg(1)?;
    let Some(label) = label_regex(label) else {
        return Ok(Outcome::empty_text());
    };

    for el in ctx.query(selector)? {
        let Some(rest) = text_after(&label, &ctx.content(&el)) else {
            continue;
        };
        if !rest.is_empty() && ctx.accepts(Outcome::Text(rest.clone())) {
            if pluck {
                ctx.mark(&el);
            }
            return Ok(Outcome::Text(rest));
        }
        if let Some(next) = el.next_siblings().into_iter().next() {
            let text = normalize_whitespace(&next.text());
            if ctx.accepts(Outcome::Text(text.clone())) {
                if pluck {
                    ctx.mark(&next);
                }
                return Ok(Outcome::Text(text));
            }
        }
    }
    Ok(Outcome::empty_text())
}

fn find_date_near_label(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    date_near_label(ctx, false)
}

fn pluck_date_near_label(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    date_near_label(ctx, true)
}

fn numeric_date(ctx: &mut RuleContext<'_>, from_end: bool, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let mut elements = ctx.query(selector)?;
    if from_end {
        elements.reverse();
    }
    for el in &elements {
        let text = el.text();
        let mut found: Vec<&str> = NUMERIC_DATE_RE.find_iter(&text).map(|m| m.as_str()).collect();
        if from_end {
            found.reverse();
        }
        for candidate in found {
            if ctx.accepts(Outcome::text(candidate)) {
                if pluck {
                    ctx.mark(el);
                }
                return Ok(Outcome::text(candidate));
            }
        }
    }
    Ok(Outcome::empty_text())
}

fn find_numeric_date(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    numeric_date(ctx, false, false)
}

fn pluck_numeric_date(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    numeric_date(ctx, false, true)
}

fn find_numeric_date_from_end(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    numeric_date(ctx, true, false)
}
