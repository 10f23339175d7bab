// ABOUTME: Array rules collecting element contents into a list: all matches, the Nth match, breadcrumbs.

use serde_json::Value;

use crate::dom::Element;
use crate::error::Result;
use crate::obtainer::Outcome;
use crate::rule::{RuleContext, RuleDef};
use crate::rules::scalar::breadcrumbs;

pub const RULES: &[RuleDef] = &[
    RuleDef::finder("find_all_selector", find_all_selector),
    RuleDef::plucker("pluck_all_selector", pluck_all_selector),
    RuleDef::finder("find_selector_n", find_selector_n),
    RuleDef::plucker("pluck_selector_n", pluck_selector_n),
    RuleDef::finder("find_xpath_all", find_xpath_all),
    RuleDef::plucker("pluck_xpath_all", pluck_xpath_all),
    RuleDef::finder("find_class_breadcrumb", find_class_breadcrumb),
];

/// Contents of `elements`, skipping blank ones; pluckers mark each one kept.
fn contents(ctx: &mut RuleContext<'_>, elements: &[Element<'_>], pluck: bool) -> Outcome {
    let mut items = Vec::new();
    for el in elements {
        let content = ctx.content(el);
        if content.trim().is_empty() {
            continue;
        }
        if pluck {
            ctx.mark(el);
        }
        items.push(Value::String(content));
    }
    Outcome::Records(items)
}

fn all_selector(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let elements = ctx.query(selector)?;
    Ok(contents(ctx, &elements, pluck))
}

fn find_all_selector(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    all_selector(ctx, false)
}

fn pluck_all_selector(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    all_selector(ctx, true)
}

fn selector_n(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let n = ctx.index_arg(1, 1)?;
    let elements: Vec<_> = ctx.query(selector)?.into_iter().skip(n).take(1).collect();
    Ok(contents(ctx, &elements, pluck))
}

fn find_selector_n(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    selector_n(ctx, false)
}

fn pluck_selector_n(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    selector_n(ctx, true)
}

fn xpath_all(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let expr = ctx.str_arg(0)?;
    let elements = ctx.page().query_xpath(expr)?;
    Ok(contents(ctx, &elements, pluck))
}

fn find_xpath_all(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    xpath_all(ctx, false)
}

fn pluck_xpath_all(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    xpath_all(ctx, true)
}

/// Every crumb's text. Breadcrumbs belong to the page chrome, so this never plucks.
fn find_class_breadcrumb(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let class = ctx.str_arg(0)?;
    let crumbs = breadcrumbs(ctx, class)?
        .into_iter()
        .map(|c| Value::String(c.text))
        .collect();
    Ok(Outcome::Records(crumbs))
}
