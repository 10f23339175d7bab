// ABOUTME: Content-type sniffing rules; each yields its configured tag on a match, else the empty tag.

use regex::RegexBuilder;

use crate::error::{ObtainError, Result};
use crate::obtainer::Outcome;
use crate::rule::{RuleContext, RuleDef};

pub const RULES: &[RuleDef] = &[
    RuleDef::finder("find_type_if_selector", find_type_if_selector),
    RuleDef::finder("find_type_if_text", find_type_if_text),
    RuleDef::finder("find_type_if_meta", find_type_if_meta),
];

fn tag_if(matched: bool, tag: &str) -> Outcome {
    if matched {
        Outcome::Tag(tag.to_string())
    } else {
        Outcome::Tag(String::new())
    }
}

fn find_type_if_selector(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let tag = ctx.str_arg(1)?;
    Ok(tag_if(!ctx.query(selector)?.is_empty(), tag))
}

fn find_type_if_text(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let needle = ctx.str_arg(1)?.to_lowercase();
    let tag = ctx.str_arg(2)?;
    let matched = ctx
        .query(selector)?
        .iter()
        .any(|el| el.text().to_lowercase().contains(&needle));
    Ok(tag_if(matched, tag))
}

fn find_type_if_meta(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let name = ctx.str_arg(0)?.trim();
    let pattern = ctx.str_arg(1)?;
    let tag = ctx.str_arg(2)?;
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ObtainError::argument(ctx.method(), "compile pattern", Some(e.into())))?;
    let matched = ctx.query("meta")?.iter().any(|m| {
        let named = ["name", "property"]
            .iter()
            .any(|a| m.attr(a).is_some_and(|v| v.trim().eq_ignore_ascii_case(name)));
        named && m.attr("content").is_some_and(|c| re.is_match(&c))
    });
    Ok(tag_if(matched, tag))
}
