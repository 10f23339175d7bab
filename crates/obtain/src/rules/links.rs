// ABOUTME: Link and image collection rules with domain and file-extension filters.
// ABOUTME: Record variants return {href,text,title} / {src,alt,title}; string variants are de-duplicated.

use serde_json::{json, Value};
use url::Url;

use crate::dom::Element;
use crate::error::Result;
use crate::obtainer::Outcome;
use crate::rule::{RuleContext, RuleDef};
use crate::rules::is_dead_link;
use crate::text::normalize_whitespace;

pub const LINK_RULES: &[RuleDef] = &[
    RuleDef::finder("find_links", find_links),
    RuleDef::plucker("pluck_links", pluck_links),
    RuleDef::finder("find_link_hrefs", find_link_hrefs),
    RuleDef::plucker("pluck_link_hrefs", pluck_link_hrefs),
];

pub const IMAGE_RULES: &[RuleDef] = &[
    RuleDef::finder("find_images", find_images),
    RuleDef::plucker("pluck_images", pluck_images),
    RuleDef::finder("find_image_srcs", find_image_srcs),
    RuleDef::plucker("pluck_image_srcs", pluck_image_srcs),
];

/// True if `href` is relative or its host is `domain` or one of its subdomains.
pub fn on_domain(href: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return true;
    }
    let candidate = if href.starts_with("//") {
        format!("http:{}", href)
    } else {
        href.to_string()
    };
    match Url::parse(&candidate) {
        Ok(url) => match url.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                host == domain || host.ends_with(&format!(".{}", domain))
            }
            None => false,
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Parses `"pdf, .DOC"` into `["pdf", "doc"]`.
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// True if the path of `href` ends in one of `extensions`.
pub fn has_extension(href: &str, extensions: &[String]) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').next().unwrap_or_default();
    match file.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Which element and attribute a collection rule reads.
#[derive(Clone, Copy)]
enum Target {
    Link,
    Image,
}

impl Target {
    fn tag(self) -> &'static str {
        match self {
            Target::Link => "a",
            Target::Image => "img",
        }
    }

    fn url_attr(self) -> &'static str {
        match self {
            Target::Link => "href",
            Target::Image => "src",
        }
    }

    fn record(self, url: &str, el: &Element<'_>) -> Value {
        let title = el.attr("title").unwrap_or_default();
        match self {
            Target::Link => json!({
                "href": url,
                "text": normalize_whitespace(&el.text()),
                "title": title,
            }),
            Target::Image => json!({
                "src": url,
                "alt": el.attr("alt").unwrap_or_default(),
                "title": title,
            }),
        }
    }
}

/// Arguments: `selector, domain = null, extensions = null, resolve = false`.
///
/// The selector may match the targets themselves or containers of them.
/// With `urls_only`, returns each distinct URL once, in first-seen order.
fn collect(ctx: &mut RuleContext<'_>, target: Target, urls_only: bool, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let domain = ctx.opt_str_arg(1)?;
    let extensions = ctx.opt_str_arg(2)?.map(parse_extensions);
    let resolve = ctx.bool_arg(3, false)?;

    let mut candidates = Vec::new();
    for el in ctx.query(selector)? {
        if el.tag() == target.tag() {
            candidates.push(el);
        } else {
            candidates.extend(el.query_all(&format!("{}[{}]", target.tag(), target.url_attr()))?);
        }
    }

    let mut records = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for el in &candidates {
        let Some(url) = el.attr(target.url_attr()).map(|u| u.trim().to_string()) else {
            continue;
        };
        if is_dead_link(&url) {
            continue;
        }
        if domain.is_some_and(|d| !on_domain(&url, d)) {
            continue;
        }
        if extensions.as_ref().is_some_and(|exts| !has_extension(&url, exts)) {
            continue;
        }
        let url = if resolve {
            match ctx.resolve(&url) {
                Some(resolved) => resolved,
                None => continue,
            }
        } else {
            url
        };

        if pluck {
            ctx.mark(el);
        }
        if urls_only {
            if !seen.contains(&url) {
                records.push(Value::String(url.clone()));
                seen.push(url);
            }
        } else {
            records.push(target.record(&url, el));
        }
    }
    Ok(Outcome::Records(records))
}

fn find_links(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Link, false, false)
}

fn pluck_links(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Link, false, true)
}

fn find_link_hrefs(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Link, true, false)
}

fn pluck_link_hrefs(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Link, true, true)
}

fn find_images(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Image, false, false)
}

fn pluck_images(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Image, false, true)
}

fn find_image_srcs(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Image, true, false)
}

fn pluck_image_srcs(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    collect(ctx, Target::Image, true, true)
}
