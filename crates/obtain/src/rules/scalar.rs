// ABOUTME: Scalar finders and pluckers: selector, XPath, meta, scan-until-valid, breadcrumbs, label lookups.
// ABOUTME: Each returns the matched element's content; pluckers also mark what they matched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::Element;
use crate::error::Result;
use crate::obtainer::Outcome;
use crate::rule::{RuleContext, RuleDef};
use crate::rules::{class_selector, label_regex, text_after};
use crate::text::entities::decode_entities;
use crate::text::{normalize_whitespace, strip_tags};

pub const RULES: &[RuleDef] = &[
    RuleDef::finder("find_selector", find_selector),
    RuleDef::plucker("pluck_selector", pluck_selector),
    RuleDef::finder("find_selector_attribute", find_selector_attribute),
    RuleDef::finder("find_xpath", find_xpath),
    RuleDef::plucker("pluck_xpath", pluck_xpath),
    RuleDef::finder("find_meta", find_meta),
    RuleDef::finder("find_class_breadcrumb_last", find_class_breadcrumb_last),
    RuleDef::finder("find_class_breadcrumb_last_anchor", find_class_breadcrumb_last_anchor),
    RuleDef::finder("find_sibling_by_label", find_sibling_by_label),
    RuleDef::plucker("pluck_sibling_by_label", pluck_sibling_by_label),
    RuleDef::finder("find_text_after_label", find_text_after_label),
    RuleDef::plucker("pluck_text_after_label", pluck_text_after_label),
];

/// Scan rules shared with the array kind.
pub const UNTIL_VALID: &[RuleDef] = &[
    RuleDef::finder("find_any_selector_until_valid", find_any_selector_until_valid),
    RuleDef::plucker("pluck_any_selector_until_valid", pluck_any_selector_until_valid),
    RuleDef::finder("find_last_selector_until_valid", find_last_selector_until_valid),
    RuleDef::plucker("pluck_last_selector_until_valid", pluck_last_selector_until_valid),
];

fn take_nth(ctx: &mut RuleContext<'_>, elements: Vec<Element<'_>>, n: usize, pluck: bool) -> Outcome {
    match elements.into_iter().nth(n) {
        Some(el) => {
            if pluck {
                ctx.mark(&el);
            }
            Outcome::Text(ctx.content(&el))
        }
        None => Outcome::empty_text(),
    }
}

fn selector_nth(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let n = ctx.index_arg(1, 1)?;
    let elements = ctx.query(selector)?;
    Ok(take_nth(ctx, elements, n, pluck))
}

fn find_selector(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    selector_nth(ctx, false)
}

fn pluck_selector(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    selector_nth(ctx, true)
}

fn find_selector_attribute(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let attribute = ctx.str_arg(1)?;
    let n = ctx.index_arg(2, 1)?;
    let value = ctx
        .query(selector)?
        .into_iter()
        .nth(n)
        .and_then(|el| el.attr(attribute))
        .unwrap_or_default();
    Ok(Outcome::Text(value))
}

fn xpath_nth(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let expr = ctx.str_arg(0)?;
    let n = ctx.index_arg(1, 1)?;
    let elements = ctx.page().query_xpath(expr)?;
    Ok(take_nth(ctx, elements, n, pluck))
}

fn find_xpath(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    xpath_nth(ctx, false)
}

fn pluck_xpath(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    xpath_nth(ctx, true)
}

/// `content` of the first `<meta>` whose name, property or itemprop is `name`.
fn find_meta(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let name = ctx.str_arg(0)?.trim();
    let value = ctx
        .query("meta")?
        .into_iter()
        .find(|m| {
            ["name", "property", "itemprop"]
                .iter()
                .any(|a| m.attr(a).is_some_and(|v| v.trim().eq_ignore_ascii_case(name)))
        })
        .and_then(|m| m.attr("content"))
        .unwrap_or_default();
    Ok(Outcome::Text(value))
}

fn scan_until_valid(ctx: &mut RuleContext<'_>, from_end: bool, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let mut elements = ctx.query(selector)?;
    if from_end {
        elements.reverse();
    }
    for el in &elements {
        let content = ctx.content(el);
        if ctx.accepts(Outcome::Text(content.clone())) {
            if pluck {
                ctx.mark(el);
            }
            return Ok(Outcome::Text(content));
        }
    }
    Ok(Outcome::empty_text())
}

fn find_any_selector_until_valid(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    scan_until_valid(ctx, false, false)
}

fn pluck_any_selector_until_valid(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    scan_until_valid(ctx, false, true)
}

fn find_last_selector_until_valid(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    scan_until_valid(ctx, true, false)
}

fn pluck_last_selector_until_valid(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    scan_until_valid(ctx, true, true)
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Crumb {
    pub text: String,
    pub is_anchor: bool,
}

static CLOSING_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</a\s*>").unwrap());

fn crumb_text(raw: &str) -> String {
    normalize_whitespace(raw)
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '>' | '»' | '›' | '/' | '|' | '·' | '•' | ':')
        })
        .to_string()
}

/// Crumbs of the first element carrying `class`, in document order.
///
/// List markup gives one crumb per `<li>`. Otherwise each anchor is a crumb
/// and any text after the last anchor is the trailing non-anchor crumb.
pub(crate) fn breadcrumbs(ctx: &RuleContext<'_>, class: &str) -> Result<Vec<Crumb>> {
    let Some(container) = ctx.query(&class_selector(class))?.into_iter().next() else {
        return Ok(Vec::new());
    };

    let items = container.query_all("li")?;
    let mut crumbs = Vec::new();
    if !items.is_empty() {
        for li in &items {
            crumbs.push(Crumb {
                text: crumb_text(&li.text()),
                is_anchor: !li.query_all("a")?.is_empty(),
            });
        }
    } else {
        for a in container.query_all("a")? {
            crumbs.push(Crumb {
                text: crumb_text(&a.text()),
                is_anchor: true,
            });
        }
        let inner = container.inner_html();
        let tail = match CLOSING_ANCHOR_RE.find_iter(&inner).last() {
            Some(m) => &inner[m.end()..],
            None => inner.as_str(),
        };
        crumbs.push(Crumb {
            text: crumb_text(&decode_entities(&strip_tags(tail))),
            is_anchor: false,
        });
    }
    crumbs.retain(|c| !c.text.is_empty());
    Ok(crumbs)
}

fn find_class_breadcrumb_last(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let class = ctx.str_arg(0)?;
    let last = breadcrumbs(ctx, class)?
        .into_iter()
        .rev()
        .find(|c| !c.is_anchor)
        .map(|c| c.text)
        .unwrap_or_default();
    Ok(Outcome::Text(last))
}

fn find_class_breadcrumb_last_anchor(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    let class = ctx.str_arg(0)?;
    let last = breadcrumbs(ctx, class)?
        .into_iter()
        .rev()
        .find(|c| c.is_anchor)
        .map(|c| c.text)
        .unwrap_or_default();
    Ok(Outcome::Text(last))
}

/// The `n`th following sibling of the first element whose text contains `label`.
///
/// With `cross_check`, the sibling must match that selector or sit inside a
/// match; this keeps a label at one nesting depth from picking up a sibling
/// at another.
fn sibling_by_label(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let label = ctx.str_arg(1)?;
    let n = ctx.index_arg(2, 1)?;
    let cross_check = ctx.opt_str_arg(3)?;
    let Some(label) = label_regex(label) else {
        return Ok(Outcome::empty_text());
    };

    let allowed: Option<Vec<Element<'_>>> = match cross_check {
        Some(css) => Some(ctx.query(css)?),
        None => None,
    };

    for el in ctx.query(selector)? {
        if !label.is_match(&normalize_whitespace(&el.text())) {
            continue;
        }
        let Some(target) = el.next_siblings().into_iter().nth(n) else {
            continue;
        };
        if allowed
            .as_ref()
            .is_some_and(|scopes| !scopes.iter().any(|s| s.contains(&target)))
        {
            continue;
        }
        if pluck {
            ctx.mark(&target);
        }
        return Ok(Outcome::Text(ctx.content(&target)));
    }
    Ok(Outcome::empty_text())
}

fn find_sibling_by_label(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    sibling_by_label(ctx, false)
}

fn pluck_sibling_by_label(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    sibling_by_label(ctx, true)
}

/// Text following `label` inside the first matching element that has any.
fn text_after_label(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let selector = ctx.str_arg(0)?;
    let label = ctx.str_arg(1)?;
    let Some(label) = label_regex(label) else {
        return Ok(Outcome::empty_text());
    };
    for el in ctx.query(selector)? {
        match text_after(&label, &ctx.content(&el)) {
            Some(rest) if !rest.is_empty() => {
                if pluck {
                    ctx.mark(&el);
                }
                return Ok(Outcome::Text(rest));
            }
            _ => continue,
        }
    }
    Ok(Outcome::empty_text())
}

fn find_text_after_label(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    text_after_label(ctx, false)
}

fn pluck_text_after_label(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    text_after_label(ctx, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;
    use crate::obtainer::{Obtainer, ObtainerKind};
    use crate::options::ObtainOptions;
    use crate::rule::{Arg, Rule};

    const PAGE: &str = r#"
        <html><head>
            <meta property="og:title" content="Meta Title">
        </head><body>
            <h1 class="headline">First</h1>
            <h1 class="headline">Second</h1>
            <ul class="crumbs"><li><a href="/">Home</a></li><li><a href="/news">News</a></li><li>Budget vote</li></ul>
            <div class="trail"><a href="/">Home</a> &gt; <a href="/p">Parks</a> &gt; Summer hours</div>
            <dl><dt>City</dt><dd>Springfield</dd><dt>State</dt><dd>Oregon</dd></dl>
            <p class="byline">Posted by: Jane Roe</p>
            <div class="state"><span>CA?</span><span>Nowhere</span><span>Texas</span></div>
            <div class="notes"><b>Notes:</b> Bring ID.<br>Doors open at six.</div>
        </body></html>
    "#;

    fn run(kind: ObtainerKind, def: RuleDef, args: Vec<Arg>) -> (Outcome, usize) {
        let page = Page::parse(PAGE);
        let obtainer = Obtainer::for_kind(kind, &ObtainOptions::default());
        let rule = Rule::new(def, args);
        let mut ctx = RuleContext::new(&page, &rule, &obtainer, None);
        let out = (def.func)(&mut ctx).unwrap();
        let (marked, _) = ctx.into_parts();
        (out, marked.len())
    }

    fn rule(name: &str) -> RuleDef {
        RULES
            .iter()
            .chain(UNTIL_VALID)
            .find(|d| d.name == name)
            .copied()
            .unwrap()
    }

    #[test]
    fn selector_picks_nth_and_pluck_marks() {
        let (out, marked) = run(ObtainerKind::Text, rule("find_selector"), vec!["h1".into(), 2.into()]);
        assert_eq!(out, Outcome::text("Second"));
        assert_eq!(marked, 0);
        let (out, marked) = run(ObtainerKind::Text, rule("pluck_selector"), vec!["h1.headline".into()]);
        assert_eq!(out, Outcome::text("First"));
        assert_eq!(marked, 1);
    }

    #[test]
    fn missing_nth_is_empty() {
        let (out, _) = run(ObtainerKind::Text, rule("find_selector"), vec!["h1".into(), 9.into()]);
        assert_eq!(out, Outcome::empty_text());
    }

    #[test]
    fn meta_and_attribute() {
        let (out, _) = run(ObtainerKind::Text, rule("find_meta"), vec!["OG:TITLE".into()]);
        assert_eq!(out, Outcome::text("Meta Title"));
        let (out, _) = run(
            ObtainerKind::Text,
            rule("find_selector_attribute"),
            vec!["ul.crumbs a".into(), "href".into(), 2.into()],
        );
        assert_eq!(out, Outcome::text("/news"));
    }

    #[test]
    fn xpath_rules_use_the_subset() {
        let (out, marked) = run(ObtainerKind::Text, rule("pluck_xpath"), vec!["//dl/dd[2]".into()]);
        assert_eq!(out, Outcome::text("Oregon"));
        assert_eq!(marked, 1);
    }

    #[test]
    fn scan_until_valid_respects_kind_validation() {
        let (out, marked) = run(
            ObtainerKind::State,
            rule("pluck_any_selector_until_valid"),
            vec![".state span".into()],
        );
        assert_eq!(out, Outcome::text("Texas"));
        assert_eq!(marked, 1);
        let (out, _) = run(
            ObtainerKind::Text,
            rule("find_last_selector_until_valid"),
            vec!["h1".into()],
        );
        assert_eq!(out, Outcome::text("Second"));
    }

    #[test]
    fn breadcrumbs_from_lists_and_inline_trails() {
        let (out, marked) = run(ObtainerKind::Text, rule("find_class_breadcrumb_last"), vec!["crumbs".into()]);
        assert_eq!(out, Outcome::text("Budget vote"));
        assert_eq!(marked, 0);
        let (out, _) = run(
            ObtainerKind::Text,
            rule("find_class_breadcrumb_last_anchor"),
            vec!["crumbs".into()],
        );
        assert_eq!(out, Outcome::text("News"));
        let (out, _) = run(ObtainerKind::Text, rule("find_class_breadcrumb_last"), vec!["trail".into()]);
        assert_eq!(out, Outcome::text("Summer hours"));
    }

    #[test]
    fn sibling_by_label_with_cross_check() {
        let (out, marked) = run(
            ObtainerKind::City,
            rule("pluck_sibling_by_label"),
            vec!["dt".into(), "city".into()],
        );
        assert_eq!(out, Outcome::text("Springfield"));
        assert_eq!(marked, 1);
        let (out, _) = run(
            ObtainerKind::Text,
            rule("find_sibling_by_label"),
            vec!["dt".into(), "City".into(), 1.into(), "p".into()],
        );
        assert_eq!(out, Outcome::empty_text());
    }

    #[test]
    fn text_after_label_trims_separators() {
        let (out, marked) = run(
            ObtainerKind::Text,
            rule("pluck_text_after_label"),
            vec!["p".into(), "posted by".into()],
        );
        assert_eq!(out, Outcome::text("Jane Roe"));
        assert_eq!(marked, 1);
    }

    #[test]
    fn text_after_label_keeps_markup_for_plain_text() {
        let (out, _) = run(
            ObtainerKind::PlainText,
            rule("find_text_after_label"),
            vec!["div.notes".into(), "notes".into()],
        );
        assert_eq!(out, Outcome::text("Bring ID.<br>Doors open at six."));
        let obtainer = Obtainer::for_kind(ObtainerKind::PlainText, &ObtainOptions::default());
        assert_eq!(obtainer.clean(out), Outcome::text("Bring ID.\nDoors open at six."));
    }

    #[test]
    fn missing_arguments_propagate() {
        let page = Page::parse(PAGE);
        let obtainer = Obtainer::for_kind(ObtainerKind::Text, &ObtainOptions::default());
        let bare = Rule::new(rule("find_selector"), vec![]);
        let mut ctx = RuleContext::new(&page, &bare, &obtainer, None);
        assert!((bare.def().func)(&mut ctx).unwrap_err().is_argument());
    }
}
