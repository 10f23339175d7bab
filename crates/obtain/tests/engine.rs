// ABOUTME: Integration tests for the obtain loop across jobs sharing one page.
// ABOUTME: Covers rule ordering, empty stacks, removal side effects, table plucks and diagnostics.

use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::json;
use sitemove_obtain::{
    Arg, Engine, Job, MemorySink, ObtainerKind, Outcome, Page, Result, RuleContext, RuleDef,
    Severity,
};

static FIRST_CALLS: AtomicUsize = AtomicUsize::new(0);
static SECOND_CALLS: AtomicUsize = AtomicUsize::new(0);
static THIRD_CALLS: AtomicUsize = AtomicUsize::new(0);

fn yields_nothing(_: &mut RuleContext<'_>) -> Result<Outcome> {
    FIRST_CALLS.fetch_add(1, Ordering::SeqCst);
    Ok(Outcome::text("   "))
}

fn yields_value(_: &mut RuleContext<'_>) -> Result<Outcome> {
    SECOND_CALLS.fetch_add(1, Ordering::SeqCst);
    Ok(Outcome::text("winner"))
}

fn never_reached(_: &mut RuleContext<'_>) -> Result<Outcome> {
    THIRD_CALLS.fetch_add(1, Ordering::SeqCst);
    Ok(Outcome::text("too late"))
}

#[test]
fn stops_at_first_valid_rule() {
    let engine = Engine::default();
    let mut page = Page::parse("<p>x</p>");
    let mut sink = MemorySink::new();
    let job = Job::new("body", ObtainerKind::Text)
        .add_resolved_rule(RuleDef::finder("yields_nothing", yields_nothing), vec![])
        .add_resolved_rule(RuleDef::finder("yields_value", yields_value), vec![])
        .add_resolved_rule(RuleDef::finder("never_reached", never_reached), vec![]);

    let out = engine.obtain(&job, &mut page, &mut sink, "calls").unwrap();

    assert_eq!(out, Outcome::text("winner"));
    assert_eq!(FIRST_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(SECOND_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(THIRD_CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_stack_returns_canonical_empty_value() {
    let engine = Engine::default();
    let mut page = Page::parse("<p>x</p>");
    let mut sink = MemorySink::new();
    for kind in ObtainerKind::ALL {
        let job = Job::new("field", kind);
        let out = engine.obtain(&job, &mut page, &mut sink, "empty").unwrap();
        assert_eq!(out, kind.empty_outcome(), "kind {}", kind);
    }
    assert!(sink
        .at(Severity::Debug)
        .all(|d| d.message() == "No match for field"));
}

#[test]
fn plucked_elements_are_gone_for_later_jobs() {
    let engine = Engine::default();
    let mut page = Page::parse(
        r#"<div class="story">
            <p class="dateline">Posted: Monday, June 1, 2020</p>
            <p>Body text.</p>
        </div>"#,
    );
    let mut sink = MemorySink::new();

    let date = Job::new("date", ObtainerKind::Date).add_rule("pluck_selector", vec!["p.dateline".into()]);
    let again = Job::new("date_again", ObtainerKind::Date).add_rule("find_selector", vec!["p.dateline".into()]);
    let body = Job::new("body", ObtainerKind::PlainText).add_rule("find_selector", vec![".story".into()]);

    let results = engine
        .obtain_all(&[date, again, body], &mut page, &mut sink, "story.html")
        .unwrap();

    assert_eq!(
        results,
        vec![
            ("date".to_string(), Outcome::text("June 1, 2020")),
            ("date_again".to_string(), Outcome::text("")),
            ("body".to_string(), Outcome::text("Body text.")),
        ]
    );
}

#[test]
fn table_cell_pluck_removes_only_that_cell() {
    let engine = Engine::default();
    let mut page = Page::parse(
        r#"<table>
            <tr><td>a1</td><td>a2</td><td>a3</td></tr>
            <tr><td>b1</td><td>b2</td><td>  b3  </td></tr>
        </table>"#,
    );
    let mut sink = MemorySink::new();
    let job = Job::new("cell", ObtainerKind::Table).add_rule(
        "pluck_table_cell",
        vec![Arg::Int(1), Arg::Int(2), Arg::Int(3), Arg::Null],
    );

    let out = engine.obtain(&job, &mut page, &mut sink, "table").unwrap();

    assert_eq!(out, Outcome::Records(vec![json!("b3")]));
    let cells: Vec<String> = page.query_all("td").unwrap().iter().map(|c| c.text()).collect();
    assert_eq!(cells, vec!["a1", "a2", "a3", "b1", "b2"]);
}

#[test]
fn title_truncation_reports_exact_remainder() {
    let engine = Engine::default();
    // 30 words of 9 characters plus separators, and one extra letter: 300 characters.
    let words: Vec<String> = (0..30).map(|i| format!("word{:05}", i)).collect();
    let long = format!("{}x", words.join(" "));
    assert_eq!(long.chars().count(), 300);
    let mut page = Page::parse(&format!("<h1>{}</h1>", long));
    let mut sink = MemorySink::new();
    let job = Job::new("title", ObtainerKind::Title).add_rule("pluck_selector", vec!["h1".into()]);

    let out = engine.obtain(&job, &mut page, &mut sink, "long.html").unwrap();

    let title = out.as_str().unwrap().to_string();
    assert!(title.chars().count() <= 255);
    assert!(!title.ends_with(' '));
    let errors: Vec<_> = sink.at(Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    let discarded = &errors[0].substitutions["discarded"];
    assert_eq!(format!("{} {}", title, discarded), long.replace("word", "Word"));
    assert_eq!(errors[0].source_tag, "long.html");
}

#[test]
fn skipped_rules_and_matches_are_logged() {
    let engine = Engine::default();
    let mut page = Page::parse("<h2>Oregon</h2>");
    let mut sink = MemorySink::new();
    let job = Job::new("state", ObtainerKind::State)
        .add_rule("pluck_numeric_date", vec!["h2".into()])
        .add_rule("find_selector", vec!["h2".into()]);

    let out = engine.obtain(&job, &mut page, &mut sink, "row-12").unwrap();

    assert_eq!(out, Outcome::text("Oregon"));
    let messages: Vec<String> = sink.entries().iter().map(|d| d.message()).collect();
    assert_eq!(
        messages,
        vec![
            "Skipped unknown rule pluck_numeric_date for state".to_string(),
            "Trying find_selector('h2') for state".to_string(),
            "Matched state with find_selector('h2'); removed 0 element(s)".to_string(),
        ]
    );
    assert!(sink.entries().iter().all(|d| d.source_tag == "row-12"));
}
