// ABOUTME: Table rules: single-cell lookup by (table, row, col) and whole-table row extraction.
// ABOUTME: Rows and cells are counted per table, ignoring those of nested tables.

use serde_json::Value;

use crate::dom::Element;
use crate::error::Result;
use crate::obtainer::Outcome;
use crate::rule::{RuleContext, RuleDef};
use crate::text::normalize_whitespace;

/// Cell rules, available to scalar kinds and the table kind alike.
pub const CELL_RULES: &[RuleDef] = &[
    RuleDef::finder("find_table_cell", find_table_cell),
    RuleDef::plucker("pluck_table_cell", pluck_table_cell),
];

pub const TABLE_RULES: &[RuleDef] = &[
    RuleDef::finder("find_table_rows", find_table_rows),
    RuleDef::plucker("pluck_table", pluck_table),
];

/// The `index`th table, inside the first `scope` match when one is given.
fn nth_table<'a>(ctx: &RuleContext<'a>, index: usize, scope: Option<&str>) -> Result<Option<Element<'a>>> {
    let tables = match scope {
        Some(css) => match ctx.query(css)?.into_iter().next() {
            Some(container) => {
                ctx.page().focus(&container);
                ctx.query("table")?
            }
            None => return Ok(None),
        },
        None => ctx.query("table")?,
    };
    Ok(tables.into_iter().nth(index))
}

fn nearest_table_is(el: &Element<'_>, table: &Element<'_>) -> bool {
    let mut cur = el.parent();
    while let Some(node) = cur {
        if node.tag() == "table" {
            return node.id() == table.id();
        }
        cur = node.parent();
    }
    false
}

/// `<tr>` elements belonging to `table` itself, in document order.
pub(crate) fn own_rows<'a>(table: &Element<'a>) -> Result<Vec<Element<'a>>> {
    Ok(table
        .query_all("tr")?
        .into_iter()
        .filter(|tr| nearest_table_is(tr, table))
        .collect())
}

pub(crate) fn cells<'a>(row: &Element<'a>) -> Vec<Element<'a>> {
    row.children()
        .into_iter()
        .filter(|c| matches!(c.tag().as_str(), "td" | "th"))
        .collect()
}

fn table_cell(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let table = ctx.index_arg(0, 1)?;
    let row = ctx.index_arg(1, 1)?;
    let col = ctx.index_arg(2, 1)?;
    let scope = ctx.opt_str_arg(3)?;

    let Some(table) = nth_table(ctx, table, scope)? else {
        return Ok(Outcome::empty_text());
    };
    let Some(row) = own_rows(&table)?.into_iter().nth(row) else {
        return Ok(Outcome::empty_text());
    };
    let Some(cell) = cells(&row).into_iter().nth(col) else {
        return Ok(Outcome::empty_text());
    };
    if pluck {
        ctx.mark(&cell);
    }
    Ok(Outcome::Text(ctx.content(&cell).trim().to_string()))
}

fn find_table_cell(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    table_cell(ctx, false)
}

fn pluck_table_cell(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    table_cell(ctx, true)
}

/// One list of cell texts per row; rows without cells are skipped.
fn table_rows(ctx: &mut RuleContext<'_>, pluck: bool) -> Result<Outcome> {
    let table = ctx.index_arg(0, 1)?;
    let scope = ctx.opt_str_arg(1)?;
    let Some(table) = nth_table(ctx, table, scope)? else {
        return Ok(Outcome::Records(Vec::new()));
    };

    let mut rows = Vec::new();
    for row in own_rows(&table)? {
        let texts: Vec<Value> = cells(&row)
            .iter()
            .map(|c| Value::String(normalize_whitespace(&c.text())))
            .collect();
        if !texts.is_empty() {
            rows.push(Value::Array(texts));
        }
    }
    if pluck && !rows.is_empty() {
        ctx.mark(&table);
    }
    Ok(Outcome::Records(rows))
}

fn find_table_rows(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    table_rows(ctx, false)
}

fn pluck_table(ctx: &mut RuleContext<'_>) -> Result<Outcome> {
    table_rows(ctx, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;
    use crate::obtainer::{Obtainer, ObtainerKind};
    use crate::options::ObtainOptions;
    use crate::rule::{Arg, Rule};
    use serde_json::json;

    const PAGE: &str = r#"
        <table id="t1">
            <tr><th>Name</th><th>Role</th><th>Phone</th></tr>
            <tr><td>Ann</td><td>Clerk</td><td>
                <table id="inner"><tr><td>555-0100</td></tr></table>
            </td></tr>
        </table>
        <div id="side">
            <table id="t2"><tr><td> a </td><td>b</td></tr><tr></tr><tr><td>c</td></tr></table>
        </div>
    "#;

    fn run(kind: ObtainerKind, def: RuleDef, args: Vec<Arg>) -> (Outcome, Vec<String>) {
        let page = Page::parse(PAGE);
        let obtainer = Obtainer::for_kind(kind, &ObtainOptions::default());
        let rule = Rule::new(def, args);
        let mut ctx = RuleContext::new(&page, &rule, &obtainer, None);
        let out = (def.func)(&mut ctx).unwrap();
        let (marked, _) = ctx.into_parts();
        let tags = marked
            .into_iter()
            .filter_map(|id| page.element(id))
            .map(|e| e.tag())
            .collect();
        (out, tags)
    }

    #[test]
    fn cell_rows_skip_nested_tables() {
        let (out, marked) = run(
            ObtainerKind::Text,
            CELL_RULES[1],
            vec![1.into(), 2.into(), 2.into()],
        );
        assert_eq!(out, Outcome::text("Clerk"));
        assert_eq!(marked, vec!["td".to_string()]);

        // The first table has two rows of its own; the nested row is not a third.
        let (out, _) = run(ObtainerKind::Text, CELL_RULES[0], vec![1.into(), 3.into(), 1.into()]);
        assert_eq!(out, Outcome::empty_text());
    }

    #[test]
    fn scope_restricts_table_search() {
        let (out, _) = run(
            ObtainerKind::Text,
            CELL_RULES[0],
            vec![1.into(), 1.into(), 1.into(), "#side".into()],
        );
        assert_eq!(out, Outcome::text("a"));
    }

    #[test]
    fn rows_become_lists_of_cells() {
        let (out, marked) = run(
            ObtainerKind::Table,
            TABLE_RULES[1],
            vec![1.into(), "#side".into()],
        );
        assert_eq!(out, Outcome::Records(vec![json!(["a", "b"]), json!(["c"])]));
        assert_eq!(marked, vec!["table".to_string()]);
    }
}
