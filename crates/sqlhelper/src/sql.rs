//! SQL text builders.
//!
//! Stateless functions that turn values, condition maps and data maps into complete SQL
//! statements with literals inlined (strings quoted, embedded quotes doubled). Every
//! statement is passed through [`check`] before it is returned.
//!
//! # Example
//!
//! ```ignore
//! use sqlhelper::{columns, sql};
//!
//! let q = sql::select("users", columns! { "age" => 20..=29, "email" => sql::not_nil() })?;
//! assert_eq!(q, "select * from users where age >= 20 and age <= 29 and email is not null");
//!
//! let q = sql::update(
//!     "users",
//!     columns! { "name" => "O'Brien", "updated_at" => sql::expr("now()") }
//!         .filter(columns! { "id" => 7 }),
//! )?;
//! assert_eq!(q, "update users set name = 'O''Brien', updated_at = now() where id = 7");
//! ```
//!
//! Table and column names are emitted as given.

mod columns;
mod json;
mod value;


pub use columns::{Columns, Conditions, IntoConditions, WHERE_KEY};
pub use value::{Expr, NOT_NIL, NotNil, SqlRange, Value};

use crate::error::{SqlError, SqlResult};

/// Mark a string as literal SQL so it is never quoted.
pub fn expr(sql: impl Into<String>) -> Expr {
    Expr::new(sql)
}

/// The "IS NOT NULL" marker for condition maps.
pub fn not_nil() -> NotNil {
    NOT_NIL
}

/// Format a single value as a SQL literal.
///
/// - `null` for [`Value::Null`]
/// - numbers as canonical decimal text, floats in positional form (`1e20` is
///   `100000000000000000000.0`)
/// - expressions verbatim
/// - strings single-quoted with embedded quotes doubled
///
/// Anything else fails with [`SqlError::UnsupportedType`]. The literal is passed through
/// [`check`], so an expression carrying a statement separator or a comment is rejected here.
pub fn value(v: impl Into<Value>) -> SqlResult<String> {
    let mut out = String::new();
    push_value(&mut out, &v.into())?;
    checked(out)
}

/// Build the body of a WHERE clause (without the `where` keyword).
///
/// Returns `None` when there is nothing to filter on: no conditions, a blank string, or an
/// empty map. An empty list renders as `col in (null)`, which matches no rows.
pub fn where_clause(conds: impl IntoConditions) -> SqlResult<Option<String>> {
    match build_where(conds.into_conditions())? {
        Some(clause) => Ok(Some(checked(clause)?)),
        None => Ok(None),
    }
}

/// `select * from <table> [where ...]`
pub fn select(table: &str, conds: impl IntoConditions) -> SqlResult<String> {
    checked(format!("select * from {table}{}", make_where(conds)?))
}

/// `select count(*) from <table> [where ...]`
pub fn count(table: &str, conds: impl IntoConditions) -> SqlResult<String> {
    checked(format!("select count(*) from {table}{}", make_where(conds)?))
}

/// `delete from <table> [where ...]`
pub fn delete(table: &str, conds: impl IntoConditions) -> SqlResult<String> {
    checked(format!("delete from {table}{}", make_where(conds)?))
}

/// `update <table> set <col> = <value>, ... [where ...]`
///
/// The conditions attached with [`Columns::filter`] become the WHERE clause.
pub fn update(table: &str, mut data: Columns) -> SqlResult<String> {
    let where_sql = make_where(data.take_filter())?;

    let mut sql = format!("update {table} set ");
    for (i, (column, v)) in data.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(column);
        sql.push_str(" = ");
        push_value(&mut sql, v)?;
    }
    sql.push_str(&where_sql);
    checked(sql)
}

/// `insert into <table> (<cols>) values (<values>)`
pub fn insert(table: &str, data: &Columns) -> SqlResult<String> {
    insert_with("insert", table, data)
}

/// `insert ignore into ...` (non-standard syntax)
pub fn insert_ignore(table: &str, data: &Columns) -> SqlResult<String> {
    insert_with("insert ignore", table, data)
}

/// `replace into ...` (non-standard syntax)
pub fn replace(table: &str, data: &Columns) -> SqlResult<String> {
    insert_with("replace", table, data)
}

/// Reject SQL that looks like it carries more than one statement, a comment, or an
/// unterminated literal.
///
/// Quoted spans (`'...'`, `` `...` ``, `"..."`) are stripped from a scratch copy first, so
/// semicolons and comment markers inside closed literals are fine. On success the original
/// text is returned unchanged.
///
/// This is a naive last line of defense against obviously malformed input, not a SQL parser.
pub fn check(sql: &str) -> SqlResult<&str> {
    let stripped = strip_quoted(&strip_quoted(&strip_quoted(sql, '\''), '`'), '"');

    let rejection = if stripped.contains(';') {
        Some(SqlError::InjectionRisk(format!(
            "expression cannot contain semicolons: {stripped}"
        )))
    } else if ["--", "/*", "*/"].iter().any(|m| stripped.contains(m)) {
        Some(SqlError::InjectionRisk(format!(
            "expression cannot contain comments: {stripped}"
        )))
    } else if stripped.contains(['\'', '"', '`']) {
        Some(SqlError::UnterminatedLiteral(stripped))
    } else {
        None
    };

    match rejection {
        Some(err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "sqlhelper.sql", sql, error = %err, "rejected SQL");
            Err(err)
        }
        None => Ok(sql),
    }
}

fn checked(sql: String) -> SqlResult<String> {
    check(&sql)?;
    Ok(sql)
}

fn insert_with(verb: &str, table: &str, data: &Columns) -> SqlResult<String> {
    let mut cols = String::new();
    let mut vals = String::new();
    for (i, (column, v)) in data.iter().enumerate() {
        if i > 0 {
            cols.push_str(", ");
            vals.push_str(", ");
        }
        cols.push_str(column);
        push_value(&mut vals, v)?;
    }
    checked(format!("{verb} into {table} ({cols}) values ({vals})"))
}

/// `" where <clause>"`, or an empty string when there are no conditions.
fn make_where(conds: impl IntoConditions) -> SqlResult<String> {
    Ok(build_where(conds.into_conditions())?
        .map(|clause| format!(" where {clause}"))
        .unwrap_or_default())
}

// Unchecked; callers check the final statement.
fn build_where(conds: Option<Conditions>) -> SqlResult<Option<String>> {
    match conds {
        None => Ok(None),
        Some(Conditions::Raw(raw)) => {
            if raw.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(raw))
            }
        }
        Some(Conditions::Map(map)) => {
            if map.is_empty() {
                return Ok(None);
            }
            let mut out = String::new();
            for (i, (column, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(" and ");
                }
                push_condition(&mut out, column, v)?;
            }
            Ok(Some(out))
        }
    }
}

fn push_condition(out: &mut String, column: &str, v: &Value) -> SqlResult<()> {
    out.push_str(column);
    match v {
        Value::Null => out.push_str(" is null"),
        Value::NotNull => out.push_str(" is not null"),
        Value::Range(range) => {
            out.push_str(" >= ");
            push_value(out, &range.start)?;
            out.push_str(" and ");
            out.push_str(column);
            out.push_str(if range.exclusive { " < " } else { " <= " });
            push_value(out, &range.end)?;
        }
        Value::List(items) => {
            // An empty IN list is a syntax error; `in (null)` keeps the column and matches nothing.
            if items.is_empty() {
                out.push_str(" in (null)");
                return Ok(());
            }
            out.push_str(" in (");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_value(out, item)?;
            }
            out.push(')');
        }
        other => {
            out.push_str(" = ");
            push_value(out, other)?;
        }
    }
    Ok(())
}

fn push_value(out: &mut String, v: &Value) -> SqlResult<()> {
    match v {
        Value::Null => out.push_str("null"),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(SqlError::unsupported(format!("non-finite float {f}")));
            }
            // Display is positional and round-trips; keep a fractional part on whole numbers.
            let text = f.to_string();
            out.push_str(&text);
            if !text.contains('.') {
                out.push_str(".0");
            }
        }
        #[cfg(feature = "rust_decimal")]
        Value::Decimal(d) => out.push_str(&d.to_string()),
        Value::Expr(e) => out.push_str(e.as_str()),
        Value::Text(s) => push_quoted(out, s),
        Value::NotNull | Value::Range(_) | Value::List(_) | Value::Unsupported(_) => {
            return Err(SqlError::unsupported(v.kind()));
        }
    }
    Ok(())
}

fn push_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

/// Remove every closed `quote ... quote` span, left to right. An unmatched opening quote and
/// everything after it are kept.
fn strip_quoted(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find(quote) {
        let after = &rest[open + quote.len_utf8()..];
        let Some(close) = after.find(quote) else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &after[close + quote.len_utf8()..];
    }
    out.push_str(rest);
    out
}
