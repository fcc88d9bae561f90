//! The DeX printer — the parser's structural inverse.
//!
//! Two layouts over the same traversal:
//!
//! - **Compact** ([`to_string`]): no insignificant whitespace, every string
//!   quoted, `tag{`, `key:value`, `,` between entries.
//! - **Pretty** ([`to_string_pretty`]): `tag { `, two-space indentation per
//!   nesting level, ` : ` around map keys, arrays inline with `, ` between
//!   values. Strings stay bare when they would re-tokenize unchanged and
//!   are quoted otherwise.
//!
//! Escaping is symmetric with the parser's escape set, and numbers print in
//! the shortest form that parses back to the identical bit pattern, so
//! `parse(print(t))` reproduces `t`.
//!
//! ```rust
//! use dex::Table;
//!
//! let table = Table::builder().put("a", 1).put("b", "x y").create();
//! assert_eq!(dex::to_string(&table), r#"{"a":1,"b":"x y"}"#);
//! assert_eq!(dex::to_string_pretty(&table), "{\n  a : 1\n  b : x y\n}");
//! ```

use crate::number::parse_number;
use crate::table::Table;
use crate::value::Value;

/// Prints `table` in the compact layout.
#[must_use]
pub fn to_string(table: &Table) -> String {
    let mut out = String::with_capacity(128);
    compact_table(table, &mut out);
    out
}

/// Prints `table` in the pretty layout.
#[must_use]
pub fn to_string_pretty(table: &Table) -> String {
    let mut out = String::with_capacity(256);
    pretty_table(table, &mut out, 2);
    out
}

fn compact_table(table: &Table, out: &mut String) {
    if table.has_tag() {
        write_key_token(out, table.tag());
    }
    out.push('{');
    let array = table.is_array();
    let mut first = true;
    for (key, value) in table.iter() {
        if !first {
            out.push(',');
        }
        first = false;
        if !array {
            compact_value(key, out);
            out.push(':');
        }
        compact_value(value, out);
    }
    out.push('}');
}

fn compact_value(value: &Value, out: &mut String) {
    match value {
        Value::Str(s) => write_quoted(out, s),
        Value::Num(n) => out.push_str(&format_number(*n)),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Table(t) => compact_table(t, out),
    }
}

/// `level` is the indentation of this table's entries; nested tables indent
/// a further two spaces.
fn pretty_table(table: &Table, out: &mut String, level: usize) {
    if table.has_tag() {
        write_key_token(out, table.tag());
        out.push(' ');
    }
    if table.is_array() {
        out.push_str("{ ");
        let mut first = true;
        for value in table.values() {
            if !first {
                out.push_str(", ");
            }
            first = false;
            pretty_value(value, out, level + 2);
        }
        if table.is_empty() {
            out.push('}');
        } else {
            out.push_str(" }");
        }
    } else {
        out.push_str("{\n");
        for (key, value) in table.iter() {
            out.push_str(&" ".repeat(level));
            pretty_key(key, out, level);
            out.push_str(" : ");
            pretty_value(value, out, level + 2);
            out.push('\n');
        }
        out.push_str(&" ".repeat(level - 2));
        out.push('}');
    }
}

fn pretty_value(value: &Value, out: &mut String, level: usize) {
    match value {
        Value::Str(s) => write_value_token(out, s),
        Value::Num(n) => out.push_str(&format_number(*n)),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Table(t) => pretty_table(t, out, level),
    }
}

fn pretty_key(key: &Value, out: &mut String, level: usize) {
    match key {
        Value::Str(s) => write_key_token(out, s),
        Value::Table(t) => pretty_table(t, out, level),
        other => pretty_value(other, out, level),
    }
}

/// A string value stays bare only when the parser would hand it back
/// unchanged: no structural or escape-worthy characters, no clipped
/// whitespace, and no reading as a number, boolean or flag token.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s != s.trim()
        || s.chars().any(|c| escape_char(c).is_some())
        || s.contains(['{', '}', ':', ','])
        || s == "true"
        || s == "false"
        || s.starts_with('+')
        || s.starts_with('-')
        || parse_number(s).is_some()
}

fn write_value_token(out: &mut String, s: &str) {
    if needs_quotes(s) {
        write_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

/// Keys and tags additionally quote inner whitespace: a bare key token ends
/// at its last word when `:` or `{` follows.
fn write_key_token(out: &mut String, s: &str) {
    if needs_quotes(s) || s.chars().any(char::is_whitespace) {
        write_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match escape_char(c) {
            Some(escaped) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out.push('"');
}

/// The escape set recognized by the parser, in printable form.
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("\\\""),
        '\t' => Some("\\t"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\u{000C}' => Some("\\f"),
        '\u{0008}' => Some("\\b"),
        '\\' => Some("\\\\"),
        _ => None,
    }
}

/// Fixed-locale minimal formatting: integers print with no fractional part,
/// everything else in the shortest decimal form that parses back exactly.
/// The specials print as their literal tokens.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        n.to_string()
    }
}
