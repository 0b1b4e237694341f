//! JS literal rendering for patched declarations
//!
//! Values come from the typed snapshot model (via serde) and are written
//! back in the shape hand-written templates use: bare keys where the key
//! is a valid identifier, double-quoted strings, two-space indentation.

use serde_json::Value;

const INDENT: &str = "  ";

/// Multi-line literal. Continuation lines are prefixed with `base_indent`
/// so the literal lines up with the declaration it replaces.
pub fn to_js_literal(value: &Value, base_indent: &str) -> String {
    let mut out = String::new();
    write_value(value, base_indent, 0, &mut out);
    out
}

/// Single-line literal, e.g. `{ color: "#fff", fontSize: "16px" }`
pub fn to_inline_literal(value: &Value) -> String {
    match value {
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => format!(
            "[{}]",
            items
                .iter()
                .map(to_inline_literal)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Value::Object(fields) if fields.is_empty() => "{}".to_string(),
        Value::Object(fields) => format!(
            "{{ {} }}",
            fields
                .iter()
                .map(|(key, value)| format!("{}: {}", js_key(key), to_inline_literal(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        scalar => scalar_literal(scalar),
    }
}

fn write_value(value: &Value, base: &str, depth: usize, out: &mut String) {
    match value {
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, base, depth + 1);
                write_value(item, base, depth + 1, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, base, depth);
            out.push(']');
        }
        Value::Object(fields) => {
            out.push_str("{\n");
            for (i, (key, field)) in fields.iter().enumerate() {
                push_indent(out, base, depth + 1);
                out.push_str(&js_key(key));
                out.push_str(": ");
                write_value(field, base, depth + 1, out);
                if i + 1 < fields.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, base, depth);
            out.push('}');
        }
        scalar => out.push_str(&scalar_literal(scalar)),
    }
}

fn push_indent(out: &mut String, base: &str, depth: usize) {
    out.push_str(base);
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn scalar_literal(value: &Value) -> String {
    // JSON scalars are valid JS expressions
    value.to_string()
}

/// Object key, quoted unless it is a plain identifier
pub fn js_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
