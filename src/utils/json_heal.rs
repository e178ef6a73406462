//! Best-effort recovery of JSON objects from model-emitted argument payloads.
//!
//! Models produce tool-call arguments that are usually JSON but sometimes
//! arrive with trailing commas, unquoted keys, single-quoted strings, raw
//! control characters, or truncated output. `heal_json` repairs what it can
//! and fails closed to an empty object — it never panics and never returns
//! an error past this boundary.

use serde_json::{Map, Value};
use tracing::debug;

/// Parse `raw` as a JSON object, repairing common malformations.
///
/// Returns the parsed object on success, or an empty object when the payload
/// is unrecoverable or parses to something other than an object. Non-JSON
/// prose is never guessed at; it fails closed.
pub fn heal_json(raw: &str) -> Value {
    let trimmed = strip_code_fence(raw.trim());
    if trimmed.is_empty() {
        return Value::Object(Map::new());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return into_object(value);
    }

    let repaired = repair(trimmed);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => into_object(value),
        Err(err) => {
            debug!(error = %err, len = raw.len(), "argument payload unrecoverable, failing closed");
            Value::Object(Map::new())
        }
    }
}

fn into_object(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => {
            debug!(kind = json_kind(&other), "argument payload is not an object, failing closed");
            Value::Object(Map::new())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strip a markdown code fence if the payload arrived wrapped in one.
fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end_matches('`').trim()
}

/// Rewrite `input` into strict JSON where possible.
///
/// Handles: single-quoted strings, unquoted keys and bareword values,
/// trailing commas, raw control characters inside strings, and truncation
/// (unterminated strings, unclosed containers, dangling keys).
fn repair(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut stack: Vec<char> = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => copy_string(c, &mut chars, &mut out),
            '{' => {
                stack.push('}');
                out.push('{');
            }
            '[' => {
                stack.push(']');
                out.push('[');
            }
            '}' | ']' => {
                trim_trailing_comma(&mut out);
                if stack.last() == Some(&c) {
                    stack.pop();
                    out.push(c);
                }
                // Mismatched closer: drop it and let the final parse decide.
            }
            ',' | ':' => out.push(c),
            c if c.is_whitespace() => out.push(' '),
            c if c.is_ascii_digit() || c == '-' => {
                out.push(c);
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_digit() || matches!(n, '.' | 'e' | 'E' | '+' | '-') {
                        out.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                word.push(c);
                while let Some(&n) = chars.peek() {
                    if n.is_alphanumeric() || n == '_' || n == '-' {
                        word.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.as_str() {
                    "true" | "false" | "null" => out.push_str(&word),
                    // Unquoted key or bareword value: quote it.
                    _ => {
                        out.push('"');
                        out.push_str(&word);
                        out.push('"');
                    }
                }
            }
            // Anything else is junk between tokens; drop it.
            _ => {}
        }
    }

    trim_trailing_comma(&mut out);
    if out.trim_end().ends_with(':') {
        out.push_str("null");
    }
    while let Some(closer) = stack.pop() {
        trim_trailing_comma(&mut out);
        if out.trim_end().ends_with(':') {
            out.push_str("null");
        }
        out.push(closer);
    }

    out
}

/// Copy a string literal delimited by `quote`, emitting a strict
/// double-quoted JSON string. Consumes up to (and including) the closing
/// quote, or to end of input for truncated strings.
fn copy_string(
    quote: char,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) {
    out.push('"');
    while let Some(c) = chars.next() {
        if c == quote {
            out.push('"');
            return;
        }
        match c {
            '\\' => match chars.next() {
                Some(esc @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u')) => {
                    out.push('\\');
                    out.push(esc);
                }
                // Invalid escape (e.g. \' inside a single-quoted string):
                // keep the escaped character literally.
                Some('\'') => out.push('\''),
                Some(other) => push_escaped(other, out),
                None => break,
            },
            '"' => out.push_str("\\\""),
            c if (c as u32) < 0x20 => push_escaped(c, out),
            c => out.push(c),
        }
    }
    // Truncated string: close it so the container repair can finish.
    out.push('"');
}

fn push_escaped(c: char, out: &mut String) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => {
            out.push_str(&format!("\\u{:04x}", c as u32));
        }
        c => out.push(c),
    }
}

fn trim_trailing_comma(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if out.ends_with(',') {
        out.pop();
    }
}
