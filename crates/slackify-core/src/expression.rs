//! Template expressions in parameter values.
//!
//! Parameter values may embed `{{ ... }}` expressions that are evaluated
//! against the item being processed:
//!
//! | Expression | Value |
//! |------------|-------|
//! | `$json` | the whole record |
//! | `$json.a.b`, `$json["a b"]`, `$json.list[0]` | a nested field |
//! | `$itemIndex` | position of the item |
//!
//! A value consisting of exactly one expression evaluates to the referenced
//! JSON value. Otherwise every expression is interpolated into the string:
//! strings are inserted as-is, everything else as compact JSON.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use slackify_types::Record;
use thiserror::Error;

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("expression pattern is valid"));

/// Data visible to an expression.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionContext<'a> {
    pub json: &'a Record,
    pub item_index: usize,
}

/// An expression that could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ExpressionError {
    /// The offending expression, braces included.
    pub expression: String,
    pub reason: String,
}

impl ExpressionError {
    fn new(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Whether `template` contains anything that needs evaluation.
pub fn is_template(template: &str) -> bool {
    template.contains("{{")
}

/// Evaluate all expressions in `template` against `ctx`.
pub fn render(template: &str, ctx: &ExpressionContext<'_>) -> Result<Value, ExpressionError> {
    if !is_template(template) {
        return Ok(Value::String(template.to_owned()));
    }

    let trimmed = template.trim();
    let matches: Vec<_> = EXPRESSION.captures_iter(template).collect();
    if let [only] = matches.as_slice()
        && let (Some(whole), Some(inner)) = (only.get(0), only.get(1))
        && whole.as_str() == trimmed
    {
        return evaluate(inner.as_str(), whole.as_str(), ctx);
    }

    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for caps in &matches {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let literal = &template[last..whole.start()];
        check_literal(literal)?;
        rendered.push_str(literal);
        match evaluate(inner.as_str(), whole.as_str(), ctx)? {
            Value::String(text) => rendered.push_str(&text),
            other => rendered.push_str(&other.to_string()),
        }
        last = whole.end();
    }
    let tail = &template[last..];
    check_literal(tail)?;
    rendered.push_str(tail);
    Ok(Value::String(rendered))
}

fn check_literal(literal: &str) -> Result<(), ExpressionError> {
    match literal.find("{{") {
        Some(start) => Err(ExpressionError::new(
            &literal[start..],
            "unterminated expression, missing '}}'",
        )),
        None => Ok(()),
    }
}

fn evaluate(
    inner: &str,
    source: &str,
    ctx: &ExpressionContext<'_>,
) -> Result<Value, ExpressionError> {
    let expression = inner.trim();
    if expression == "$itemIndex" {
        return Ok(Value::from(ctx.item_index));
    }
    let Some(path) = expression.strip_prefix("$json") else {
        return Err(ExpressionError::new(
            source,
            format!("unsupported expression '{expression}'"),
        ));
    };

    let segments = parse_path(path).map_err(|reason| ExpressionError::new(source, reason))?;
    let mut segments = segments.into_iter();
    let Some(first) = segments.next() else {
        return Ok(Value::Object(ctx.json.clone()));
    };

    let mut current = match &first {
        Segment::Key(key) => ctx.json.get(key),
        Segment::Index(_) => None,
    }
    .ok_or_else(|| ExpressionError::new(source, not_found(&first)))?;

    for segment in segments {
        current = match (&segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        }
        .ok_or_else(|| ExpressionError::new(source, not_found(&segment)))?;
    }
    Ok(current.clone())
}

fn not_found(segment: &Segment) -> String {
    match segment {
        Segment::Key(key) => format!("field '{key}' not found"),
        Segment::Index(index) => format!("index {index} not found"),
    }
}

fn parse_path(path: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .unwrap_or(after.len());
            if end == 0 {
                return Err("expected a field name after '.'".into());
            }
            segments.push(Segment::Key(after[..end].to_owned()));
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').ok_or("missing ']'")?;
            let inner = after[..close].trim();
            let segment = match unquote(inner) {
                Some(key) => Segment::Key(key.to_owned()),
                None => inner
                    .parse::<usize>()
                    .map(Segment::Index)
                    .map_err(|_| format!("invalid index '{inner}'"))?,
            };
            segments.push(segment);
            rest = &after[close + 1..];
        } else {
            return Err(format!("unexpected '{rest}'"));
        }
    }
    Ok(segments)
}

fn unquote(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        text.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record() -> Record {
        json!({
            "text": "**hi**",
            "count": 3,
            "nested": { "inner": "deep", "list": ["a", "b"] },
            "with space": "spaced",
            "nothing": null
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn render_with(template: &str) -> Result<Value, ExpressionError> {
        let json = record();
        let ctx = ExpressionContext {
            json: &json,
            item_index: 5,
        };
        render(template, &ctx)
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render_with("just text").unwrap(), json!("just text"));
        assert_eq!(render_with("").unwrap(), json!(""));
    }

    #[test]
    fn single_expression_keeps_type() {
        assert_eq!(render_with("{{ $json.text }}").unwrap(), json!("**hi**"));
        assert_eq!(render_with("{{$json.count}}").unwrap(), json!(3));
        assert_eq!(render_with("  {{ $json.nothing }} ").unwrap(), Value::Null);
        assert_eq!(render_with("{{ $itemIndex }}").unwrap(), json!(5));
    }

    #[test]
    fn nested_paths() {
        assert_eq!(render_with("{{ $json.nested.inner }}").unwrap(), json!("deep"));
        assert_eq!(render_with("{{ $json.nested.list[1] }}").unwrap(), json!("b"));
        assert_eq!(render_with(r#"{{ $json["with space"] }}"#).unwrap(), json!("spaced"));
        assert_eq!(render_with("{{ $json['nested']['inner'] }}").unwrap(), json!("deep"));
    }

    #[test]
    fn whole_record() {
        let value = render_with("{{ $json }}").unwrap();
        assert_eq!(value["count"], 3);
    }

    #[test]
    fn interpolation_stringifies() {
        assert_eq!(
            render_with("# {{ $json.text }} x{{ $json.count }} #{{ $itemIndex }}").unwrap(),
            json!("# **hi** x3 #5")
        );
        assert_eq!(
            render_with("list: {{ $json.nested.list }}").unwrap(),
            json!(r#"list: ["a","b"]"#)
        );
    }

    #[test]
    fn missing_field_is_error() {
        let err = render_with("{{ $json.absent }}").unwrap_err();
        assert_eq!(err.reason, "field 'absent' not found");
        assert_eq!(err.expression, "{{ $json.absent }}");
    }

    #[test]
    fn index_out_of_range_is_error() {
        let err = render_with("{{ $json.nested.list[9] }}").unwrap_err();
        assert_eq!(err.reason, "index 9 not found");
    }

    #[test]
    fn indexing_a_string_is_error() {
        assert!(render_with("{{ $json.text[0] }}").is_err());
        assert!(render_with("{{ $json.text.inner }}").is_err());
    }

    #[test]
    fn unsupported_expression() {
        let err = render_with("{{ 1 + 1 }}").unwrap_err();
        assert!(err.reason.contains("unsupported expression"));
    }

    #[test]
    fn malformed_paths() {
        assert!(render_with("{{ $json. }}").is_err());
        assert!(render_with("{{ $json[0 }}").is_err());
        assert!(render_with("{{ $json[abc] }}").is_err());
        assert!(render_with("{{ $jsonx }}").is_err());
    }

    #[test]
    fn unterminated_expression() {
        let err = render_with("hello {{ $json.text").unwrap_err();
        assert!(err.reason.contains("unterminated"));
        assert_eq!(err.expression, "{{ $json.text");

        let err = render_with("{{ $json.text }} and {{ more").unwrap_err();
        assert_eq!(err.expression, "{{ more");
    }

    #[test]
    fn detects_templates() {
        assert!(is_template("{{ $json.a }}"));
        assert!(!is_template("plain"));
    }
}
