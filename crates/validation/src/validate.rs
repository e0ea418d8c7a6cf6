use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{Constraint, FieldError, Location, Payload, Rule, RuleSet};

static EMAIL: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

/// Evaluate every rule in order. Each rule yields at most one error.
///
/// An empty result means the payload passed.
pub fn validate(payload: &Payload, rules: &RuleSet) -> Vec<FieldError> {
    rules
        .iter()
        .filter_map(|rule| check(payload, rule))
        .collect()
}

/// Apply the trim and e-mail normalisation steps declared by `rules` in place.
///
/// Run after [`validate`] succeeds so handlers see the cleaned values.
pub fn sanitize(payload: &mut Payload, rules: &RuleSet) {
    for rule in rules.iter().filter(|r| r.trim || r.normalize_email) {
        let slot = match rule.location {
            Location::Body => payload
                .body
                .as_object_mut()
                .and_then(|o| o.get_mut(rule.field.as_ref())),
            Location::Params => payload.params.get_mut(rule.field.as_ref()),
            Location::Query => payload.query.get_mut(rule.field.as_ref()),
        };
        let Some(Value::String(s)) = slot else {
            continue;
        };
        let mut cleaned = if rule.trim {
            s.trim().to_string()
        } else {
            s.clone()
        };
        if rule.normalize_email {
            cleaned = cleaned.to_lowercase();
        }
        *s = cleaned;
    }
}

fn check(payload: &Payload, rule: &Rule) -> Option<FieldError> {
    let raw = payload
        .get(rule.location, &rule.field)
        .filter(|v| !v.is_null());

    let Some(raw) = raw else {
        if rule.optional {
            return None;
        }
        return Some(error(rule, None));
    };

    let value = effective(raw, rule.trim);

    if !rule.optional && is_blank(&value) {
        return Some(error(rule, Some(value)));
    }

    if satisfies(&rule.constraint, &value) {
        None
    } else {
        Some(error(rule, Some(value)))
    }
}

fn effective(raw: &Value, trim: bool) -> Value {
    match raw {
        Value::String(s) if trim => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

fn satisfies(constraint: &Constraint, value: &Value) -> bool {
    match constraint {
        Constraint::Present => !is_blank(value),
        Constraint::Length { min, max } => text(value).is_some_and(|s| {
            let n = s.chars().count();
            min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m)
        }),
        Constraint::Email => match (value, EMAIL.as_ref()) {
            (Value::String(s), Ok(re)) => re.is_match(s),
            _ => false,
        },
        Constraint::OneOf(allowed) => value
            .as_str()
            .is_some_and(|s| allowed.iter().any(|a| *a == s)),
        Constraint::IntRange { min, max } => integer(value)
            .is_some_and(|n| min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m)),
        Constraint::Boolean => match value {
            Value::Bool(_) => true,
            Value::String(s) => matches!(s.as_str(), "true" | "false" | "1" | "0"),
            Value::Number(n) => matches!(n.as_u64(), Some(0 | 1)),
            _ => false,
        },
        Constraint::Identifier => value
            .as_str()
            .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn error(rule: &Rule, value: Option<Value>) -> FieldError {
    FieldError {
        field: rule.field.to_string(),
        location: rule.location,
        message: rule.message.to_string(),
        value,
    }
}
