//! Validator compiler
//!
//! Turns a schema's properties and required names into a [`Ruleset`] that is
//! applied once, when the rendered form is submitted. Submissions are flat:
//! every field is addressed by its dot-joined [`FieldPath`], nested objects
//! included.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use crate::model::{Format, JsonSchema, PropertyGroup, PropertyKind, SchemaProperty};
use crate::path::FieldPath;

// ============================================================================
// Values
// ============================================================================

/// A value collected by one form widget
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    List(Vec<String>),
    Json(Value),
}

impl FieldValue {
    /// Map a raw JSON value onto the closest widget value. Strings stay text;
    /// arrays made only of strings become lists.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => FieldValue::Json(Value::Number(n)),
            },
            Value::Array(items) if items.iter().all(Value::is_string) => FieldValue::List(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            other => FieldValue::Json(other),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Submitted or coerced form values keyed by dot-joined field path
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormValues {
    values: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldValue> {
        self.values.get(&path.to_string())
    }

    pub fn set(&mut self, path: &FieldPath, value: FieldValue) {
        self.values.insert(path.to_string(), value);
    }

    pub fn remove(&mut self, path: &FieldPath) -> Option<FieldValue> {
        self.values.remove(&path.to_string())
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.values.contains_key(&path.to_string())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rebuild the nested data object handed to the submit handler
    pub fn to_document(&self) -> Value {
        let mut root = Map::new();
        for (key, value) in &self.values {
            let path = FieldPath::parse(key);
            let segments: Vec<&str> = path.segments().collect();
            let Some((leaf, parents)) = segments.split_last() else {
                continue;
            };
            let mut cursor = &mut root;
            for segment in parents {
                let entry = cursor
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                cursor = match entry {
                    Value::Object(map) => map,
                    _ => unreachable!("entry was just made an object"),
                };
            }
            cursor.insert(leaf.to_string(), value.to_json());
        }
        Value::Object(root)
    }
}

impl<P: Into<FieldPath>> FromIterator<(P, FieldValue)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (P, FieldValue)>>(iter: T) -> Self {
        let mut values = FormValues::new();
        for (path, value) in iter {
            values.set(&path.into(), value);
        }
        values
    }
}

/// Per-field messages of a rejected submission
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, path: &FieldPath, message: &str) {
        self.0.insert(path.to_string(), message.to_string());
    }
}

// ============================================================================
// Rules
// ============================================================================

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_INVALID_EMAIL: &str = "Invalid email";
pub const MSG_EXPECTED_DATE: &str = "Expected date";
pub const MSG_EXPECTED_STRING: &str = "Expected string";
pub const MSG_EXPECTED_NUMBER: &str = "Expected number";
pub const MSG_EXPECTED_BOOLEAN: &str = "Expected boolean";
pub const MSG_EXPECTED_STRING_LIST: &str = "Expected array of strings";
pub const MSG_EXPECTED_OBJECT: &str = "Expected object";
pub const MSG_EXPECTED_ARRAY: &str = "Expected array";

/// What a field's value must look like
#[derive(Clone, Debug, PartialEq)]
pub enum RuleKind {
    Email,
    Date,
    StringList,
    Text,
    Numeric,
    Boolean,
    Nested(Ruleset),
    AnyObject,
    AnyList,
    Any,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub kind: RuleKind,
    /// Absence passes
    pub optional: bool,
}

/// Compiled validator for one nesting level
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ruleset {
    rules: Vec<FieldRule>,
}

/// Compile the top level of a schema document
pub fn compile_schema(schema: &JsonSchema) -> Ruleset {
    let ruleset = compile(&schema.group());
    debug!(title = %schema.title, fields = ruleset.rules.len(), "compiled ruleset");
    ruleset
}

/// Compile one level, recursing into nested objects
pub fn compile(group: &PropertyGroup) -> Ruleset {
    let rules = group
        .properties
        .iter()
        .map(|(name, property)| FieldRule {
            name: name.to_string(),
            kind: rule_for(property),
            optional: !group.is_required(name),
        })
        .collect();
    Ruleset { rules }
}

fn rule_for(property: &SchemaProperty) -> RuleKind {
    match &property.kind {
        PropertyKind::String { format, choices } => match (format, choices) {
            (Some(Format::Email), _) => RuleKind::Email,
            (Some(Format::Date | Format::DateTime), _) => RuleKind::Date,
            (_, Some(choices)) if choices.multiple => RuleKind::StringList,
            _ => RuleKind::Text,
        },
        PropertyKind::Number { .. } => RuleKind::Numeric,
        PropertyKind::Boolean => RuleKind::Boolean,
        PropertyKind::Object(group) if group.properties.is_empty() => RuleKind::AnyObject,
        PropertyKind::Object(group) => RuleKind::Nested(compile(group)),
        PropertyKind::Array { .. } => RuleKind::AnyList,
        PropertyKind::Other { .. } => RuleKind::Any,
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Syntactic email check
pub fn is_valid_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && email_regex().is_match(s)
}

impl Ruleset {
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Validate a flat submission.
    ///
    /// Success returns only the paths this ruleset knows about, with string
    /// arrays normalized to lists. Failure carries one message per offending
    /// path.
    pub fn validate(&self, values: &FormValues) -> Result<FormValues, FieldErrors> {
        let mut accepted = FormValues::new();
        let mut errors = FieldErrors::default();
        self.validate_at(&FieldPath::root(), values, &mut accepted, &mut errors);

        if errors.is_empty() {
            debug!(fields = accepted.len(), "submission accepted");
            Ok(accepted)
        } else {
            debug!(errors = errors.len(), "submission rejected");
            Err(errors)
        }
    }

    fn validate_at(
        &self,
        prefix: &FieldPath,
        values: &FormValues,
        accepted: &mut FormValues,
        errors: &mut FieldErrors,
    ) {
        for rule in &self.rules {
            let path = prefix.push(&rule.name);

            // An object with properties is always present as the container
            // of its fields, so its children are checked whether or not
            // anything under it was filled in.
            if let RuleKind::Nested(nested) = &rule.kind {
                if values.contains(&path) {
                    errors.push(&path, MSG_EXPECTED_OBJECT);
                } else {
                    nested.validate_at(&path, values, accepted, errors);
                }
                continue;
            }

            match values.get(&path) {
                None if rule.optional => {}
                None => errors.push(&path, MSG_REQUIRED),
                Some(value) => match check(&rule.kind, value) {
                    Ok(value) => accepted.set(&path, value),
                    Err(message) => errors.push(&path, message),
                },
            }
        }
    }

    /// Field-binding coercion ahead of validation.
    ///
    /// Walks a raw JSON submission (flat dot-joined keys, nested objects, or a
    /// mix) and converts each known field the way its widget would: numeric
    /// text becomes a number with unparseable text coerced to `0`, ISO date
    /// strings become dates. Unknown keys are dropped; `null` counts as absent.
    pub fn coerce_input(&self, raw: &Map<String, Value>) -> FormValues {
        let mut flat = Map::new();
        flatten_into(&FieldPath::root(), raw, &mut flat);

        let mut values = FormValues::new();
        self.coerce_at(&FieldPath::root(), &flat, &mut values);
        values
    }

    fn coerce_at(&self, prefix: &FieldPath, flat: &Map<String, Value>, values: &mut FormValues) {
        for rule in &self.rules {
            let path = prefix.push(&rule.name);
            if let RuleKind::Nested(nested) = &rule.kind {
                nested.coerce_at(&path, flat, values);
                continue;
            }
            let Some(raw) = flat.get(&path.to_string()) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            values.set(&path, coerce(&rule.kind, raw.clone()));
        }
    }
}

/// Spread nested objects into dot-joined keys. Objects at unknown depth are
/// spread as well; the ruleset decides later what it reads.
fn flatten_into(prefix: &FieldPath, raw: &Map<String, Value>, out: &mut Map<String, Value>) {
    for (key, value) in raw {
        let path = prefix.join(key);
        match value {
            Value::Object(inner) if !inner.is_empty() => {
                out.insert(path.to_string(), value.clone());
                flatten_into(&path, inner, out);
            }
            _ => {
                out.insert(path.to_string(), value.clone());
            }
        }
    }
}

/// Number box semantics: anything unparseable is `0`
pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Read a date picker value from its ISO form
pub fn parse_date_value(raw: &str) -> Option<FieldValue> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(FieldValue::Date(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
}

fn coerce(kind: &RuleKind, raw: Value) -> FieldValue {
    match (kind, raw) {
        (RuleKind::Numeric, Value::String(s)) => FieldValue::Number(coerce_number(&s)),
        (RuleKind::Date, Value::String(s)) => {
            parse_date_value(&s).unwrap_or(FieldValue::Text(s))
        }
        (RuleKind::AnyObject | RuleKind::Any, raw) => FieldValue::Json(raw),
        (_, raw) => FieldValue::from_json(raw),
    }
}

fn check(kind: &RuleKind, value: &FieldValue) -> Result<FieldValue, &'static str> {
    match kind {
        RuleKind::Email => match value {
            FieldValue::Text(s) if is_valid_email(s) => Ok(value.clone()),
            FieldValue::Text(_) => Err(MSG_INVALID_EMAIL),
            _ => Err(MSG_EXPECTED_STRING),
        },
        RuleKind::Date => match value {
            FieldValue::Date(_) | FieldValue::DateTime(_) => Ok(value.clone()),
            _ => Err(MSG_EXPECTED_DATE),
        },
        RuleKind::StringList => match value {
            FieldValue::List(_) => Ok(value.clone()),
            FieldValue::Json(Value::Array(items)) if items.iter().all(Value::is_string) => {
                Ok(FieldValue::from_json(Value::Array(items.clone())))
            }
            _ => Err(MSG_EXPECTED_STRING_LIST),
        },
        RuleKind::Text => match value {
            FieldValue::Text(_) => Ok(value.clone()),
            _ => Err(MSG_EXPECTED_STRING),
        },
        RuleKind::Numeric => match value {
            FieldValue::Number(n) if n.is_finite() => Ok(value.clone()),
            _ => Err(MSG_EXPECTED_NUMBER),
        },
        RuleKind::Boolean => match value {
            FieldValue::Bool(_) => Ok(value.clone()),
            _ => Err(MSG_EXPECTED_BOOLEAN),
        },
        RuleKind::AnyObject => match value {
            FieldValue::Json(Value::Object(_)) => Ok(value.clone()),
            _ => Err(MSG_EXPECTED_OBJECT),
        },
        RuleKind::AnyList => match value {
            FieldValue::List(_) | FieldValue::Json(Value::Array(_)) => Ok(value.clone()),
            _ => Err(MSG_EXPECTED_ARRAY),
        },
        RuleKind::Any => Ok(value.clone()),
        // Nested rules are resolved by the caller
        RuleKind::Nested(_) => Err(MSG_EXPECTED_OBJECT),
    }
}

// ============================================================================
// Tests
// ============================================================================
