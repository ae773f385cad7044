//! Form interaction state
//!
//! Widget-level value binding for a rendered form: what each control stores
//! when the user types, clicks or picks, and the submission gate of
//! multi-step forms.

use chrono::{DateTime, NaiveDate, Utc};
use pulldown_cmark::{html, Event, Options, Parser};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::model::JsonSchema;
use crate::path::FieldPath;
use crate::plan::{FormMode, RenderPlan, StepCursor};
use crate::rules::{coerce_number, compile_schema, FieldErrors, FieldValue, FormValues, Ruleset};

// ============================================================================
// Display helpers
// ============================================================================

/// Long-form date shown next to a date picker, e.g. `Jan 5, 2024`
pub fn format_date_display(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Render markdown to HTML for the live preview. `None` while the text is
/// empty, so no preview is shown.
///
/// Raw HTML in the source is emitted as escaped text, never as markup.
pub fn markdown_preview(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    Some(out)
}

// ============================================================================
// Tag input
// ============================================================================

/// Keys the tag input reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKey {
    Enter,
    Space,
    Backspace,
    Other,
}

impl TagKey {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Self {
        match key {
            "Enter" => TagKey::Enter,
            " " | "Spacebar" => TagKey::Space,
            "Backspace" => TagKey::Backspace,
            _ => TagKey::Other,
        }
    }
}

/// Draft text plus committed elements of a free-form string list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagInput {
    pub draft: String,
    pub tags: Vec<String>,
}

impl TagInput {
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            draft: String::new(),
            tags,
        }
    }

    /// Apply a key press. Returns true when the key was consumed and the
    /// browser's default action should be suppressed.
    pub fn handle_key(&mut self, key: TagKey) -> bool {
        match key {
            TagKey::Enter | TagKey::Space => {
                self.commit();
                true
            }
            TagKey::Backspace if self.draft.is_empty() => {
                self.tags.pop();
                true
            }
            _ => false,
        }
    }

    /// Commit the trimmed draft. Blank drafts and duplicates are dropped; the
    /// draft is cleared either way.
    pub fn commit(&mut self) {
        let candidate = self.draft.trim();
        if !candidate.is_empty() && !self.tags.iter().any(|t| t == candidate) {
            self.tags.push(candidate.to_string());
        }
        self.draft.clear();
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.tags.len() {
            self.tags.remove(index);
        }
    }
}

// ============================================================================
// Form state
// ============================================================================

/// Values collected so far plus per-field drafts of tag inputs. Kept across
/// step changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    values: FormValues,
    drafts: BTreeMap<FieldPath, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, path: &FieldPath) -> Option<&FieldValue> {
        self.values.get(path)
    }

    pub fn text(&self, path: &FieldPath) -> &str {
        self.values.get(path).and_then(FieldValue::as_text).unwrap_or_default()
    }

    pub fn set_text(&mut self, path: &FieldPath, text: impl Into<String>) {
        self.values.set(path, FieldValue::Text(text.into()));
    }

    /// Bind a number box. Empty or unparseable input stores `0`.
    pub fn set_number_input(&mut self, path: &FieldPath, raw: &str) -> f64 {
        let number = coerce_number(raw);
        self.values.set(path, FieldValue::Number(number));
        number
    }

    pub fn set_bool(&mut self, path: &FieldPath, on: bool) {
        self.values.set(path, FieldValue::Bool(on));
    }

    pub fn pick_date(&mut self, path: &FieldPath, date: NaiveDate) {
        self.values.set(path, FieldValue::Date(date));
    }

    pub fn pick_date_time(&mut self, path: &FieldPath, at: DateTime<Utc>) {
        self.values.set(path, FieldValue::DateTime(at));
    }

    /// Remove a value so the field counts as absent
    pub fn clear(&mut self, path: &FieldPath) {
        self.values.remove(path);
    }

    /// Selected options of a checkbox list, or elements of a tag input
    pub fn list(&self, path: &FieldPath) -> &[String] {
        self.values.get(path).and_then(FieldValue::as_list).unwrap_or_default()
    }

    /// Checkbox list binding: checking appends when absent, unchecking
    /// filters the option out.
    pub fn toggle_option(&mut self, path: &FieldPath, option: &str, checked: bool) {
        let mut selected = self.list(path).to_vec();
        if checked {
            if !selected.iter().any(|s| s == option) {
                selected.push(option.to_string());
            }
        } else {
            selected.retain(|s| s != option);
        }
        self.values.set(path, FieldValue::List(selected));
    }

    pub fn draft(&self, path: &FieldPath) -> &str {
        self.drafts.get(path).map(String::as_str).unwrap_or_default()
    }

    pub fn set_draft(&mut self, path: &FieldPath, draft: impl Into<String>) {
        self.drafts.insert(path.clone(), draft.into());
    }

    /// Route a key press to the tag input at `path`
    pub fn tag_key(&mut self, path: &FieldPath, key: TagKey) -> bool {
        let mut input = TagInput {
            draft: self.draft(path).to_string(),
            tags: self.list(path).to_vec(),
        };
        let consumed = input.handle_key(key);
        self.drafts.insert(path.clone(), input.draft);
        if consumed {
            self.values.set(path, FieldValue::List(input.tags));
        }
        consumed
    }

    pub fn remove_tag(&mut self, path: &FieldPath, index: usize) {
        let mut input = TagInput::new(self.list(path).to_vec());
        input.remove(index);
        self.values.set(path, FieldValue::List(input.tags));
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Form can only be submitted from the final step")]
    NotOnFinalStep,

    #[error(transparent)]
    Invalid(#[from] FieldErrors),
}

/// One rendered form: its plan, compiled ruleset, collected values and step
/// position
#[derive(Clone, Debug)]
pub struct FormSession {
    pub plan: RenderPlan,
    pub ruleset: Ruleset,
    pub state: FormState,
    cursor: StepCursor,
}

impl FormSession {
    pub fn new(schema: &JsonSchema, mode: FormMode) -> Self {
        let plan = RenderPlan::generate(schema, mode);
        let cursor = StepCursor::new(plan.step_count());
        Self {
            ruleset: compile_schema(schema),
            plan,
            state: FormState::new(),
            cursor,
        }
    }

    pub fn cursor(&self) -> StepCursor {
        self.cursor
    }

    pub fn next_step(&mut self) -> bool {
        self.cursor.next()
    }

    pub fn previous_step(&mut self) -> bool {
        self.cursor.previous()
    }

    pub fn can_submit(&self) -> bool {
        !self.plan.is_multi_step() || self.cursor.is_last()
    }

    /// Validate everything collected so far against the compiled ruleset
    pub fn submit(&self) -> Result<FormValues, SubmitError> {
        if !self.can_submit() {
            return Err(SubmitError::NotOnFinalStep);
        }
        let accepted = self.ruleset.validate(self.state.values())?;
        debug!(title = %self.plan.title, fields = accepted.len(), "form submitted");
        Ok(accepted)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Format, PropertyGroup, SchemaProperty};
    use crate::rules::MSG_REQUIRED;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s)
    }

    #[test]
    fn test_date_display() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date_display(date), "Jan 5, 2024");
    }

    #[test]
    fn test_markdown_preview_hidden_when_empty() {
        assert_eq!(markdown_preview(""), None);
        let html = markdown_preview("**bold**").unwrap();
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_markdown_preview_escapes_raw_html() {
        let html = markdown_preview("<img src=x onerror=alert(1)>").unwrap();
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));

        let html = markdown_preview("hi <b>there</b> <script>x()</script>").unwrap();
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<script"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_number_input_coerces_to_zero() {
        let mut state = FormState::new();
        assert_eq!(state.set_number_input(&path("price"), "12.5"), 12.5);
        assert_eq!(state.set_number_input(&path("price"), ""), 0.0);
        assert_eq!(state.set_number_input(&path("price"), "abc"), 0.0);
        assert_eq!(state.value(&path("price")), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn test_checkbox_list_toggle() {
        let mut state = FormState::new();
        let color = path("color");
        state.toggle_option(&color, "red", true);
        state.toggle_option(&color, "green", true);
        state.toggle_option(&color, "green", true);
        assert_eq!(state.list(&color), ["red", "green"]);

        state.toggle_option(&color, "red", false);
        assert_eq!(state.list(&color), ["green"]);
    }

    #[test]
    fn test_tag_input_commits_trimmed_and_skips_duplicates() {
        let mut input = TagInput::default();
        input.draft = "  rust ".to_string();
        assert!(input.handle_key(TagKey::Enter));
        assert_eq!(input.tags, vec!["rust"]);
        assert!(input.draft.is_empty());

        input.draft = "rust".to_string();
        input.handle_key(TagKey::Space);
        assert_eq!(input.tags, vec!["rust"]);
        assert!(input.draft.is_empty());

        input.draft = "   ".to_string();
        input.handle_key(TagKey::Enter);
        assert_eq!(input.tags, vec!["rust"]);
    }

    #[test]
    fn test_tag_input_backspace() {
        let mut input = TagInput::new(vec!["a".to_string(), "b".to_string()]);
        input.draft = "x".to_string();
        assert!(!input.handle_key(TagKey::Backspace));
        assert_eq!(input.tags.len(), 2);

        input.draft.clear();
        assert!(input.handle_key(TagKey::Backspace));
        assert_eq!(input.tags, vec!["a"]);
        assert!(!input.handle_key(TagKey::from_key("a")));
    }

    #[test]
    fn test_tag_key_through_state() {
        let mut state = FormState::new();
        let tags = path("tags");
        state.set_draft(&tags, "one");
        state.tag_key(&tags, TagKey::Enter);
        state.set_draft(&tags, "two");
        state.tag_key(&tags, TagKey::from_key(" "));
        assert_eq!(state.list(&tags), ["one", "two"]);
        assert_eq!(state.draft(&tags), "");

        state.remove_tag(&tags, 0);
        assert_eq!(state.list(&tags), ["two"]);
    }

    fn seven_field_schema() -> JsonSchema {
        JsonSchema::new("Seven").with_group(PropertyGroup::new(
            (1..=7).map(|i| (format!("f{i}"), SchemaProperty::string())).collect(),
            vec!["f1".to_string()],
        ))
    }

    #[test]
    fn test_submit_only_from_final_step() {
        let mut session = FormSession::new(&seven_field_schema(), FormMode::MultiStep);
        session.state.set_text(&path("f1"), "kept");

        assert!(matches!(session.submit(), Err(SubmitError::NotOnFinalStep)));
        session.next_step();
        session.next_step();
        assert!(session.cursor().is_last());

        let accepted = session.submit().unwrap();
        assert_eq!(accepted.get(&path("f1")), Some(&FieldValue::Text("kept".to_string())));
    }

    #[test]
    fn test_values_survive_step_changes() {
        let mut session = FormSession::new(&seven_field_schema(), FormMode::MultiStep);
        session.state.set_text(&path("f2"), "value");
        session.next_step();
        session.previous_step();
        assert_eq!(session.state.text(&path("f2")), "value");
    }

    #[test]
    fn test_submit_reports_field_errors() {
        let session = FormSession::new(&seven_field_schema(), FormMode::Single);
        let Err(SubmitError::Invalid(errors)) = session.submit() else {
            panic!("missing required field should fail");
        };
        assert_eq!(errors.get("f1"), Some(MSG_REQUIRED));
    }

    #[test]
    fn test_optional_date_picked_later() {
        let schema = JsonSchema::new("Event").with_group(PropertyGroup::new(
            [("when", SchemaProperty::string().with_format(Format::Date))]
                .into_iter()
                .collect(),
            vec![],
        ));
        let mut session = FormSession::new(&schema, FormMode::Single);
        assert!(session.submit().is_ok());

        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        session.state.pick_date(&path("when"), date);
        let accepted = session.submit().unwrap();
        assert_eq!(accepted.get(&path("when")), Some(&FieldValue::Date(date)));

        session.state.clear(&path("when"));
        assert!(session.submit().is_ok());
    }

    #[test]
    fn test_empty_schema_submits_immediately() {
        let session = FormSession::new(&JsonSchema::new("Empty"), FormMode::MultiStep);
        assert!(session.can_submit());
        assert!(session.submit().unwrap().is_empty());
    }
}
