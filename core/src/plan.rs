//! Form render-plan generator
//!
//! Decides, per property and recursively, which widget represents a field, and
//! how the top-level fields are grouped into steps for multi-step forms.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Format, ItemsDescriptor, JsonSchema, PropertyGroup, PropertyKind, SchemaProperty};
use crate::path::FieldPath;

/// Descriptions longer than this get a multi-line input
pub const WIDE_DESCRIPTION_THRESHOLD: usize = 50;

/// Top-level fields per step in multi-step mode
pub const STEP_SIZE: usize = 3;

// ============================================================================
// Plan types
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Single,
    MultiStep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Email,
}

/// The interactive control chosen for a field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Text { input: InputKind },
    TextArea,
    /// Editor with a rendered preview below it
    Markdown,
    Number,
    /// Switch with the caption shown inline
    Toggle { caption: String },
    DatePicker { with_time: bool },
    Select { options: Vec<String> },
    CheckboxList { options: Vec<String> },
    /// Free-form list of strings. The item descriptor is display only.
    TagInput { items: Option<ItemsDescriptor> },
    /// Nested object rendered as a titled sub-form
    Section { fields: Vec<FieldPlan> },
}

impl Widget {
    pub fn is_section(&self) -> bool {
        matches!(self, Widget::Section { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPlan {
    pub path: FieldPath,
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(flatten)]
    pub widget: Widget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    /// Names of the top-level fields shown in this step
    pub fields: Vec<String>,
}

/// Everything the form renderer needs to lay out a schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldPlan>,
    /// Present only in multi-step mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
}

// ============================================================================
// Generation
// ============================================================================

impl RenderPlan {
    pub fn generate(schema: &JsonSchema, mode: FormMode) -> Self {
        let fields = plan_group(&FieldPath::root(), &schema.group());
        let steps = match mode {
            FormMode::Single => None,
            FormMode::MultiStep => Some(partition_steps(&fields)),
        };

        debug!(
            title = %schema.title,
            fields = fields.len(),
            steps = steps.as_ref().map(Vec::len),
            "generated render plan"
        );

        Self {
            title: schema.title.clone(),
            description: schema.description.clone(),
            fields,
            steps,
        }
    }

    pub fn is_multi_step(&self) -> bool {
        self.steps.is_some()
    }

    pub fn step_count(&self) -> usize {
        self.steps.as_ref().map_or(0, Vec::len)
    }

    /// Top-level field plans shown at a step. In single mode every field sits
    /// at step 0.
    pub fn step_fields(&self, index: usize) -> Vec<&FieldPlan> {
        match &self.steps {
            None if index == 0 => self.fields.iter().collect(),
            None => Vec::new(),
            Some(steps) => steps
                .get(index)
                .map(|step| {
                    step.fields
                        .iter()
                        .filter_map(|name| self.fields.iter().find(|f| &f.name == name))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn field(&self, path: &FieldPath) -> Option<&FieldPlan> {
        find_field(&self.fields, path)
    }
}

fn find_field<'a>(fields: &'a [FieldPlan], path: &FieldPath) -> Option<&'a FieldPlan> {
    let (head, rest) = path.split_first()?;
    let field = fields.iter().find(|f| f.name == head)?;
    if rest.is_root() {
        return Some(field);
    }
    match &field.widget {
        Widget::Section { fields } => find_field(fields, &rest),
        _ => None,
    }
}

/// Plan every property of one nesting level, in display order
pub fn plan_group(prefix: &FieldPath, group: &PropertyGroup) -> Vec<FieldPlan> {
    group
        .properties
        .iter()
        .map(|(name, property)| plan_field(prefix.push(name), group.is_required(name), property))
        .collect()
}

fn plan_field(path: FieldPath, required: bool, property: &SchemaProperty) -> FieldPlan {
    let name = path.name().unwrap_or_default().to_string();
    let description = property.description();
    let widget = select_widget(&path, &name, property);

    FieldPlan {
        label: name.clone(),
        placeholder: (!description.is_empty()).then(|| description.to_string()),
        name,
        path,
        required,
        widget,
    }
}

/// Widget precedence for a property; first match wins for strings
pub fn select_widget(path: &FieldPath, name: &str, property: &SchemaProperty) -> Widget {
    match &property.kind {
        PropertyKind::String { format, choices } => {
            if let Some(format) = format.filter(Format::is_date) {
                return Widget::DatePicker {
                    with_time: format == Format::DateTime,
                };
            }
            if let Some(choices) = choices.as_ref().filter(|c| !c.options.is_empty()) {
                let options = choices.options.clone();
                return if choices.multiple {
                    Widget::CheckboxList { options }
                } else {
                    Widget::Select { options }
                };
            }
            if *format == Some(Format::Markdown) {
                return Widget::Markdown;
            }
            if *format == Some(Format::Textarea)
                || property.description().chars().count() > WIDE_DESCRIPTION_THRESHOLD
            {
                return Widget::TextArea;
            }
            let input = if *format == Some(Format::Email) {
                InputKind::Email
            } else {
                InputKind::Text
            };
            Widget::Text { input }
        }
        PropertyKind::Number { .. } => Widget::Number,
        PropertyKind::Boolean => {
            let caption = match property.description() {
                "" => name.to_string(),
                description => description.to_string(),
            };
            Widget::Toggle { caption }
        }
        PropertyKind::Array { items } => Widget::TagInput {
            items: items.clone(),
        },
        PropertyKind::Object(group) => Widget::Section {
            fields: plan_group(path, group),
        },
        PropertyKind::Other { .. } => Widget::Text {
            input: InputKind::Text,
        },
    }
}

/// Chunk top-level fields into steps of [`STEP_SIZE`] in original order
pub fn partition_steps(fields: &[FieldPlan]) -> Vec<Step> {
    fields
        .chunks(STEP_SIZE)
        .enumerate()
        .map(|(index, chunk)| Step {
            index,
            fields: chunk.iter().map(|f| f.name.clone()).collect(),
        })
        .collect()
}

// ============================================================================
// Step navigation
// ============================================================================

/// Linear Previous / Next position over a fixed number of steps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCursor {
    current: usize,
    count: usize,
}

impl StepCursor {
    pub fn new(count: usize) -> Self {
        Self { current: 0, count }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// With no steps the form counts as being on its final step
    pub fn is_last(&self) -> bool {
        self.count == 0 || self.current + 1 >= self.count
    }

    /// Advance one step; stays put on the last step
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Go back one step; stays put on the first step
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyType, SchemaProperty};

    fn widget_for(property: SchemaProperty) -> Widget {
        select_widget(&FieldPath::parse("field"), "field", &property)
    }

    #[test]
    fn test_date_beats_enum() {
        let property = SchemaProperty::string()
            .with_format(Format::Date)
            .with_choices(["a"], false);
        assert_eq!(widget_for(property), Widget::DatePicker { with_time: false });

        let property = SchemaProperty::string().with_format(Format::DateTime);
        assert_eq!(widget_for(property), Widget::DatePicker { with_time: true });
    }

    #[test]
    fn test_enum_widgets() {
        let single = SchemaProperty::string().with_choices(["s", "m"], false);
        assert_eq!(
            widget_for(single),
            Widget::Select {
                options: vec!["s".to_string(), "m".to_string()]
            }
        );

        let multi = SchemaProperty::string().with_choices(["red", "green"], true);
        assert!(matches!(widget_for(multi), Widget::CheckboxList { .. }));
    }

    #[test]
    fn test_empty_enum_falls_through() {
        let property = SchemaProperty::string()
            .with_choices(Vec::<String>::new(), true)
            .with_format(Format::Markdown);
        assert_eq!(widget_for(property), Widget::Markdown);
    }

    #[test]
    fn test_enum_beats_markdown() {
        let property = SchemaProperty::string()
            .with_format(Format::Markdown)
            .with_choices(["a"], false);
        assert!(matches!(widget_for(property), Widget::Select { .. }));
    }

    #[test]
    fn test_long_description_widens_input() {
        let at_threshold = SchemaProperty::string().with_description("x".repeat(WIDE_DESCRIPTION_THRESHOLD));
        assert_eq!(
            widget_for(at_threshold),
            Widget::Text {
                input: InputKind::Text
            }
        );

        let over = SchemaProperty::string().with_description("x".repeat(WIDE_DESCRIPTION_THRESHOLD + 1));
        assert_eq!(widget_for(over), Widget::TextArea);

        let textarea = SchemaProperty::string().with_format(Format::Textarea);
        assert_eq!(widget_for(textarea), Widget::TextArea);
    }

    #[test]
    fn test_email_input() {
        let property = SchemaProperty::string().with_format(Format::Email);
        assert_eq!(
            widget_for(property),
            Widget::Text {
                input: InputKind::Email
            }
        );
    }

    #[test]
    fn test_toggle_uses_description_as_caption() {
        let property = SchemaProperty::boolean().with_description("In stock");
        assert_eq!(
            widget_for(property),
            Widget::Toggle {
                caption: "In stock".to_string()
            }
        );
        assert_eq!(
            widget_for(SchemaProperty::boolean()),
            Widget::Toggle {
                caption: "field".to_string()
            }
        );
    }

    #[test]
    fn test_other_types() {
        assert_eq!(widget_for(SchemaProperty::number()), Widget::Number);
        assert!(matches!(
            widget_for(SchemaProperty::new(PropertyType::Array)),
            Widget::TagInput { items: None }
        ));
        let unknown: SchemaProperty = serde_json::from_value(serde_json::json!({"type": "integer"})).unwrap();
        assert_eq!(
            widget_for(unknown),
            Widget::Text {
                input: InputKind::Text
            }
        );
    }

    #[test]
    fn test_nested_section_paths() {
        let address = PropertyGroup::new(
            [("street", SchemaProperty::string().with_description("Street name"))]
                .into_iter()
                .collect(),
            vec!["street".to_string()],
        );
        let schema = JsonSchema::new("Customer").with_group(PropertyGroup::new(
            [("address", SchemaProperty::object(address))].into_iter().collect(),
            vec![],
        ));

        let plan = RenderPlan::generate(&schema, FormMode::Single);
        let address = &plan.fields[0];
        assert!(!address.required);
        let Widget::Section { fields } = &address.widget else {
            panic!("object should plan as a section");
        };
        assert_eq!(fields[0].path.to_string(), "address.street");
        assert!(fields[0].required);
        assert_eq!(fields[0].placeholder.as_deref(), Some("Street name"));

        let street = plan.field(&FieldPath::parse("address.street")).unwrap();
        assert_eq!(street.label, "street");
    }

    #[test]
    fn test_steps_chunk_in_order() {
        let group = PropertyGroup::new(
            (1..=7)
                .map(|i| (format!("f{i}"), SchemaProperty::string()))
                .collect(),
            vec![],
        );
        let schema = JsonSchema::new("Seven").with_group(group);

        let plan = RenderPlan::generate(&schema, FormMode::MultiStep);
        assert_eq!(plan.step_count(), 3);
        let sizes: Vec<usize> = plan.steps.as_ref().unwrap().iter().map(|s| s.fields.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(plan.step_fields(2)[0].name, "f7");
        assert!(plan.step_fields(3).is_empty());
    }

    #[test]
    fn test_single_mode_has_no_steps() {
        let schema = JsonSchema::new("One").with_group(PropertyGroup::new(
            [("a", SchemaProperty::string())].into_iter().collect(),
            vec![],
        ));
        let plan = RenderPlan::generate(&schema, FormMode::Single);
        assert!(!plan.is_multi_step());
        assert_eq!(plan.step_fields(0).len(), 1);
    }

    #[test]
    fn test_zero_fields_zero_steps() {
        let plan = RenderPlan::generate(&JsonSchema::new("Empty"), FormMode::MultiStep);
        assert_eq!(plan.step_count(), 0);
        assert!(StepCursor::new(plan.step_count()).is_last());
    }

    #[test]
    fn test_step_cursor_is_linear() {
        let mut cursor = StepCursor::new(3);
        assert!(cursor.is_first());
        assert!(!cursor.previous());
        assert!(cursor.next());
        assert!(cursor.next());
        assert!(cursor.is_last());
        assert!(!cursor.next());
        assert_eq!(cursor.current(), 2);
        assert!(cursor.previous());
        assert_eq!(cursor.current(), 1);
    }

    #[test]
    fn test_plan_serializes_widget_tag() {
        let schema = JsonSchema::new("T").with_group(PropertyGroup::new(
            [("n", SchemaProperty::number())].into_iter().collect(),
            vec![],
        ));
        let value = serde_json::to_value(RenderPlan::generate(&schema, FormMode::Single)).unwrap();
        assert_eq!(value["fields"][0]["widget"], "number");
        assert_eq!(value["fields"][0]["path"], "n");
    }
}
