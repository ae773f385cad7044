//! Schema data model
//!
//! The typed tree every other module operates on. A [`JsonSchema`] document owns
//! an ordered [`PropertyMap`] of [`SchemaProperty`] nodes; each node carries a
//! [`PropertyKind`] holding only the attributes meaningful for its type.
//!
//! On the wire a property is the flat JSON Schema shape
//! (`type`, `description`, `format`, `enum`, `multiple`, `items`,
//! `properties`, `required`). Attributes that make no sense for the type are
//! never emitted.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Type tags
// ============================================================================

/// The closed set of property types the editor can produce
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::String,
        PropertyType::Number,
        PropertyType::Boolean,
        PropertyType::Array,
        PropertyType::Object,
    ];

    /// Wire spelling of the type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Array => "array",
            PropertyType::Object => "object",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            PropertyType::String => "Text",
            PropertyType::Number => "Number",
            PropertyType::Boolean => "Yes / No",
            PropertyType::Array => "List",
            PropertyType::Object => "Group",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refinement tag for string and number properties
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Date,
    DateTime,
    Time,
    Email,
    Uri,
    Uuid,
    Markdown,
    Textarea,
}

impl Format {
    pub const ALL: [Format; 8] = [
        Format::Date,
        Format::DateTime,
        Format::Time,
        Format::Email,
        Format::Uri,
        Format::Uuid,
        Format::Markdown,
        Format::Textarea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Time => "time",
            Format::Email => "email",
            Format::Uri => "uri",
            Format::Uuid => "uuid",
            Format::Markdown => "markdown",
            Format::Textarea => "textarea",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// True for the formats rendered with a date picker
    pub fn is_date(&self) -> bool {
        matches!(self, Format::Date | Format::DateTime)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Property nodes
// ============================================================================

/// Closed list of allowed values for a string property
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Choices {
    pub options: Vec<String>,
    /// Accept a set of values instead of one
    pub multiple: bool,
}

/// Element type of an array property. Display only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsDescriptor {
    #[serde(rename = "type")]
    pub item_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
}

/// The properties of one nesting level together with the names that are
/// mandatory at that level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyGroup {
    pub properties: PropertyMap,
    pub required: Vec<String>,
}

impl PropertyGroup {
    pub fn new(properties: PropertyMap, required: Vec<String>) -> Self {
        Self { properties, required }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Type-specific part of a property definition
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKind {
    String {
        format: Option<Format>,
        choices: Option<Choices>,
    },
    Number {
        format: Option<Format>,
    },
    Boolean,
    Array {
        items: Option<ItemsDescriptor>,
    },
    Object(PropertyGroup),
    /// A type tag outside the supported set, read from a document authored
    /// elsewhere. The editor never produces it.
    Other { type_name: String },
}

/// One field definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProperty", into = "RawProperty")]
pub struct SchemaProperty {
    pub description: Option<String>,
    pub kind: PropertyKind,
}

impl Default for SchemaProperty {
    /// A fresh string field with an empty description
    fn default() -> Self {
        Self {
            description: Some(String::new()),
            kind: PropertyKind::String {
                format: None,
                choices: None,
            },
        }
    }
}

impl SchemaProperty {
    /// Create an empty property of the given type
    pub fn new(property_type: PropertyType) -> Self {
        let kind = match property_type {
            PropertyType::String => PropertyKind::String {
                format: None,
                choices: None,
            },
            PropertyType::Number => PropertyKind::Number { format: None },
            PropertyType::Boolean => PropertyKind::Boolean,
            PropertyType::Array => PropertyKind::Array { items: None },
            PropertyType::Object => PropertyKind::Object(PropertyGroup::default()),
        };
        Self {
            description: None,
            kind,
        }
    }

    pub fn string() -> Self {
        Self::new(PropertyType::String)
    }

    pub fn number() -> Self {
        Self::new(PropertyType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(PropertyType::Boolean)
    }

    pub fn array(items: Option<ItemsDescriptor>) -> Self {
        Self {
            description: None,
            kind: PropertyKind::Array { items },
        }
    }

    pub fn object(group: PropertyGroup) -> Self {
        Self {
            description: None,
            kind: PropertyKind::Object(group),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the format. Ignored for types other than string and number.
    pub fn with_format(mut self, format: Format) -> Self {
        self.set_format(Some(format));
        self
    }

    /// Turn a string property into a closed choice. Ignored for other types.
    pub fn with_choices<I, S>(mut self, options: I, multiple: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let PropertyKind::String { choices, .. } = &mut self.kind {
            *choices = Some(Choices {
                options: options.into_iter().map(Into::into).collect(),
                multiple,
            });
        }
        self
    }

    /// The type tag, or `None` for an unrecognized one
    pub fn property_type(&self) -> Option<PropertyType> {
        match &self.kind {
            PropertyKind::String { .. } => Some(PropertyType::String),
            PropertyKind::Number { .. } => Some(PropertyType::Number),
            PropertyKind::Boolean => Some(PropertyType::Boolean),
            PropertyKind::Array { .. } => Some(PropertyType::Array),
            PropertyKind::Object(_) => Some(PropertyType::Object),
            PropertyKind::Other { .. } => None,
        }
    }

    /// Wire spelling of the type tag, including unrecognized ones
    pub fn type_name(&self) -> &str {
        match &self.kind {
            PropertyKind::Other { type_name } => type_name,
            _ => self.property_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn format(&self) -> Option<Format> {
        match &self.kind {
            PropertyKind::String { format, .. } | PropertyKind::Number { format } => *format,
            _ => None,
        }
    }

    pub fn set_format(&mut self, new_format: Option<Format>) {
        match &mut self.kind {
            PropertyKind::String { format, .. } | PropertyKind::Number { format } => {
                *format = new_format;
            }
            _ => {}
        }
    }

    pub fn choices(&self) -> Option<&Choices> {
        match &self.kind {
            PropertyKind::String { choices, .. } => choices.as_ref(),
            _ => None,
        }
    }

    pub fn choices_mut(&mut self) -> Option<&mut Option<Choices>> {
        match &mut self.kind {
            PropertyKind::String { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// Nested group for object properties
    pub fn group(&self) -> Option<&PropertyGroup> {
        match &self.kind {
            PropertyKind::Object(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, PropertyKind::Object(_))
    }

    /// A copy of this property switched to another type.
    ///
    /// The description always survives; the format survives when both the
    /// old and the new type accept one. Everything else is reset, so an
    /// object switched away loses its nested properties.
    pub fn retyped(&self, property_type: PropertyType) -> Self {
        if self.property_type() == Some(property_type) {
            return self.clone();
        }
        let mut next = Self::new(property_type);
        next.description = self.description.clone();
        next.set_format(self.format());
        next
    }
}

/// Flat wire shape of a property
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct RawProperty {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<Format>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<ItemsDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<Vec<String>>,
}

impl From<RawProperty> for SchemaProperty {
    fn from(raw: RawProperty) -> Self {
        let kind = match PropertyType::parse(&raw.type_name) {
            Some(PropertyType::String) => PropertyKind::String {
                format: raw.format,
                choices: raw.enum_values.map(|options| Choices {
                    options,
                    multiple: raw.multiple.unwrap_or(false),
                }),
            },
            Some(PropertyType::Number) => PropertyKind::Number { format: raw.format },
            Some(PropertyType::Boolean) => PropertyKind::Boolean,
            Some(PropertyType::Array) => PropertyKind::Array { items: raw.items },
            Some(PropertyType::Object) => PropertyKind::Object(PropertyGroup {
                properties: raw.properties.unwrap_or_default(),
                required: raw.required.unwrap_or_default(),
            }),
            None => PropertyKind::Other {
                type_name: raw.type_name,
            },
        };
        Self {
            description: raw.description,
            kind,
        }
    }
}

impl From<SchemaProperty> for RawProperty {
    fn from(property: SchemaProperty) -> Self {
        let mut raw = RawProperty {
            type_name: property.type_name().to_string(),
            description: property.description,
            ..Default::default()
        };
        match property.kind {
            PropertyKind::String { format, choices } => {
                raw.format = format;
                if let Some(choices) = choices {
                    raw.enum_values = Some(choices.options);
                    raw.multiple = choices.multiple.then_some(true);
                }
            }
            PropertyKind::Number { format } => raw.format = format,
            PropertyKind::Boolean | PropertyKind::Other { .. } => {}
            PropertyKind::Array { items } => raw.items = items,
            PropertyKind::Object(group) => {
                raw.properties = Some(group.properties);
                raw.required = Some(group.required);
            }
        }
        raw
    }
}

// ============================================================================
// Ordered property mapping
// ============================================================================

/// Ordered mapping of field name to definition.
///
/// Insertion order is display order. Serialized as a JSON object whose key
/// order follows the mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, SchemaProperty)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaProperty> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Index of a name in display order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == name)
    }

    /// Insert or replace. A replaced entry keeps its position; a new one is
    /// appended. Returns the previous definition.
    pub fn insert(&mut self, name: impl Into<String>, property: SchemaProperty) -> Option<SchemaProperty> {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, property)),
            None => {
                self.entries.push((name, property));
                None
            }
        }
    }

    /// Remove an entry, keeping the order of the others
    pub fn remove(&mut self, name: &str) -> Option<SchemaProperty> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaProperty)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, SchemaProperty)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (K, SchemaProperty)>>(iter: T) -> Self {
        let mut map = PropertyMap::new();
        for (name, property) in iter {
            map.insert(name, property);
        }
        map
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, SchemaProperty);
    type IntoIter = std::vec::IntoIter<(String, SchemaProperty)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, property) in &self.entries {
            map.serialize_entry(name, property)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertyMapVisitor;

        impl<'de> Visitor<'de> for PropertyMapVisitor {
            type Value = PropertyMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property name to property definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = PropertyMap::new();
                while let Some((name, property)) = access.next_entry::<String, SchemaProperty>()? {
                    map.insert(name, property);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(PropertyMapVisitor)
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Root type of a schema document. Only `"object"` is accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Object,
}

/// The schema document produced by the editor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub schema_type: DocumentType,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new("")
    }
}

impl JsonSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            schema_type: DocumentType::Object,
            properties: PropertyMap::new(),
            required: Vec::new(),
            additional_properties: false,
        }
    }

    pub fn with_group(mut self, group: PropertyGroup) -> Self {
        self.properties = group.properties;
        self.required = group.required;
        self
    }

    /// Snapshot of the top-level properties and required names
    pub fn group(&self) -> PropertyGroup {
        PropertyGroup::new(self.properties.clone(), self.required.clone())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A persisted, identified schema document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSchema {
    pub id: String,
    pub category: String,
    pub event_type: String,
    pub schema: JsonSchema,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductSchema {
    pub fn title(&self) -> &str {
        &self.schema.title
    }
}

/// Payload submitted by the editor to create or update a record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaRequest {
    pub category: String,
    pub event_type: String,
    pub schema: JsonSchema,
}

/// A schema document that could not be read
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid schema document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Save rejected before reaching the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Category, event type, and title are required")]
    MissingFields { fields: Vec<&'static str> },
}

impl CreateSchemaRequest {
    pub fn new(category: impl Into<String>, event_type: impl Into<String>, schema: JsonSchema) -> Self {
        Self {
            category: category.into(),
            event_type: event_type.into(),
            schema,
        }
    }

    /// Basic non-empty checks. The property tree itself is not inspected.
    pub fn validate(&self) -> Result<(), SaveError> {
        let fields: Vec<&'static str> = [
            ("category", &self.category),
            ("eventType", &self.event_type),
            ("title", &self.schema.title),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(SaveError::MissingFields { fields })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
