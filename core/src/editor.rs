//! Property tree editor
//!
//! Every edit is a pure transformation of a [`PropertyGroup`]: the current
//! properties and required names of one nesting level go in, new ones come
//! out. Edits aimed at a nested object descend along a [`FieldPath`], apply at
//! that object's own level, and the parent splices the returned group back
//! into its entry on the way up. Nothing here fails; blank or clashing names
//! are tolerated until save time.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{
    Choices, Format, JsonSchema, PropertyGroup, PropertyKind, PropertyType, SchemaProperty,
};
use crate::path::FieldPath;

/// Prefix of generated property names
pub const DEFAULT_NAME_PREFIX: &str = "property_";

// ============================================================================
// Edit commands
// ============================================================================

/// A single change to one nesting level of the tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Append `property_<n+1>` as a string field
    Add,
    /// Replace a definition wholesale
    Update { name: String, property: SchemaProperty },
    /// Switch a property to another type
    Retype { name: String, property_type: PropertyType },
    Describe { name: String, description: String },
    SetFormat { name: String, format: Option<Format> },
    Remove { name: String },
    ToggleRequired { name: String },
    Rename { from: String, to: String },
    /// Turn a string field into a select with one empty option
    EnableOptions { name: String },
    DisableOptions { name: String },
    AddOption { name: String },
    UpdateOption { name: String, index: usize, value: String },
    RemoveOption { name: String, index: usize },
    SetMultiple { name: String, multiple: bool },
}

// ============================================================================
// Level operations
// ============================================================================

impl PropertyGroup {
    /// Name the next added property gets. Unique only among siblings, and only
    /// as long as nobody renamed a sibling to the same name.
    pub fn next_property_name(&self) -> String {
        format!("{}{}", DEFAULT_NAME_PREFIX, self.properties.len() + 1)
    }

    pub fn add_property(&self) -> Self {
        let mut next = self.clone();
        next.properties
            .insert(self.next_property_name(), SchemaProperty::default());
        next
    }

    /// Replace one entry. Unknown names are ignored.
    pub fn update_property(&self, name: &str, property: SchemaProperty) -> Self {
        if !self.properties.contains_key(name) {
            return self.clone();
        }
        let mut next = self.clone();
        next.properties.insert(name, property);
        next
    }

    pub fn remove_property(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.properties.remove(name);
        next.required.retain(|r| r != name);
        next
    }

    pub fn toggle_required(&self, name: &str) -> Self {
        if !self.properties.contains_key(name) {
            return self.clone();
        }
        let mut next = self.clone();
        if next.is_required(name) {
            next.required.retain(|r| r != name);
        } else {
            next.required.push(name.to_string());
        }
        next
    }

    /// Move an entry to a new key.
    ///
    /// Blank targets, same-name renames and unknown sources change nothing.
    /// The renamed entry goes to the end of the mapping. A target that already
    /// exists is overwritten where it stands.
    pub fn rename_property(&self, from: &str, to: &str) -> Self {
        if to.trim().is_empty() || from == to {
            return self.clone();
        }
        let mut next = self.clone();
        let Some(property) = next.properties.remove(from) else {
            return self.clone();
        };
        next.properties.insert(to, property);

        let mut required = Vec::with_capacity(next.required.len());
        for name in next.required.drain(..) {
            let name = if name == from { to.to_string() } else { name };
            if !required.contains(&name) {
                required.push(name);
            }
        }
        next.required = required;
        next
    }

    /// Apply a property-local change to one named entry
    fn modify_property<F>(&self, name: &str, f: F) -> Self
    where
        F: FnOnce(&SchemaProperty) -> SchemaProperty,
    {
        match self.properties.get(name) {
            Some(property) => {
                let updated = f(property);
                self.update_property(name, updated)
            }
            None => self.clone(),
        }
    }

    /// Apply an edit at this level
    pub fn apply_here(&self, edit: &Edit) -> Self {
        match edit {
            Edit::Add => self.add_property(),
            Edit::Update { name, property } => self.update_property(name, property.clone()),
            Edit::Retype { name, property_type } => {
                self.modify_property(name, |p| p.retyped(*property_type))
            }
            Edit::Describe { name, description } => self.modify_property(name, |p| {
                let mut p = p.clone();
                p.description = Some(description.clone());
                p
            }),
            Edit::SetFormat { name, format } => self.modify_property(name, |p| {
                let mut p = p.clone();
                p.set_format(*format);
                p
            }),
            Edit::Remove { name } => self.remove_property(name),
            Edit::ToggleRequired { name } => self.toggle_required(name),
            Edit::Rename { from, to } => self.rename_property(from, to),
            Edit::EnableOptions { name } => self.modify_property(name, enable_options),
            Edit::DisableOptions { name } => self.modify_property(name, |p| {
                edit_choices(p, |choices| *choices = None)
            }),
            Edit::AddOption { name } => self.modify_property(name, |p| {
                edit_choices(p, |choices| {
                    choices
                        .get_or_insert_with(Choices::default)
                        .options
                        .push(String::new());
                })
            }),
            Edit::UpdateOption { name, index, value } => self.modify_property(name, |p| {
                edit_choices(p, |choices| {
                    if let Some(option) = choices
                        .as_mut()
                        .and_then(|c| c.options.get_mut(*index))
                    {
                        *option = value.clone();
                    }
                })
            }),
            Edit::RemoveOption { name, index } => self.modify_property(name, |p| {
                edit_choices(p, |choices| {
                    if let Some(c) = choices.as_mut() {
                        if *index < c.options.len() {
                            c.options.remove(*index);
                        }
                        if c.options.is_empty() {
                            *choices = None;
                        }
                    }
                })
            }),
            Edit::SetMultiple { name, multiple } => self.modify_property(name, |p| {
                edit_choices(p, |choices| {
                    if let Some(c) = choices.as_mut() {
                        c.multiple = *multiple;
                    }
                })
            }),
        }
    }

    /// Apply an edit to the object found at `path` (root path = this level).
    ///
    /// Each object on the way down is rebuilt with its child's new group;
    /// siblings are untouched. A path through a missing or non-object node
    /// leaves the tree as it was.
    pub fn apply(&self, path: &FieldPath, edit: &Edit) -> Self {
        let Some((head, rest)) = path.split_first() else {
            return self.apply_here(edit);
        };
        let Some(child) = self.properties.get(head) else {
            return self.clone();
        };
        let PropertyKind::Object(group) = &child.kind else {
            return self.clone();
        };

        let spliced = SchemaProperty {
            description: child.description.clone(),
            kind: PropertyKind::Object(group.apply(&rest, edit)),
        };
        self.update_property(head, spliced)
    }

    /// The nested group at `path`, or `None` when the path leaves the tree
    /// or stops at a non-object
    pub fn group_at(&self, path: &FieldPath) -> Option<&PropertyGroup> {
        let Some((head, rest)) = path.split_first() else {
            return Some(self);
        };
        self.properties.get(head)?.group()?.group_at(&rest)
    }

    /// Flattened view of the tree in display order, depth first
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        self.collect_outline(&FieldPath::root(), &mut entries);
        entries
    }

    fn collect_outline(&self, parent: &FieldPath, entries: &mut Vec<OutlineEntry>) {
        for (name, property) in self.properties.iter() {
            let path = parent.push(name);
            entries.push(OutlineEntry {
                depth: parent.depth(),
                path: path.clone(),
                type_name: property.type_name().to_string(),
                required: self.is_required(name),
            });
            if let Some(group) = property.group() {
                group.collect_outline(&path, entries);
            }
        }
    }
}

/// String properties only; anything else passes through unchanged
fn edit_choices<F>(property: &SchemaProperty, f: F) -> SchemaProperty
where
    F: FnOnce(&mut Option<Choices>),
{
    let mut next = property.clone();
    if let Some(choices) = next.choices_mut() {
        f(choices);
    }
    next
}

fn enable_options(property: &SchemaProperty) -> SchemaProperty {
    edit_choices(property, |choices| {
        *choices = Some(Choices {
            options: vec![String::new()],
            multiple: false,
        });
    })
}

/// One row of [`PropertyGroup::outline`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub path: FieldPath,
    /// Nesting level, used for indentation
    pub depth: usize,
    pub type_name: String,
    pub required: bool,
}

impl JsonSchema {
    /// A new document with `edit` applied at `path`
    pub fn apply(&self, path: &FieldPath, edit: &Edit) -> JsonSchema {
        trace!(path = %path, ?edit, "applying schema edit");
        let group = self.group().apply(path, edit);
        self.clone().with_group(group)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyMap;

    fn group(names: &[&str], required: &[&str]) -> PropertyGroup {
        PropertyGroup::new(
            names.iter().map(|n| (*n, SchemaProperty::string())).collect(),
            required.iter().map(|r| r.to_string()).collect(),
        )
    }

    fn names(group: &PropertyGroup) -> Vec<&str> {
        group.properties.names().collect()
    }

    #[test]
    fn test_add_names_by_sibling_count() {
        let g = PropertyGroup::default().add_property().add_property();
        assert_eq!(names(&g), vec!["property_1", "property_2"]);

        let added = g.properties.get("property_1").unwrap();
        assert_eq!(added.property_type(), Some(PropertyType::String));
        assert_eq!(added.description, Some(String::new()));
    }

    #[test]
    fn test_add_collides_with_renamed_sibling() {
        let g = PropertyGroup::default()
            .add_property()
            .rename_property("property_1", "property_2");
        let g = g.update_property("property_2", SchemaProperty::number());

        let g = g.add_property();
        assert_eq!(names(&g), vec!["property_2"]);
        assert_eq!(
            g.properties.get("property_2").unwrap().property_type(),
            Some(PropertyType::String)
        );
    }

    #[test]
    fn test_update_unknown_name_is_ignored() {
        let g = group(&["a"], &[]);
        assert_eq!(g.update_property("zzz", SchemaProperty::number()), g);
    }

    #[test]
    fn test_retype_away_from_object_drops_children() {
        let inner = group(&["x"], &["x"]);
        let g = PropertyGroup::new(
            [("meta", SchemaProperty::object(inner))].into_iter().collect(),
            vec![],
        );
        let g = g.apply_here(&Edit::Retype {
            name: "meta".to_string(),
            property_type: PropertyType::Number,
        });
        let meta = g.properties.get("meta").unwrap();
        assert_eq!(meta.property_type(), Some(PropertyType::Number));
        assert!(meta.group().is_none());
    }

    #[test]
    fn test_remove_drops_from_both() {
        let g = group(&["a", "b"], &["a"]);
        let removed = g.remove_property("a");
        assert_eq!(names(&removed), vec!["b"]);
        assert!(removed.required.is_empty());

        let removed = g.remove_property("b");
        assert_eq!(names(&removed), vec!["a"]);
        assert_eq!(removed.required, vec!["a".to_string()]);
    }

    #[test]
    fn test_toggle_required_missing_property_is_noop() {
        let g = group(&["a"], &[]);
        assert_eq!(g.toggle_required("ghost"), g);
    }

    #[test]
    fn test_toggle_required_twice_restores() {
        let g = group(&["a", "b"], &["b"]);
        let once = g.toggle_required("a");
        assert!(once.is_required("a"));
        let twice = once.toggle_required("a");
        assert_eq!(twice.required, g.required);
    }

    #[test]
    fn test_rename_rewrites_required_and_moves_to_end() {
        let g = group(&["a", "b", "c"], &["a", "c"]);
        let renamed = g.rename_property("a", "z");

        assert_eq!(names(&renamed), vec!["b", "c", "z"]);
        assert!(!renamed.properties.contains_key("a"));
        assert_eq!(renamed.required, vec!["z".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_rename_blank_or_same_is_noop() {
        let g = group(&["a", "b"], &["a"]);
        assert_eq!(g.rename_property("a", ""), g);
        assert_eq!(g.rename_property("a", "   "), g);
        assert_eq!(g.rename_property("a", "a"), g);
        assert_eq!(g.rename_property("missing", "x"), g);
    }

    #[test]
    fn test_rename_onto_existing_overwrites() {
        let mut properties = PropertyMap::new();
        properties.insert("a", SchemaProperty::number());
        properties.insert("b", SchemaProperty::string());
        let g = PropertyGroup::new(properties, vec!["a".to_string(), "b".to_string()]);

        let renamed = g.rename_property("a", "b");
        assert_eq!(names(&renamed), vec!["b"]);
        assert_eq!(
            renamed.properties.get("b").unwrap().property_type(),
            Some(PropertyType::Number)
        );
        assert_eq!(renamed.required, vec!["b".to_string()]);
    }

    #[test]
    fn test_nested_edit_splices_back() {
        let address = group(&["street"], &[]);
        let root = PropertyGroup::new(
            [
                ("name", SchemaProperty::string()),
                ("address", SchemaProperty::object(address).with_description("Where")),
            ]
            .into_iter()
            .collect(),
            vec!["name".to_string()],
        );
        let path = FieldPath::parse("address");

        let root = root.apply(&path, &Edit::Add);
        let root = root.apply(&path, &Edit::ToggleRequired { name: "street".to_string() });

        let address = root.properties.get("address").unwrap();
        assert_eq!(address.description(), "Where");
        let inner = address.group().unwrap();
        assert_eq!(names(inner), vec!["street", "property_2"]);
        assert_eq!(inner.required, vec!["street".to_string()]);
        assert_eq!(root.required, vec!["name".to_string()]);
    }

    #[test]
    fn test_edit_through_non_object_is_noop() {
        let g = group(&["name"], &[]);
        assert_eq!(g.apply(&FieldPath::parse("name"), &Edit::Add), g);
        assert_eq!(g.apply(&FieldPath::parse("missing.deeper"), &Edit::Add), g);
    }

    #[test]
    fn test_group_at_follows_objects_only() {
        let inner = group(&["city"], &["city"]);
        let mut g = group(&["name"], &[]);
        g.properties.insert("shipping", SchemaProperty::object(inner.clone()));

        assert_eq!(g.group_at(&FieldPath::root()), Some(&g));
        assert_eq!(g.group_at(&FieldPath::parse("shipping")), Some(&inner));
        assert!(g.group_at(&FieldPath::parse("name")).is_none());
        assert!(g.group_at(&FieldPath::parse("shipping.city")).is_none());
    }

    #[test]
    fn test_deep_nesting() {
        let mut schema = JsonSchema::new("Deep");
        let mut path = FieldPath::root();
        for _ in 0..6 {
            schema = schema.apply(&path, &Edit::Add);
            schema = schema.apply(
                &path,
                &Edit::Retype {
                    name: "property_1".to_string(),
                    property_type: PropertyType::Object,
                },
            );
            path = path.push("property_1");
        }
        let outline = schema.group().outline();
        assert_eq!(outline.len(), 6);
        assert_eq!(outline.last().unwrap().depth, 5);
        assert_eq!(outline.last().unwrap().path.depth(), 6);
    }

    #[test]
    fn test_options_lifecycle() {
        let g = group(&["color"], &[]);
        let name = "color".to_string();

        let g = g.apply_here(&Edit::EnableOptions { name: name.clone() });
        assert_eq!(g.properties.get("color").unwrap().choices().unwrap().options, vec![String::new()]);

        let g = g.apply_here(&Edit::UpdateOption { name: name.clone(), index: 0, value: "red".to_string() });
        let g = g.apply_here(&Edit::AddOption { name: name.clone() });
        let g = g.apply_here(&Edit::UpdateOption { name: name.clone(), index: 1, value: "green".to_string() });
        let g = g.apply_here(&Edit::SetMultiple { name: name.clone(), multiple: true });
        let choices = g.properties.get("color").unwrap().choices().unwrap().clone();
        assert_eq!(choices.options, vec!["red".to_string(), "green".to_string()]);
        assert!(choices.multiple);

        let g = g.apply_here(&Edit::RemoveOption { name: name.clone(), index: 0 });
        let g = g.apply_here(&Edit::RemoveOption { name: name.clone(), index: 0 });
        assert!(g.properties.get("color").unwrap().choices().is_none());
    }

    #[test]
    fn test_options_ignored_for_non_strings() {
        let g = PropertyGroup::new([("n", SchemaProperty::number())].into_iter().collect(), vec![]);
        assert_eq!(g.apply_here(&Edit::EnableOptions { name: "n".to_string() }), g);
    }

    #[test]
    fn test_edit_serializes_with_op_tag() {
        let edit = Edit::Rename { from: "a".to_string(), to: "b".to_string() };
        let value = serde_json::to_value(&edit).unwrap();
        assert_eq!(value, serde_json::json!({"op": "rename", "from": "a", "to": "b"}));
    }
}
