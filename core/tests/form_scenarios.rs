//! End-to-end form scenarios: build a schema with the editor, render it, fill
//! it in through the widget bindings and submit.

use schemaforge_core::editor::Edit;
use schemaforge_core::form::{FormSession, SubmitError};
use schemaforge_core::model::{JsonSchema, PropertyType};
use schemaforge_core::path::FieldPath;
use schemaforge_core::plan::{FormMode, Widget};
use schemaforge_core::rules::{compile_schema, FieldValue, MSG_REQUIRED};
use serde_json::json;

fn product_schema() -> JsonSchema {
    let root = FieldPath::root();
    let rename = |from: &str, to: &str| Edit::Rename {
        from: from.to_string(),
        to: to.to_string(),
    };

    let mut schema = JsonSchema::new("Product");
    for edit in [
        Edit::Add,
        Edit::Add,
        rename("property_1", "name"),
        rename("property_2", "price"),
        Edit::Retype {
            name: "price".to_string(),
            property_type: PropertyType::Number,
        },
        Edit::ToggleRequired { name: "name".to_string() },
        Edit::ToggleRequired { name: "price".to_string() },
    ] {
        schema = schema.apply(&root, &edit);
    }
    schema
}

#[test]
fn test_price_input_coerces_before_validation() {
    let schema = product_schema();
    assert_eq!(schema.required, vec!["name", "price"]);

    let mut session = FormSession::new(&schema, FormMode::Single);
    session.state.set_text(&FieldPath::parse("name"), "Widget");
    session.state.set_number_input(&FieldPath::parse("price"), "not-a-number");

    let accepted = session.submit().unwrap();
    assert_eq!(accepted.get(&FieldPath::parse("price")), Some(&FieldValue::Number(0.0)));
    assert_eq!(accepted.to_document(), json!({"name": "Widget", "price": 0.0}));
}

#[test]
fn test_raw_submission_coerces_the_same_way() {
    let ruleset = compile_schema(&product_schema());
    let raw = json!({"name": "Widget", "price": "not-a-number"});
    let values = ruleset.coerce_input(raw.as_object().unwrap());
    assert!(ruleset.validate(&values).is_ok());
}

#[test]
fn test_multi_select_deselect() {
    let root = FieldPath::root();
    let mut schema = JsonSchema::new("Colors");
    for edit in [
        Edit::Add,
        Edit::EnableOptions { name: "property_1".to_string() },
        Edit::UpdateOption {
            name: "property_1".to_string(),
            index: 0,
            value: "red".to_string(),
        },
        Edit::AddOption { name: "property_1".to_string() },
        Edit::UpdateOption {
            name: "property_1".to_string(),
            index: 1,
            value: "green".to_string(),
        },
        Edit::SetMultiple {
            name: "property_1".to_string(),
            multiple: true,
        },
    ] {
        schema = schema.apply(&root, &edit);
    }

    let mut session = FormSession::new(&schema, FormMode::Single);
    assert!(matches!(session.plan.fields[0].widget, Widget::CheckboxList { .. }));

    let path = FieldPath::parse("property_1");
    session.state.toggle_option(&path, "red", true);
    session.state.toggle_option(&path, "green", true);
    session.state.toggle_option(&path, "red", false);

    let accepted = session.submit().unwrap();
    assert_eq!(
        accepted.get(&path),
        Some(&FieldValue::List(vec!["green".to_string()]))
    );
}

#[test]
fn test_nested_object_built_through_paths() {
    let root = FieldPath::root();
    let mut schema = JsonSchema::new("Customer");
    schema = schema.apply(&root, &Edit::Add);
    schema = schema.apply(
        &root,
        &Edit::Rename {
            from: "property_1".to_string(),
            to: "address".to_string(),
        },
    );
    schema = schema.apply(
        &root,
        &Edit::Retype {
            name: "address".to_string(),
            property_type: PropertyType::Object,
        },
    );
    let address = FieldPath::parse("address");
    schema = schema.apply(&address, &Edit::Add);
    schema = schema.apply(
        &address,
        &Edit::ToggleRequired {
            name: "property_1".to_string(),
        },
    );

    let mut session = FormSession::new(&schema, FormMode::Single);
    let Err(SubmitError::Invalid(errors)) = session.submit() else {
        panic!("untouched address should still need its required field");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("address.property_1"), Some(MSG_REQUIRED));

    session.state.set_text(&FieldPath::parse("address.note"), "ignored");
    assert!(session.submit().is_err());

    session.state.set_text(&FieldPath::parse("address.property_1"), "Main St");
    let accepted = session.submit().unwrap();
    assert_eq!(accepted.to_document(), json!({"address": {"property_1": "Main St"}}));
}
