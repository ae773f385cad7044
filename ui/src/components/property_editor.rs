//! Recursive property editor
//!
//! Edits one nesting level of a schema and recurses into object properties.
//! Every change is expressed as a core [`Edit`] applied at the level's path,
//! so the signal always holds a complete, consistent document.

use leptos::prelude::*;
use schemaforge_core::model::{Format, PropertyType};
use schemaforge_core::{Edit, FieldPath, JsonSchema, SchemaProperty};

const INPUT_CLASS: &str =
    "w-full px-2 py-1 text-sm border border-gray-300 rounded focus:ring-teal-500";

fn names_at(schema: &JsonSchema, path: &FieldPath) -> Vec<String> {
    let group = schema.group();
    group
        .group_at(path)
        .map(|g| g.properties.names().map(str::to_string).collect())
        .unwrap_or_default()
}

fn property_at(schema: &JsonSchema, path: &FieldPath, name: &str) -> Option<SchemaProperty> {
    let group = schema.group();
    group.group_at(path)?.properties.get(name).cloned()
}

fn required_at(schema: &JsonSchema, path: &FieldPath, name: &str) -> bool {
    let group = schema.group();
    group.group_at(path).is_some_and(|g| g.is_required(name))
}

/// All properties at `path`, plus the button that appends a new one
#[component]
pub fn PropertyLevel(schema: RwSignal<JsonSchema>, path: FieldPath, depth: usize) -> AnyView {
    let path_stored = StoredValue::new(path);

    let indent_class = match depth {
        0 => "",
        1 => "ml-4",
        2 => "ml-8",
        _ => "ml-12",
    };

    view! {
        <div class=format!("space-y-2 {}", indent_class)>
            <Show
                when=move || !names_at(&schema.read(), &path_stored.get_value()).is_empty()
                fallback=|| view! {
                    <div class="text-xs text-gray-400 italic p-2">"No properties yet"</div>
                }
            >
                <For
                    each=move || names_at(&schema.read(), &path_stored.get_value())
                    key=|name| name.clone()
                    children=move |name| {
                        view! {
                            <PropertyRow
                                schema=schema
                                path=path_stored.get_value()
                                name=name
                                depth=depth
                            />
                        }
                    }
                />
            </Show>
            <button
                type="button"
                class="px-2 py-0.5 text-xs bg-teal-100 text-teal-700 hover:bg-teal-200 rounded"
                on:click=move |_| {
                    let path = path_stored.get_value();
                    schema.update(|s| *s = s.apply(&path, &Edit::Add));
                }
            >
                "+ Add property"
            </button>
        </div>
    }
    .into_any()
}

/// One property definition, with its nested level when it is an object
#[component]
fn PropertyRow(schema: RwSignal<JsonSchema>, path: FieldPath, name: String, depth: usize) -> AnyView {
    let (expanded, set_expanded) = signal(true);
    let path_stored = StoredValue::new(path);
    let name_stored = StoredValue::new(name);

    let property = move || property_at(&schema.read(), &path_stored.get_value(), &name_stored.get_value());
    let apply = move |edit: Edit| {
        let path = path_stored.get_value();
        schema.update(|s| *s = s.apply(&path, &edit));
    };

    let type_name = move || property().map(|p| p.type_name().to_string()).unwrap_or_default();
    let description = move || property().map(|p| p.description().to_string()).unwrap_or_default();
    let format = move || {
        property()
            .and_then(|p| p.format())
            .map(|f| f.as_str().to_string())
            .unwrap_or_default()
    };
    let is_required =
        move || required_at(&schema.read(), &path_stored.get_value(), &name_stored.get_value());
    let is_object = move || property().is_some_and(|p| p.is_object());
    let accepts_format = move || {
        matches!(
            property().and_then(|p| p.property_type()),
            Some(PropertyType::String | PropertyType::Number)
        )
    };
    let is_string = move || property().and_then(|p| p.property_type()) == Some(PropertyType::String);
    let options = move || {
        property()
            .and_then(|p| p.choices().map(|c| c.options.clone()))
            .unwrap_or_default()
    };
    let has_options = move || property().is_some_and(|p| p.choices().is_some());
    let multiple = move || property().and_then(|p| p.choices().map(|c| c.multiple)).unwrap_or(false);

    let row_class = if depth % 2 == 0 { "bg-gray-50" } else { "bg-gray-100" };

    view! {
        <div class=format!("border border-gray-200 rounded-lg p-3 {}", row_class)>
            <div class="flex flex-wrap gap-2 items-start">
                <div class="flex-1 min-w-[120px]">
                    <input
                        type="text"
                        class=INPUT_CLASS
                        placeholder="Property name"
                        prop:value=move || name_stored.get_value()
                        on:change=move |ev| {
                            apply(Edit::Rename {
                                from: name_stored.get_value(),
                                to: event_target_value(&ev),
                            });
                        }
                    />
                </div>

                <div class="w-32">
                    <select
                        class=INPUT_CLASS
                        prop:value=type_name
                        on:change=move |ev| {
                            if let Some(property_type) = PropertyType::parse(&event_target_value(&ev)) {
                                apply(Edit::Retype { name: name_stored.get_value(), property_type });
                            }
                        }
                    >
                        {PropertyType::ALL
                            .into_iter()
                            .map(|t| view! { <option value=t.as_str()>{t.display_name()}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                </div>

                <Show when=accepts_format>
                    <div class="w-32">
                        <select
                            class=INPUT_CLASS
                            prop:value=format
                            on:change=move |ev| {
                                apply(Edit::SetFormat {
                                    name: name_stored.get_value(),
                                    format: Format::parse(&event_target_value(&ev)),
                                });
                            }
                        >
                            <option value="">"(no format)"</option>
                            {Format::ALL
                                .into_iter()
                                .map(|f| view! { <option value=f.as_str()>{f.as_str()}</option> })
                                .collect::<Vec<_>>()}
                        </select>
                    </div>
                </Show>

                <label class="flex items-center gap-1 text-sm text-gray-600">
                    <input
                        type="checkbox"
                        class="rounded text-teal-500"
                        prop:checked=is_required
                        on:change=move |_| apply(Edit::ToggleRequired { name: name_stored.get_value() })
                    />
                    "Required"
                </label>

                <Show when=is_object>
                    <button
                        type="button"
                        class="px-2 py-1 text-sm text-gray-600 hover:bg-gray-200 rounded"
                        on:click=move |_| set_expanded.update(|e| *e = !*e)
                    >
                        {move || if expanded.get() { "▼" } else { "▶" }}
                    </button>
                </Show>

                <button
                    type="button"
                    class="px-2 py-1 text-sm text-red-600 hover:bg-red-50 rounded"
                    on:click=move |_| apply(Edit::Remove { name: name_stored.get_value() })
                >
                    "Delete"
                </button>
            </div>

            <div class="mt-2">
                <input
                    type="text"
                    class=INPUT_CLASS
                    placeholder="Description (optional)"
                    prop:value=description
                    on:input=move |ev| {
                        apply(Edit::Describe {
                            name: name_stored.get_value(),
                            description: event_target_value(&ev),
                        });
                    }
                />
            </div>

            <Show when=is_string>
                <div class="mt-2 space-y-1">
                    <label class="flex items-center gap-1 text-sm text-gray-600">
                        <input
                            type="checkbox"
                            prop:checked=has_options
                            on:change=move |ev| {
                                let name = name_stored.get_value();
                                if event_target_checked(&ev) {
                                    apply(Edit::EnableOptions { name });
                                } else {
                                    apply(Edit::DisableOptions { name });
                                }
                            }
                        />
                        "Fixed options"
                    </label>
                    <Show when=has_options>
                        <div class="pl-4 space-y-1">
                            {move || {
                                options()
                                    .into_iter()
                                    .enumerate()
                                    .map(|(index, option)| {
                                        view! {
                                            <div class="flex gap-2">
                                                <input
                                                    type="text"
                                                    class=format!("{} bg-yellow-50", INPUT_CLASS)
                                                    placeholder="Option value"
                                                    prop:value=option
                                                    on:change=move |ev| {
                                                        apply(Edit::UpdateOption {
                                                            name: name_stored.get_value(),
                                                            index,
                                                            value: event_target_value(&ev),
                                                        });
                                                    }
                                                />
                                                <button
                                                    type="button"
                                                    class="px-2 text-sm text-red-600 hover:bg-red-50 rounded"
                                                    on:click=move |_| {
                                                        apply(Edit::RemoveOption { name: name_stored.get_value(), index });
                                                    }
                                                >
                                                    "×"
                                                </button>
                                            </div>
                                        }
                                    })
                                    .collect::<Vec<_>>()
                            }}
                            <div class="flex items-center gap-4">
                                <button
                                    type="button"
                                    class="px-2 py-0.5 text-xs bg-yellow-100 text-yellow-800 rounded"
                                    on:click=move |_| apply(Edit::AddOption { name: name_stored.get_value() })
                                >
                                    "+ Option"
                                </button>
                                <label class="flex items-center gap-1 text-xs text-gray-600">
                                    <input
                                        type="checkbox"
                                        prop:checked=multiple
                                        on:change=move |ev| {
                                            apply(Edit::SetMultiple {
                                                name: name_stored.get_value(),
                                                multiple: event_target_checked(&ev),
                                            });
                                        }
                                    />
                                    "Allow multiple"
                                </label>
                            </div>
                        </div>
                    </Show>
                </div>
            </Show>

            <Show when=move || is_object() && expanded.get()>
                <div class="mt-3 pt-3 border-t border-gray-200">
                    <span class="block mb-2 text-xs font-medium text-gray-500 uppercase">
                        "Nested Properties"
                    </span>
                    <PropertyLevel
                        schema=schema
                        path=path_stored.get_value().push(&name_stored.get_value())
                        depth=depth + 1
                    />
                </div>
            </Show>
        </div>
    }
    .into_any()
}

/// Collapsible pretty-printed document
#[component]
pub fn SchemaPreview(schema: RwSignal<JsonSchema>) -> impl IntoView {
    view! {
        <details class="mt-2">
            <summary class="text-xs text-gray-500 cursor-pointer hover:text-gray-700">"View JSON Schema"</summary>
            <pre class="mt-2 p-2 bg-gray-900 text-green-400 rounded text-xs overflow-x-auto">
                {move || schema.read().to_json().unwrap_or_default()}
            </pre>
        </details>
    }
}
