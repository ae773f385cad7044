//! Schema editor page
//!
//! Header fields plus the recursive property editor. Saving runs the
//! required-field check locally first so a blank form never reaches the
//! registry.

use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params_map};
use schemaforge_core::{CreateSchemaRequest, FieldPath, JsonSchema, Notification, NotificationSink};

use crate::api;
use crate::components::property_editor::{PropertyLevel, SchemaPreview};
use crate::components::toasts::use_toasts;

const INPUT_CLASS: &str = "w-full px-3 py-2 border border-gray-300 rounded-lg focus:ring-teal-500";

#[component]
pub fn SchemaEditorPage() -> impl IntoView {
    let toasts = use_toasts();
    let navigate = use_navigate();
    let params = use_params_map();
    let schema_id = move || params.read().get("id");

    let category = RwSignal::new(String::new());
    let event_type = RwSignal::new(String::new());
    let schema = RwSignal::new(JsonSchema::new(""));
    let (saving, set_saving) = signal(false);

    Effect::new(move |_| {
        let Some(id) = schema_id() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            match api::get_schema(&id).await {
                Ok(record) => {
                    category.set(record.category);
                    event_type.set(record.event_type);
                    schema.set(record.schema);
                }
                Err(e) => toasts.notify(Notification::error("Failed to load schema", e)),
            }
        });
    });

    let on_save = move |_| {
        let payload = CreateSchemaRequest::new(category.get(), event_type.get(), schema.get());
        if let Err(e) = payload.validate() {
            toasts.notify(Notification::error("Failed to save schema", e.to_string()));
            return;
        }

        set_saving.set(true);
        let id = schema_id();
        let navigate = navigate.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match id {
                Some(id) => api::update_schema(&id, &payload).await,
                None => api::create_schema(&payload).await,
            };
            set_saving.set(false);
            match result {
                Ok(record) => {
                    log::info!("Saved schema {}", record.id);
                    navigate("/", Default::default());
                }
                Err(e) => toasts.notify(Notification::error("Failed to save schema", e)),
            }
        });
    };

    view! {
        <div class="p-6 max-w-4xl">
            <h2 class="text-2xl font-bold mb-6">
                {move || if schema_id().is_some() { "Edit Schema" } else { "New Schema" }}
            </h2>

            <div class="bg-white rounded-lg shadow p-6 space-y-4">
                <div class="grid grid-cols-2 gap-4">
                    <div>
                        <label class="block text-sm font-medium text-gray-700 mb-1">"Category *"</label>
                        <input
                            type="text"
                            class=INPUT_CLASS
                            prop:value=move || category.get()
                            on:input=move |ev| category.set(event_target_value(&ev))
                        />
                    </div>
                    <div>
                        <label class="block text-sm font-medium text-gray-700 mb-1">"Event Type *"</label>
                        <input
                            type="text"
                            class=INPUT_CLASS
                            prop:value=move || event_type.get()
                            on:input=move |ev| event_type.set(event_target_value(&ev))
                        />
                    </div>
                </div>
                <div>
                    <label class="block text-sm font-medium text-gray-700 mb-1">"Title *"</label>
                    <input
                        type="text"
                        class=INPUT_CLASS
                        prop:value=move || schema.read().title.clone()
                        on:input=move |ev| schema.update(|s| s.title = event_target_value(&ev))
                    />
                </div>
                <div>
                    <label class="block text-sm font-medium text-gray-700 mb-1">"Description"</label>
                    <textarea
                        class=INPUT_CLASS
                        rows="2"
                        prop:value=move || schema.read().description.clone()
                        on:input=move |ev| schema.update(|s| s.description = event_target_value(&ev))
                    ></textarea>
                </div>

                <div>
                    <h3 class="text-sm font-medium text-gray-700 mb-2">"Properties"</h3>
                    <PropertyLevel schema=schema path=FieldPath::root() depth=0 />
                    <SchemaPreview schema=schema />
                </div>

                <div class="flex justify-end gap-3 pt-4 border-t border-gray-100">
                    <a href="/" class="px-4 py-2 text-gray-700 bg-gray-100 rounded-lg hover:bg-gray-200">"Cancel"</a>
                    <button
                        class="px-4 py-2 text-white bg-teal-600 rounded-lg hover:bg-teal-700 disabled:opacity-50"
                        on:click=on_save
                        disabled=move || saving.get()
                    >
                        {move || if saving.get() { "Saving..." } else { "Save" }}
                    </button>
                </div>
            </div>
        </div>
    }
}
