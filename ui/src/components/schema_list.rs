//! Schema list page with search and delete

use leptos::prelude::*;
use leptos_router::components::A;
use schemaforge_core::{Notification, NotificationSink};

use crate::api;
use crate::components::toasts::use_toasts;

#[component]
pub fn SchemaList() -> impl IntoView {
    let toasts = use_toasts();
    let (query, set_query) = signal(String::new());
    let (refresh_trigger, set_refresh_trigger) = signal(0u32);
    let (delete_target, set_delete_target) = signal(Option::<(String, String)>::None);
    let (deleting, set_deleting) = signal(false);

    let schemas = LocalResource::new(move || {
        let _ = refresh_trigger.get();
        let q = query.get();
        async move {
            match api::list_schemas(&q).await {
                Ok(items) => Some(items),
                Err(e) => {
                    log::error!("Failed to load schemas: {}", e);
                    None
                }
            }
        }
    });

    let on_delete_confirm = move |_| {
        let Some((id, title)) = delete_target.get() else {
            return;
        };
        set_deleting.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = api::delete_schema(&id).await {
                toasts.notify(Notification::error(
                    "Failed to delete schema",
                    format!("{}: {}", title, e),
                ));
            }
            set_delete_target.set(None);
            set_refresh_trigger.update(|n| *n += 1);
            set_deleting.set(false);
        });
    };

    view! {
        <div class="p-6">
            <div class="flex justify-between items-center mb-6">
                <h2 class="text-2xl font-bold">"Schemas"</h2>
                <A href="/schemas/new" attr:class="px-4 py-2 bg-teal-600 text-white rounded-lg hover:bg-teal-700">
                    "New Schema"
                </A>
            </div>

            <input
                type="search"
                class="w-full mb-4 px-3 py-2 border border-gray-300 rounded-lg"
                placeholder="Search by category, event type or title"
                prop:value=query
                on:input=move |ev| set_query.set(event_target_value(&ev))
            />

            <Suspense fallback=move || view! { <div class="text-gray-500">"Loading schemas..."</div> }>
                {move || {
                    schemas.get().map(|maybe_schemas| match maybe_schemas {
                        Some(items) if !items.is_empty() => view! {
                            <div class="bg-white rounded-lg shadow overflow-hidden">
                                <table class="min-w-full divide-y divide-gray-200">
                                    <thead class="bg-gray-50">
                                        <tr>
                                            <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Title"</th>
                                            <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Category"</th>
                                            <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Event Type"</th>
                                            <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Properties"</th>
                                            <th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">"Updated"</th>
                                            <th class="px-6 py-3 text-right text-xs font-medium text-gray-500 uppercase tracking-wider">"Actions"</th>
                                        </tr>
                                    </thead>
                                    <tbody class="bg-white divide-y divide-gray-200">
                                        {items.into_iter().map(|record| {
                                            let id = record.id.clone();
                                            let target = (record.id.clone(), record.title().to_string());
                                            view! {
                                                <tr class="hover:bg-gray-50">
                                                    <td class="px-6 py-4 text-sm font-medium text-gray-900">{record.title().to_string()}</td>
                                                    <td class="px-6 py-4 text-sm text-gray-500">{record.category.clone()}</td>
                                                    <td class="px-6 py-4 text-sm text-gray-500">{record.event_type.clone()}</td>
                                                    <td class="px-6 py-4 whitespace-nowrap">
                                                        <span class="px-2 inline-flex text-xs leading-5 font-semibold rounded-full bg-teal-100 text-teal-800">
                                                            {record.schema.properties.len()} " properties"
                                                        </span>
                                                    </td>
                                                    <td class="px-6 py-4 text-sm text-gray-500">
                                                        {record.updated_at.format("%Y-%m-%d %H:%M").to_string()}
                                                    </td>
                                                    <td class="px-6 py-4 whitespace-nowrap text-right text-sm font-medium">
                                                        <A href=format!("/schemas/{}", id) attr:class="text-teal-600 hover:text-teal-900 mr-4">"Edit"</A>
                                                        <A href=format!("/schemas/{}/preview", id) attr:class="text-teal-600 hover:text-teal-900 mr-4">"Preview"</A>
                                                        <button
                                                            class="text-red-600 hover:text-red-900"
                                                            on:click=move |_| set_delete_target.set(Some(target.clone()))
                                                        >
                                                            "Delete"
                                                        </button>
                                                    </td>
                                                </tr>
                                            }
                                        }).collect::<Vec<_>>()}
                                    </tbody>
                                </table>
                            </div>
                        }.into_any(),
                        Some(_) => view! {
                            <div class="text-center py-12 text-gray-500">
                                {move || if query.get().trim().is_empty() {
                                    "No schemas yet. Create the first one."
                                } else {
                                    "No schemas match your search."
                                }}
                            </div>
                        }.into_any(),
                        None => view! {
                            <div class="text-red-600">"Failed to load schemas"</div>
                        }.into_any(),
                    })
                }}
            </Suspense>

            <Show when=move || delete_target.get().is_some()>
                <div class="fixed inset-0 bg-black bg-opacity-50 flex items-center justify-center z-40">
                    <div class="bg-white rounded-lg shadow-xl p-6 max-w-md w-full mx-4">
                        <h3 class="text-lg font-semibold text-gray-900 mb-4">"Delete Schema"</h3>
                        <p class="text-gray-600 mb-6">
                            "Delete "
                            <span class="font-semibold">{move || delete_target.get().map(|(_, title)| title).unwrap_or_default()}</span>
                            "? This cannot be undone."
                        </p>
                        <div class="flex justify-end gap-3">
                            <button
                                class="px-4 py-2 text-gray-700 bg-gray-100 rounded-lg hover:bg-gray-200"
                                on:click=move |_| set_delete_target.set(None)
                                disabled=move || deleting.get()
                            >
                                "Cancel"
                            </button>
                            <button
                                class="px-4 py-2 text-white bg-red-600 rounded-lg hover:bg-red-700 disabled:opacity-50"
                                on:click=on_delete_confirm
                                disabled=move || deleting.get()
                            >
                                {move || if deleting.get() { "Deleting..." } else { "Delete" }}
                            </button>
                        </div>
                    </div>
                </div>
            </Show>
        </div>
    }
}
