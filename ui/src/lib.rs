use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes, A};
use leptos_router::path;
use schemaforge_core::NotificationSink;

mod api;
mod components;

use components::form_preview::FormPreviewPage;
use components::schema_editor::SchemaEditorPage;
use components::schema_list::SchemaList;
use components::toasts::{ToastArea, Toasts};

#[component]
pub fn App() -> impl IntoView {
    let toasts = Toasts::new();
    provide_context(toasts);

    // Registry mutations are announced by the server; the stream stays open
    // for the lifetime of the page.
    match api::subscribe_notifications(move |notification| toasts.notify(notification)) {
        Ok(source) => std::mem::forget(source),
        Err(e) => log::warn!("{}", e),
    }

    view! {
        <Router>
            <div class="flex h-screen bg-gray-100">
                // Sidebar
                <div class="w-64 bg-gray-800 text-white p-4 flex flex-col">
                    <h1 class="text-2xl font-bold mb-8">"SchemaForge"</h1>
                    <nav class="space-y-1 flex-1">
                        <NavLink href="/" label="Schemas" />
                        <NavLink href="/schemas/new" label="New Schema" />
                    </nav>
                    <div class="text-xs text-gray-500 mt-4">
                        "JSON Schema form designer"
                    </div>
                </div>

                // Main Content
                <div class="flex-1 overflow-y-auto">
                    <Routes fallback=|| "Not found.">
                        <Route path=path!("/") view=SchemaList/>
                        <Route path=path!("/schemas/new") view=SchemaEditorPage/>
                        <Route path=path!("/schemas/:id/preview") view=FormPreviewPage/>
                        <Route path=path!("/schemas/:id") view=SchemaEditorPage/>
                    </Routes>
                </div>
            </div>
            <ToastArea />
        </Router>
    }
}

#[component]
fn NavLink(href: &'static str, label: &'static str) -> impl IntoView {
    view! {
        <A href=href attr:class="block p-2 hover:bg-gray-700 rounded transition-colors">
            {label}
        </A>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(App);
}
