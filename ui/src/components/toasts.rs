//! Toast area
//!
//! Reactive implementation of the core notification channel. Toasts expire
//! on their own after a few seconds or when clicked.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use schemaforge_core::{Notification, NotificationLevel, NotificationSink};

const DISMISS_AFTER_MS: u32 = 4_000;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
}

#[derive(Clone, Copy)]
pub struct Toasts {
    list: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            list: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(0),
        }
    }

    pub fn dismiss(&self, id: u64) {
        self.list.try_update(|list| list.retain(|t| t.id != id));
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for Toasts {
    fn notify(&self, notification: Notification) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        self.list.update(|list| list.push(Toast { id, notification }));

        let toasts = *self;
        Timeout::new(DISMISS_AFTER_MS, move || toasts.dismiss(id)).forget();
    }
}

/// The toast channel provided by [`crate::App`]
pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

fn level_class(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "bg-white border-gray-300 text-gray-800",
        NotificationLevel::Success => "bg-green-50 border-green-400 text-green-800",
        NotificationLevel::Error => "bg-red-50 border-red-400 text-red-800",
    }
}

#[component]
pub fn ToastArea() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div class="fixed top-4 right-4 z-50 space-y-2 w-80">
            <For
                each=move || toasts.list.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div
                            class=format!(
                                "toast-enter border rounded-lg shadow p-3 cursor-pointer {}",
                                level_class(toast.notification.level)
                            )
                            on:click=move |_| toasts.dismiss(id)
                        >
                            <div class="font-semibold text-sm">{toast.notification.title}</div>
                            <div class="text-sm">{toast.notification.message}</div>
                        </div>
                    }
                }
            />
        </div>
    }
}
