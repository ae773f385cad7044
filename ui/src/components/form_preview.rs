//! Form preview page
//!
//! Renders a stored schema as an interactive form from its render plan, in
//! single or multi-step mode. Submission is checked locally by the compiled
//! ruleset and then by the registry service.

use chrono::{NaiveDate, NaiveDateTime};
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use schemaforge_core::form::{format_date_display, markdown_preview};
use schemaforge_core::plan::InputKind;
use schemaforge_core::{
    FieldErrors, FieldPlan, FieldValue, FormMode, FormSession, FormState, Notification,
    NotificationSink, SubmitError, TagKey, Widget,
};

use crate::api::{self, SubmitResult};
use crate::components::toasts::use_toasts;

const INPUT_CLASS: &str = "w-full px-3 py-2 border border-gray-300 rounded-lg focus:ring-teal-500";

type Session = RwSignal<Option<FormSession>>;

fn read_state<R>(session: Session, f: impl FnOnce(&FormState) -> R) -> Option<R> {
    session.with(|s| s.as_ref().map(|s| f(&s.state)))
}

fn read_state_untracked<R>(session: Session, f: impl FnOnce(&FormState) -> R) -> Option<R> {
    session.with_untracked(|s| s.as_ref().map(|s| f(&s.state)))
}

fn write_state(session: Session, f: impl FnOnce(&mut FormState)) {
    session.update(|s| {
        if let Some(s) = s.as_mut() {
            f(&mut s.state);
        }
    });
}

#[component]
pub fn FormPreviewPage() -> impl IntoView {
    let toasts = use_toasts();
    let params = use_params_map();
    let schema_id = move || params.read().get("id");

    let multi_step = RwSignal::new(false);
    let session: Session = RwSignal::new(None);
    let errors = RwSignal::new(FieldErrors::default());
    let accepted = RwSignal::new(Option::<String>::None);

    let record = LocalResource::new(move || {
        let id = schema_id();
        async move {
            let id = id?;
            match api::get_schema(&id).await {
                Ok(record) => Some(record),
                Err(e) => {
                    log::error!("Failed to load schema {}: {}", id, e);
                    None
                }
            }
        }
    });

    Effect::new(move |_| {
        let mode = if multi_step.get() {
            FormMode::MultiStep
        } else {
            FormMode::Single
        };
        if let Some(Some(record)) = record.get() {
            session.set(Some(FormSession::new(&record.schema, mode)));
            errors.set(FieldErrors::default());
            accepted.set(None);
        }
    });

    // Only the fields of the current step; typing must not rebuild them
    let visible_fields = Memo::new(move |_| {
        session.with(|s| {
            s.as_ref()
                .map(|s| {
                    s.plan
                        .step_fields(s.cursor().current())
                        .into_iter()
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    });
    let cursor = Memo::new(move |_| session.with(|s| s.as_ref().map(FormSession::cursor)));
    let can_submit = move || session.with(|s| s.as_ref().is_some_and(FormSession::can_submit));

    let on_submit = move |_| {
        let Some(outcome) = session.with_untracked(|s| s.as_ref().map(FormSession::submit)) else {
            return;
        };
        match outcome {
            Err(SubmitError::NotOnFinalStep) => {
                toasts.notify(Notification::info("Not finished", "Complete every step first"));
            }
            Err(SubmitError::Invalid(field_errors)) => {
                toasts.notify(Notification::error("Form has errors", field_errors.to_string()));
                errors.set(field_errors);
                accepted.set(None);
            }
            Ok(values) => {
                errors.set(FieldErrors::default());
                let Some(id) = schema_id() else {
                    return;
                };
                let document = values.to_document();
                let body = document.as_object().cloned().unwrap_or_default();
                wasm_bindgen_futures::spawn_local(async move {
                    match api::submit_form(&id, &body).await {
                        Ok(SubmitResult::Accepted(document)) => {
                            accepted.set(serde_json::to_string_pretty(&document).ok());
                            toasts.notify(Notification::success("Submission accepted", "The form passed validation"));
                        }
                        Ok(SubmitResult::Rejected(field_errors)) => {
                            errors.set(field_errors);
                            accepted.set(None);
                        }
                        Err(e) => toasts.notify(Notification::error("Submission failed", e)),
                    }
                });
            }
        }
    };

    view! {
        <div class="p-6 max-w-3xl">
            <div class="flex justify-between items-center mb-6">
                <h2 class="text-2xl font-bold">
                    {move || session.with(|s| s.as_ref().map(|s| s.plan.title.clone())).unwrap_or_else(|| "Form Preview".to_string())}
                </h2>
                <label class="flex items-center gap-2 text-sm text-gray-600">
                    <input
                        type="checkbox"
                        prop:checked=move || multi_step.get()
                        on:change=move |ev| multi_step.set(event_target_checked(&ev))
                    />
                    "Multi-step"
                </label>
            </div>

            <Suspense fallback=move || view! { <div class="text-gray-500">"Loading schema..."</div> }>
                {move || record.get().map(|maybe_record| match maybe_record {
                    Some(_) => view! {
                        <div class="bg-white rounded-lg shadow p-6 space-y-4">
                            <p class="text-sm text-gray-500">
                                {move || session.with(|s| s.as_ref().map(|s| s.plan.description.clone())).unwrap_or_default()}
                            </p>

                            <Show when=move || cursor.get().is_some_and(|c| c.count() > 0)>
                                <div class="text-xs font-medium text-gray-500 uppercase">
                                    {move || cursor.get().map(|c| format!("Step {} of {}", c.current() + 1, c.count())).unwrap_or_default()}
                                </div>
                            </Show>

                            <For
                                each=move || visible_fields.get()
                                key=|field| field.path.to_string()
                                children=move |field| view! { <FieldView session=session errors=errors field=field /> }
                            />

                            <div class="flex justify-between pt-4 border-t border-gray-100">
                                <button
                                    class="px-4 py-2 text-gray-700 bg-gray-100 rounded-lg hover:bg-gray-200 disabled:opacity-50"
                                    disabled=move || cursor.get().map_or(true, |c| c.is_first())
                                    on:click=move |_| session.update(|s| {
                                        if let Some(s) = s.as_mut() {
                                            s.previous_step();
                                        }
                                    })
                                >
                                    "Previous"
                                </button>
                                <Show
                                    when=can_submit
                                    fallback=move || view! {
                                        <button
                                            class="px-4 py-2 text-white bg-teal-600 rounded-lg hover:bg-teal-700"
                                            on:click=move |_| session.update(|s| {
                                                if let Some(s) = s.as_mut() {
                                                    s.next_step();
                                                }
                                            })
                                        >
                                            "Next"
                                        </button>
                                    }
                                >
                                    <button
                                        class="px-4 py-2 text-white bg-teal-600 rounded-lg hover:bg-teal-700"
                                        on:click=on_submit
                                    >
                                        "Submit"
                                    </button>
                                </Show>
                            </div>
                        </div>
                    }.into_any(),
                    None => view! { <div class="text-red-600">"Schema not found"</div> }.into_any(),
                })}
            </Suspense>

            <Show when=move || accepted.get().is_some()>
                <div class="mt-6">
                    <h3 class="text-sm font-medium text-gray-700 mb-2">"Accepted document"</h3>
                    <pre class="p-3 bg-gray-900 text-green-400 rounded text-xs overflow-x-auto">
                        {move || accepted.get().unwrap_or_default()}
                    </pre>
                </div>
            </Show>
        </div>
    }
}

/// One planned field, recursing into sections
#[component]
fn FieldView(session: Session, errors: RwSignal<FieldErrors>, field: FieldPlan) -> AnyView {
    let path = StoredValue::new(field.path.clone());
    let path_key = StoredValue::new(field.path.to_string());
    let error = move || errors.with(|e| e.get(&path_key.get_value()).map(str::to_string));

    let control = match field.widget {
        Widget::Section { fields } => {
            return view! {
                <fieldset class="border border-gray-200 rounded-lg p-4 space-y-4">
                    <legend class="px-1 text-sm font-semibold text-gray-700">{field.label}</legend>
                    {fields
                        .into_iter()
                        .map(|child| view! { <FieldView session=session errors=errors field=child /> })
                        .collect::<Vec<_>>()}
                </fieldset>
            }
            .into_any();
        }
        Widget::Text { input } => {
            let input_type = match input {
                InputKind::Email => "email",
                InputKind::Text => "text",
            };
            view! {
                <input
                    type=input_type
                    class=INPUT_CLASS
                    placeholder=field.placeholder
                    prop:value=move || read_state(session, |s| s.text(&path.get_value()).to_string()).unwrap_or_default()
                    on:input=move |ev| write_state(session, |s| s.set_text(&path.get_value(), event_target_value(&ev)))
                />
            }
            .into_any()
        }
        Widget::TextArea => view! {
            <textarea
                class=INPUT_CLASS
                rows="4"
                placeholder=field.placeholder
                prop:value=move || read_state(session, |s| s.text(&path.get_value()).to_string()).unwrap_or_default()
                on:input=move |ev| write_state(session, |s| s.set_text(&path.get_value(), event_target_value(&ev)))
            ></textarea>
        }
        .into_any(),
        Widget::Markdown => {
            let preview = move || read_state(session, |s| markdown_preview(s.text(&path.get_value()))).flatten();
            view! {
                <div class="space-y-2">
                    <textarea
                        class=format!("{} font-mono", INPUT_CLASS)
                        rows="6"
                        placeholder=field.placeholder
                        prop:value=move || read_state(session, |s| s.text(&path.get_value()).to_string()).unwrap_or_default()
                        on:input=move |ev| write_state(session, |s| s.set_text(&path.get_value(), event_target_value(&ev)))
                    ></textarea>
                    <Show when=move || preview().is_some()>
                        <div
                            class="markdown-preview border border-gray-100 rounded p-3 text-sm"
                            inner_html=move || preview().unwrap_or_default()
                        ></div>
                    </Show>
                </div>
            }
            .into_any()
        }
        Widget::Number => {
            let initial = read_state_untracked(session, |s| match s.value(&path.get_value()) {
                Some(FieldValue::Number(n)) => n.to_string(),
                _ => String::new(),
            })
            .unwrap_or_default();
            view! {
                <input
                    type="number"
                    class=INPUT_CLASS
                    placeholder=field.placeholder
                    value=initial
                    on:input=move |ev| write_state(session, |s| {
                        s.set_number_input(&path.get_value(), &event_target_value(&ev));
                    })
                />
            }
            .into_any()
        }
        Widget::Toggle { caption } => view! {
            <label class="flex items-center gap-2 text-sm text-gray-700">
                <input
                    type="checkbox"
                    class="rounded text-teal-500"
                    prop:checked=move || {
                        read_state(session, |s| matches!(s.value(&path.get_value()), Some(FieldValue::Bool(true))))
                            .unwrap_or(false)
                    }
                    on:change=move |ev| write_state(session, |s| s.set_bool(&path.get_value(), event_target_checked(&ev)))
                />
                {caption}
            </label>
        }
        .into_any(),
        Widget::DatePicker { with_time } => {
            let picked = move || {
                read_state(session, |s| match s.value(&path.get_value()) {
                    Some(FieldValue::Date(date)) => format_date_display(*date),
                    Some(FieldValue::DateTime(at)) => {
                        format!("{} {}", format_date_display(at.date_naive()), at.format("%H:%M"))
                    }
                    _ => "Pick a date".to_string(),
                })
                .unwrap_or_default()
            };
            let input_type = if with_time { "datetime-local" } else { "date" };
            view! {
                <div class="flex items-center gap-3">
                    <input
                        type=input_type
                        class="px-3 py-2 border border-gray-300 rounded-lg"
                        on:change=move |ev| {
                            let raw = event_target_value(&ev);
                            write_state(session, |s| {
                                let path = path.get_value();
                                if raw.is_empty() {
                                    s.clear(&path);
                                } else if with_time {
                                    if let Ok(at) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M") {
                                        s.pick_date_time(&path, at.and_utc());
                                    }
                                } else if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                                    s.pick_date(&path, date);
                                }
                            });
                        }
                    />
                    <span class="text-sm text-gray-600">{picked}</span>
                </div>
            }
            .into_any()
        }
        Widget::Select { options } => view! {
            <select
                class=INPUT_CLASS
                prop:value=move || read_state(session, |s| s.text(&path.get_value()).to_string()).unwrap_or_default()
                on:change=move |ev| {
                    let picked = event_target_value(&ev);
                    write_state(session, |s| {
                        if picked.is_empty() {
                            s.clear(&path.get_value());
                        } else {
                            s.set_text(&path.get_value(), picked);
                        }
                    });
                }
            >
                <option value="">{field.placeholder.unwrap_or_else(|| "Select...".to_string())}</option>
                {options
                    .into_iter()
                    .map(|option| view! { <option value=option.clone()>{option.clone()}</option> })
                    .collect::<Vec<_>>()}
            </select>
        }
        .into_any(),
        Widget::CheckboxList { options } => view! {
            <div class="space-y-1">
                {options
                    .into_iter()
                    .map(|option| {
                        let option = StoredValue::new(option);
                        view! {
                            <label class="flex items-center gap-2 text-sm text-gray-700">
                                <input
                                    type="checkbox"
                                    prop:checked=move || {
                                        read_state(session, |s| s.list(&path.get_value()).contains(&option.get_value()))
                                            .unwrap_or(false)
                                    }
                                    on:change=move |ev| write_state(session, |s| {
                                        s.toggle_option(&path.get_value(), &option.get_value(), event_target_checked(&ev));
                                    })
                                />
                                {option.get_value()}
                            </label>
                        }
                    })
                    .collect::<Vec<_>>()}
            </div>
        }
        .into_any(),
        Widget::TagInput { items } => {
            let tags = move || read_state(session, |s| s.list(&path.get_value()).to_vec()).unwrap_or_default();
            view! {
                <div class="space-y-2">
                    <div class="flex flex-wrap gap-1">
                        {move || {
                            tags()
                                .into_iter()
                                .enumerate()
                                .map(|(index, tag)| view! {
                                    <span class="inline-flex items-center gap-1 px-2 py-0.5 text-xs bg-teal-100 text-teal-800 rounded-full">
                                        {tag}
                                        <button
                                            type="button"
                                            class="hover:text-red-600"
                                            on:click=move |_| write_state(session, |s| s.remove_tag(&path.get_value(), index))
                                        >
                                            "×"
                                        </button>
                                    </span>
                                })
                                .collect::<Vec<_>>()
                        }}
                    </div>
                    <input
                        type="text"
                        class=INPUT_CLASS
                        placeholder=field.placeholder.unwrap_or_else(|| "Type and press Enter".to_string())
                        prop:value=move || read_state(session, |s| s.draft(&path.get_value()).to_string()).unwrap_or_default()
                        on:input=move |ev| write_state(session, |s| s.set_draft(&path.get_value(), event_target_value(&ev)))
                        on:keydown=move |ev| {
                            let key = TagKey::from_key(&ev.key());
                            let mut consumed = false;
                            write_state(session, |s| consumed = s.tag_key(&path.get_value(), key));
                            if consumed {
                                ev.prevent_default();
                            }
                        }
                    />
                    {items.map(|items| view! {
                        <p class="text-xs text-gray-500">{format!("Items: {}", items.item_type.display_name())}</p>
                    })}
                </div>
            }
            .into_any()
        }
    };

    view! {
        <div>
            <label class="block text-sm font-medium text-gray-700 mb-1">
                {field.label}
                {field.required.then_some(" *")}
            </label>
            {control}
            <Show when=move || error().is_some()>
                <p class="mt-1 text-xs text-red-600">{move || error().unwrap_or_default()}</p>
            </Show>
        </div>
    }
    .into_any()
}
