use leptos::prelude::*;
use tw_merge::tw_merge;

const FIELD_CLASS: &str = "placeholder:text-muted-foreground border-input w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50 disabled:cursor-not-allowed disabled:opacity-50 aria-invalid:border-destructive";

/// Text input bound to a signal.
///
/// Wired by hand with `prop:value` + `on:input` instead of `bind:value`.
#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(optional)] disabled: bool,
    #[prop(optional)] invalid: bool,
    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(FIELD_CLASS, "h-9", class);

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            id=id
            disabled=disabled
            aria-invalid=invalid.then_some("true")
            prop:value=move || bind_value.get()
            on:input=move |ev| bind_value.set(event_target_value(&ev))
        />
    }
}

/// Uncontrolled input: shows `value` and reports each keystroke to `on_change`.
#[component]
pub fn FieldInput(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] placeholder: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(FIELD_CLASS, "h-9", class);

    view! {
        <input
            data-name="FieldInput"
            type="text"
            class=merged_class
            placeholder=placeholder
            prop:value=move || value.get()
            on:input=move |ev| on_change.run(event_target_value(&ev))
        />
    }
}

#[component]
pub fn Textarea(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] placeholder: String,
    #[prop(default = 4)] rows: u32,
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(FIELD_CLASS, "py-2", class);

    view! {
        <textarea
            data-name="Textarea"
            class=merged_class
            placeholder=placeholder
            rows=rows
            prop:value=move || value.get()
            on:input=move |ev| on_change.run(event_target_value(&ev))
        ></textarea>
    }
}
