use crate::api::read_file;
use crate::components::ui::Spinner;
use crate::richtext::RichText;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// `contenteditable` HTML editor.
///
/// The markup is only written on mount; callers re-create the field when the stored value
/// changes underneath it (undo, reload).
#[component]
pub fn RichTextField(
    #[prop(into)] initial: RichText,
    #[prop(into)] on_change: Callback<RichText>,
    #[prop(into, optional)] placeholder: String,
) -> impl IntoView {
    view! {
        <div
            data-name="RichTextField"
            class="prose prose-sm min-h-24 w-full max-w-none rounded-md border bg-background px-3 py-2 text-sm shadow-xs outline-none focus-visible:ring-2 focus-visible:ring-ring/50 empty:before:text-muted-foreground empty:before:content-[attr(data-placeholder)]"
            contenteditable="true"
            data-placeholder=placeholder
            inner_html=initial.as_html().to_string()
            on:input=move |ev| {
                let el = event_target::<web_sys::HtmlElement>(&ev);
                on_change.run(RichText::from_html(el.inner_html()));
            }
        ></div>
    }
}

/// Image picker that uploads straight away and reports the public URL.
#[component]
pub fn FileField(
    #[prop(into)] value: Signal<String>,
    #[prop(into)] on_uploaded: Callback<String>,
    #[prop(default = "image/*")] accept: &'static str,
) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let uploading = RwSignal::new(false);

    let on_change = move |ev: web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        // Picking the same file twice should upload twice.
        input.set_value("");

        let api = app.api();
        uploading.set(true);
        spawn_local(async move {
            let result = match read_file(&file).await {
                Ok(req) => api.upload(req).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(url) => on_uploaded.run(url),
                Err(e) => app.report(&e),
            }
            uploading.set(false);
        });
    };

    view! {
        <div data-name="FileField" class="flex items-center gap-3">
            <Show when=move || !value.get().trim().is_empty()>
                <img src=move || value.get() alt="" class="h-16 w-24 rounded border object-cover" />
            </Show>
            <input
                type="file"
                accept=accept
                class="text-sm file:mr-3 file:rounded-md file:border file:bg-background file:px-3 file:py-1"
                prop:disabled=move || uploading.get()
                on:change=on_change
            />
            <Show when=move || uploading.get()>
                <Spinner />
            </Show>
        </div>
    }
}
