use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::*;

mod components {
    use super::*;
    clx! {DialogHeader, div, "flex flex-col gap-2 text-center sm:text-left"}
    clx! {DialogTitle, h3, "text-lg leading-none font-semibold"}
    clx! {DialogDescription, p, "text-muted-foreground text-sm"}
    clx! {DialogFooter, footer, "flex flex-col-reverse gap-2 sm:flex-row sm:justify-end"}
}

pub use components::*;

/// Modal shown while `open` is true. Clicking the backdrop calls `on_dismiss`.
#[component]
pub fn Dialog(
    #[prop(into)] open: Signal<bool>,
    #[prop(into, optional)] on_dismiss: Option<Callback<()>>,
    #[prop(optional, into)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "fixed top-1/2 left-1/2 z-50 flex w-full max-w-[calc(100%-2rem)] -translate-x-1/2 -translate-y-1/2 flex-col gap-4 rounded-2xl border bg-background p-6 shadow-lg sm:max-w-md",
        class
    );
    let children = StoredValue::new(children);

    view! {
        <Show when=move || open.get()>
            <div
                data-name="DialogBackdrop"
                class="fixed inset-0 z-40 bg-black/50"
                on:click=move |_| {
                    if let Some(cb) = on_dismiss {
                        cb.run(());
                    }
                }
            />
            <div data-name="DialogContent" role="dialog" aria-modal="true" class=merged_class.clone()>
                {children.with_value(|c| c())}
            </div>
        </Show>
    }
}
