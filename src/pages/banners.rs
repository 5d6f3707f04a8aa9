use super::fields::FileField;
use super::leave::FormDraft;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardFooter, CardHeader,
    CardTitle, FieldInput, Label, Spinner, Textarea,
};
use crate::content::list;
use crate::models::Banner;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// The open banner form; `None` while no form is open.
type BannerForm = FormDraft<Option<Banner>>;

fn save_banner(app: AppState, form: BannerForm, reload: impl Fn() + 'static) {
    let Some(sent) = form.begin_save() else {
        return;
    };
    let Some(banner) = sent.clone() else {
        form.save_failed();
        return;
    };
    if let Err(e) = banner.validate() {
        app.error(e.to_string());
        form.save_failed();
        return;
    }
    let api = app.api();
    spawn_local(async move {
        match api.save(&banner).await {
            Ok(_) => {
                app.success("Banner saved");
                // Closes the form.
                form.saved(&sent, Some(None));
                reload();
            }
            Err(e) => {
                app.report(&e);
                form.save_failed();
            }
        }
    });
}

fn image_row(form: BannerForm, i: usize, len: usize, url: String) -> impl IntoView {
    let edit_images = move |f: fn(&mut Vec<String>, usize) -> Result<(), list::OutOfBounds>| {
        form.edit(|b| match b.as_mut() {
            Some(b) => f(&mut b.banner_image, i),
            None => Ok(()),
        })
    };

    view! {
        <div class="flex items-center gap-2">
            <img src=url.clone() alt="" class="h-12 w-20 rounded border object-cover" />
            <span class="flex-1 truncate text-xs text-muted-foreground">{url}</span>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Move up"
                attr:disabled={i == 0}
                on:click=move |_| edit_images(|v, i| list::move_to(v, i, i.saturating_sub(1)))
            >
                "↑"
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Move down"
                attr:disabled={i + 1 >= len}
                on:click=move |_| edit_images(|v, i| list::move_to(v, i, i + 1))
            >
                "↓"
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Sm
                on:click=move |_| edit_images(|v, i| list::remove(v, i).map(drop))
            >
                "Remove"
            </Button>
        </div>
    }
}

#[component]
pub fn BannersPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let banners: RwSignal<Vec<Banner>> = RwSignal::new(vec![]);
    let loading = RwSignal::new(true);
    let busy = RwSignal::new(false);

    let reload = move || {
        let api = app.api();
        loading.set(true);
        spawn_local(async move {
            match api.list::<Banner>().await {
                Ok(list) => banners.set(list),
                Err(e) => app.report(&e),
            }
            loading.set(false);
        });
    };
    reload();

    let form: BannerForm = FormDraft::new(None, move |form| save_banner(app, form, reload));

    let on_delete = move |id: String| {
        let api = app.api();
        busy.set(true);
        spawn_local(async move {
            match api.delete::<Banner>(&id).await {
                Ok(()) => {
                    app.success("Banner deleted");
                    reload();
                }
                Err(e) => app.report(&e),
            }
            busy.set(false);
        });
    };

    let edit_field = move |f: fn(&mut Banner, String)| {
        Callback::new(move |v: String| form.update(|b| if let Some(b) = b.as_mut() { f(b, v) }))
    };
    let read_field = move |f: fn(&Banner) -> String| {
        Signal::derive(move || form.with(|b| b.as_ref().map(f).unwrap_or_default()))
    };

    // Text inputs read the draft themselves; only opening the form or changing the image
    // list rebuilds it.
    let form_key = Memo::new(move |_| {
        form.with(|b| b.as_ref().map(|b| (b.id.clone(), b.banner_image.clone())))
    });

    let editor = move || {
        form_key.track();
        form.revision.track();
        form.current().map(|banner| {
            let heading = if banner.id.is_some() { "Edit banner" } else { "New banner" };
            let len = banner.banner_image.len();
            let images = banner
                .banner_image
                .into_iter()
                .enumerate()
                .map(|(i, url)| image_row(form, i, len, url))
                .collect_view();

            view! {
                <Card>
                    <CardHeader>
                        <CardTitle>{heading}</CardTitle>
                    </CardHeader>
                    <CardContent>
                        <Label>"Title"</Label>
                        <FieldInput
                            placeholder="Title, inline markup allowed"
                            value=read_field(|b| b.banner_title.clone())
                            on_change=edit_field(|b, v| b.banner_title = v)
                        />
                        <Label>"Content"</Label>
                        <Textarea
                            value=read_field(|b| b.banner_content.clone())
                            on_change=edit_field(|b, v| b.banner_content = v)
                        />
                        <Label>"Images"</Label>
                        {images}
                        <FileField
                            value=Signal::derive(String::new)
                            on_uploaded=edit_field(|b, url| list::add(&mut b.banner_image, url))
                        />
                    </CardContent>
                    <CardFooter>
                        <Button
                            variant=ButtonVariant::Ghost
                            attr:disabled=move || form.is_dirty()
                            on:click=move |_| form.load(None)
                        >
                            "Close"
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            attr:disabled=move || !form.is_dirty() || form.saving.get()
                            on:click=move |_| form.revert()
                        >
                            "Discard changes"
                        </Button>
                        <Button
                            attr:disabled=move || !form.is_dirty() || form.saving.get()
                            on:click=move |_| form.save()
                        >
                            "Save"
                        </Button>
                    </CardFooter>
                </Card>
            }
        })
    };

    let list = move || {
        banners
            .get()
            .into_iter()
            .map(|banner| {
                let for_edit = banner.clone();
                let id = banner.id.clone().unwrap_or_default();
                let title = banner.banner_title.clone();
                let content = banner.banner_content.clone();
                let thumb = banner.banner_image.first().cloned().unwrap_or_default();

                view! {
                    <Card class="py-4">
                        <div class="flex items-center gap-4 px-5">
                            {(!thumb.is_empty()).then(|| view! {
                                <img src=thumb alt="" class="h-14 w-24 rounded border object-cover" />
                            })}
                            <div class="min-w-0 flex-1">
                                <div class="truncate text-sm font-medium" inner_html=title></div>
                                <CardDescription class="truncate">{content}</CardDescription>
                            </div>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                attr:disabled=move || form.is_dirty()
                                on:click=move |_| form.load(Some(for_edit.clone()))
                            >
                                "Edit"
                            </Button>
                            <Button
                                variant=ButtonVariant::Destructive
                                size=ButtonSize::Sm
                                attr:disabled=move || busy.get()
                                on:click=move |_| on_delete(id.clone())
                            >
                                "Delete"
                            </Button>
                        </div>
                    </Card>
                }
            })
            .collect_view()
    };

    view! {
        <div class="mx-auto flex max-w-4xl flex-col gap-4">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-semibold">"Banners"</h1>
                <Button
                    size=ButtonSize::Sm
                    attr:disabled=move || form.is_dirty()
                    on:click=move |_| form.load(Some(Banner::default()))
                >
                    "New banner"
                </Button>
            </div>
            {editor}
            <Show
                when=move || !loading.get()
                fallback=|| view! { <div class="flex justify-center p-8"><Spinner /></div> }
            >
                <Show
                    when=move || !banners.with(Vec::is_empty)
                    fallback=|| view! { <div class="text-sm text-muted-foreground">"No banners yet."</div> }
                >
                    {list}
                </Show>
            </Show>
        </div>
    }
}
