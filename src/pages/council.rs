use super::fields::FileField;
use super::leave::FormDraft;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardFooter, CardHeader,
    CardTitle, FieldInput, Input, Label, Spinner, Textarea,
};
use crate::content::list;
use crate::models::{Council, CouncilMember};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;

type CouncilForm = FormDraft<Option<Council>>;
type MemberSetter = fn(&mut CouncilMember, String);

fn save_council(app: AppState, form: CouncilForm) {
    let Some(sent) = form.begin_save() else {
        return;
    };
    let Some(record) = sent.clone() else {
        form.save_failed();
        return;
    };
    if let Err(e) = record.validate() {
        app.error(e.to_string());
        form.save_failed();
        return;
    }
    let api = app.api();
    spawn_local(async move {
        match api.save(&record).await {
            Ok(saved) => {
                app.success(format!("{} saved", saved.title));
                form.saved(&sent, Some(Some(saved)));
            }
            Err(e) => {
                app.report(&e);
                form.save_failed();
            }
        }
    });
}

/// Applies a member list edit to the open council.
fn edit_members(
    form: CouncilForm,
    f: impl FnOnce(&mut Vec<CouncilMember>) -> Result<(), list::OutOfBounds>,
) {
    form.edit(|c| match c.as_mut() {
        Some(c) => f(&mut c.members),
        None => Ok(()),
    });
}

#[component]
pub fn CouncilPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let query = RwSignal::new(String::from("Advisory Council"));
    let searching = RwSignal::new(false);
    let form: CouncilForm = FormDraft::new(None, move |form| save_council(app, form));
    // Set when the last lookup found nothing.
    let missing: RwSignal<Option<String>> = RwSignal::new(None);

    let lookup = move || {
        if form.is_dirty() {
            app.error("Save or discard your changes first");
            return;
        }
        let title = query.get_untracked().trim().to_string();
        if title.is_empty() {
            app.error("Council title is required");
            return;
        }
        let api = app.api();
        searching.set(true);
        spawn_local(async move {
            match api.council_by_title(&title).await {
                Ok(Some(found)) => {
                    missing.set(None);
                    form.load(Some(found));
                }
                Ok(None) => {
                    form.load(None);
                    missing.set(Some(title));
                }
                Err(e) => app.report(&e),
            }
            searching.set(false);
        });
    };

    let start_new = move |_| {
        let title = missing.get_untracked().unwrap_or_default();
        missing.set(None);
        form.load(Some(Council {
            title,
            ..Default::default()
        }));
    };

    let text = move |get: fn(&Council) -> String| {
        Signal::derive(move || form.with(|c| c.as_ref().map(get).unwrap_or_default()))
    };
    let set_text = move |set: fn(&mut Council, String)| {
        Callback::new(move |v: String| form.update(|c| if let Some(c) = c.as_mut() { set(c, v) }))
    };

    let member_text = move |i: usize, get: fn(&CouncilMember) -> String| {
        Signal::derive(move || {
            form.with(|c| {
                c.as_ref()
                    .and_then(|c| c.members.get(i))
                    .map(get)
                    .unwrap_or_default()
            })
        })
    };

    let set_member = move |i: usize, set: MemberSetter| {
        Callback::new(move |v: String| {
            edit_members(form, |members| list::update(members, i, |m| set(m, v)))
        })
    };

    let form_key = Memo::new(move |_| {
        form.with(|c| c.as_ref().map(|c| (c.id.clone(), c.members.len())))
    });

    let editor = move || {
        form.revision.track();
        form_key.get().map(|(id, count)| {
            let is_new = id.is_none();
            let members = (0..count)
                .map(|i| {
                    view! {
                        <div class="flex flex-col gap-2 rounded-lg border p-3">
                            <div class="grid gap-2 sm:grid-cols-2">
                                <FieldInput
                                    placeholder="Name"
                                    value=member_text(i, |m| m.name.clone())
                                    on_change=set_member(i, |m, v| m.name = v)
                                />
                                <FieldInput
                                    placeholder="Designation"
                                    value=member_text(i, |m| m.designation.clone())
                                    on_change=set_member(i, |m, v| m.designation = v)
                                />
                            </div>
                            <div class="flex items-center justify-between gap-2">
                                <FileField
                                    value=member_text(i, |m| m.image.clone())
                                    on_uploaded=set_member(i, |m, v| m.image = v)
                                />
                                <div class="flex items-center gap-1">
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Icon
                                        attr:title="Move up"
                                        attr:disabled={i == 0}
                                        on:click=move |_| edit_members(form, |m| list::move_to(m, i, i.saturating_sub(1)))
                                    >
                                        "↑"
                                    </Button>
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Icon
                                        attr:title="Move down"
                                        attr:disabled={i + 1 >= count}
                                        on:click=move |_| edit_members(form, |m| list::move_to(m, i, i + 1))
                                    >
                                        "↓"
                                    </Button>
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Sm
                                        on:click=move |_| edit_members(form, |m| list::remove(m, i).map(drop))
                                    >
                                        "Remove"
                                    </Button>
                                </div>
                            </div>
                        </div>
                    }
                })
                .collect_view();

            view! {
                <Card>
                    <CardHeader>
                        <CardTitle>{if is_new { "New council" } else { "Edit council" }}</CardTitle>
                        <CardDescription>{format!("{count} member(s)")}</CardDescription>
                    </CardHeader>
                    <CardContent>
                        <Label>"Title"</Label>
                        <FieldInput value=text(|c| c.title.clone()) on_change=set_text(|c, v| c.title = v) />
                        <Label>"Description"</Label>
                        <Textarea
                            value=text(|c| c.description.clone())
                            on_change=set_text(|c, v| c.description = v)
                        />
                        <Label>"Members"</Label>
                        {members}
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| edit_members(form, |m| {
                                list::add(m, CouncilMember::default());
                                Ok(())
                            })
                        >
                            "Add member"
                        </Button>
                    </CardContent>
                    <CardFooter>
                        <Button
                            variant=ButtonVariant::Ghost
                            attr:disabled=move || !form.is_dirty() || form.saving.get()
                            on:click=move |_| form.revert()
                        >
                            "Discard changes"
                        </Button>
                        <Button
                            attr:disabled=move || (!is_new && !form.is_dirty()) || form.saving.get()
                            on:click=move |_| form.save()
                        >
                            "Save"
                        </Button>
                    </CardFooter>
                </Card>
            }
        })
    };

    view! {
        <div class="mx-auto flex max-w-3xl flex-col gap-4">
            <h1 class="text-xl font-semibold">"Council"</h1>
            <form
                class="flex items-center gap-2"
                on:submit=move |ev: web_sys::SubmitEvent| {
                    ev.prevent_default();
                    lookup();
                }
            >
                <Input placeholder="Council title" bind_value=query />
                <Button attr:disabled=move || searching.get() || form.is_dirty()>"Find"</Button>
                <Show when=move || searching.get()>
                    <Spinner />
                </Show>
            </form>
            {move || missing.get().map(|title| view! {
                <Card class="py-4">
                    <div class="flex items-center justify-between gap-3 px-5 text-sm">
                        <span>{format!("No council titled \"{title}\" yet.")}</span>
                        <Button size=ButtonSize::Sm on:click=start_new>"Create it"</Button>
                    </div>
                </Card>
            })}
            {editor}
        </div>
    }
}
