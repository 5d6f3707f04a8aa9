use super::leave::FormDraft;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, FieldInput, Spinner,
};
use crate::content::list::{self, OutOfBounds};
use crate::models::{validate_tree, NavItem, NavKind, NavNode, NavSection};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;

type NavForm = FormDraft<Vec<NavNode>>;

/// Layout of the tree without its text, so typing doesn't rebuild the form.
fn outline(tree: &[NavNode]) -> Vec<(NavKind, Vec<usize>)> {
    tree.iter()
        .map(|n| {
            let sections = n
                .sections
                .iter()
                .flatten()
                .map(|s| s.items.len())
                .collect();
            (n.kind, sections)
        })
        .collect()
}

/// Runs `f` on the sections of node `node`, creating the list on first use.
fn edit_sections<R>(
    tree: &mut [NavNode],
    node: usize,
    f: impl FnOnce(&mut Vec<NavSection>) -> Result<R, OutOfBounds>,
) -> Result<R, OutOfBounds> {
    list::update(tree, node, |n| f(n.sections.get_or_insert_with(Vec::new)))?
}

fn edit_items<R>(
    tree: &mut [NavNode],
    node: usize,
    section: usize,
    f: impl FnOnce(&mut Vec<NavItem>) -> Result<R, OutOfBounds>,
) -> Result<R, OutOfBounds> {
    edit_sections(tree, node, |sections| list::update(sections, section, |s| f(&mut s.items))?)
}

fn save_tree(app: AppState, form: NavForm) {
    let Some(nodes) = form.begin_save() else {
        return;
    };
    if let Err(e) = validate_tree(&nodes) {
        app.error(e.to_string());
        form.save_failed();
        return;
    }
    let api = app.api();
    spawn_local(async move {
        match api.save_navigation(&nodes).await {
            Ok(()) => {
                app.success("Navigation saved");
                form.saved(&nodes, None);
            }
            Err(e) => {
                app.report(&e);
                form.save_failed();
            }
        }
    });
}

#[component]
pub fn NavigationPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let form: NavForm = FormDraft::new(vec![], move |form| save_tree(app, form));
    let loading = RwSignal::new(true);

    let api = app.api();
    spawn_local(async move {
        match api.navigation().await {
            Ok(nodes) => form.load(nodes),
            Err(e) => app.report(&e),
        }
        loading.set(false);
    });

    let node_text = move |i: usize, get: fn(&NavNode) -> String| {
        Signal::derive(move || form.with(|t| t.get(i).map(get).unwrap_or_default()))
    };
    let set_node = move |i: usize, set: fn(&mut NavNode, String)| {
        Callback::new(move |v: String| form.edit(|t| list::update(t, i, |n| set(n, v))))
    };
    let section_text = move |i: usize, s: usize| {
        Signal::derive(move || {
            form.with(|t| {
                t.get(i)
                    .and_then(|n| n.sections.as_ref()?.get(s).map(|sec| sec.header.clone()))
                    .unwrap_or_default()
            })
        })
    };
    let item_text = move |i: usize, s: usize, k: usize, get: fn(&NavItem) -> String| {
        Signal::derive(move || {
            form.with(|t| {
                t.get(i)
                    .and_then(|n| n.sections.as_ref()?.get(s)?.items.get(k).map(get))
                    .unwrap_or_default()
            })
        })
    };
    let set_item = move |i: usize, s: usize, k: usize, set: fn(&mut NavItem, String)| {
        Callback::new(move |v: String| {
            form.edit(|t| edit_items(t, i, s, |items| list::update(items, k, |it| set(it, v))))
        })
    };

    let shape = Memo::new(move |_| form.with(|t| outline(t)));

    let section_view = move |i: usize, s: usize, items: usize| {
        let rows = (0..items)
            .map(|k| {
                view! {
                    <div class="flex items-center gap-2">
                        <FieldInput
                            placeholder="Label"
                            value=item_text(i, s, k, |it| it.label.clone())
                            on_change=set_item(i, s, k, |it, v| it.label = v)
                        />
                        <FieldInput
                            placeholder="/path"
                            value=item_text(i, s, k, |it| it.link.clone())
                            on_change=set_item(i, s, k, |it, v| it.link = v)
                        />
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            attr:title="Remove item"
                            on:click=move |_| form.edit(|t| edit_items(t, i, s, |items| list::remove(items, k).map(drop)))
                        >
                            "✕"
                        </Button>
                    </div>
                }
            })
            .collect_view();

        view! {
            <div class="flex flex-col gap-2 rounded-lg border p-3">
                <div class="flex items-center gap-2">
                    <FieldInput
                        class="font-medium"
                        placeholder="Section header"
                        value=section_text(i, s)
                        on_change=Callback::new(move |v: String| form.edit(|t| {
                            edit_sections(t, i, |sections| list::update(sections, s, |sec| sec.header = v))
                        }))
                    />
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        on:click=move |_| form.edit(|t| edit_sections(t, i, |sections| list::remove(sections, s).map(drop)))
                    >
                        "Remove section"
                    </Button>
                </div>
                {rows}
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| form.edit(|t| edit_items(t, i, s, |items| {
                        list::add(items, NavItem::default());
                        Ok(())
                    }))
                >
                    "Add item"
                </Button>
            </div>
        }
    };

    let nodes = move || {
        form.revision.track();
        let layout = shape.get();
        let len = layout.len();
        layout
            .into_iter()
            .enumerate()
            .map(|(i, (kind, sections))| {
                let body = match kind {
                    NavKind::Link => view! {
                        <FieldInput
                            placeholder="/path"
                            value=node_text(i, |n| n.link.clone().unwrap_or_default())
                            on_change=set_node(i, |n, v| n.link = Some(v))
                        />
                    }
                    .into_any(),
                    NavKind::Group => {
                        let groups = sections
                            .into_iter()
                            .enumerate()
                            .map(|(s, items)| section_view(i, s, items))
                            .collect_view();
                        view! {
                            <div class="flex flex-col gap-2">
                                {groups}
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| form.edit(|t| edit_sections(t, i, |sections| {
                                        list::add(sections, NavSection::default());
                                        Ok(())
                                    }))
                                >
                                    "Add section"
                                </Button>
                            </div>
                        }
                        .into_any()
                    }
                };

                view! {
                    <Card class="py-4">
                        <CardContent>
                            <div class="flex items-center gap-2">
                                <FieldInput
                                    class="font-medium"
                                    placeholder="Title"
                                    value=node_text(i, |n| n.title.clone())
                                    on_change=set_node(i, |n, v| n.title = v)
                                />
                                <select
                                    class="h-9 rounded-md border bg-background px-2 text-sm"
                                    on:change=move |ev| {
                                        let kind = if event_target_value(&ev) == "group" {
                                            NavKind::Group
                                        } else {
                                            NavKind::Link
                                        };
                                        form.edit(|t| list::update(t, i, |n| {
                                            *n = std::mem::take(n).with_kind(kind);
                                        }));
                                    }
                                >
                                    <option value="link" selected={kind == NavKind::Link}>"Link"</option>
                                    <option value="group" selected={kind == NavKind::Group}>"Group"</option>
                                </select>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    attr:title="Move up"
                                    attr:disabled={i == 0}
                                    on:click=move |_| form.edit(|t| list::move_to(t, i, i.saturating_sub(1)))
                                >
                                    "↑"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    attr:title="Move down"
                                    attr:disabled={i + 1 >= len}
                                    on:click=move |_| form.edit(|t| list::move_to(t, i, i + 1))
                                >
                                    "↓"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    attr:title="Remove"
                                    on:click=move |_| form.edit(|t| list::remove(t, i).map(drop))
                                >
                                    "✕"
                                </Button>
                            </div>
                            {body}
                        </CardContent>
                    </Card>
                }
            })
            .collect_view()
    };

    view! {
        <div class="mx-auto flex max-w-3xl flex-col gap-4">
            <div class="flex items-center justify-between">
                <div>
                    <h1 class="text-xl font-semibold">"Navigation"</h1>
                    <CardDescription>"Menu of the public website: links, or groups of sections."</CardDescription>
                </div>
                <div class="flex items-center gap-2">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:disabled=move || !form.is_dirty() || form.saving.get()
                        on:click=move |_| form.revert()
                    >
                        "Discard changes"
                    </Button>
                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || !form.is_dirty() || form.saving.get()
                        on:click=move |_| form.save()
                    >
                        "Save"
                    </Button>
                </div>
            </div>
            <Show
                when=move || !loading.get()
                fallback=|| view! { <div class="flex justify-center p-8"><Spinner /></div> }
            >
                {nodes}
                <div class="flex gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| form.update(|t| list::add(t, NavNode::link("", "")))
                    >
                        "Add link"
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| form.update(|t| list::add(t, NavNode::group("", vec![])))
                    >
                        "Add group"
                    </Button>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_ignores_text() {
        let a = vec![
            NavNode::link("Home", "/"),
            NavNode::group(
                "Programs",
                vec![NavSection {
                    header: "UG".into(),
                    items: vec![NavItem {
                        label: "B.Tech".into(),
                        link: "/btech".into(),
                    }],
                }],
            ),
        ];
        let mut b = a.clone();
        b[0].title = "Start".into();
        assert_eq!(outline(&a), outline(&b));
        assert_eq!(outline(&a), vec![(NavKind::Link, vec![]), (NavKind::Group, vec![1])]);

        b[1] = b[1].clone().with_kind(NavKind::Link);
        assert_ne!(outline(&a), outline(&b));
    }

    #[test]
    fn test_item_edits_reach_only_existing_sections() {
        let mut tree = vec![
            NavNode::link("Home", "/"),
            NavNode::group("Programs", vec![NavSection::default()]),
        ];
        let add = |items: &mut Vec<NavItem>| {
            list::add(items, NavItem::default());
            Ok(())
        };
        assert!(edit_items(&mut tree, 1, 0, add).is_ok());
        assert_eq!(outline(&tree)[1], (NavKind::Group, vec![1]));

        assert_eq!(
            edit_items(&mut tree, 1, 1, add),
            Err(OutOfBounds { index: 1, len: 1 })
        );
        assert_eq!(
            edit_items(&mut tree, 5, 0, add),
            Err(OutOfBounds { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_section_removal_keeps_the_rest() {
        let mut tree = vec![NavNode::group(
            "Programs",
            vec![
                NavSection { header: "UG".into(), items: vec![] },
                NavSection { header: "PG".into(), items: vec![] },
            ],
        )];
        edit_sections(&mut tree, 0, |sections| list::remove(sections, 0).map(drop)).unwrap();
        let headers: Vec<&str> = tree[0]
            .sections
            .iter()
            .flatten()
            .map(|s| s.header.as_str())
            .collect();
        assert_eq!(headers, ["PG"]);
    }
}
