use super::fields::{FileField, RichTextField};
use super::humanize;
use super::leave::FormDraft;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, FieldInput,
    Spinner, Textarea,
};
use crate::content::{
    self, is_image_key, shape_key, EditResult, EditorKinds, LeafKind, Node, Path, SectionContent,
};
use crate::models::ContentPage;
use crate::richtext::{self, RichText};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Keeps number fields numeric while their input is edited as text.
fn parse_input(kind: LeafKind, input: String) -> Node {
    if kind == LeafKind::Number {
        let trimmed = input.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Node::Number(i.into());
        }
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Node::Number(n);
        }
    }
    Node::text(input)
}

/// Kinds offered by "Add field".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::EnumIter,
)]
enum NewField {
    #[default]
    Text,
    RichText,
    Image,
    List,
    Group,
}

impl NewField {
    fn label(self) -> &'static str {
        match self {
            NewField::Text => "Text",
            NewField::RichText => "Rich text",
            NewField::Image => "Image",
            NewField::List => "List",
            NewField::Group => "Group",
        }
    }

    fn template(self) -> Node {
        match self {
            NewField::Text | NewField::Image => Node::text(""),
            NewField::RichText => Node::text("<p></p>"),
            NewField::List => Node::array(Vec::new()),
            NewField::Group => Node::empty_object(),
        }
    }

    /// Widget the new field is pinned to.
    fn leaf_kind(self) -> Option<LeafKind> {
        match self {
            NewField::Text => Some(LeafKind::Text),
            NewField::RichText => Some(LeafKind::RichText),
            NewField::Image => Some(LeafKind::Image),
            NewField::List | NewField::Group => None,
        }
    }

    /// Image fields are also recognised by their key after a reload, so make sure the key
    /// says so.
    fn key_for(self, name: &str) -> String {
        let name = name.trim();
        if self == NewField::Image && !is_image_key(Some(name)) {
            format!("{name}Image")
        } else {
            name.to_string()
        }
    }
}

#[derive(Clone, Copy)]
struct PageEditor {
    page: ContentPage,
    app: AppState,
    form: FormDraft<Node>,
    exists: RwSignal<bool>,
    kinds: StoredValue<EditorKinds>,
}

impl PageEditor {
    fn value_at(self, path: &Path) -> Node {
        self.form
            .with(|doc| content::get(doc, path).cloned())
            .unwrap_or_default()
    }

    fn text_at(self, path: &Path) -> String {
        self.value_at(path).display_text()
    }

    fn edit(self, f: impl FnOnce(&Node) -> EditResult<Node>) {
        self.form.edit(|doc| f(doc).map(|next| *doc = next));
    }

    fn set(self, path: &Path, value: Node) {
        self.edit(|doc| content::set_value(doc, path, value));
    }

    fn load(self, loading: RwSignal<bool>) {
        let api = self.app.api();
        spawn_local(async move {
            match api.page_content(self.page).await {
                Ok(doc) => {
                    self.exists.set(doc.is_some());
                    let doc = doc.unwrap_or_else(Node::empty_object);
                    let legacy = richtext::find_legacy_fields(&doc);
                    let (migrated, report) = richtext::migrate_document(&doc, &legacy);

                    self.kinds.set_value(EditorKinds::detect(&migrated));
                    self.form.load(doc);
                    if !report.is_noop() {
                        self.form.apply(migrated);
                        self.app.success(format!(
                            "Converted {} legacy rich-text field(s); save to keep the change",
                            report.migrated.len()
                        ));
                    }
                }
                Err(e) => self.app.report(&e),
            }
            loading.set(false);
        });
    }
}

fn save_page(page: ContentPage, app: AppState, exists: RwSignal<bool>, form: FormDraft<Node>) {
    let Some(doc) = form.begin_save() else {
        return;
    };
    let existing = exists.get_untracked();
    let api = app.api();

    spawn_local(async move {
        match api.save_page_content(page, &doc, existing).await {
            Ok(_) => {
                exists.set(true);
                app.success(format!("{} saved", page.title()));
                form.saved(&doc, None);
            }
            Err(e) => {
                app.report(&e);
                form.save_failed();
            }
        }
    });
}

/// Resolves `/pages/:page` and mounts a fresh editor per page.
#[component]
pub fn ContentPageRoute() -> impl IntoView {
    let params = use_params_map();
    let page = move || {
        params
            .with(|p| p.get("page"))
            .and_then(|slug| ContentPage::from_str(&slug).ok())
    };

    move || match page() {
        Some(page) => view! { <ContentPageEditor page=page /> }.into_any(),
        None => view! { <div class="text-sm text-muted-foreground">"Unknown page"</div> }.into_any(),
    }
}

#[component]
pub fn ContentPageEditor(page: ContentPage) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let exists = RwSignal::new(false);
    let form = FormDraft::new(Node::empty_object(), move |form| {
        save_page(page, app, exists, form)
    });
    let ed = PageEditor {
        page,
        app,
        form,
        exists,
        kinds: StoredValue::new(EditorKinds::default()),
    };
    let loading = RwSignal::new(true);
    ed.load(loading);

    let shape = Memo::new(move |_| form.with(shape_key));
    let body = move || {
        shape.track();
        form.revision.track();
        let doc = form.current();
        ed.kinds.update_value(|k| k.fill(&doc));
        section_view(ed, Path::root(), &doc)
    };

    let status = move || {
        if form.saving.get() {
            "Saving..."
        } else if form.is_dirty() {
            "Unsaved changes"
        } else {
            "All changes saved"
        }
    };

    view! {
        <div class="mx-auto flex max-w-4xl flex-col gap-4">
            <div class="flex items-center justify-between gap-3">
                <div>
                    <h1 class="text-xl font-semibold">{page.title()}</h1>
                    <div class="text-xs text-muted-foreground">{status}</div>
                </div>
                <div class="flex items-center gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || !form.draft.with(|d| d.can_undo())
                        on:click=move |_| form.jump(|d| d.undo())
                    >
                        "Undo"
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || !form.draft.with(|d| d.can_redo())
                        on:click=move |_| form.jump(|d| d.redo())
                    >
                        "Redo"
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
                {body}
            </Show>
        </div>
    }
}

fn text_input(ed: PageEditor, path: &Path, kind: LeafKind, multiline: bool) -> AnyView {
    let read = path.clone();
    let write = path.clone();
    let value = Signal::derive(move || ed.text_at(&read));
    let on_change = Callback::new(move |v: String| ed.set(&write, parse_input(kind, v)));

    if multiline {
        view! { <Textarea value=value on_change=on_change /> }.into_any()
    } else {
        view! { <FieldInput value=value on_change=on_change /> }.into_any()
    }
}

fn item_controls(ed: PageEditor, path: &Path, index: usize, len: usize) -> impl IntoView {
    let (up, down, remove) = (path.clone(), path.clone(), path.clone());

    view! {
        <div class="flex shrink-0 items-center gap-1">
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Move up"
                attr:disabled={index == 0}
                on:click=move |_| ed.edit(|doc| content::move_item(doc, &up, index, index.saturating_sub(1)))
            >
                "↑"
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Move down"
                attr:disabled={index + 1 >= len}
                on:click=move |_| ed.edit(|doc| content::move_item(doc, &down, index, index + 1))
            >
                "↓"
            </Button>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Remove"
                on:click=move |_| ed.edit(|doc| content::remove_item(doc, &remove, index))
            >
                "✕"
            </Button>
        </div>
    }
}

fn add_field_form(ed: PageEditor, path: &Path) -> AnyView {
    let name = RwSignal::new(String::new());
    let kind = RwSignal::new(NewField::default());
    let at = path.clone();

    let on_add = move |_| {
        let raw = name.get_untracked();
        if raw.trim().is_empty() {
            ed.app.error("Field name is required");
            return;
        }
        let field = kind.get_untracked();
        let key = field.key_for(&raw);
        let path = at.key(&key);
        if ed.form.with(|doc| content::get(doc, &path).is_some()) {
            ed.app.error(format!("{} already exists", humanize(&key)));
            return;
        }
        if let Some(leaf) = field.leaf_kind() {
            ed.kinds.update_value(|k| k.pin(&path, leaf));
        }
        ed.set(&path, field.template());
        name.set(String::new());
    };

    let options = NewField::iter()
        .map(|k| view! { <option value=k.as_ref().to_string()>{k.label()}</option> })
        .collect_view();

    view! {
        <div class="flex items-center gap-2 border-t pt-3">
            <FieldInput
                class="max-w-56"
                placeholder="New field name"
                value=Signal::derive(move || name.get())
                on_change=Callback::new(move |v: String| name.set(v))
            />
            <select
                class="h-9 rounded-md border bg-background px-2 text-sm"
                on:change=move |ev| kind.set(NewField::from_str(&event_target_value(&ev)).unwrap_or_default())
            >
                {options}
            </select>
            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_add>
                "Add field"
            </Button>
        </div>
    }
    .into_any()
}

/// Widget for a single value, chosen by its pinned kind.
fn leaf_view(ed: PageEditor, path: Path, kind: LeafKind, node: &Node) -> AnyView {
    match kind {
        LeafKind::Text => {
            let text = node.display_text();
            text_input(ed, &path, kind, text.len() > 80 || text.contains('\n'))
        }
        LeafKind::Number => text_input(ed, &path, kind, false),
        LeafKind::Flag => {
            let read = path.clone();
            view! {
                <input
                    type="checkbox"
                    class="size-4"
                    prop:checked=move || ed.value_at(&read) == Node::Bool(true)
                    on:change=move |ev| ed.set(&path, Node::Bool(event_target_checked(&ev)))
                />
            }
            .into_any()
        }
        LeafKind::RichText => {
            let initial = RichText::from_stored(&serde_json::Value::from(node.clone()));
            view! {
                <RichTextField
                    initial=initial
                    on_change=Callback::new(move |html: RichText| {
                        ed.set(&path, Node::text(html.to_stored()))
                    })
                />
            }
            .into_any()
        }
        LeafKind::Image => {
            let read = path.clone();
            let value = Signal::derive(move || ed.text_at(&read));
            view! {
                <div class="flex flex-col gap-2">
                    {text_input(ed, &path, kind, false)}
                    <FileField
                        value=value
                        on_uploaded=Callback::new(move |url: String| ed.set(&path, Node::text(url)))
                    />
                </div>
            }
            .into_any()
        }
    }
}

/// Editor for the value at `path`. Leaves use their pinned widget; lists and records are
/// laid out from their shape.
fn section_view(ed: PageEditor, path: Path, node: &Node) -> AnyView {
    if let Some(kind) = ed.kinds.with_value(|k| k.kind_at(&path, node)) {
        return leaf_view(ed, path, kind, node);
    }

    match SectionContent::classify(node) {
        SectionContent::Field { value, .. } => {
            let value_path = path.key("value");
            view! {
                <div class="grid gap-2 sm:grid-cols-[12rem_1fr]">
                    {text_input(ed, &path.key("label"), LeafKind::Text, false)}
                    {section_view(ed, value_path, &value)}
                </div>
            }
            .into_any()
        }
        SectionContent::Table { columns, rows } => {
            let len = rows.len();
            let template = rows.first().map(content::blank_template).unwrap_or_default();
            let add_at = path.clone();
            let header = columns
                .iter()
                .map(|c| view! { <th class="px-2 py-1 text-left font-medium">{humanize(c)}</th> })
                .collect_view();
            let body = rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let cells = columns
                        .iter()
                        .map(|c| {
                            let cell = row.field(c).cloned().unwrap_or_default();
                            view! { <td class="px-1 py-1">{section_view(ed, path.index(i).key(c), &cell)}</td> }
                        })
                        .collect_view();
                    view! {
                        <tr>
                            {cells}
                            <td class="px-1">{item_controls(ed, &path, i, len)}</td>
                        </tr>
                    }
                })
                .collect_view();

            view! {
                <div class="flex flex-col gap-2 overflow-x-auto">
                    <table class="w-full text-sm">
                        <thead><tr>{header}<th></th></tr></thead>
                        <tbody>{body}</tbody>
                    </table>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| ed.edit(|doc| content::add_item(doc, &add_at, &template))
                    >
                        "Add row"
                    </Button>
                </div>
            }
            .into_any()
        }
        SectionContent::List(items) => {
            let len = items.len();
            let template = items
                .first()
                .map(content::blank_template)
                .unwrap_or_else(|| Node::text(""));
            let add_at = path.clone();
            let entries = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    view! {
                        <div class="flex items-start gap-2 rounded-lg border bg-background p-3">
                            <div class="flex-1">{section_view(ed, path.index(i), item)}</div>
                            {item_controls(ed, &path, i, len)}
                        </div>
                    }
                })
                .collect_view();

            view! {
                <div class="flex flex-col gap-2">
                    {entries}
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| ed.edit(|doc| content::add_item(doc, &add_at, &template))
                    >
                        "Add item"
                    </Button>
                </div>
            }
            .into_any()
        }
        SectionContent::Group(fields) => {
            let sections = fields
                .iter()
                .map(|(key, value)| {
                    let title = humanize(key);
                    let editor = section_view(ed, path.key(key), value);
                    if path.is_root() {
                        view! {
                            <Card>
                                <CardHeader><CardTitle class="text-base">{title}</CardTitle></CardHeader>
                                <CardContent>{editor}</CardContent>
                            </Card>
                        }
                        .into_any()
                    } else {
                        view! {
                            <div class="flex flex-col gap-1">
                                <div class="text-xs font-medium text-muted-foreground">{title}</div>
                                {editor}
                            </div>
                        }
                        .into_any()
                    }
                })
                .collect_view();

            view! {
                <div class="flex flex-col gap-3">
                    {sections}
                    {add_field_form(ed, &path)}
                </div>
            }
            .into_any()
        }
        SectionContent::Empty
        | SectionContent::Text(_)
        | SectionContent::Number(_)
        | SectionContent::Flag(_)
        | SectionContent::RichText(_)
        | SectionContent::Image(_) => text_input(ed, &path, LeafKind::Text, false),
    }
}
