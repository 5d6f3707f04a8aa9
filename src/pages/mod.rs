mod banners;
mod content_page;
mod council;
mod fields;
mod leave;
mod navigation;
mod online_apply;

pub use banners::BannersPage;
pub use content_page::ContentPageRoute;
pub use council::CouncilPage;
pub use navigation::NavigationPage;
pub use online_apply::OnlineApplyPage;

use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardDescription,
    CardHeader, CardTitle, Dialog, DialogDescription, DialogFooter, DialogHeader, DialogTitle,
    Input, Label, ALERT_ERROR, ALERT_SUCCESS,
};
use crate::guard::GuardEvent;
use crate::models::{ContentPage, UserProfile};
use crate::state::{AppContext, NoticeKind};
use leave::{shell_view, Exit, LeaveIntercept, ShellView};
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::use_navigate;
use strum::IntoEnumIterator;

/// Sidebar entries as `(label, route)`.
pub(crate) fn menu() -> Vec<(String, String)> {
    let mut items = vec![
        ("Dashboard".to_string(), "/".to_string()),
        ("Banners".to_string(), "/banners".to_string()),
        ("Council".to_string(), "/council".to_string()),
        ("Online Apply".to_string(), "/online-apply".to_string()),
    ];
    items.extend(
        ContentPage::iter().map(|p| (p.title().to_string(), format!("/pages/{}", p.slug()))),
    );
    items.push(("Navigation".to_string(), "/navigation".to_string()));
    items
}

/// Turns `heroTitle` / `fee_structure` into `Hero Title` / `Fee Structure`.
pub(crate) fn humanize(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        word.push(c);
    }
    if !word.is_empty() {
        words.push(word);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[component]
pub fn AdminShell(children: ChildrenFn) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let navigate = use_navigate();
    let leave = LeaveIntercept::new(Callback::new(move |exit: Exit| match exit {
        Exit::Route(to) => navigate(&to, Default::default()),
        Exit::SignOut => app.session.update(|s| s.logout()),
    }));
    provide_context(leave);

    let unload = window_event_listener(ev::beforeunload, move |e: web_sys::BeforeUnloadEvent| {
        if leave.blocks_unload() {
            e.prevent_default();
            e.set_return_value("");
        }
    });
    on_cleanup(move || unload.remove());

    let view_mode = Memo::new(move |_| {
        let (authenticated, invalidated) =
            app.session.with(|s| (s.is_authenticated(), s.was_invalidated()));
        shell_view(authenticated, invalidated, leave.holds_edits())
    });

    let website = app.frontend_url();
    let user_name = move || {
        app.session.with(|s| {
            s.current_user()
                .and_then(UserProfile::display_name)
                .unwrap_or_else(|| "Editor".to_string())
        })
    };

    let sidebar = move || {
        menu()
            .into_iter()
            .map(|(label, route)| {
                view! {
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="w-full justify-start"
                        on:click=move |_| leave.request(Exit::Route(route.clone()))
                    >
                        {label}
                    </Button>
                }
            })
            .collect_view()
    };

    view! {
        <Show
            when=move || view_mode.get() != ShellView::SignIn
            fallback=|| view! { <SignInPage /> }
        >
            <div class="flex min-h-screen bg-muted/30">
                <aside class="flex w-56 shrink-0 flex-col gap-1 border-r bg-background p-3">
                    <div class="px-2 py-3 text-sm font-semibold">"Campus CMS"</div>
                    {sidebar()}
                    <div class="mt-auto flex flex-col gap-2 border-t pt-3">
                        <a
                            class="px-2 text-sm text-primary underline-offset-4 hover:underline"
                            href=website.clone()
                            target="_blank"
                            rel="noopener"
                        >
                            "Go to website"
                        </a>
                        <div class="px-2 text-xs text-muted-foreground">{user_name}</div>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| leave.request(Exit::SignOut)
                        >
                            "Log out"
                        </Button>
                    </div>
                </aside>
                <main class="flex-1 overflow-auto p-6">{children()}</main>
            </div>
            <LeaveDialog />
            <Dialog open=Signal::derive(move || view_mode.get() == ShellView::Expired && !leave.confirming())>
                <DialogHeader>
                    <DialogTitle>"Session expired"</DialogTitle>
                    <DialogDescription>
                        "Sign in again to keep working. Your unsaved edits stay on this page."
                    </DialogDescription>
                </DialogHeader>
                <SignInForm />
                <DialogFooter>
                    <Button variant=ButtonVariant::Ghost on:click=move |_| leave.request(Exit::SignOut)>
                        "Sign out"
                    </Button>
                </DialogFooter>
            </Dialog>
        </Show>
        <NoticeStack />
    }
}

/// Asks what to do with unsaved edits before leaving the page.
#[component]
fn LeaveDialog() -> impl IntoView {
    let leave = expect_context::<LeaveIntercept>();
    let busy = move || leave.awaiting_save();

    view! {
        <Dialog
            open=Signal::derive(move || leave.confirming())
            on_dismiss=Callback::new(move |_: ()| leave.answer(GuardEvent::Cancel))
        >
            <DialogHeader>
                <DialogTitle>"Unsaved changes"</DialogTitle>
                <DialogDescription>"Save your edits before leaving this page?"</DialogDescription>
            </DialogHeader>
            <DialogFooter>
                <Button
                    variant=ButtonVariant::Ghost
                    attr:disabled=busy
                    on:click=move |_| leave.answer(GuardEvent::Cancel)
                >
                    "Cancel"
                </Button>
                <Button
                    variant=ButtonVariant::Destructive
                    attr:disabled=busy
                    on:click=move |_| leave.answer(GuardEvent::LeaveWithoutSaving)
                >
                    "Leave without saving"
                </Button>
                <Button attr:disabled=busy on:click=move |_| leave.answer(GuardEvent::SaveAndLeave)>
                    "Save & leave"
                </Button>
            </DialogFooter>
        </Dialog>
    }
}

#[component]
fn NoticeStack() -> impl IntoView {
    let app = expect_context::<AppContext>().0;

    view! {
        <div class="fixed right-4 bottom-4 z-50 flex w-80 flex-col gap-2">
            <For
                each=move || app.notices.with(|n| n.items().to_vec())
                key=|n| n.id
                children=move |notice| {
                    let id = notice.id;
                    let tone = match notice.kind {
                        NoticeKind::Success => ALERT_SUCCESS,
                        NoticeKind::Error => ALERT_ERROR,
                    };
                    view! {
                        <Alert
                            class=tone
                            on:click=move |_| app.notices.update(|n| n.dismiss(id))
                        >
                            <AlertDescription>{notice.message}</AlertDescription>
                        </Alert>
                    }
                }
            />
        </div>
    }
}

/// Token form. Tokens are issued by the main site's login.
#[component]
fn SignInForm() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let token = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let t = token.get_untracked().trim().to_string();
        if t.is_empty() {
            app.error("Access token is required");
            return;
        }
        let mut profile = UserProfile::default();
        let n = name.get_untracked();
        if !n.trim().is_empty() {
            profile
                .extra
                .insert("name".to_string(), serde_json::Value::String(n.trim().to_string()));
        }
        app.session.update(|s| s.login(t, profile));
    };

    view! {
        <form class="flex flex-col gap-3 px-5" on:submit=on_submit>
            <Label html_for="token">"Access token"</Label>
            <Input id="token" r#type="password" bind_value=token />
            <Label html_for="name">"Display name"</Label>
            <Input id="name" placeholder="Optional" bind_value=name />
            <Button class="w-full">"Continue"</Button>
        </form>
    }
}

/// Shown when there is no session.
#[component]
pub fn SignInPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let expired = app.session.with_untracked(|s| s.was_invalidated());

    view! {
        <div class="flex min-h-screen items-center justify-center p-6">
            <Card class="w-full max-w-sm">
                <CardHeader>
                    <CardTitle>"Campus CMS"</CardTitle>
                    <CardDescription>"Paste the access token issued by the website login."</CardDescription>
                </CardHeader>
                <Show when=move || expired>
                    <div class="px-5">
                        <Alert class=ALERT_ERROR>
                            <AlertDescription>"Your session has expired. Please sign in again."</AlertDescription>
                        </Alert>
                    </div>
                </Show>
                <SignInForm />
            </Card>
        </div>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let leave = expect_context::<LeaveIntercept>();

    let cards = menu()
        .into_iter()
        .skip(1)
        .map(|(label, route)| {
            view! {
                <Card
                    class="cursor-pointer transition-colors hover:bg-accent"
                    on:click=move |_| leave.request(Exit::Route(route.clone()))
                >
                    <CardHeader>
                        <CardTitle class="text-sm">{label}</CardTitle>
                    </CardHeader>
                </Card>
            }
        })
        .collect_view();

    view! {
        <div class="space-y-4">
            <h1 class="text-xl font-semibold">"Content"</h1>
            <div class="grid gap-3 sm:grid-cols-2 lg:grid-cols-3">{cards}</div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_covers_every_content_page() {
        let routes: Vec<String> = menu().into_iter().map(|(_, r)| r).collect();
        assert_eq!(routes.first().map(String::as_str), Some("/"));
        assert!(routes.contains(&"/pages/feeStructure".to_string()));
        assert!(routes.contains(&"/navigation".to_string()));
        assert_eq!(routes.len(), 5 + ContentPage::iter().count());
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("heroTitle"), "Hero Title");
        assert_eq!(humanize("fee_structure"), "Fee Structure");
        assert_eq!(humanize("hero"), "Hero");
        assert_eq!(humanize("step2Title"), "Step2 Title");
        assert_eq!(humanize(""), "");
    }
}
