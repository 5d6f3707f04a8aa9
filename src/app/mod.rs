use crate::config::EnvConfig;
use crate::pages::{
    AdminShell, BannersPage, ContentPageRoute, CouncilPage, DashboardPage, NavigationPage,
    OnlineApplyPage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App(config: EnvConfig) -> impl IntoView {
    provide_context(AppContext(AppState::new(config)));

    // Every route sits inside the shell, which also gates on the session.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=move || view! {
                    <AdminShell>
                        <DashboardPage />
                    </AdminShell>
                } />
                <Route path=path!("banners") view=move || view! {
                    <AdminShell>
                        <BannersPage />
                    </AdminShell>
                } />
                <Route path=path!("council") view=move || view! {
                    <AdminShell>
                        <CouncilPage />
                    </AdminShell>
                } />
                <Route path=path!("online-apply") view=move || view! {
                    <AdminShell>
                        <OnlineApplyPage />
                    </AdminShell>
                } />
                <Route path=path!("pages/:page") view=move || view! {
                    <AdminShell>
                        <ContentPageRoute />
                    </AdminShell>
                } />
                <Route path=path!("navigation") view=move || view! {
                    <AdminShell>
                        <NavigationPage />
                    </AdminShell>
                } />
            </Routes>
        </Router>
    }
}
