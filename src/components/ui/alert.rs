use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border bg-background px-4 py-3 text-sm shadow-sm"}
    clx! {AlertDescription, p, "text-sm leading-relaxed"}
}

pub use components::*;

pub const ALERT_SUCCESS: &str = "border-emerald-300 bg-emerald-50 text-emerald-900";
pub const ALERT_ERROR: &str = "border-destructive/40 bg-destructive/5 text-destructive";
