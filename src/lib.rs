//! Admin console for the campus website's content.

mod api;
mod app;
mod components;
mod config;
mod content;
mod guard;
mod logging;
mod models;
mod pages;
mod richtext;
mod session;
mod state;
mod storage;

use crate::app::App;
use crate::config::EnvConfig;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = EnvConfig::from_build_env();
    logging::init(&config.log_level);
    tracing::info!(api = %config.api_base_url, "starting console");

    mount_to_body(move || view! { <App config=config.clone() /> });
}
