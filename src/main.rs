//! Mutual-Aid Map Frontend Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod detail;
mod error;
mod identity;
mod leaflet;
mod listing;
mod models;
mod store;
mod wizard;

use api::ApiClient;
use app::App;
use config::AppConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    let config = AppConfig::from_env();
    let origin = web_sys::window().and_then(|w| w.location().origin().ok());
    let base_url = match config.resolve_api_base(origin.as_deref()) {
        Ok(url) => url,
        Err(e) => {
            log::error!("[APP] Invalid API base {:?}: {}", config.api_base, e);
            return;
        }
    };
    log::info!("[APP] Using API at {}", base_url);

    let api = ApiClient::new(base_url);
    mount_to_body(move || view! { <App api=api.clone() config=config.clone() /> });
}
