//! Mutual-Aid Map App
//!
//! Root controller: owns the viewport, view mode, selection and picked
//! location, polls the request list and wires the modals.

use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;

use crate::api::ApiClient;
use crate::components::{BottomSheet, CreateRequestModal, FloatingButtons, MapView, RequestModal};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::identity::DeviceIdentity;
use crate::listing::FetchSequencer;
use crate::models::{BoundingBox, LatLng, ListQuery};
use crate::store::{AppState, AppStateStoreFields};

#[component]
pub fn App(api: ApiClient, config: AppConfig) -> impl IntoView {
    // State
    let store = Store::new(AppState::new());
    let ctx = AppContext::new(signal(0u32));

    // Provide context to all children
    provide_context(store);
    provide_context(ctx);
    provide_context(api.clone());

    let api = StoredValue::new(api);
    let sequencer = StoredValue::new(FetchSequencer::default());
    let page_limit = config.page_limit;
    let poll_interval_ms = config.poll_interval_ms();
    let default_location = config.default_location;
    let token_key = config.device_token_key.clone();

    // Resolve this browser's identity on mount
    Effect::new(move |_| {
        let api = api.get_value();
        let identity = DeviceIdentity::for_browser(&token_key);
        spawn_local(async move {
            match identity.get_or_create(&api).await {
                Ok(token) => {
                    api.set_device_token(Some(token.clone()));
                    store.device_token().set(Some(token));
                }
                Err(e) => log::error!("[APP] Device registration failed: {}", e),
            }
        });
    });

    let load_requests = move |bbox: BoundingBox| {
        let Some(ticket) = sequencer.try_update_value(|s| s.begin()) else {
            return;
        };
        store.loading().set(true);
        let api = api.get_value();
        let query = ListQuery::ranked(bbox, page_limit);
        spawn_local(async move {
            let result = api.list_requests(&query).await;
            let mode = store.mode().get_untracked();
            let Some(outcome) = sequencer.try_update_value(|s| s.apply(ticket, result, mode)) else {
                return;
            };
            if let Some(visible) = outcome.requests {
                log::info!("[APP] Showing {} requests", visible.len());
                store.requests().set(visible);
            }
            store.loading().set(outcome.loading);
        });
    };

    // Load requests when the viewport, mode or trigger changes
    Effect::new(move |_| {
        let trigger = ctx.reload_trigger.get();
        let mode = store.mode().get();
        let Some(bbox) = store.bbox().get() else {
            return;
        };
        log::debug!("[APP] Loading {} ({:?}), trigger={}", bbox.key(), mode, trigger);
        load_requests(bbox);
    });

    // Poll in the background; restarted whenever the viewport or mode changes
    let poller = StoredValue::new_local(None::<Interval>);
    Effect::new(move |_| {
        let _ = store.mode().get();
        let has_bbox = store.bbox().get().is_some();
        poller.set_value(None);
        if !has_bbox {
            return;
        }
        let interval = Interval::new(poll_interval_ms, move || {
            if let Some(bbox) = store.bbox().get_untracked() {
                load_requests(bbox);
            }
        });
        poller.set_value(Some(interval));
    });
    on_cleanup(move || poller.set_value(None));

    let requests = Signal::derive(move || store.requests().get());
    let selected = Signal::derive(move || store.selected_request_id().get());
    let picked = Signal::derive(move || store.picked_location().get());
    let loading = Signal::derive(move || store.loading().get());
    let mode = Signal::derive(move || store.mode().get());

    let on_bounds_change = Callback::new(move |bbox: BoundingBox| store.bbox().set(Some(bbox)));
    let on_pick = Callback::new(move |point: LatLng| store.picked_location().set(Some(point)));
    let on_select = Callback::new(move |id: String| store.selected_request_id().set(Some(id)));
    let on_toggle_mode = Callback::new(move |_: ()| store.mode().update(|m| *m = m.toggled()));
    let on_create = Callback::new(move |_: ()| store.create_open().set(true));
    let close_detail = Callback::new(move |_: ()| store.selected_request_id().set(None));
    let close_create = Callback::new(move |_: ()| store.create_open().set(false));

    view! {
        <div class="app-layout">
            <div class="ranking-banner">
                "Ranked by urgency and vulnerability, not profit."
            </div>

            <MapView
                requests=requests
                selected=selected
                picked=picked
                center=default_location
                zoom=config.default_zoom
                tile_url=config.tile_url.clone()
                tile_attribution=config.tile_attribution.clone()
                on_bounds_change=on_bounds_change
                on_pick=on_pick
                on_select=on_select
            />

            <BottomSheet
                requests=requests
                loading=loading
                selected=selected
                mode=mode
                on_select=on_select
            />

            <FloatingButtons mode=mode on_toggle_mode=on_toggle_mode on_create=on_create />

            {move || store.selected_request_id().get().map(|id| view! {
                <RequestModal request_id=id on_close=close_detail />
            })}

            <Show when=move || store.create_open().get()>
                {move || {
                    let location = store.picked_location().get_untracked().unwrap_or(default_location);
                    view! { <CreateRequestModal picked_location=location on_close=close_create /> }
                }}
            </Show>
        </div>
    }
}
