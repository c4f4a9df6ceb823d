//! Request Modal Component
//!
//! Detail view for one request with donate, claim and delivery actions.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiClient;
use crate::components::display::{dollars, progress_style};
use crate::context::AppContext;
use crate::detail::{DetailPhase, DetailState, PRESET_AMOUNTS};
use crate::error::ApiError;
use crate::models::Request;
use crate::store::{store_merge_request, use_app_store, AppStateStoreFields};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ModalBody {
    Loading,
    Errored,
    Ready,
}

async fn claim_and_refresh(api: &ApiClient, id: &str) -> Result<Request, ApiError> {
    api.claim(id).await?;
    api.get_request(id).await
}

async fn deliver_and_refresh(api: &ApiClient, id: &str) -> Result<Request, ApiError> {
    api.mark_delivered(id).await?;
    api.get_request(id).await
}

/// Modal for the selected request; one instance per selection
#[component]
pub fn RequestModal(
    request_id: String,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let api = StoredValue::new(expect_context::<ApiClient>());
    let store = use_app_store();
    let request_id = StoredValue::new(request_id);
    let state = RwSignal::new(DetailState::new());

    // Load detail on mount
    Effect::new(move |_| {
        let api = api.get_value();
        let id = request_id.get_value();
        spawn_local(async move {
            match api.get_request(&id).await {
                Ok(request) => state.update(|s| s.load_succeeded(request)),
                Err(e) => {
                    log::warn!("[DETAIL] Failed to load {}: {}", id, e);
                    state.update(|s| s.load_failed(e.user_message("Failed to load")));
                }
            }
        });
    });

    // None = use the "Other" field
    let donate = move |preset: Option<f64>| {
        let amount = state
            .try_update(|s| match preset {
                Some(amount) => s.begin_donate(amount),
                None => s.begin_custom_donate(),
            })
            .flatten();
        let Some(amount) = amount else {
            return;
        };
        let api = api.get_value();
        let id = request_id.get_value();
        spawn_local(async move {
            match api.donate(&id, amount).await {
                Ok(patch) => {
                    log::info!("[DETAIL] Donated {} to {}", amount, id);
                    store_merge_request(&store, patch.clone());
                    state.update(|s| s.donate_succeeded(patch));
                    ctx.reload();
                }
                Err(e) => {
                    log::warn!("[DETAIL] Donation to {} failed: {}", id, e);
                    state.update(|s| s.action_failed(e.user_message("Donation failed")));
                }
            }
        });
    };

    let claim = move || {
        if !state.try_update(|s| s.begin_claim()).unwrap_or(false) {
            return;
        }
        let api = api.get_value();
        let id = request_id.get_value();
        spawn_local(async move {
            match claim_and_refresh(&api, &id).await {
                Ok(refreshed) => {
                    state.update(|s| s.action_refreshed(refreshed));
                    ctx.reload();
                }
                Err(e) => {
                    log::warn!("[DETAIL] Claim of {} failed: {}", id, e);
                    state.update(|s| s.action_failed(e.user_message("Claim failed")));
                }
            }
        });
    };

    let deliver = move || {
        let token = store.device_token().get_untracked();
        if !state.try_update(|s| s.begin_deliver(token.as_deref())).unwrap_or(false) {
            return;
        }
        let api = api.get_value();
        let id = request_id.get_value();
        spawn_local(async move {
            match deliver_and_refresh(&api, &id).await {
                Ok(refreshed) => {
                    state.update(|s| s.action_refreshed(refreshed));
                    ctx.reload();
                }
                Err(e) => {
                    log::warn!("[DETAIL] Delivery of {} failed: {}", id, e);
                    state.update(|s| s.action_failed(e.user_message("Delivery failed")));
                }
            }
        });
    };

    let body = Memo::new(move |_| {
        state.with(|s| match (s.phase, s.detail.is_some()) {
            (DetailPhase::Loading, _) => ModalBody::Loading,
            (DetailPhase::Errored, _) | (_, false) => ModalBody::Errored,
            _ => ModalBody::Ready,
        })
    });
    let detail = Memo::new(move |_| state.with(|s| s.detail.clone()));
    let busy = move || state.with(|s| s.is_busy());
    let error = move || state.with(|s| s.error.clone());

    let ready_view = move || {
        // Header content does not change after load
        let Some(snapshot) = detail.get_untracked() else {
            return ().into_any();
        };
        let funding = move || {
            detail.with(|d| {
                d.as_ref()
                    .map(|d| (d.funded_amount, d.funding_goal, d.progress()))
                    .unwrap_or_default()
            })
        };
        let directions = move || detail.with(|d| d.as_ref().map(Request::directions_url).unwrap_or_default());

        view! {
            <div class="detail-header">
                <div class="detail-title">
                    <span class="category-icon large">{snapshot.category.icon()}</span>
                    <div>
                        <h2>{snapshot.category.as_str()}</h2>
                        <p class="muted">
                            {format!("Urgency: {} · Severity {}/5", snapshot.urgency_window.as_str(), snapshot.severity)}
                        </p>
                    </div>
                </div>
                <button type="button" class="close-btn" aria-label="Close" on:click=move |_| on_close.run(())>
                    "✕"
                </button>
            </div>

            <p class="raw-text">{snapshot.raw_text.clone()}</p>

            {move || detail.with(|d| {
                d.as_ref()
                    .filter(|d| !d.rank_reason.is_empty())
                    .map(|d| view! {
                        <div class="rank-reason">
                            <span>"💡"</span>
                            <span>{format!("AI prioritized: {}", d.rank_reason)}</span>
                        </div>
                    })
            })}

            <div class="chip-row">
                {snapshot.is_high_need().then(|| view! { <span class="high-need-chip">"High need"</span> })}
                <span class="chip">"Vulnerability-aware ranking"</span>
            </div>

            {(!snapshot.items.is_empty()).then(|| view! {
                <ul class="item-list">
                    {snapshot.items.iter().map(|item| {
                        let line = if item.notes.is_empty() {
                            item.summary()
                        } else {
                            format!("{} ({})", item.summary(), item.notes)
                        };
                        view! { <li>{line}</li> }
                    }).collect_view()}
                </ul>
            })}

            <div class="funding-block">
                <div class="funding-labels">
                    <span>"Funding progress"</span>
                    <span>{move || {
                        let (funded, goal, _) = funding();
                        format!("{} / {}", dollars(funded), dollars(goal))
                    }}</span>
                </div>
                <div class="progress-track large">
                    <div class="progress-fill" style=move || progress_style(funding().2)></div>
                </div>
            </div>

            {move || error().map(|message| view! { <p class="error-text">{message}</p> })}

            <Show when=move || state.with(|s| s.donation_open())>
                <div class="donate-block">
                    <p class="muted">"Donate"</p>
                    <div class="donate-row">
                        {PRESET_AMOUNTS.iter().map(|&amount| view! {
                            <button
                                type="button"
                                class="donate-btn"
                                disabled=busy
                                on:click=move |_| donate(Some(amount))
                            >
                                {dollars(amount)}
                            </button>
                        }).collect_view()}
                        <div class="custom-amount">
                            <input
                                type="number"
                                min="1"
                                step="1"
                                placeholder="Other"
                                prop:value=move || state.with(|s| s.custom_amount.clone())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    state.update(|s| s.custom_amount = value);
                                }
                            />
                            <button
                                type="button"
                                class="donate-btn"
                                disabled=move || busy() || state.with(|s| s.custom_amount.is_empty())
                                on:click=move |_| donate(None)
                            >
                                "Give"
                            </button>
                        </div>
                    </div>
                </div>
            </Show>

            <Show when=move || state.with(|s| s.claim_open())>
                <button
                    type="button"
                    class="claim-btn"
                    disabled=busy
                    on:click=move |_| claim()
                >
                    {move || if state.with(|s| s.phase == DetailPhase::Claiming) { "Claiming…" } else { "Claim" }}
                </button>
            </Show>

            <Show when=move || {
                let token = store.device_token().get();
                state.with(|s| s.delivery_open(token.as_deref()))
            }>
                <button
                    type="button"
                    class="deliver-btn"
                    disabled=busy
                    on:click=move |_| deliver()
                >
                    {move || if state.with(|s| s.phase == DetailPhase::Delivering) { "Saving…" } else { "Mark delivered" }}
                </button>
            </Show>

            <Show when=move || state.with(|s| s.shows_directions())>
                <a class="directions-link" href=directions target="_blank" rel="noopener noreferrer">
                    "Open in Google Maps"
                </a>
            </Show>
        }
        .into_any()
    };

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.run(())>
            <div class="modal-panel" on:click=|ev| ev.stop_propagation()>
                <div class="modal-handle"><div class="handle-bar"></div></div>
                <div class="modal-body">
                    {move || match body.get() {
                        ModalBody::Loading => view! {
                            <div class="skeleton-block">
                                <div class="skeleton-line title"></div>
                                <div class="skeleton-line"></div>
                                <div class="skeleton-box"></div>
                            </div>
                        }.into_any(),
                        ModalBody::Errored => view! {
                            <div class="detail-header">
                                <p class="error-text">{move || error().unwrap_or_default()}</p>
                                <button type="button" class="close-btn" aria-label="Close" on:click=move |_| on_close.run(())>
                                    "✕"
                                </button>
                            </div>
                        }.into_any(),
                        ModalBody::Ready => ready_view(),
                    }}
                </div>
            </div>
        </div>
    }
}
