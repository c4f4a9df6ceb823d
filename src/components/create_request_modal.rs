//! Create Request Modal Component
//!
//! Describe need, confirm the AI draft, then submit.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiClient;
use crate::components::display::{dollars, percent};
use crate::context::AppContext;
use crate::models::{LatLng, RequestItem};
use crate::wizard::{CreateWizard, WizardStep, MAX_TEXT_LEN};

fn item_line(item: &RequestItem) -> String {
    match item.cheapest_offer() {
        Some(offer) => format!("{} · from {} at {}", item.summary(), dollars(offer.price), offer.shop),
        None => item.summary(),
    }
}

#[component]
pub fn CreateRequestModal(
    picked_location: LatLng,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let api = StoredValue::new(expect_context::<ApiClient>());
    let wizard = RwSignal::new(CreateWizard::new(picked_location));

    let step = Memo::new(move |_| wizard.with(|w| w.step));
    let in_flight = move || wizard.with(|w| w.in_flight);
    let error = move || wizard.with(|w| w.error.clone());

    let parse = move || {
        let Some(payload) = wizard.try_update(|w| w.begin_parse()).flatten() else {
            return;
        };
        let api = api.get_value();
        spawn_local(async move {
            match api.invoke_ai(&payload).await {
                Ok(response) => {
                    log::info!(
                        "[CREATE] Draft parsed ({} items, confidence {:.2})",
                        response.request_draft.items.len(),
                        response.confidence
                    );
                    wizard.update(|w| w.parse_succeeded(response.request_draft, response.confidence));
                }
                Err(e) => {
                    log::warn!("[CREATE] AI parse failed: {}", e);
                    wizard.update(|w| w.parse_failed(e.user_message("AI parse failed")));
                }
            }
        });
    };

    let submit = move || {
        let Some(payload) = wizard.try_update(|w| w.begin_submit()).flatten() else {
            return;
        };
        let api = api.get_value();
        spawn_local(async move {
            match api.create_request(&payload).await {
                Ok(created) => {
                    log::info!("[CREATE] Created request {}", created.id.as_deref().unwrap_or("?"));
                    wizard.update(|w| w.submit_succeeded());
                    ctx.reload();
                }
                Err(e) => {
                    log::warn!("[CREATE] Create failed: {}", e);
                    wizard.update(|w| w.submit_failed(e.user_message("Failed to create request")));
                }
            }
        });
    };

    let input_view = move || {
        view! {
            <p class="muted">
                {format!("Location: {}", picked_location)}
            </p>
            <textarea
                class="need-input"
                rows="4"
                maxlength=MAX_TEXT_LEN.to_string()
                placeholder="Describe what you need, e.g. insulin by tonight, can't leave home"
                prop:value=move || wizard.with(|w| w.text.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    wizard.update(|w| w.text = value);
                }
            ></textarea>
            <p class="char-count">
                {move || format!("{}/{}", wizard.with(|w| w.text.chars().count()), MAX_TEXT_LEN)}
            </p>
            {move || error().map(|message| view! { <p class="error-text">{message}</p> })}
            <button
                type="button"
                class="primary-btn"
                disabled=move || !wizard.with(|w| w.can_submit_text())
                on:click=move |_| parse()
            >
                {move || if in_flight() { "Parsing…" } else { "Continue" }}
            </button>
        }
    };

    let summary_view = move || {
        let Some(draft) = wizard.with_untracked(|w| w.draft.clone()) else {
            return ().into_any();
        };
        let confidence = wizard.with_untracked(|w| w.confidence);
        view! {
            <div class="summary-card">
                <div class="summary-row">
                    <span class="category-icon">{draft.category.icon()}</span>
                    <span class="summary-category">{draft.category.as_str()}</span>
                    <span class=draft.urgency_window.badge_class()>
                        {draft.urgency_window.badge()}
                    </span>
                </div>
                <p class="muted">
                    {format!(
                        "Severity {}/5 · Estimated {} · Confidence {}",
                        draft.severity,
                        dollars(draft.estimated_total),
                        percent(confidence)
                    )}
                </p>
                {(!draft.items.is_empty()).then(|| view! {
                    <ul class="item-list">
                        {draft.items.iter().map(|item| view! { <li>{item_line(item)}</li> }).collect_view()}
                    </ul>
                })}
            </div>
            <label class="field-label">
                "How much can you contribute? ($)"
                <input
                    type="number"
                    min="0"
                    step="1"
                    placeholder="0"
                    prop:value=move || wizard.with(|w| w.afford.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        wizard.update(|w| w.afford = value);
                    }
                />
            </label>
            {move || error().map(|message| view! { <p class="error-text">{message}</p> })}
            <button
                type="button"
                class="primary-btn"
                disabled=in_flight
                on:click=move |_| submit()
            >
                {move || if in_flight() { "Submitting…" } else { "Submit request" }}
            </button>
        }
        .into_any()
    };

    let done_view = move || {
        view! {
            <div class="done-block">
                <p class="done-icon">"✓"</p>
                <p>"Your request is live. Neighbors nearby can now see and fund it."</p>
                <button type="button" class="primary-btn" on:click=move |_| on_close.run(())>
                    "Close"
                </button>
            </div>
        }
    };

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.run(())>
            <div class="modal-panel" on:click=|ev| ev.stop_propagation()>
                <div class="modal-handle"><div class="handle-bar"></div></div>
                <div class="modal-body">
                    <div class="detail-header">
                        <h2>{move || step.get().title()}</h2>
                        <button type="button" class="close-btn" aria-label="Close" on:click=move |_| on_close.run(())>
                            "✕"
                        </button>
                    </div>
                    {move || match step.get() {
                        WizardStep::Input => input_view().into_any(),
                        WizardStep::Summary => summary_view(),
                        WizardStep::Done => done_view().into_any(),
                    }}
                </div>
            </div>
        </div>
    }
}
