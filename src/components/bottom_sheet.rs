//! Bottom Sheet Component
//!
//! Lists visible requests, split into "Open / Funded" and "Claimed".

use leptos::prelude::*;

use crate::components::{RequestCard, RequestCardSkeleton};
use crate::listing::{group_sections, ViewMode};
use crate::models::Request;

/// Sliding panel under the map
#[component]
pub fn BottomSheet(
    #[prop(into)] requests: Signal<Vec<Request>>,
    #[prop(into)] loading: Signal<bool>,
    #[prop(into)] selected: Signal<Option<String>>,
    #[prop(into)] mode: Signal<ViewMode>,
    #[prop(into)] on_select: Callback<String>,
) -> impl IntoView {
    let sections = Memo::new(move |_| group_sections(&requests.get()));

    let heading_class = move || {
        if mode.get().is_crisis() { "sheet-heading crisis" } else { "sheet-heading" }
    };
    let heading = move || {
        if mode.get().is_crisis() { "Urgent Need" } else { "Nearby requests" }
    };

    // Key on every field a card displays so updates re-render the card
    let card_key = |r: &Request| {
        (
            r.id.clone(),
            r.status,
            r.funded_amount.to_bits(),
            r.funding_goal.to_bits(),
            r.rank_score.to_bits(),
        )
    };
    let card = move |r: Request| {
        let id = r.id.clone();
        let is_selected = Signal::derive(move || selected.get().as_deref() == Some(id.as_str()));
        view! {
            <li>
                <RequestCard request=r selected=is_selected on_select=on_select />
            </li>
        }
    };

    view! {
        <div class="bottom-sheet">
            <div class="sheet-handle"><div class="handle-bar"></div></div>
            <div class="sheet-body">
                <h2 class=heading_class>{heading}</h2>
                <Show
                    when=move || !loading.get()
                    fallback=|| view! {
                        <div class="card-list">
                            <RequestCardSkeleton />
                            <RequestCardSkeleton />
                            <RequestCardSkeleton />
                        </div>
                    }
                >
                    <section class="sheet-section">
                        <h3 class="section-title">"Open / Funded"</h3>
                        <ul class="card-list">
                            <For
                                each=move || sections.get().open_and_funded
                                key=card_key
                                children=card
                            />
                        </ul>
                        <Show when=move || sections.with(|s| s.open_and_funded.is_empty())>
                            <p class="empty-note">"No open or funded requests in this area."</p>
                        </Show>
                    </section>

                    <section class="sheet-section">
                        <h3 class="section-title">"Claimed"</h3>
                        <ul class="card-list">
                            <For
                                each=move || sections.get().claimed
                                key=card_key
                                children=card
                            />
                        </ul>
                        <Show when=move || sections.with(|s| s.claimed.is_empty())>
                            <p class="empty-note">"No claimed requests yet."</p>
                        </Show>
                    </section>
                </Show>
            </div>
        </div>
    }
}
