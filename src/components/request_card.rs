//! Request Card Component
//!
//! Compact summary of one request in the bottom sheet.

use leptos::prelude::*;

use crate::components::display::{dollars, progress_style};
use crate::models::Request;

const RANK_TOOLTIP: &str = "Prioritized by urgency, severity and funding gap, not profit.";

/// Card with category, funding, urgency badge and progress bar
#[component]
pub fn RequestCard(
    request: Request,
    #[prop(into)] selected: Signal<bool>,
    #[prop(into)] on_select: Callback<String>,
) -> impl IntoView {
    let id = request.id.clone();
    let card_class = move || {
        if selected.get() { "request-card selected" } else { "request-card" }
    };
    let accent = format!("border-left-color: {}", request.category.color());

    view! {
        <div class=card_class style=accent on:click=move |_| on_select.run(id.clone())>
            <div class="request-card-header">
                <div class="request-card-title">
                    <span class="category-icon" title=request.category.as_str()>
                        {request.category.icon()}
                    </span>
                    <div>
                        <span class="category-name">{request.category.as_str()}</span>
                        <span class="funding-line">
                            {format!("{} / {}", dollars(request.funded_amount), dollars(request.funding_goal))}
                        </span>
                    </div>
                </div>
                <span class=request.urgency_window.badge_class()>{request.urgency_window.badge()}</span>
            </div>

            <div class="progress-track">
                <div class="progress-fill" style=progress_style(request.progress())></div>
            </div>

            <div class="request-card-tags">
                <span class="rank-chip" title=RANK_TOOLTIP>
                    {format!("Rank {:.2} 💡", request.rank_score)}
                </span>
                {request.is_high_need().then(|| view! { <span class="high-need-chip">"High need"</span> })}
            </div>
            <div class="request-card-footer">
                <span>{format!("{} left", dollars(request.remaining()))}</span>
            </div>
        </div>
    }
}

/// Placeholder shown while the list loads
#[component]
pub fn RequestCardSkeleton() -> impl IntoView {
    view! {
        <div class="request-card skeleton">
            <div class="skeleton-row">
                <div class="skeleton-circle"></div>
                <div class="skeleton-lines">
                    <div class="skeleton-line wide"></div>
                    <div class="skeleton-line narrow"></div>
                </div>
                <div class="skeleton-pill"></div>
            </div>
            <div class="progress-track"></div>
        </div>
    }
}
