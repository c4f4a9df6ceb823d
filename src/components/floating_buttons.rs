//! Floating Buttons Component
//!
//! Crisis-mode toggle and the "Request Help" entry point.

use leptos::prelude::*;

use crate::listing::ViewMode;

#[component]
pub fn FloatingButtons(
    #[prop(into)] mode: Signal<ViewMode>,
    #[prop(into)] on_toggle_mode: Callback<()>,
    #[prop(into)] on_create: Callback<()>,
) -> impl IntoView {
    let toggle_class = move || {
        if mode.get().is_crisis() { "crisis-toggle active" } else { "crisis-toggle" }
    };

    view! {
        <div class="floating-buttons">
            <button type="button" class=toggle_class on:click=move |_| on_toggle_mode.run(())>
                <span>{move || if mode.get().is_crisis() { "🔴" } else { "⚪" }}</span>
                "Crisis Mode"
            </button>
            <button type="button" class="request-help-btn" on:click=move |_| on_create.run(())>
                <span class="plus">"+"</span>
                "Request Help"
            </button>
        </div>
    }
}
