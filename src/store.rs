//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::listing::ViewMode;
use crate::models::{BoundingBox, LatLng, Request, RequestPatch};

/// Root controller state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Filtered, rank-ordered requests in the viewport
    pub requests: Vec<Request>,
    /// A list fetch is in flight
    pub loading: bool,
    /// Current map viewport (None until the map reports one)
    pub bbox: Option<BoundingBox>,
    pub mode: ViewMode,
    /// Request whose detail modal is open
    pub selected_request_id: Option<String>,
    /// Location chosen by tapping the map
    pub picked_location: Option<LatLng>,
    pub create_open: bool,
    /// This browser's identity, once known
    pub device_token: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Merge a server-returned partial update into the listed copy
pub fn store_merge_request(store: &AppStore, patch: RequestPatch) {
    let Some(id) = patch.id.clone() else {
        return;
    };
    if let Some(request) = store.requests().write().iter_mut().find(|r| r.id == id) {
        request.merge(patch);
    }
}
