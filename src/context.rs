//! Application Context
//!
//! Shared signals provided via Leptos Context API.

use leptos::prelude::*;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Bumped after any mutation to re-fetch the list - read
    pub reload_trigger: ReadSignal<u32>,
    /// Bumped after any mutation to re-fetch the list - write
    set_reload_trigger: WriteSignal<u32>,
}

impl AppContext {
    pub fn new(reload_trigger: (ReadSignal<u32>, WriteSignal<u32>)) -> Self {
        Self {
            reload_trigger: reload_trigger.0,
            set_reload_trigger: reload_trigger.1,
        }
    }

    /// Trigger a reload of the request list
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }
}
