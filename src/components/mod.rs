//! UI Components
//!
//! Leptos components for the map screen and its overlays.

mod map_view;
pub mod display;
mod request_card;
mod bottom_sheet;
mod floating_buttons;
mod request_modal;
mod create_request_modal;

pub use map_view::MapView;
pub use request_card::{RequestCard, RequestCardSkeleton};
pub use bottom_sheet::BottomSheet;
pub use floating_buttons::FloatingButtons;
pub use request_modal::RequestModal;
pub use create_request_modal::CreateRequestModal;
