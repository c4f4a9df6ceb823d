//! Request Detail State
//!
//! State machine behind one open request modal:
//! `Loading -> Loaded -> {Donating, Claiming, Delivering} -> Loaded`,
//! or `Loading -> Errored`. Transitions are pure; the modal performs the
//! network calls the `begin_*` methods authorize.

use crate::error::ValidationError;
use crate::models::{Request, RequestPatch, Status};

/// Server-side cap on a single donation
pub const MAX_DONATION: f64 = 2000.0;

/// One-tap donation buttons
pub const PRESET_AMOUNTS: [f64; 3] = [5.0, 10.0, 25.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    Loading,
    Loaded,
    Donating,
    Claiming,
    Delivering,
    /// Initial load failed; terminal for this modal
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub phase: DetailPhase,
    pub detail: Option<Request>,
    pub error: Option<String>,
    /// Raw text of the "Other" amount field
    pub custom_amount: String,
}

impl Default for DetailState {
    fn default() -> Self {
        Self::new()
    }
}

/// A positive, finite amount; anything else is ignored
pub fn parse_donation(input: &str) -> Option<f64> {
    let amount: f64 = input.trim().parse().ok()?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

impl DetailState {
    pub fn new() -> Self {
        Self {
            phase: DetailPhase::Loading,
            detail: None,
            error: None,
            custom_amount: String::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            DetailPhase::Donating | DetailPhase::Claiming | DetailPhase::Delivering
        )
    }

    fn status(&self) -> Option<Status> {
        self.detail.as_ref().map(|d| d.status)
    }

    /// Donation controls are shown for open requests only
    pub fn donation_open(&self) -> bool {
        self.status() == Some(Status::Open)
    }

    /// Claim is shown for funded requests only
    pub fn claim_open(&self) -> bool {
        self.status() == Some(Status::Funded)
    }

    pub fn delivery_open(&self, device_token: Option<&str>) -> bool {
        self.detail
            .as_ref()
            .is_some_and(|d| d.status == Status::Claimed && d.is_claimed_by(device_token))
    }

    /// Directions are useful once someone can go shopping
    pub fn shows_directions(&self) -> bool {
        matches!(
            self.status(),
            Some(Status::Funded | Status::Claimed | Status::Delivered)
        )
    }

    pub fn load_succeeded(&mut self, request: Request) {
        self.detail = Some(request);
        self.phase = DetailPhase::Loaded;
        self.error = None;
    }

    pub fn load_failed(&mut self, message: String) {
        self.error = Some(message);
        self.phase = if self.detail.is_some() {
            DetailPhase::Loaded
        } else {
            DetailPhase::Errored
        };
    }

    /// Authorize a donation of `amount`.
    ///
    /// Returns the amount to send, or None when nothing should be sent:
    /// non-positive amounts are dropped silently, oversized ones leave an
    /// inline message.
    pub fn begin_donate(&mut self, amount: f64) -> Option<f64> {
        if self.phase != DetailPhase::Loaded || !self.donation_open() {
            return None;
        }
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        if amount > MAX_DONATION {
            self.error = Some(ValidationError::DonationTooLarge { max: MAX_DONATION }.to_string());
            return None;
        }
        self.phase = DetailPhase::Donating;
        self.error = None;
        Some(amount)
    }

    /// Authorize a donation from the "Other" field
    pub fn begin_custom_donate(&mut self) -> Option<f64> {
        let amount = parse_donation(&self.custom_amount)?;
        self.begin_donate(amount)
    }

    pub fn donate_succeeded(&mut self, patch: RequestPatch) {
        if let Some(detail) = self.detail.as_mut() {
            detail.merge(patch);
        }
        self.custom_amount.clear();
        self.phase = DetailPhase::Loaded;
    }

    pub fn begin_claim(&mut self) -> bool {
        if self.phase != DetailPhase::Loaded || !self.claim_open() {
            return false;
        }
        self.phase = DetailPhase::Claiming;
        self.error = None;
        true
    }

    pub fn begin_deliver(&mut self, device_token: Option<&str>) -> bool {
        if self.phase != DetailPhase::Loaded || !self.delivery_open(device_token) {
            return false;
        }
        self.phase = DetailPhase::Delivering;
        self.error = None;
        true
    }

    /// Claim or delivery done; `refreshed` is the re-fetched detail
    pub fn action_refreshed(&mut self, refreshed: Request) {
        self.detail = Some(refreshed);
        self.phase = DetailPhase::Loaded;
    }

    /// Any in-flight action failed; keep the detail, show the message
    pub fn action_failed(&mut self, message: String) {
        if self.phase == DetailPhase::Donating {
            self.custom_amount.clear();
        }
        self.error = Some(message);
        self.phase = DetailPhase::Loaded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::make_request;
    use crate::models::Claim;

    fn loaded(status: Status) -> DetailState {
        let mut state = DetailState::new();
        state.load_succeeded(make_request("r1", status));
        state
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let mut state = DetailState::new();
        state.load_failed("not found".into());
        assert_eq!(state.phase, DetailPhase::Errored);
        assert!(!state.donation_open());
        assert!(!state.begin_claim());
    }

    #[test]
    fn test_invalid_donations_send_nothing() {
        let mut state = loaded(Status::Open);
        assert_eq!(state.begin_donate(0.0), None);
        assert_eq!(state.begin_donate(-5.0), None);
        assert_eq!(state.begin_donate(f64::NAN), None);
        state.custom_amount = "ten".into();
        assert_eq!(state.begin_custom_donate(), None);
        state.custom_amount = String::new();
        assert_eq!(state.begin_custom_donate(), None);
        assert_eq!(state.phase, DetailPhase::Loaded);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_oversized_donation_shows_message() {
        let mut state = loaded(Status::Open);
        assert_eq!(state.begin_donate(2500.0), None);
        assert_eq!(state.phase, DetailPhase::Loaded);
        assert!(state.error.is_some());
    }

    #[test]
    fn test_donation_only_when_open() {
        let mut state = loaded(Status::Funded);
        assert!(!state.donation_open());
        assert_eq!(state.begin_donate(10.0), None);
    }

    #[test]
    fn test_donation_completes_funding() {
        let mut state = DetailState::new();
        let mut request = make_request("r1", Status::Open);
        request.funding_goal = 50.0;
        request.funded_amount = 40.0;
        state.load_succeeded(request);

        assert_eq!(state.begin_donate(10.0), Some(10.0));
        assert_eq!(state.phase, DetailPhase::Donating);
        assert!(state.is_busy());

        state.donate_succeeded(RequestPatch {
            funded_amount: Some(50.0),
            status: Some(Status::Funded),
            ..Default::default()
        });

        let detail = state.detail.as_ref().unwrap();
        assert_eq!(detail.status, Status::Funded);
        assert_eq!(detail.progress(), 1.0);
        assert_eq!(state.phase, DetailPhase::Loaded);
        assert!(state.claim_open());
        assert!(!state.donation_open());
    }

    #[test]
    fn test_custom_amount_cleared_after_attempt() {
        let mut state = loaded(Status::Open);
        state.custom_amount = "12.5".into();
        assert_eq!(state.begin_custom_donate(), Some(12.5));
        state.action_failed("request not open/fundable".into());
        assert_eq!(state.custom_amount, "");
        assert_eq!(state.error.as_deref(), Some("request not open/fundable"));
        assert!(state.detail.is_some());
    }

    #[test]
    fn test_claim_only_when_funded() {
        for status in [Status::Open, Status::Claimed, Status::Delivered, Status::Cancelled] {
            let mut state = loaded(status);
            assert!(!state.begin_claim(), "{:?}", status);
        }
    }

    #[test]
    fn test_claim_then_refresh_shows_claimed() {
        let mut state = loaded(Status::Funded);
        assert!(state.begin_claim());
        assert_eq!(state.phase, DetailPhase::Claiming);
        // Second click while in flight is ignored
        assert!(!state.begin_claim());

        let mut refreshed = make_request("r1", Status::Claimed);
        refreshed.claim = Some(Claim { helper_id: "dev_me".into(), claimed_at: None });
        state.action_refreshed(refreshed);

        assert_eq!(state.detail.as_ref().unwrap().status, Status::Claimed);
        assert!(!state.claim_open());
        assert!(state.shows_directions());
    }

    #[test]
    fn test_claim_failure_keeps_detail() {
        let mut state = loaded(Status::Funded);
        assert!(state.begin_claim());
        state.action_failed("not_claimable".into());
        assert_eq!(state.phase, DetailPhase::Loaded);
        assert_eq!(state.detail.as_ref().unwrap().status, Status::Funded);
    }

    #[test]
    fn test_delivery_only_for_claiming_helper() {
        let mut request = make_request("r1", Status::Claimed);
        request.claim = Some(Claim { helper_id: "dev_me".into(), claimed_at: None });
        let mut state = DetailState::new();
        state.load_succeeded(request);

        assert!(!state.begin_deliver(Some("dev_someone_else")));
        assert!(!state.begin_deliver(None));
        assert!(state.begin_deliver(Some("dev_me")));
        state.action_refreshed(make_request("r1", Status::Delivered));
        assert!(!state.delivery_open(Some("dev_me")));
    }

    #[test]
    fn test_parse_donation() {
        assert_eq!(parse_donation(" 25 "), Some(25.0));
        assert_eq!(parse_donation("0"), None);
        assert_eq!(parse_donation("inf"), None);
        assert_eq!(parse_donation("abc"), None);
    }
}
