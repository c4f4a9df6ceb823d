//! Frontend Models
//!
//! Data structures matching the mutual-aid API payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request category (drives marker colour and icon)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Meds,
    Groceries,
    Shelter,
    Transport,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Meds => "meds",
            Category::Groceries => "groceries",
            Category::Shelter => "shelter",
            Category::Transport => "transport",
            Category::Other => "other",
        }
    }

    /// Marker and card accent colour
    pub fn color(self) -> &'static str {
        match self {
            Category::Meds => "#dc2626",
            Category::Groceries => "#16a34a",
            Category::Shelter => "#2563eb",
            Category::Transport => "#9333ea",
            Category::Other => "#6b7280",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Meds => "💊",
            Category::Groceries => "🛒",
            Category::Shelter => "🏠",
            Category::Transport => "🚗",
            Category::Other => "📦",
        }
    }
}

/// How soon the requester needs help
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyWindow {
    Now,
    Today,
    #[serde(other)]
    Week,
}

impl UrgencyWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyWindow::Now => "now",
            UrgencyWindow::Today => "today",
            UrgencyWindow::Week => "week",
        }
    }

    /// Badge text shown on cards
    pub fn badge(self) -> &'static str {
        match self {
            UrgencyWindow::Now => "NOW",
            UrgencyWindow::Today => "TODAY",
            UrgencyWindow::Week => "WEEK",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            UrgencyWindow::Now => "urgency-badge urgency-now",
            UrgencyWindow::Today => "urgency-badge urgency-today",
            UrgencyWindow::Week => "urgency-badge urgency-week",
        }
    }
}

/// Request lifecycle status.
///
/// The server moves a request forward only:
/// `open -> funded -> claimed -> delivered`, or to `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Funded,
    Claimed,
    Delivered,
    Cancelled,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Funded => "funded",
            Status::Claimed => "claimed",
            Status::Delivered => "delivered",
            Status::Cancelled => "cancelled",
        }
    }

    /// Open or funded: someone can still donate or claim
    pub fn is_actionable(self) -> bool {
        matches!(self, Status::Open | Status::Funded)
    }

    /// Delivered or cancelled: no longer shown anywhere
    pub fn is_closed(self) -> bool {
        matches!(self, Status::Delivered | Status::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Visible map viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// `south,west,north,east` - both the `bbox` query value and the change-detection key
    pub fn key(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopPrice {
    pub shop: String,
    pub price: f64,
    #[serde(default)]
    pub link: String,
}

/// One line of a request's shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shop_prices: Vec<ShopPrice>,
}

fn default_qty() -> f64 {
    1.0
}

fn default_unit() -> String {
    "unit".to_string()
}

impl RequestItem {
    /// "2 box bandages"
    pub fn summary(&self) -> String {
        format!("{} {} {}", self.qty, self.unit, self.name)
    }

    pub fn cheapest_offer(&self) -> Option<&ShopPrice> {
        self.shop_prices
            .iter()
            .filter(|offer| offer.price.is_finite())
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub helper_id: String,
    #[serde(default)]
    pub claimed_at: Option<String>,
}

/// A help request as served by the API.
///
/// List responses carry only the card fields; text, items and ranking
/// reason arrive with the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub category: Category,
    pub urgency_window: UrgencyWindow,
    pub severity: u8,
    pub status: Status,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub items: Vec<RequestItem>,
    #[serde(default)]
    pub estimated_total: f64,
    #[serde(default)]
    pub requester_afford: f64,
    #[serde(default)]
    pub funding_goal: f64,
    #[serde(default)]
    pub funded_amount: f64,
    #[serde(default)]
    pub rank_score: f64,
    #[serde(default)]
    pub rank_reason: String,
    #[serde(default)]
    pub claim: Option<Claim>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// funded / goal clamped to [0, 1]; a non-positive goal counts as fully funded
pub fn clamp_progress(funded_amount: f64, funding_goal: f64) -> f64 {
    if funding_goal <= 0.0 {
        return 1.0;
    }
    let ratio = funded_amount / funding_goal;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

impl Request {
    pub fn progress(&self) -> f64 {
        clamp_progress(self.funded_amount, self.funding_goal)
    }

    pub fn remaining(&self) -> f64 {
        (self.funding_goal - self.funded_amount).max(0.0)
    }

    pub fn is_high_need(&self) -> bool {
        self.severity >= 4
    }

    pub fn location(&self) -> LatLng {
        LatLng { lat: self.lat, lng: self.lng }
    }

    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.lat, self.lng
        )
    }

    /// Whether `device_token` is the helper who claimed this request
    pub fn is_claimed_by(&self, device_token: Option<&str>) -> bool {
        match (&self.claim, device_token) {
            (Some(claim), Some(token)) => !token.is_empty() && claim.helper_id == token,
            _ => false,
        }
    }

    /// Overwrite local fields with whatever the server sent back
    pub fn merge(&mut self, patch: RequestPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(funded_amount) = patch.funded_amount {
            self.funded_amount = funded_amount;
        }
        if let Some(funding_goal) = patch.funding_goal {
            self.funding_goal = funding_goal;
        }
        if let Some(rank_score) = patch.rank_score {
            self.rank_score = rank_score;
        }
        if let Some(rank_reason) = patch.rank_reason {
            self.rank_reason = rank_reason;
        }
        if patch.claim.is_some() {
            self.claim = patch.claim;
        }
    }
}

/// Partial request returned by donate / claim / create / delivered
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestPatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub funded_amount: Option<f64>,
    #[serde(default)]
    pub funding_goal: Option<f64>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub rank_score: Option<f64>,
    #[serde(default)]
    pub rank_reason: Option<String>,
    #[serde(default)]
    pub claim: Option<Claim>,
}

/// AI-parsed proposal shown before a request is created
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Draft {
    pub category: Category,
    pub urgency_window: UrgencyWindow,
    pub severity: u8,
    #[serde(default)]
    pub items: Vec<RequestItem>,
    #[serde(default)]
    pub estimated_total: f64,
}

// ========================
// Request / Response Bodies
// ========================

#[derive(Debug, Deserialize)]
pub struct DeviceResponse {
    pub device_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub requests: Vec<Request>,
}

#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub request: Request,
}

#[derive(Debug, Deserialize)]
pub struct PatchResponse {
    pub request: RequestPatch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvokeResponse {
    pub request_draft: Draft,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokeAiPayload {
    pub text: String,
    pub location: LatLng,
    pub requester_afford: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRequestPayload {
    pub raw_text: String,
    pub category: Category,
    pub urgency_window: UrgencyWindow,
    pub severity: u8,
    pub items: Vec<RequestItem>,
    pub estimated_total: f64,
    pub requester_afford: f64,
    pub location: LatLng,
}

#[derive(Debug, Serialize)]
pub struct DonatePayload {
    pub amount: f64,
}

/// The map always asks for the server's ranking order
pub const LIST_SORT: &str = "rank";

/// Parameters of `GET /requests`
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub bbox: Option<BoundingBox>,
    pub status: Option<Status>,
    pub limit: u32,
}

impl ListQuery {
    /// Rank-sorted page constrained to a viewport
    pub fn ranked(bbox: BoundingBox, limit: u32) -> Self {
        Self {
            bbox: Some(bbox),
            status: None,
            limit,
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(bbox) = &self.bbox {
            pairs.push(("bbox", bbox.key()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs.push(("sort", LIST_SORT.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_request(id: &str, status: Status) -> Request {
        Request {
            id: id.to_string(),
            category: Category::Groceries,
            urgency_window: UrgencyWindow::Week,
            severity: 2,
            status,
            lat: 42.36,
            lng: -71.06,
            raw_text: String::new(),
            items: Vec::new(),
            estimated_total: 50.0,
            requester_afford: 0.0,
            funding_goal: 50.0,
            funded_amount: 0.0,
            rank_score: 0.1,
            rank_reason: String::new(),
            claim: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(clamp_progress(40.0, 50.0), 0.8);
        assert_eq!(clamp_progress(80.0, 50.0), 1.0);
        assert_eq!(clamp_progress(-5.0, 50.0), 0.0);
        assert_eq!(clamp_progress(0.0, 0.0), 1.0);
        assert_eq!(clamp_progress(f64::NAN, 50.0), 0.0);
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut req = make_request("a", Status::Funded);
        req.funded_amount = 60.0;
        assert_eq!(req.remaining(), 0.0);
        req.funded_amount = 15.0;
        assert_eq!(req.remaining(), 35.0);
    }

    #[test]
    fn test_list_entry_without_detail_fields() {
        let json = r#"{
            "id": "65f0",
            "category": "meds",
            "urgency_window": "now",
            "severity": 5,
            "status": "open",
            "lat": 42.36,
            "lng": -71.05,
            "estimated_total": 20.0,
            "requester_afford": 5.0,
            "funding_goal": 15.0,
            "funded_amount": 0.0,
            "progress": 0.0,
            "rank_score": 0.91
        }"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert_eq!(req.category, Category::Meds);
        assert_eq!(req.urgency_window, UrgencyWindow::Now);
        assert!(req.items.is_empty());
        assert!(req.claim.is_none());
        assert_eq!(req.rank_reason, "");
    }

    #[test]
    fn test_unknown_category_falls_back_to_other() {
        let category: Category = serde_json::from_str(r#""pets""#).unwrap();
        assert_eq!(category, Category::Other);
        let urgency: UrgencyWindow = serde_json::from_str(r#""someday""#).unwrap();
        assert_eq!(urgency, UrgencyWindow::Week);
    }

    #[test]
    fn test_donation_patch_funds_request() {
        let mut req = make_request("r1", Status::Open);
        req.funded_amount = 40.0;
        let patch: RequestPatch = serde_json::from_str(
            r#"{"id":"r1","funded_amount":50.0,"funding_goal":50.0,"progress":1.0,
                "status":"funded","rank_score":0.4,"rank_reason":"fully funded"}"#,
        )
        .unwrap();
        req.merge(patch);
        assert_eq!(req.status, Status::Funded);
        assert_eq!(req.funded_amount, 50.0);
        assert_eq!(req.progress(), 1.0);
        assert_eq!(req.rank_reason, "fully funded");
        assert_eq!(req.category, Category::Groceries);
    }

    #[test]
    fn test_claim_patch_keeps_funding_fields() {
        let mut req = make_request("r1", Status::Funded);
        req.funded_amount = 50.0;
        let patch: RequestPatch = serde_json::from_str(
            r#"{"id":"r1","status":"claimed","claim":{"helper_id":"dev_abc","claimed_at":"2024-03-01T10:00:00"}}"#,
        )
        .unwrap();
        req.merge(patch);
        assert_eq!(req.status, Status::Claimed);
        assert_eq!(req.funded_amount, 50.0);
        assert!(req.is_claimed_by(Some("dev_abc")));
        assert!(!req.is_claimed_by(Some("dev_other")));
        assert!(!req.is_claimed_by(None));
    }

    #[test]
    fn test_list_query_pairs() {
        let bbox = BoundingBox { south: 42.3, west: -71.1, north: 42.4, east: -71.0 };
        let query = ListQuery::ranked(bbox, 200);
        assert_eq!(
            query.to_pairs(),
            vec![
                ("bbox", "42.3,-71.1,42.4,-71".to_string()),
                ("sort", "rank".to_string()),
                ("limit", "200".to_string()),
            ]
        );

        let open_only = ListQuery { status: Some(Status::Open), ..ListQuery::ranked(bbox, 50) };
        assert!(open_only.to_pairs().contains(&("status", "open".to_string())));
    }

    #[test]
    fn test_cheapest_offer() {
        let item = RequestItem {
            name: "insulin".into(),
            qty: 1.0,
            unit: "vial".into(),
            notes: String::new(),
            shop_prices: vec![
                ShopPrice { shop: "A".into(), price: 30.0, link: String::new() },
                ShopPrice { shop: "B".into(), price: 24.5, link: String::new() },
            ],
        };
        assert_eq!(item.cheapest_offer().map(|o| o.shop.as_str()), Some("B"));
        assert_eq!(item.summary(), "1 vial insulin");
    }
}
