//! Application Configuration
//!
//! Defaults for the API endpoint, polling and map, with builder-style overrides.

use std::time::Duration;

use url::Url;

use crate::error::ApiError;
use crate::models::LatLng;

/// API prefix used when no `MUTUAL_AID_API_URL` was set at build time
pub const DEFAULT_API_BASE: &str = "/v1";

/// Local-storage key holding the device token
pub const DEVICE_TOKEN_KEY: &str = "crisis_mutual_aid_device_token";

/// Boston, used until the user taps the map
pub const DEFAULT_LOCATION: LatLng = LatLng { lat: 42.3601, lng: -71.0589 };

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Absolute or origin-relative API root
    pub api_base: String,
    pub poll_interval: Duration,
    /// `limit` sent with every list fetch
    pub page_limit: u32,
    pub default_location: LatLng,
    pub default_zoom: u8,
    pub tile_url: String,
    pub tile_attribution: String,
    pub device_token_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval: Duration::from_secs(10),
            page_limit: 200,
            default_location: DEFAULT_LOCATION,
            default_zoom: 13,
            tile_url: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png".to_string(),
            tile_attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>"
                .to_string(),
            device_token_key: DEVICE_TOKEN_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults plus the build-time overrides
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            option_env!("MUTUAL_AID_API_URL"),
            option_env!("MUTUAL_AID_POLL_SECS"),
            option_env!("MUTUAL_AID_PAGE_LIMIT"),
        )
    }

    /// Apply raw override values; blank or unparsable ones are ignored
    pub fn with_overrides(
        mut self,
        api_base: Option<&str>,
        poll_secs: Option<&str>,
        page_limit: Option<&str>,
    ) -> Self {
        if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
            self = self.with_api_base(base);
        }
        match poll_secs.map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => self = self.with_poll_interval(Duration::from_secs(secs)),
            Some(_) => log::warn!("[CONFIG] Ignoring invalid MUTUAL_AID_POLL_SECS"),
            None => {}
        }
        match page_limit.map(|v| v.trim().parse::<u32>()) {
            Some(Ok(limit)) => self = self.with_page_limit(limit),
            Some(Err(_)) => log::warn!("[CONFIG] Ignoring invalid MUTUAL_AID_PAGE_LIMIT"),
            None => {}
        }
        self
    }

    pub fn with_api_base(mut self, value: &str) -> Self {
        self.api_base = value.to_string();
        self
    }

    pub fn with_poll_interval(mut self, value: Duration) -> Self {
        self.poll_interval = value;
        self
    }

    pub fn with_page_limit(mut self, value: u32) -> Self {
        self.page_limit = value.clamp(1, 1000);
        self
    }

    pub fn poll_interval_ms(&self) -> u32 {
        u32::try_from(self.poll_interval.as_millis()).unwrap_or(u32::MAX)
    }

    /// Resolve `api_base` against the page origin when it is relative
    pub fn resolve_api_base(&self, origin: Option<&str>) -> Result<Url, ApiError> {
        resolve_base_url(&self.api_base, origin)
    }
}

pub fn resolve_base_url(raw: &str, origin: Option<&str>) -> Result<Url, ApiError> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = origin.ok_or(url::ParseError::RelativeUrlWithoutBase)?;
            Ok(Url::parse(origin)?.join(raw)?)
        }
        Err(e) => Err(e.into()),
    }
}
