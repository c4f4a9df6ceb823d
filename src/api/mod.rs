//! API Client
//!
//! HTTP bindings to the mutual-aid API, organized by resource.

mod ai;
mod device;
mod requests;

use std::sync::{Arc, RwLock};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{detail_from_body, ApiError};

/// Header carrying the device identity on every call
pub const DEVICE_TOKEN_HEADER: &str = "X-Device-Token";

/// Shared handle to the API. Cloning is cheap; clones share the device token.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    http_client: Client,
    device_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http_client: Client::new(),
            device_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Token attached to subsequent calls
    pub fn set_device_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.device_token.write() {
            *guard = token;
        }
    }

    pub fn device_token(&self) -> Option<String> {
        self.device_token.read().ok().and_then(|guard| guard.clone())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        join_endpoint(&self.base_url, segments)
    }

    /// Attach identity, send, and decode a JSON body or the server's error detail
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.device_token() {
            Some(token) => request.header(DEVICE_TOKEN_HEADER, token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = detail_from_body(&body).unwrap_or_default();
            log::warn!("[API] request failed: {} {}", status.as_u16(), detail);
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Append path segments to the API root, percent-encoding each one
pub fn join_endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::Url(url::ParseError::EmptyHost))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod http_tests {
    use super::*;
    use crate::models::{BoundingBox, ListQuery, Status};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let base = Url::parse(&format!("{}/v1", server.uri())).unwrap();
        ApiClient::new(base)
    }

    fn area() -> ListQuery {
        ListQuery::ranked(
            BoundingBox { south: 42.3, west: -71.1, north: 42.4, east: -71.0 },
            200,
        )
    }

    #[tokio::test]
    async fn test_list_without_token_omits_header() {
        let server = MockServer::start().await;

        // Any call carrying a token is rejected
        Mock::given(header_exists(DEVICE_TOKEN_HEADER))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "unexpected token"})))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"requests": []})))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let requests = api.list_requests(&area()).await.unwrap();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_token_sends_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/requests"))
            .and(header(DEVICE_TOKEN_HEADER, "dev_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requests": [{
                    "id": "r1",
                    "category": "meds",
                    "urgency_window": "today",
                    "severity": 4,
                    "status": "open",
                    "lat": 42.36,
                    "lng": -71.06,
                    "funding_goal": 40.0,
                    "funded_amount": 10.0
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server);
        api.set_device_token(Some("dev_1".to_string()));
        let requests = api.list_requests(&area()).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "r1");
        assert_eq!(requests[0].status, Status::Open);
    }

    #[tokio::test]
    async fn test_conflict_detail_becomes_user_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/requests/r1/claim"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"detail": "not_claimable"})))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.claim("r1").await.unwrap_err();
        match &err {
            ApiError::Server { status, detail } => {
                assert_eq!(*status, 409);
                assert_eq!(detail, "not_claimable");
            }
            other => panic!("expected server error, got {:?}", other),
        }
        assert_eq!(err.user_message("Claim failed"), "not_claimable");
    }

    #[tokio::test]
    async fn test_validation_detail_uses_first_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/requests/r1/donate"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [
                    {"loc": ["body", "amount"], "msg": "amount must be positive", "type": "value_error"},
                    {"loc": ["body"], "msg": "second problem", "type": "value_error"}
                ]
            })))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.donate("r1", 10.0).await.unwrap_err();
        assert_eq!(err.user_message("Donation failed"), "amount must be positive");
    }

    #[tokio::test]
    async fn test_html_error_page_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/requests/r1"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_raw("<html><body>Internal Server Error</body></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.get_request("r1").await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert_eq!(err.user_message("Failed to load"), "Failed to load");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/requests/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let api = client_for(&server);
        let err = api.get_request("r1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);
        assert_eq!(err.user_message("Failed to load"), "Failed to load");
    }

    #[tokio::test]
    async fn test_donate_posts_amount() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/requests/r1/donate"))
            .and(body_json(json!({"amount": 10.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request": {"id": "r1", "status": "open", "funded_amount": 20.0, "funding_goal": 40.0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client_for(&server);
        let patch = api.donate("r1", 10.0).await.unwrap();
        assert_eq!(patch.id.as_deref(), Some("r1"));
        assert_eq!(patch.funded_amount, Some(20.0));
        assert_eq!(patch.status, Some(Status::Open));
    }
}
