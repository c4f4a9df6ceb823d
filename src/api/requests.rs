//! Request Endpoints
//!
//! Listing, detail, creation and the donate / claim / delivered actions.

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    CreateRequestPayload, DetailResponse, DonatePayload, ListQuery, ListResponse, PatchResponse,
    Request, RequestPatch,
};

impl ApiClient {
    /// `GET /requests` - rank-sorted page for the viewport
    pub async fn list_requests(&self, query: &ListQuery) -> Result<Vec<Request>, ApiError> {
        let url = self.endpoint(&["requests"])?;
        let request = self.http_client.get(url).query(&query.to_pairs());
        let response: ListResponse = self.send(request).await?;
        Ok(response.requests)
    }

    pub async fn get_request(&self, id: &str) -> Result<Request, ApiError> {
        let url = self.endpoint(&["requests", id])?;
        let response: DetailResponse = self.send(self.http_client.get(url)).await?;
        Ok(response.request)
    }

    pub async fn create_request(&self, payload: &CreateRequestPayload) -> Result<RequestPatch, ApiError> {
        let url = self.endpoint(&["requests"])?;
        let response: PatchResponse = self.send(self.http_client.post(url).json(payload)).await?;
        Ok(response.request)
    }

    pub async fn donate(&self, id: &str, amount: f64) -> Result<RequestPatch, ApiError> {
        let url = self.endpoint(&["requests", id, "donate"])?;
        let request = self.http_client.post(url).json(&DonatePayload { amount });
        let response: PatchResponse = self.send(request).await?;
        Ok(response.request)
    }

    pub async fn claim(&self, id: &str) -> Result<RequestPatch, ApiError> {
        let url = self.endpoint(&["requests", id, "claim"])?;
        let response: PatchResponse = self.send(self.http_client.post(url)).await?;
        Ok(response.request)
    }

    /// Only the helper who claimed the request may mark it delivered
    pub async fn mark_delivered(&self, id: &str) -> Result<RequestPatch, ApiError> {
        let url = self.endpoint(&["requests", id, "delivered"])?;
        let response: PatchResponse = self.send(self.http_client.post(url)).await?;
        Ok(response.request)
    }
}
