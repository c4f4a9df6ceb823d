//! Device Endpoint

use super::ApiClient;
use crate::error::ApiError;
use crate::identity::TokenIssuer;
use crate::models::DeviceResponse;

impl ApiClient {
    /// `POST /device` - mint a fresh device token
    pub async fn create_device(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&["device"])?;
        let response: DeviceResponse = self.send(self.http_client.post(url)).await?;
        Ok(response.device_token)
    }
}

impl TokenIssuer for ApiClient {
    async fn issue_token(&self) -> Result<String, ApiError> {
        self.create_device().await
    }
}
