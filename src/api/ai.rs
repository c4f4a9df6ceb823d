//! AI Endpoints

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{InvokeAiPayload, InvokeResponse};

impl ApiClient {
    /// `POST /ai/invoke` - turn free text into a structured draft
    pub async fn invoke_ai(&self, payload: &InvokeAiPayload) -> Result<InvokeResponse, ApiError> {
        let url = self.endpoint(&["ai", "invoke"])?;
        self.send(self.http_client.post(url).json(payload)).await
    }
}
