use crate::{
    config::GeminiConfig,
    error::{RestyleError, Result},
    models::{GenerateContentRequest, GenerateContentResponse},
};
use async_trait::async_trait;
use reqwest::Client;

/// One round trip to a `generateContent`-shaped endpoint.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

pub struct HttpTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url().to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RestyleError::GenerationFailed(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RestyleError::GenerationFailed(format!(
                "Gemini returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| RestyleError::GenerationFailed(format!("Malformed Gemini response: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes in order and records every request it sees.
    #[derive(Default)]
    pub struct FakeTransport {
        outcomes: Mutex<VecDeque<Result<GenerateContentResponse>>>,
        pub requests: Mutex<Vec<(String, GenerateContentRequest)>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, response: GenerateContentResponse) -> Self {
            self.outcomes.lock().unwrap().push_back(Ok(response));
            self
        }

        pub fn fail(self, error: RestyleError) -> Self {
            self.outcomes.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<(String, GenerateContentRequest)> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl GenerationTransport for FakeTransport {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((model.to_string(), request.clone()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(GenerateContentResponse::default()))
        }
    }
}
