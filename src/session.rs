//! The single "current image" and the request state machine around it.
//!
//! `Idle -> InFlight -> {Succeeded, Failed}`; a new call may start from any
//! state except `InFlight`. Calls are split into `begin` and `complete` so a
//! shared session can be unlocked while the remote call runs.

use crate::{
    error::{RestyleError, Result},
    gemini::ImageClient,
    models::{GenerationResult, Operation, PromptParams, SourceImage},
    prompt::compose_prompt,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    InFlight { operation: Operation },
    Succeeded { operation: Operation },
    Failed { operation: Operation, message: String },
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight { .. })
    }
}

#[derive(Debug, Default)]
pub struct EditSession {
    current: Option<SourceImage>,
    result: Option<GenerationResult>,
    state: RequestState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(image: SourceImage) -> Self {
        Self {
            current: Some(image),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&SourceImage> {
        self.current.as_ref()
    }

    /// Output of the last successful transform, if any.
    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_in_flight()
    }

    /// Replaces the current image with a fresh upload and drops any old result.
    pub fn load_image(&mut self, image: SourceImage) -> Result<()> {
        self.ensure_idle()?;
        log::info!("📥 Loaded {} image ({} bytes)", image.mime(), image.size());
        self.current = Some(image);
        self.result = None;
        self.state = RequestState::Idle;
        Ok(())
    }

    /// Marks `operation` as in flight and hands back the image to send.
    pub fn begin(&mut self, operation: Operation) -> Result<SourceImage> {
        self.ensure_idle()?;
        let image = self
            .current
            .clone()
            .ok_or_else(|| RestyleError::InvalidInput("Please upload an image first.".into()))?;
        self.state = RequestState::InFlight { operation };
        Ok(image)
    }

    /// Settles the in-flight call. Remote errors are absorbed here: the detail
    /// is logged and the state carries only a generic message. A completion
    /// that does not match the in-flight operation is ignored.
    pub fn complete(
        &mut self,
        operation: Operation,
        outcome: Result<GenerationResult>,
    ) -> &RequestState {
        if self.state != (RequestState::InFlight { operation }) {
            log::warn!(
                "⚠️  Ignoring {} completion while session state is {:?}",
                operation,
                self.state
            );
            return &self.state;
        }

        let applied = outcome.and_then(|result| self.apply(operation, result));
        self.state = match applied {
            Ok(()) => RequestState::Succeeded { operation },
            Err(e) => {
                log::error!("❌ {} failed: {}", operation, e);
                RequestState::Failed {
                    operation,
                    message: operation.failure_message().to_string(),
                }
            }
        };
        &self.state
    }

    fn apply(&mut self, operation: Operation, result: GenerationResult) -> Result<()> {
        match operation {
            Operation::Transform => {
                self.result = Some(result);
            }
            Operation::RemoveBackground => {
                // Converted before touching state so a bad result leaves the
                // current image untouched.
                let image = result.to_source_image()?;
                self.current = Some(image);
                self.result = None;
            }
        }
        Ok(())
    }

    pub async fn transform(
        &mut self,
        client: &ImageClient,
        params: &PromptParams,
    ) -> Result<&RequestState> {
        let image = self.begin(Operation::Transform)?;
        let prompt = compose_prompt(params);
        let outcome = client.transform_image(&image, &prompt).await;
        Ok(self.complete(Operation::Transform, outcome))
    }

    pub async fn remove_background(&mut self, client: &ImageClient) -> Result<&RequestState> {
        let image = self.begin(Operation::RemoveBackground)?;
        let outcome = client.remove_background(&image).await;
        Ok(self.complete(Operation::RemoveBackground, outcome))
    }

    /// Makes the last transform result the current image, for chained edits.
    pub fn promote_result(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| RestyleError::InvalidInput("There is no generated image yet.".into()))?;
        let image = result.to_source_image()?;
        self.current = Some(image);
        self.result = None;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.ensure_idle()?;
        *self = Self::default();
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_busy() {
            Err(RestyleError::RequestInFlight)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::transport::fake::FakeTransport;
    use crate::models::{GenerateContentResponse, ImageMime, Part};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::sync::Arc;

    const PNG_BYTES: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 7, 7, 7, 7];

    fn jpeg() -> SourceImage {
        SourceImage::from_upload(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2], "image/jpeg").unwrap()
    }

    fn png_response() -> GenerateContentResponse {
        GenerateContentResponse::from_parts(vec![Part::inline("image/png", STANDARD.encode(PNG_BYTES))])
    }

    fn client(transport: FakeTransport) -> ImageClient {
        ImageClient::new(Arc::new(transport), "gemini-2.5-flash-image")
    }

    #[test]
    fn test_begin_refuses_overlapping_calls() {
        let mut session = EditSession::with_image(jpeg());
        session.begin(Operation::Transform).unwrap();
        assert!(session.is_busy());

        assert!(matches!(
            session.begin(Operation::RemoveBackground),
            Err(RestyleError::RequestInFlight)
        ));
        assert!(matches!(session.load_image(jpeg()), Err(RestyleError::RequestInFlight)));
        assert!(matches!(session.reset(), Err(RestyleError::RequestInFlight)));
    }

    #[test]
    fn test_begin_without_image_is_invalid_input() {
        let mut session = EditSession::new();
        assert!(matches!(
            session.begin(Operation::Transform),
            Err(RestyleError::InvalidInput(_))
        ));
        assert_eq!(session.state(), &RequestState::Idle);
    }

    #[tokio::test]
    async fn test_remove_background_replaces_current_image() {
        let client = client(FakeTransport::new().respond(png_response()));
        let mut session = EditSession::with_image(jpeg());

        let state = session.remove_background(&client).await.unwrap().clone();
        assert_eq!(
            state,
            RequestState::Succeeded {
                operation: Operation::RemoveBackground
            }
        );
        let current = session.current().unwrap();
        assert_eq!(current.mime(), ImageMime::Png);
        assert_eq!(current.data(), &PNG_BYTES[..]);
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_transform_keeps_source_and_stores_result() {
        let client = client(FakeTransport::new().respond(png_response()));
        let mut session = EditSession::with_image(jpeg());

        session
            .transform(&client, &PromptParams::new("Transform to cyberpunk"))
            .await
            .unwrap();
        assert_eq!(session.current(), Some(&jpeg()));
        assert_eq!(session.result().unwrap().data, PNG_BYTES.to_vec());

        session.promote_result().unwrap();
        assert_eq!(session.current().unwrap().mime(), ImageMime::Png);
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_failure_is_absorbed_with_generic_message() {
        let client = client(
            FakeTransport::new()
                .fail(RestyleError::GenerationFailed("403 API key not valid".into())),
        );
        let mut session = EditSession::with_image(jpeg());

        let state = session.remove_background(&client).await.unwrap().clone();
        match state {
            RequestState::Failed { operation, message } => {
                assert_eq!(operation, Operation::RemoveBackground);
                assert_eq!(message, Operation::RemoveBackground.failure_message());
                assert!(!message.contains("API key"));
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(session.current(), Some(&jpeg()));

        // A failed call does not block the next one.
        assert!(session.begin(Operation::Transform).is_ok());
    }

    #[tokio::test]
    async fn test_no_image_response_fails_transform() {
        let client = client(
            FakeTransport::new().respond(GenerateContentResponse::from_parts(vec![Part::text("no")])),
        );
        let mut session = EditSession::with_image(jpeg());

        let state = session
            .transform(&client, &PromptParams::new("Make it anime"))
            .await
            .unwrap();
        assert!(matches!(state, RequestState::Failed { .. }));
        assert!(session.result().is_none());
    }

    #[test]
    fn test_unmatched_completion_is_ignored() {
        let result = GenerationResult {
            id: uuid::Uuid::new_v4(),
            operation: Operation::RemoveBackground,
            data: PNG_BYTES.to_vec(),
            mime_type: "image/png".to_string(),
            model: "gemini-2.5-flash-image".to_string(),
            duration_ms: 1,
        };

        let mut session = EditSession::with_image(jpeg());
        let state = session
            .complete(Operation::RemoveBackground, Ok(result.clone()))
            .clone();
        assert_eq!(state, RequestState::Idle);
        assert_eq!(session.current(), Some(&jpeg()));

        session.begin(Operation::Transform).unwrap();
        session.complete(Operation::RemoveBackground, Ok(result));
        assert_eq!(
            session.state(),
            &RequestState::InFlight {
                operation: Operation::Transform
            }
        );
        assert_eq!(session.current(), Some(&jpeg()));
    }

    #[test]
    fn test_state_serializes_with_status_tag() {
        let json = serde_json::to_value(RequestState::InFlight {
            operation: Operation::Transform,
        })
        .unwrap();
        assert_eq!(json["status"], "in_flight");
        assert_eq!(json["operation"], "transform");
    }
}
