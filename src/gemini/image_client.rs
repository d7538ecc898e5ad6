use crate::{
    error::{RestyleError, Result},
    gemini::transport::GenerationTransport,
    logger,
    models::{
        Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        GenerationResult, InlineData, Operation, Part, SourceImage,
    },
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use uuid::Uuid;

pub const REMOVE_BACKGROUND_PROMPT: &str = "Remove the background from this image completely. Keep the main subject fully intact with clean, precise edges and do not change it in any way. Output a PNG image with a transparent background.";

#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn GenerationTransport>,
    model: String,
}

impl ImageClient {
    pub fn new(transport: Arc<dyn GenerationTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Known Gemini models that answer with an image modality: (id, name, notes).
    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (
                "gemini-2.5-flash-image",
                "Gemini 2.5 Flash Image",
                "fast, default",
            ),
            (
                "gemini-2.5-flash-image-preview",
                "Gemini 2.5 Flash Image (preview)",
                "preview alias",
            ),
            (
                "gemini-3-pro-image-preview",
                "Gemini 3 Pro Image (preview)",
                "highest quality",
            ),
        ]
    }

    pub async fn transform_image(
        &self,
        image: &SourceImage,
        composed_prompt: &str,
    ) -> Result<GenerationResult> {
        if composed_prompt.trim().is_empty() {
            return Err(RestyleError::InvalidInput(
                "The transformation prompt is empty.".into(),
            ));
        }
        self.generate(Operation::Transform, image, composed_prompt)
            .await
    }

    pub async fn remove_background(&self, image: &SourceImage) -> Result<GenerationResult> {
        self.generate(Operation::RemoveBackground, image, REMOVE_BACKGROUND_PROMPT)
            .await
    }

    async fn generate(
        &self,
        operation: Operation,
        image: &SourceImage,
        instruction: &str,
    ) -> Result<GenerationResult> {
        let request = build_request(image, instruction);
        let timer = logger::timer(&format!("Gemini {}", operation));

        log::info!(
            "🎨 Requesting {} from {} ({} bytes, {})",
            operation,
            self.model,
            image.size(),
            image.mime()
        );
        log::debug!("Instruction: {}", instruction);

        let response = self
            .transport
            .generate_content(&self.model, &request)
            .await?;

        let inline = first_inline_image(&response).ok_or_else(|| {
            match response.block_reason() {
                Some(reason) => log::warn!("⚠️  Gemini blocked the {} prompt: {}", operation, reason),
                None => log::warn!(
                    "⚠️  Gemini returned {} part(s) but no image for {}",
                    response.parts().len(),
                    operation
                ),
            }
            RestyleError::NoImageInResponse
        })?;

        let data = STANDARD.decode(&inline.data).map_err(|e| {
            RestyleError::GenerationFailed(format!("Image part is not valid base64: {}", e))
        })?;

        let result = GenerationResult {
            id: Uuid::new_v4(),
            operation,
            data,
            mime_type: inline.mime_type.clone(),
            model: self.model.clone(),
            duration_ms: timer.elapsed_ms(),
        };

        log::info!(
            "✅ {} produced {} bytes ({})",
            operation,
            result.size(),
            result.mime_type
        );
        Ok(result)
    }
}

/// Image first, then the instruction, with an image-only response modality.
pub(crate) fn build_request(image: &SourceImage, instruction: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::inline(image.mime().as_str(), image.to_base64()),
                Part::text(instruction),
            ],
        }],
        generation_config: GenerationConfig::image_only(),
    }
}

/// First part, in order, that carries inline bytes.
pub(crate) fn first_inline_image(response: &GenerateContentResponse) -> Option<&InlineData> {
    response
        .parts()
        .iter()
        .find_map(|part| part.inline_data.as_ref())
}
