use crate::config::Config;
use crate::encoding::{DataUri, strip_data_uri_prefix};
use crate::error::{AppError, Result};
use gemini_rust::generation::model::ImageConfig;
use gemini_rust::{Gemini, Part};
use std::future::Future;
use tracing::{debug, info};

/// Aspect ratio hint attached to every generation request.
pub const ASPECT_RATIO: &str = "3:4";

/// Fixed instruction sent alongside the portrait.
pub const ENHANCEMENT_PROMPT: &str = "\
Enhance the portrait while strictly preserving the subject's identity with accurate facial geometry. \
Do not change their expression or face shape. Only allow subtle feature cleanup without altering who they are.
Keep the exact same background from the reference image. No replacements, no changes, no new objects, no layout shifts. \
The environment must look identical.
The image must be recreated as if it was shot on a Sony A1, using an 85mm f1.4 lens, at f1.6, ISO 100, 1/200 shutter speed, \
cinematic shallow depth of field, perfect facial focus, and an editorial-neutral color profile.
This Sony A1 + 85mm f1.4 setup is mandatory. The final image must clearly look like premium full-frame Sony A1 quality.
Lighting must match the exact direction, angle, and mood of the reference photo. \
Upgrade the lighting into a cinematic, subject-focused style: soft directional light, warm highlights, cool shadows, \
deeper contrast, expanded dynamic range, micro-contrast boost, smooth gradations, and zero harsh shadows.
Maintain neutral premium color tone, cinematic contrast curve, natural saturation, real skin texture (not plastic), \
and subtle film grain. No fake glow, no runway lighting, no oversmoothing.
Render with cinematic editorial style, premium clarity, portrait crop, and keep the original environmental vibe untouched.
Re-render the subject with improved realism, depth, texture, and lighting while keeping identity and background fully preserved.

NEGATIVE INSTRUCTIONS:
- No new background.
- No background change.
- No overly dramatic lighting.
- No face morphing.
- No fake glow.
- No flat lighting.
- No over-smooth skin.
";

/// Turns an encoded portrait into an enhanced one.
///
/// Implemented by [`GeminiClient`]; the session controller only depends on
/// this trait so it can be driven by fakes in tests.
pub trait Enhancer: Send + Sync + 'static {
    /// `encoded` is a data URI or raw base64; the returned string is a data URI.
    fn enhance(&self, encoded: &str, mime_type: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Stateless client for the `generateContent` endpoint of an image model.
pub struct GeminiClient {
    client: Gemini,
    model_name: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Gemini::with_model_and_base_url(
            &config.api_key,
            config.model_path(),
            config.base_url.clone(),
        )
        .map_err(|e| AppError::config(format!("Failed to create Gemini client: {}", e)))?;

        Ok(Self {
            client,
            model_name: config.model_name.clone(),
        })
    }

    /// Sends the portrait with the fixed prompt and returns the first image
    /// the model produced, as a data URI.
    ///
    /// The payload is forwarded as-is; the service decides whether it is a
    /// usable image.
    pub async fn enhance_portrait(&self, encoded: &str, mime_type: &str) -> Result<String> {
        let payload = strip_data_uri_prefix(encoded);
        info!(
            model = %self.model_name,
            mime_type,
            payload_len = payload.len(),
            "Sending portrait for enhancement"
        );

        let response = self
            .client
            .generate_content()
            .with_inline_data(payload, mime_type)
            .with_user_message(ENHANCEMENT_PROMPT)
            .with_image_config(ImageConfig {
                aspect_ratio: Some(ASPECT_RATIO.to_string()),
                image_size: None,
            })
            .execute()
            .await
            .map_err(|e| AppError::transport(format!("API request failed: {:?}", e)))?;
        debug!(candidates = response.candidates.len(), "Received enhancement response");

        // Only the first candidate counts
        let parts = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.as_deref());
        extract_image(parts)
    }
}

impl Enhancer for GeminiClient {
    fn enhance(&self, encoded: &str, mime_type: &str) -> impl Future<Output = Result<String>> + Send {
        self.enhance_portrait(encoded, mime_type)
    }
}

/// Picks the enhanced image out of a candidate's parts: the first part
/// carrying inline data wins.
pub fn extract_image(parts: Option<&[Part]>) -> Result<String> {
    parts
        .unwrap_or_default()
        .iter()
        .find_map(|part| match part {
            Part::InlineData { inline_data, .. } => Some(
                DataUri {
                    mime_type: inline_data.mime_type.clone(),
                    data: inline_data.data.clone(),
                }
                .to_string(),
            ),
            _ => None,
        })
        .ok_or(AppError::EmptyResult)
}
