use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::MultipartForm;
use crate::validate::{
    require_at_least, require_at_most_one, require_max_len, require_multiple_of,
    require_non_empty, require_non_empty_list, require_one_of_opt,
    require_path_segment, require_range_opt,
};

use super::{NAME, STYLE_PRESETS, Stability};

const MAX_PROMPT_CHARS: usize = 2000;
const SAMPLERS: [&str; 10] = [
    "DDIM",
    "DDPM",
    "K_DPMPP_2M",
    "K_DPMPP_2S_ANCESTRAL",
    "K_DPM_2",
    "K_DPM_2_ANCESTRAL",
    "K_EULER",
    "K_EULER_ANCESTRAL",
    "K_HEUN",
    "K_LMS",
];
const CLIP_GUIDANCE_PRESETS: [&str; 7] = [
    "FAST_BLUE",
    "FAST_GREEN",
    "NONE",
    "SIMPLE",
    "SLOW",
    "SLOWER",
    "SLOWEST",
];

/// Weighted prompt; negative weights steer away from the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrompt {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl TextPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: None,
        }
    }

    pub fn weighted(text: impl Into<String>, weight: f32) -> Self {
        Self {
            text: text.into(),
            weight: Some(weight),
        }
    }
}

/// Sampling options shared by text-to-image and image-to-image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_guidance_preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,
}

impl SamplingOptions {
    fn validate(&self) -> Result<(), ConnectorError> {
        require_range_opt("cfg_scale", self.cfg_scale, 0.0, 35.0)?;
        require_range_opt("steps", self.steps, 10, 50)?;
        require_range_opt("samples", self.samples, 1, 10)?;
        require_one_of_opt("sampler", self.sampler.as_deref(), &SAMPLERS)?;
        require_one_of_opt(
            "clip_guidance_preset",
            self.clip_guidance_preset.as_deref(),
            &CLIP_GUIDANCE_PRESETS,
        )?;
        require_one_of_opt("style_preset", self.style_preset.as_deref(), &STYLE_PRESETS)
    }

    fn append_to(&self, form: MultipartForm) -> MultipartForm {
        form.text_opt("cfg_scale", self.cfg_scale)
            .text_opt("clip_guidance_preset", self.clip_guidance_preset.as_deref())
            .text_opt("sampler", self.sampler.as_deref())
            .text_opt("samples", self.samples)
            .text_opt("seed", self.seed)
            .text_opt("steps", self.steps)
            .text_opt("style_preset", self.style_preset.as_deref())
    }
}

fn validate_prompts(prompts: &[TextPrompt]) -> Result<(), ConnectorError> {
    require_non_empty_list("text_prompts", prompts)?;
    for prompt in prompts {
        require_non_empty("text_prompts[].text", &prompt.text)?;
        require_max_len("text_prompts[].text", &prompt.text, MAX_PROMPT_CHARS)?;
    }
    Ok(())
}

/// Body of `POST /v1/generation/{engine_id}/text-to-image`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextToImageRequest {
    pub text_prompts: Vec<TextPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(flatten)]
    pub options: SamplingOptions,
}

impl TextToImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            text_prompts: vec![TextPrompt::new(prompt)],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        validate_prompts(&self.text_prompts)?;
        for (field, value) in [("height", self.height), ("width", self.width)] {
            if let Some(value) = value {
                require_multiple_of(field, value, 64)?;
                require_at_least(field, value, 128)?;
            }
        }
        self.options.validate()
    }
}

/// Multipart body of `POST /v1/generation/{engine_id}/image-to-image`.
#[derive(Debug, Clone, Default)]
pub struct ImageToImageRequest {
    pub init_image: Vec<u8>,
    pub text_prompts: Vec<TextPrompt>,
    /// `IMAGE_STRENGTH` (default) or `STEP_SCHEDULE`.
    pub init_image_mode: Option<String>,
    pub image_strength: Option<f32>,
    pub step_schedule_start: Option<f32>,
    pub step_schedule_end: Option<f32>,
    pub options: SamplingOptions,
}

impl ImageToImageRequest {
    pub fn new(init_image: Vec<u8>, prompt: impl Into<String>) -> Self {
        Self {
            init_image,
            text_prompts: vec![TextPrompt::new(prompt)],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty_list("init_image", &self.init_image)?;
        validate_prompts(&self.text_prompts)?;
        require_one_of_opt(
            "init_image_mode",
            self.init_image_mode.as_deref(),
            &["IMAGE_STRENGTH", "STEP_SCHEDULE"],
        )?;
        require_range_opt("image_strength", self.image_strength, 0.0, 1.0)?;
        require_range_opt("step_schedule_start", self.step_schedule_start, 0.0, 1.0)?;
        require_range_opt("step_schedule_end", self.step_schedule_end, 0.0, 1.0)?;
        self.options.validate()
    }

    fn into_form(self) -> MultipartForm {
        let mut form = MultipartForm::new().file("init_image", "init_image.png", self.init_image, None);
        for (index, prompt) in self.text_prompts.iter().enumerate() {
            form = form
                .text(format!("text_prompts[{index}][text]"), &prompt.text)
                .text_opt(format!("text_prompts[{index}][weight]"), prompt.weight);
        }
        form = form
            .text_opt("init_image_mode", self.init_image_mode)
            .text_opt("image_strength", self.image_strength)
            .text_opt("step_schedule_start", self.step_schedule_start)
            .text_opt("step_schedule_end", self.step_schedule_end);
        self.options.append_to(form)
    }
}

/// Multipart body of `POST /v1/generation/{engine_id}/image-to-image/upscale`.
/// At most one of `width` and `height` may be given; the other keeps the aspect ratio.
#[derive(Debug, Clone, Default)]
pub struct UpscaleRequest {
    pub image: Vec<u8>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl UpscaleRequest {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty_list("image", &self.image)?;
        require_at_most_one("width", self.width.is_some(), "height", self.height.is_some())?;
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(value) = value {
                require_at_least(field, value, 512)?;
            }
        }
        Ok(())
    }
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub base64: String,
    pub seed: u64,
    /// `SUCCESS`, `CONTENT_FILTERED` or `ERROR`.
    #[serde(rename = "finishReason")]
    pub finish_reason: String,
}

impl Artifact {
    /// Decodes the base64 payload into image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ConnectorError> {
        STANDARD
            .decode(&self.base64)
            .map_err(|err| ConnectorError::decode(NAME, format!("invalid base64 artifact: {err}")))
    }

    pub fn is_filtered(&self) -> bool {
        self.finish_reason == "CONTENT_FILTERED"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub artifacts: Vec<Artifact>,
}

impl Stability {
    /// Generates images from weighted text prompts.
    pub async fn text_to_image(
        &self,
        engine_id: &str,
        request: &TextToImageRequest,
    ) -> Result<GenerationResponse, ConnectorError> {
        require_path_segment("engine_id", engine_id)?;
        request.validate()?;
        self.client
            .post(&format!("v1/generation/{engine_id}/text-to-image"), request)
            .await
    }

    /// Generates images guided by an initial image.
    pub async fn image_to_image(
        &self,
        engine_id: &str,
        request: ImageToImageRequest,
    ) -> Result<GenerationResponse, ConnectorError> {
        require_path_segment("engine_id", engine_id)?;
        request.validate()?;
        self.client
            .post_form(
                &format!("v1/generation/{engine_id}/image-to-image"),
                request.into_form(),
            )
            .await
    }

    pub async fn upscale(
        &self,
        engine_id: &str,
        request: UpscaleRequest,
    ) -> Result<GenerationResponse, ConnectorError> {
        require_path_segment("engine_id", engine_id)?;
        request.validate()?;
        let form = MultipartForm::new()
            .file("image", "image.png", request.image, None)
            .text_opt("width", request.width)
            .text_opt("height", request.height);
        self.client
            .post_form(
                &format!("v1/generation/{engine_id}/image-to-image/upscale"),
                form,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::mock::MockTransport;

    fn artifacts() -> serde_json::Value {
        json!({"artifacts": [{"base64": STANDARD.encode(b"png-bytes"), "seed": 42, "finishReason": "SUCCESS"}]})
    }

    #[tokio::test]
    async fn text_to_image_flattens_options() {
        let transport = MockTransport::with_json(200, artifacts());
        let stability = Stability::new(transport.clone(), "sk-stab").with_client_id("my-app");

        let mut request = TextToImageRequest::new("a lighthouse at dusk");
        request.text_prompts.push(TextPrompt::weighted("blurry", -1.0));
        request.width = Some(1024);
        request.height = Some(1024);
        request.options.steps = Some(30);
        request.options.style_preset = Some("photographic".to_string());
        let response = stability
            .text_to_image("stable-diffusion-xl-1024-v1-0", &request)
            .await
            .expect("generation");

        assert_eq!(response.artifacts[0].decode().expect("bytes"), b"png-bytes");
        assert!(!response.artifacts[0].is_filtered());
        let sent = transport.last_request();
        assert_eq!(
            sent.url,
            "https://api.stability.ai/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image"
        );
        assert_eq!(sent.header("stability-client-id"), Some("my-app"));
        let body = sent.json_body();
        assert_eq!(body["steps"], 30);
        assert_eq!(body["text_prompts"][1]["weight"], -1.0);
        assert!(body.get("options").is_none());
    }

    #[test]
    fn text_to_image_limits() {
        let mut request = TextToImageRequest::new("x");
        request.width = Some(1000);
        assert!(request.validate().is_err());
        request.width = Some(64);
        assert!(request.validate().is_err());

        let mut request = TextToImageRequest::new("x");
        request.options.cfg_scale = Some(36.0);
        assert!(request.validate().is_err());

        let mut request = TextToImageRequest::new("x");
        request.options.steps = Some(5);
        assert!(request.validate().is_err());

        let mut request = TextToImageRequest::new("x");
        request.options.style_preset = Some("watercolor".to_string());
        assert!(request.validate().is_err());

        assert!(TextToImageRequest::new("x".repeat(MAX_PROMPT_CHARS + 1)).validate().is_err());
        assert!(TextToImageRequest::default().validate().is_err());
    }

    #[tokio::test]
    async fn image_to_image_builds_indexed_prompt_fields() {
        let transport = MockTransport::with_json(200, artifacts());
        let stability = Stability::new(transport.clone(), "sk-stab");

        let mut request = ImageToImageRequest::new(vec![1, 2, 3], "make it snowy");
        request.text_prompts.push(TextPrompt::weighted("rain", -0.5));
        request.image_strength = Some(0.35);
        request.options.samples = Some(2);
        stability
            .image_to_image("stable-diffusion-v1-6", request)
            .await
            .expect("image-to-image");

        let sent = transport.last_request();
        let form = sent.form_body();
        assert_eq!(form.text_value("text_prompts[0][text]"), Some("make it snowy"));
        assert!(form.text_value("text_prompts[0][weight]").is_none());
        assert_eq!(form.text_value("text_prompts[1][weight]"), Some("-0.5"));
        assert_eq!(form.text_value("image_strength"), Some("0.35"));
        assert_eq!(form.text_value("samples"), Some("2"));
        assert!(form.file_part("init_image").is_some());

        let mut request = ImageToImageRequest::new(vec![1], "x");
        request.image_strength = Some(1.5);
        assert!(request.validate().is_err());
        assert!(ImageToImageRequest::new(Vec::new(), "x").validate().is_err());
    }

    #[tokio::test]
    async fn upscale_accepts_one_dimension() {
        let transport = MockTransport::with_json(200, artifacts());
        let stability = Stability::new(transport.clone(), "sk-stab");

        let mut request = UpscaleRequest::new(vec![9; 16]);
        request.width = Some(2048);
        stability
            .upscale("esrgan-v1-x2plus", request.clone())
            .await
            .expect("upscale");
        let sent = transport.last_request();
        assert!(sent.url.ends_with("/image-to-image/upscale"));
        assert_eq!(sent.form_body().text_value("width"), Some("2048"));

        request.height = Some(2048);
        assert!(stability.upscale("esrgan-v1-x2plus", request).await.is_err());
    }
}
