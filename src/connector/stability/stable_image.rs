use crate::error::ConnectorError;
use crate::http::MultipartForm;
use crate::validate::{
    require_max_len, require_non_empty, require_one_of_opt, require_range_opt,
};

use super::{STYLE_PRESETS, Stability};

const ASPECT_RATIOS: [&str; 9] = ["16:9", "1:1", "21:9", "2:3", "3:2", "4:5", "5:4", "9:16", "9:21"];
const OUTPUT_FORMATS: [&str; 3] = ["png", "jpeg", "webp"];
const MAX_PROMPT_CHARS: usize = 10_000;
const MAX_SEED: u64 = 4_294_967_294;

/// Form fields of `POST /v2beta/stable-image/generate/core`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreImageRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<String>,
    pub seed: Option<u64>,
    pub style_preset: Option<String>,
    pub output_format: Option<String>,
}

impl CoreImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("prompt", &self.prompt)?;
        require_max_len("prompt", &self.prompt, MAX_PROMPT_CHARS)?;
        if let Some(negative) = &self.negative_prompt {
            require_max_len("negative_prompt", negative, MAX_PROMPT_CHARS)?;
        }
        require_one_of_opt("aspect_ratio", self.aspect_ratio.as_deref(), &ASPECT_RATIOS)?;
        require_range_opt("seed", self.seed, 0, MAX_SEED)?;
        require_one_of_opt("style_preset", self.style_preset.as_deref(), &STYLE_PRESETS)?;
        require_one_of_opt("output_format", self.output_format.as_deref(), &OUTPUT_FORMATS)
    }

    fn into_form(self) -> MultipartForm {
        MultipartForm::new()
            .text("prompt", self.prompt)
            .text_opt("negative_prompt", self.negative_prompt)
            .text_opt("aspect_ratio", self.aspect_ratio)
            .text_opt("seed", self.seed)
            .text_opt("style_preset", self.style_preset)
            .text_opt("output_format", self.output_format)
    }
}

/// Raw image returned with `Accept: image/*`; generation metadata travels in headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImageBytes {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub seed: Option<u64>,
    /// `SUCCESS` or `CONTENT_FILTERED`.
    pub finish_reason: Option<String>,
}

impl Stability {
    /// Generates one image with Stable Image Core and returns its bytes.
    pub async fn generate_core(
        &self,
        request: CoreImageRequest,
    ) -> Result<GeneratedImageBytes, ConnectorError> {
        request.validate()?;
        let response = self
            .client
            .post_form_full(
                "v2beta/stable-image/generate/core",
                request.into_form(),
                Some("image/*"),
            )
            .await?;
        Ok(GeneratedImageBytes {
            content_type: response.header("content-type").map(str::to_string),
            seed: response
                .header("seed")
                .and_then(|seed| seed.trim().parse().ok()),
            finish_reason: response.header("finish-reason").map(str::to_string),
            bytes: response.body,
        })
    }
}
