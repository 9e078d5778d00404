use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::MultipartForm;
use crate::validate::{
    require_max_len, require_non_empty, require_one_of, require_one_of_opt, require_range_opt,
};

use super::{Dalle, NAME};

const DALL_E_2: &str = "dall-e-2";
const DALL_E_3: &str = "dall-e-3";
const DALL_E_2_SIZES: [&str; 3] = ["256x256", "512x512", "1024x1024"];
const DALL_E_3_SIZES: [&str; 3] = ["1024x1024", "1792x1024", "1024x1792"];
const RESPONSE_FORMATS: [&str; 2] = ["url", "b64_json"];
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Body of `POST /images/generations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    /// Defaults to `dall-e-2` server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("prompt", &self.prompt)?;
        let model = self.model.as_deref().unwrap_or(DALL_E_2);
        require_one_of("model", model, &[DALL_E_2, DALL_E_3])?;
        require_one_of_opt(
            "response_format",
            self.response_format.as_deref(),
            &RESPONSE_FORMATS,
        )?;

        if model == DALL_E_3 {
            require_max_len("prompt", &self.prompt, 4000)?;
            require_one_of_opt("size", self.size.as_deref(), &DALL_E_3_SIZES)?;
            if self.n.is_some_and(|n| n != 1) {
                return Err(ConnectorError::validation("`n` must be 1 for dall-e-3"));
            }
            require_one_of_opt("quality", self.quality.as_deref(), &["standard", "hd"])?;
            require_one_of_opt("style", self.style.as_deref(), &["vivid", "natural"])
        } else {
            require_max_len("prompt", &self.prompt, 1000)?;
            require_one_of_opt("size", self.size.as_deref(), &DALL_E_2_SIZES)?;
            require_range_opt("n", self.n, 1, 10)?;
            require_one_of_opt("quality", self.quality.as_deref(), &["standard"])?;
            if self.style.is_some() {
                return Err(ConnectorError::validation(
                    "`style` is only supported by dall-e-3",
                ));
            }
            Ok(())
        }
    }
}

/// Multipart body of `POST /images/edits`.
#[derive(Debug, Clone, Default)]
pub struct ImageEditRequest {
    /// Square PNG to edit.
    pub image: Vec<u8>,
    /// Optional PNG whose transparent areas mark where to edit.
    pub mask: Option<Vec<u8>>,
    pub prompt: String,
    pub model: Option<String>,
    pub n: Option<u32>,
    pub size: Option<String>,
    pub response_format: Option<String>,
    pub user: Option<String>,
}

impl ImageEditRequest {
    pub fn new(image: Vec<u8>, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_png("image", &self.image)?;
        if let Some(mask) = &self.mask {
            require_png("mask", mask)?;
        }
        require_non_empty("prompt", &self.prompt)?;
        require_max_len("prompt", &self.prompt, 1000)?;
        validate_dall_e_2_options(
            self.model.as_deref(),
            self.n,
            self.size.as_deref(),
            self.response_format.as_deref(),
        )
    }

    fn into_form(self) -> MultipartForm {
        let mut form = MultipartForm::new().file("image", "image.png", self.image, Some("image/png"));
        if let Some(mask) = self.mask {
            form = form.file("mask", "mask.png", mask, Some("image/png"));
        }
        form.text("prompt", self.prompt)
            .text_opt("model", self.model)
            .text_opt("n", self.n)
            .text_opt("size", self.size)
            .text_opt("response_format", self.response_format)
            .text_opt("user", self.user)
    }
}

/// Multipart body of `POST /images/variations`.
#[derive(Debug, Clone, Default)]
pub struct ImageVariationRequest {
    pub image: Vec<u8>,
    pub model: Option<String>,
    pub n: Option<u32>,
    pub size: Option<String>,
    pub response_format: Option<String>,
    pub user: Option<String>,
}

impl ImageVariationRequest {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_png("image", &self.image)?;
        validate_dall_e_2_options(
            self.model.as_deref(),
            self.n,
            self.size.as_deref(),
            self.response_format.as_deref(),
        )
    }

    fn into_form(self) -> MultipartForm {
        MultipartForm::new()
            .file("image", "image.png", self.image, Some("image/png"))
            .text_opt("model", self.model)
            .text_opt("n", self.n)
            .text_opt("size", self.size)
            .text_opt("response_format", self.response_format)
            .text_opt("user", self.user)
    }
}

/// Edits and variations are only offered for dall-e-2.
fn validate_dall_e_2_options(
    model: Option<&str>,
    n: Option<u32>,
    size: Option<&str>,
    response_format: Option<&str>,
) -> Result<(), ConnectorError> {
    require_one_of_opt("model", model, &[DALL_E_2])?;
    require_range_opt("n", n, 1, 10)?;
    require_one_of_opt("size", size, &DALL_E_2_SIZES)?;
    require_one_of_opt("response_format", response_format, &RESPONSE_FORMATS)
}

fn require_png(field: &str, data: &[u8]) -> Result<(), ConnectorError> {
    if !data.starts_with(&PNG_MAGIC) {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be a PNG image"
        )));
    }
    if data.len() >= MAX_IMAGE_BYTES {
        return Err(ConnectorError::validation(format!(
            "`{field}` must be smaller than 4 MB, got {} bytes",
            data.len()
        )));
    }
    Ok(())
}

/// One generated image, returned either as a URL or inline base64.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
    /// Prompt actually used by dall-e-3 after its automatic rewrite.
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

impl GeneratedImage {
    /// Decodes the inline `b64_json` payload into image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Decode`] when the image was returned as a URL or the
    /// payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, ConnectorError> {
        let encoded = self.b64_json.as_deref().ok_or_else(|| {
            ConnectorError::decode(NAME, "image has no inline data; request `b64_json`")
        })?;
        STANDARD
            .decode(encoded)
            .map_err(|err| ConnectorError::decode(NAME, format!("invalid base64 image: {err}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub created: u64,
    pub data: Vec<GeneratedImage>,
}

impl Dalle {
    /// Creates images from a text prompt.
    pub async fn create_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImagesResponse, ConnectorError> {
        request.validate()?;
        self.client.post("images/generations", request).await
    }

    /// Edits or extends an image given a prompt and an optional mask.
    pub async fn create_image_edit(
        &self,
        request: ImageEditRequest,
    ) -> Result<ImagesResponse, ConnectorError> {
        request.validate()?;
        self.client.post_form("images/edits", request.into_form()).await
    }

    /// Creates variations of an image.
    pub async fn create_image_variation(
        &self,
        request: ImageVariationRequest,
    ) -> Result<ImagesResponse, ConnectorError> {
        request.validate()?;
        self.client
            .post_form("images/variations", request.into_form())
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::FormPart;
    use crate::http::mock::MockTransport;

    fn png(len: usize) -> Vec<u8> {
        let mut data = PNG_MAGIC.to_vec();
        data.resize(len.max(PNG_MAGIC.len()), 0);
        data
    }

    #[tokio::test]
    async fn create_image_returns_decodable_payload() {
        let transport = MockTransport::with_json(
            200,
            json!({
                "created": 1700000000,
                "data": [{"b64_json": STANDARD.encode(b"\x89PNG-bytes"), "revised_prompt": "A calm otter"}]
            }),
        );
        let dalle = Dalle::new(transport.clone(), "sk-test");

        let mut request = ImageGenerationRequest::new("an otter").with_model("dall-e-3");
        request.size = Some("1792x1024".to_string());
        request.quality = Some("hd".to_string());
        request.response_format = Some("b64_json".to_string());
        let response = dalle.create_image(&request).await.expect("image");

        assert_eq!(response.data[0].decode().expect("bytes"), b"\x89PNG-bytes");
        assert_eq!(response.data[0].revised_prompt.as_deref(), Some("A calm otter"));
        let sent = transport.last_request();
        assert_eq!(sent.url, "https://api.openai.com/v1/images/generations");
        assert_eq!(sent.json_body()["quality"], "hd");
    }

    #[test]
    fn per_model_limits() {
        let request = ImageGenerationRequest::new("x".repeat(1001));
        assert!(request.validate().is_err());
        assert!(request.clone().with_model("dall-e-3").validate().is_ok());

        let mut request = ImageGenerationRequest::new("cat").with_model("dall-e-3");
        request.n = Some(2);
        assert!(request.validate().is_err());

        let mut request = ImageGenerationRequest::new("cat");
        request.size = Some("1792x1024".to_string());
        assert!(request.validate().is_err());
        request.size = Some("512x512".to_string());
        request.n = Some(10);
        assert!(request.validate().is_ok());
        request.style = Some("vivid".to_string());
        assert!(request.validate().is_err());

        let request = ImageGenerationRequest::new("cat").with_model("midjourney");
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn image_edit_uploads_image_and_mask() {
        let transport = MockTransport::with_json(200, json!({"created": 1, "data": [{"url": "https://img/1.png"}]}));
        let dalle = Dalle::new(transport.clone(), "sk-test");

        let mut request = ImageEditRequest::new(png(64), "add a hat");
        request.mask = Some(png(32));
        request.n = Some(2);
        let response = dalle.create_image_edit(request).await.expect("edit");
        assert!(response.data[0].decode().is_err());

        let sent = transport.last_request();
        assert!(sent.url.ends_with("/images/edits"));
        let form = sent.form_body();
        assert_eq!(form.text_value("prompt"), Some("add a hat"));
        assert_eq!(form.text_value("n"), Some("2"));
        assert!(matches!(
            form.file_part("mask"),
            Some(FormPart::File { mime_type: Some(mime), .. }) if mime == "image/png"
        ));
    }

    #[tokio::test]
    async fn variation_rejects_non_png_and_large_files() {
        let transport = MockTransport::new();
        let dalle = Dalle::new(transport.clone(), "sk-test");

        let err = dalle
            .create_image_variation(ImageVariationRequest::new(b"GIF89a".to_vec()))
            .await
            .expect_err("not png");
        assert!(err.to_string().contains("PNG"));
        assert!(
            dalle
                .create_image_variation(ImageVariationRequest::new(png(MAX_IMAGE_BYTES)))
                .await
                .is_err()
        );
        let mut request = ImageVariationRequest::new(png(16));
        request.model = Some("dall-e-3".to_string());
        assert!(dalle.create_image_variation(request).await.is_err());
        assert_eq!(transport.request_count(), 0);
    }
}
