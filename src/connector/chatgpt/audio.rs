use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConnectorError;
use crate::http::MultipartForm;
use crate::validate::{
    require_max_bytes, require_max_len, require_non_empty, require_non_empty_list,
    require_one_of, require_one_of_opt, require_range_opt,
};

use super::ChatGpt;

const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;
const MAX_SPEECH_CHARS: usize = 4096;

const AUDIO_EXTENSIONS: [&str; 9] = [
    "flac", "mp3", "mp4", "mpeg", "mpga", "m4a", "ogg", "wav", "webm",
];
const RESPONSE_FORMATS: [&str; 5] = ["json", "text", "srt", "verbose_json", "vtt"];
const VOICES: [&str; 11] = [
    "alloy", "ash", "ballad", "coral", "echo", "fable", "onyx", "nova", "sage", "shimmer",
    "verse",
];
const SPEECH_FORMATS: [&str; 6] = ["mp3", "opus", "aac", "flac", "wav", "pcm"];

/// Multipart body for `/audio/transcriptions` and `/audio/translations`.
#[derive(Debug, Clone)]
pub struct AudioRequest {
    pub file: Vec<u8>,
    /// File name sent with the upload; its extension selects the decoder server-side.
    pub filename: String,
    pub model: String,
    /// ISO-639-1 code of the spoken language; ignored for translations.
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub response_format: Option<String>,
    pub temperature: Option<f32>,
    pub timestamp_granularities: Vec<String>,
}

impl AudioRequest {
    pub fn new(file: Vec<u8>, filename: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            file,
            filename: filename.into(),
            model: model.into(),
            language: None,
            prompt: None,
            response_format: None,
            temperature: None,
            timestamp_granularities: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty_list("file", &self.file)?;
        require_max_bytes("file", &self.file, MAX_AUDIO_BYTES)?;
        require_non_empty("filename", &self.filename)?;
        let extension = self
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        require_one_of("filename extension", &extension, &AUDIO_EXTENSIONS)?;
        require_non_empty("model", &self.model)?;
        require_one_of_opt(
            "response_format",
            self.response_format.as_deref(),
            &RESPONSE_FORMATS,
        )?;
        require_range_opt("temperature", self.temperature, 0.0, 1.0)?;
        for granularity in &self.timestamp_granularities {
            require_one_of("timestamp_granularities[]", granularity, &["word", "segment"])?;
        }
        Ok(())
    }

    /// Plain-text formats come back as the raw body rather than JSON.
    fn wants_plain_text(&self) -> bool {
        matches!(self.response_format.as_deref(), Some("text" | "srt" | "vtt"))
    }

    fn into_form(self, include_language: bool) -> MultipartForm {
        let mut form = MultipartForm::new()
            .file("file", self.filename, self.file, None)
            .text("model", self.model)
            .text_opt("prompt", self.prompt)
            .text_opt("response_format", self.response_format)
            .text_opt("temperature", self.temperature);
        if include_language {
            form = form.text_opt("language", self.language);
        }
        for granularity in self.timestamp_granularities {
            form = form.text("timestamp_granularities[]", granularity);
        }
        form
    }
}

/// Transcribed or translated text. Only `text` is populated for plain-text formats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub segments: Option<Vec<Value>>,
    #[serde(default)]
    pub words: Option<Vec<Value>>,
}

/// Body of `POST /audio/speech`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl SpeechRequest {
    pub fn new(
        model: impl Into<String>,
        input: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice: voice.into(),
            instructions: None,
            response_format: None,
            speed: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConnectorError> {
        require_non_empty("model", &self.model)?;
        require_non_empty("input", &self.input)?;
        require_max_len("input", &self.input, MAX_SPEECH_CHARS)?;
        require_one_of("voice", &self.voice, &VOICES)?;
        require_one_of_opt(
            "response_format",
            self.response_format.as_deref(),
            &SPEECH_FORMATS,
        )?;
        require_range_opt("speed", self.speed, 0.25, 4.0)
    }
}

/// Synthesized audio returned by the speech endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ChatGpt {
    /// Transcribes audio into the input language.
    pub async fn create_transcription(
        &self,
        request: AudioRequest,
    ) -> Result<Transcription, ConnectorError> {
        request.validate()?;
        self.send_audio("audio/transcriptions", request, true).await
    }

    /// Translates audio into English.
    pub async fn create_translation(
        &self,
        request: AudioRequest,
    ) -> Result<Transcription, ConnectorError> {
        request.validate()?;
        self.send_audio("audio/translations", request, false).await
    }

    async fn send_audio(
        &self,
        path: &str,
        request: AudioRequest,
        include_language: bool,
    ) -> Result<Transcription, ConnectorError> {
        if request.wants_plain_text() {
            let response = self
                .client
                .post_form_full(path, request.into_form(include_language), Some("text/plain"))
                .await?;
            return Ok(Transcription {
                text: response.text(),
                ..Transcription::default()
            });
        }
        self.client
            .post_form(path, request.into_form(include_language))
            .await
    }

    /// Generates spoken audio from text.
    pub async fn create_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechAudio, ConnectorError> {
        request.validate()?;
        let response = self
            .client
            .post_full("audio/speech", request, Some("audio/*"))
            .await?;
        let content_type = response.header("content-type").map(str::to_string);
        Ok(SpeechAudio {
            bytes: response.body,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::FormPart;
    use crate::http::mock::MockTransport;

    #[tokio::test]
    async fn transcription_uploads_multipart_form() {
        let transport = MockTransport::with_json(200, json!({"text": "hello world"}));
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let mut request = AudioRequest::new(b"RIFF....".to_vec(), "clip.WAV", "whisper-1");
        request.language = Some("en".to_string());
        request.timestamp_granularities = vec!["word".to_string()];
        let transcription = chatgpt
            .create_transcription(request)
            .await
            .expect("transcription");
        assert_eq!(transcription.text, "hello world");

        let sent = transport.last_request();
        assert!(sent.url.ends_with("/audio/transcriptions"));
        assert!(sent.header("content-type").is_none());
        let form = sent.form_body();
        assert_eq!(form.text_value("model"), Some("whisper-1"));
        assert_eq!(form.text_value("language"), Some("en"));
        assert_eq!(form.text_value("timestamp_granularities[]"), Some("word"));
        assert!(matches!(
            form.file_part("file"),
            Some(FormPart::File { filename, .. }) if filename == "clip.WAV"
        ));
    }

    #[tokio::test]
    async fn plain_text_formats_wrap_the_raw_body() {
        let transport = MockTransport::new();
        transport.push_raw(200, b"1\n00:00:00,000 --> 00:00:01,000\nhi\n".to_vec(), &[]);
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let mut request = AudioRequest::new(vec![1, 2, 3], "clip.mp3", "whisper-1");
        request.response_format = Some("srt".to_string());
        request.language = Some("fr".to_string());
        let translation = chatgpt.create_translation(request).await.expect("srt");
        assert!(translation.text.contains("00:00:00,000"));

        let sent = transport.last_request();
        assert_eq!(sent.header("accept"), Some("text/plain"));
        assert!(sent.form_body().text_value("language").is_none());
    }

    #[test]
    fn audio_validation() {
        assert!(AudioRequest::new(Vec::new(), "a.mp3", "whisper-1").validate().is_err());
        assert!(AudioRequest::new(vec![0], "notes.txt", "whisper-1").validate().is_err());
        assert!(AudioRequest::new(vec![0], "noextension", "whisper-1").validate().is_err());
        assert!(
            AudioRequest::new(vec![0; MAX_AUDIO_BYTES + 1], "a.mp3", "whisper-1")
                .validate()
                .is_err()
        );
        let mut request = AudioRequest::new(vec![0], "a.mp3", "whisper-1");
        request.temperature = Some(1.5);
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn speech_returns_audio_bytes() {
        let transport = MockTransport::new();
        transport.push_raw(200, vec![0xff, 0xfb, 0x90], &[("Content-Type", "audio/mpeg")]);
        let chatgpt = ChatGpt::new(transport.clone(), "sk-test");

        let mut request = SpeechRequest::new("tts-1", "Hello!", "alloy");
        request.speed = Some(1.25);
        let audio = chatgpt.create_speech(&request).await.expect("speech");
        assert_eq!(audio.bytes, vec![0xff, 0xfb, 0x90]);
        assert_eq!(audio.content_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(transport.last_request().json_body()["voice"], "alloy");
    }

    #[test]
    fn speech_validation() {
        assert!(SpeechRequest::new("tts-1", "hi", "robot").validate().is_err());
        assert!(
            SpeechRequest::new("tts-1", "x".repeat(MAX_SPEECH_CHARS + 1), "nova")
                .validate()
                .is_err()
        );
        let mut request = SpeechRequest::new("tts-1", "hi", "nova");
        request.speed = Some(0.1);
        assert!(request.validate().is_err());
    }
}
