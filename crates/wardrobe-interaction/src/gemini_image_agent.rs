//! GeminiImageAgent - Direct REST API implementation for Gemini image models.
//!
//! Sends one image plus an instruction per call to `generateContent` and maps
//! the reply onto the backend-neutral [`TransformReply`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wardrobe_core::ImageBackend;
use wardrobe_core::config::{SecretConfig, WardrobeConfig};
use wardrobe_core::error::{Result as WardrobeResult, WardrobeError};
use wardrobe_core::image::ImageArtifact;
use wardrobe_core::operation::TransformCall;
use wardrobe_core::outcome::{BlockSignal, TransformReply, TransportError};
use wardrobe_core::secret::SecretService;

pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Image backend that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiImageAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Builds an agent from loaded secrets and `config.toml`.
    pub fn from_config(secrets: &SecretConfig, config: &WardrobeConfig) -> WardrobeResult<Self> {
        let gemini = secrets.gemini.as_ref().ok_or_else(|| {
            WardrobeError::config("Gemini configuration not found in secret.json")
        })?;
        if gemini.api_key.trim().is_empty() {
            return Err(WardrobeError::Security(
                "Gemini API key is empty; set it in secret.json or GEMINI_API_KEY".to_string(),
            ));
        }

        let mut agent = Self::new(gemini.api_key.trim(), config.resolve_model(secrets));
        if let Some(base_url) = &config.base_url {
            agent = agent.with_base_url(base_url);
        }
        Ok(agent)
    }

    /// Loads secrets through `service` and builds an agent.
    pub async fn try_from_secrets(
        service: &dyn SecretService,
        config: &WardrobeConfig,
    ) -> WardrobeResult<Self> {
        let secrets = service
            .load_secrets()
            .await
            .map_err(WardrobeError::Security)?;
        Self::from_config(&secrets, config)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the REST base URL (everything before `/{model}:generateContent`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(call: &TransformCall) -> GenerateContentRequest {
        let parts = vec![
            Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: call.image.mime_type().to_string(),
                    data: call.image.to_base64(),
                },
            },
            Part::Text {
                text: call.instruction.clone(),
            },
        ];

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        }
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, TransportError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let is_retryable = err.is_connect() || err.is_timeout();
                TransportError {
                    status_code: None,
                    // without_url keeps the API key out of the message
                    message: format!("Gemini API request failed: {}", err.without_url()),
                    is_retryable,
                    retry_after: None,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        response
            .json()
            .await
            .map_err(|err| TransportError::new(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl ImageBackend for GeminiImageAgent {
    fn name(&self) -> &str {
        &self.model
    }

    async fn transform(&self, call: TransformCall) -> Result<TransformReply, TransportError> {
        tracing::info!(
            "[GeminiImage] Sending {} ({} bytes) to {}",
            call.image.mime_type(),
            call.image.len(),
            self.model
        );
        let request = Self::build_request(&call);
        let response = self.send_request(&request).await?;
        let reply = into_reply(response)?;
        tracing::debug!(
            "[GeminiImage] Reply: blocked={}, image={}, finish_reason={:?}",
            reply.block.is_some(),
            reply.image.is_some(),
            reply.finish_reason
        );
        Ok(reply)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    block_reason_message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn into_reply(response: GenerateContentResponse) -> Result<TransformReply, TransportError> {
    let block = response
        .prompt_feedback
        .and_then(|feedback| {
            feedback.block_reason.map(|reason| BlockSignal {
                reason,
                message: feedback.block_reason_message,
            })
        });

    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next());
    let Some(candidate) = candidate else {
        return Ok(TransformReply {
            block,
            ..Default::default()
        });
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    // A blocked reply is reported as blocked even if it carries image data.
    let image = match (&block, parts.iter().find_map(|part| part.inline_data.as_ref())) {
        (None, Some(inline)) => Some(
            ImageArtifact::from_base64(
                "generated",
                inline.mime_type.as_str(),
                &inline.data,
            )
            .map_err(|err| {
                TransportError::new(format!("Gemini returned unusable image data: {err}"))
            })?,
        ),
        _ => None,
    };

    let text: String = parts.iter().filter_map(|part| part.text.as_deref()).collect();

    Ok(TransformReply {
        block,
        image,
        finish_reason: candidate.finish_reason,
        text: Some(text).filter(|t| !t.trim().is_empty()),
    })
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> TransportError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    TransportError {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are not handled
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wardrobe_core::config::GeminiConfig;

    const PNG_B64: &str = "iVBORw0KGgo=";

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).expect("fixture should parse")
    }

    #[test]
    fn test_request_shape() {
        let image = Arc::new(ImageArtifact::new("p.png", "image/png", vec![1u8, 2, 3]).unwrap());
        let call = TransformCall {
            image,
            instruction: "make it blue".to_string(),
        };
        let json = serde_json::to_value(GeminiImageAgent::build_request(&call)).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["data"], "AQID");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "make it blue");
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE", "TEXT"])
        );
    }

    #[test]
    fn test_image_reply() {
        let reply = into_reply(parse(&format!(
            r#"{{"candidates":[{{"content":{{"parts":[
                {{"text":"Here it is"}},
                {{"inlineData":{{"mimeType":"image/png","data":"{PNG_B64}"}}}}
            ]}},"finishReason":"STOP"}}]}}"#
        )))
        .unwrap();

        let image = reply.image.unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(&image.bytes()[1..4], b"PNG");
        assert_eq!(reply.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(reply.text.as_deref(), Some("Here it is"));
    }

    #[test]
    fn test_block_reply_skips_image() {
        let reply = into_reply(parse(&format!(
            r#"{{"promptFeedback":{{"blockReason":"SAFETY","blockReasonMessage":"nope"}},
                "candidates":[{{"content":{{"parts":[{{"inlineData":{{"mimeType":"image/png","data":"{PNG_B64}"}}}}]}}}}]}}"#
        )))
        .unwrap();
        let block = reply.block.unwrap();
        assert_eq!(block.reason, "SAFETY");
        assert_eq!(block.message.as_deref(), Some("nope"));
        assert!(reply.image.is_none());
    }

    #[test]
    fn test_block_without_candidates() {
        let reply = into_reply(parse(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#)).unwrap();
        assert_eq!(reply.block.unwrap().reason, "OTHER");
        assert!(reply.finish_reason.is_none());
    }

    #[test]
    fn test_refusal_reply() {
        let reply = into_reply(parse(
            r#"{"candidates":[{"finishReason":"IMAGE_SAFETY"}]}"#,
        ))
        .unwrap();
        assert!(reply.image.is_none());
        assert!(reply.text.is_none());
        assert_eq!(reply.finish_reason.as_deref(), Some("IMAGE_SAFETY"));
    }

    #[test]
    fn test_bad_base64_is_transport_error() {
        let err = into_reply(parse(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"!!!"}}]}}]}"#,
        ))
        .unwrap_err();
        assert!(err.message.contains("unusable image data"));
    }

    #[test]
    fn test_map_http_error_parses_google_error() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            body.to_string(),
            Some(Duration::from_secs(7)),
        );
        assert_eq!(err.status_code, Some(429));
        assert_eq!(err.message, "RESOURCE_EXHAUSTED: Quota exceeded");
        assert!(err.is_retryable);
        assert!(err.is_quota());
        assert_eq!(err.retry_after, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "bad".to_string(), None);
        assert_eq!(err.message, "bad");
        assert!(!err.is_retryable);
    }

    #[test]
    fn test_parse_retry_after() {
        let header = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&header)), Some(Duration::from_secs(12)));
        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = WardrobeConfig::default();
        assert!(GeminiImageAgent::from_config(&SecretConfig::default(), &config).is_err());

        let blank = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "  ".to_string(),
                model_name: None,
            }),
        };
        assert!(matches!(
            GeminiImageAgent::from_config(&blank, &config),
            Err(WardrobeError::Security(_))
        ));

        let ok = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "key".to_string(),
                model_name: None,
            }),
        };
        let agent = GeminiImageAgent::from_config(&ok, &config).unwrap();
        assert_eq!(agent.model(), config.model);
    }
}
