//! Edit Gateway
//!
//! Turns one [`EditRequest`] into exactly one backend call and classifies the
//! reply. Every operation goes through the same path; only the instruction
//! template differs.

use std::sync::Arc;

use wardrobe_core::ImageBackend;
use wardrobe_core::error::Result as WardrobeResult;
use wardrobe_core::image::ImageArtifact;
use wardrobe_core::operation::{EditRequest, InstructionTemplates, Operation, TransformCall};
use wardrobe_core::outcome::{EditFailure, classify};
use wardrobe_core::preset::Theme;

pub struct EditGateway {
    backend: Arc<dyn ImageBackend>,
    templates: InstructionTemplates,
}

impl EditGateway {
    pub fn new(backend: Arc<dyn ImageBackend>) -> WardrobeResult<Self> {
        Ok(Self {
            backend,
            templates: InstructionTemplates::new()?,
        })
    }

    /// Renders the instruction text for `operation` without sending anything.
    pub fn instruction(
        &self,
        operation: &Operation,
        prompt: &str,
        theme: Theme,
    ) -> Result<String, EditFailure> {
        self.templates
            .render(operation, prompt, theme)
            .map_err(|e| EditFailure::invalid(format!("Failed to build instruction: {e}")))
    }

    /// Sends `request` and returns the produced image, named after the operation.
    pub async fn run(&self, request: EditRequest, theme: Theme) -> Result<ImageArtifact, EditFailure> {
        request.validate().map_err(EditFailure::InvalidRequest)?;

        let operation = request.operation;
        let source_name = request.image.file_name().to_string();
        let instruction = self.instruction(&operation, &request.prompt, theme)?;

        tracing::info!(
            "[Gateway] Starting {} via {} (theme: {})",
            operation,
            self.backend.name(),
            theme
        );

        let call = TransformCall {
            image: request.image,
            instruction,
        };

        let reply = self.backend.transform(call).await.inspect_err(|err| {
            tracing::error!("[Gateway] {} call failed: {}", operation, err);
        })?;

        let image = classify(reply).inspect_err(|failure| {
            tracing::warn!("[Gateway] {} produced no image: {:?}", operation, failure);
        })?;

        tracing::info!(
            "[Gateway] Received image data ({}) for {}",
            image.mime_type(),
            operation.context()
        );
        let file_name = output_file_name(&operation, &source_name, image.extension());
        Ok(image.renamed(file_name))
    }
}

/// `nobg-<upload name>` for isolation, `<stem>-<millis>.<ext>` otherwise.
fn output_file_name(operation: &Operation, source_name: &str, extension: &str) -> String {
    match operation {
        Operation::Isolate => format!("{}-{}", operation.file_stem(), source_name),
        _ => format!(
            "{}-{}.{}",
            operation.file_stem(),
            chrono::Utc::now().timestamp_millis(),
            extension
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wardrobe_core::operation::Hotspot;
    use wardrobe_core::outcome::{BlockSignal, TransformReply, TransportError};

    struct OneShotBackend {
        reply: Mutex<Option<Result<TransformReply, TransportError>>>,
        instructions: Mutex<Vec<String>>,
    }

    impl OneShotBackend {
        fn new(reply: Result<TransformReply, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                instructions: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.instructions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageBackend for OneShotBackend {
        fn name(&self) -> &str {
            "one-shot"
        }

        async fn transform(&self, call: TransformCall) -> Result<TransformReply, TransportError> {
            self.instructions.lock().unwrap().push(call.instruction);
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("backend called more than once")
        }
    }

    fn upload() -> Arc<ImageArtifact> {
        Arc::new(ImageArtifact::new("me.png", "image/png", vec![1u8, 2, 3]).unwrap())
    }

    fn image_reply() -> TransformReply {
        TransformReply {
            image: Some(ImageArtifact::new("generated", "image/jpeg", vec![9u8; 3]).unwrap()),
            finish_reason: Some("STOP".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_isolation_names_after_upload() {
        let backend = OneShotBackend::new(Ok(image_reply()));
        let gateway = EditGateway::new(backend.clone()).unwrap();

        let image = gateway
            .run(EditRequest::isolate(upload()), Theme::Cyberpunk)
            .await
            .unwrap();
        assert_eq!(image.file_name(), "nobg-me.png");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_edit_names_by_operation() {
        let backend = OneShotBackend::new(Ok(image_reply()));
        let gateway = EditGateway::new(backend.clone()).unwrap();

        let image = gateway
            .run(
                EditRequest::new(upload(), Operation::Outfit, "trench coat"),
                Theme::Cyberpunk,
            )
            .await
            .unwrap();
        assert!(image.file_name().starts_with("styled-"));
        assert!(image.file_name().ends_with(".jpg"));

        let instruction = backend.instructions.lock().unwrap()[0].clone();
        assert!(instruction.contains("Change my outfit to: a trench coat"));
    }

    #[tokio::test]
    async fn test_localized_edit_sends_coordinates_in_instruction() {
        let backend = OneShotBackend::new(Ok(image_reply()));
        let gateway = EditGateway::new(backend.clone()).unwrap();

        let operation = Operation::LocalizedEdit {
            hotspot: Hotspot::new(64, 200),
        };
        gateway
            .run(EditRequest::new(upload(), operation, "add a scar"), Theme::Fantasy)
            .await
            .unwrap();

        let instruction = backend.instructions.lock().unwrap()[0].clone();
        assert!(instruction.contains("(x: 64, y: 200)"));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_backend() {
        let backend = OneShotBackend::new(Ok(image_reply()));
        let gateway = EditGateway::new(backend.clone()).unwrap();

        let err = gateway
            .run(EditRequest::new(upload(), Operation::Filter, " "), Theme::Fantasy)
            .await
            .unwrap_err();
        assert!(matches!(err, EditFailure::InvalidRequest(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_block_is_reported() {
        let backend = OneShotBackend::new(Ok(TransformReply {
            block: Some(BlockSignal {
                reason: "SAFETY".to_string(),
                message: None,
            }),
            ..image_reply()
        }));
        let gateway = EditGateway::new(backend).unwrap();

        let err = gateway
            .run(EditRequest::new(upload(), Operation::Action, "jump"), Theme::Cyberpunk)
            .await
            .unwrap_err();
        assert!(err.is_blocked());
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let backend = OneShotBackend::new(Err(TransportError::new("quota exceeded").with_status(429)));
        let gateway = EditGateway::new(backend).unwrap();

        let err = gateway
            .run(
                EditRequest::new(upload(), Operation::Background, "a castle"),
                Theme::Fantasy,
            )
            .await
            .unwrap_err();
        assert!(err.is_quota());
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(&Operation::Isolate, "a.png", "png"), "nobg-a.png");
        let name = output_file_name(&Operation::Filter, "a.png", "webp");
        assert!(name.starts_with("filtered-") && name.ends_with(".webp"));
    }
}
