//! Classification of image backend replies.
//!
//! A reply is turned into either a new image or exactly one [`EditFailure`].
//! The checks run in a fixed priority order: block signal, image data,
//! abnormal finish reason, explanatory text, and finally a generic failure.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::image::ImageArtifact;
use crate::operation::Operation;

/// Finish reason of a normally completed generation.
pub const NORMAL_FINISH_REASON: &str = "STOP";

const QUOTA_MESSAGE: &str = "API Quota Exceeded. You've made too many requests recently. Please wait a moment before trying again, or check your API key's plan and billing details.";

static QUOTA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)quota|RESOURCE_EXHAUSTED").expect("quota pattern is valid")
});

/// Policy gate rejection reported before any generation happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignal {
    pub reason: String,
    pub message: Option<String>,
}

/// Backend-neutral shape of one transform reply.
#[derive(Debug, Clone, Default)]
pub struct TransformReply {
    pub block: Option<BlockSignal>,
    pub image: Option<ImageArtifact>,
    pub finish_reason: Option<String>,
    pub text: Option<String>,
}

/// The underlying call failed outright.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub status_code: Option<u16>,
    pub message: String,
    pub is_retryable: bool,
    pub retry_after: Option<Duration>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            is_retryable: false,
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Rate-limit or quota exhaustion.
    pub fn is_quota(&self) -> bool {
        self.status_code == Some(429)
            || self.message.contains("429")
            || QUOTA_PATTERN.is_match(&self.message)
    }
}

/// Every way an edit can fail to produce a new version.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditFailure {
    /// Prompt rejected by the policy gate; the user should rephrase.
    #[error("Request was blocked. Reason: {reason}")]
    Blocked {
        reason: String,
        message: Option<String>,
    },

    /// Generation finished without an image (e.g. a safety stop).
    #[error("Generation stopped unexpectedly. Reason: {reason}.")]
    Refused { reason: String },

    /// The model answered with text only, or with nothing.
    #[error("No image returned")]
    NoImageReturned { text: Option<String> },

    /// The call itself failed (network, HTTP status, quota).
    #[error("{0}")]
    TransportOrQuota(TransportError),

    /// Preconditions were not met; nothing was sent.
    #[error("{0}")]
    InvalidRequest(String),
}

impl EditFailure {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, Self::TransportOrQuota(err) if err.is_quota())
    }

    /// Detail sentence describing the failure in the context of `operation`.
    pub fn detail(&self, operation: &Operation) -> String {
        let context = operation.context();
        match self {
            Self::Blocked { reason, message } => format!(
                "Request was blocked. Reason: {reason}. {}",
                message.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string(),
            Self::Refused { reason } => format!(
                "Image generation for {context} stopped unexpectedly. Reason: {reason}. This often relates to safety settings."
            ),
            Self::NoImageReturned { text: Some(text) } => format!(
                "The AI model did not return an image for the {context}. The model responded with text: \"{text}\""
            ),
            Self::NoImageReturned { text: None } => format!(
                "The AI model did not return an image for the {context}. This can happen due to safety filters or if the request is too complex. Please try rephrasing your prompt to be more direct."
            ),
            Self::TransportOrQuota(err) => err.message.clone(),
            Self::InvalidRequest(message) => message.clone(),
        }
    }

    /// The single human-readable message shown to the user.
    pub fn user_message(&self, operation: &Operation) -> String {
        match self {
            Self::TransportOrQuota(err) if err.is_quota() => QUOTA_MESSAGE.to_string(),
            Self::InvalidRequest(message) => message.clone(),
            _ => format!(
                "Failed to {}. {}",
                operation.action_phrase(),
                self.detail(operation)
            ),
        }
    }
}

impl From<TransportError> for EditFailure {
    fn from(err: TransportError) -> Self {
        Self::TransportOrQuota(err)
    }
}

/// Classifies one reply, in strict priority order.
pub fn classify(reply: TransformReply) -> Result<ImageArtifact, EditFailure> {
    if let Some(block) = reply.block {
        return Err(EditFailure::Blocked {
            reason: block.reason,
            message: block.message.filter(|m| !m.trim().is_empty()),
        });
    }

    if let Some(image) = reply.image {
        return Ok(image);
    }

    if let Some(reason) = reply.finish_reason
        && reason != NORMAL_FINISH_REASON
    {
        return Err(EditFailure::Refused { reason });
    }

    let text = reply
        .text
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    Err(EditFailure::NoImageReturned { text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageArtifact {
        ImageArtifact::new("out.png", "image/png", vec![7u8; 4]).unwrap()
    }

    fn block() -> BlockSignal {
        BlockSignal {
            reason: "SAFETY".to_string(),
            message: Some("Prompt violates policy".to_string()),
        }
    }

    #[test]
    fn test_block_wins_over_image() {
        let reply = TransformReply {
            block: Some(block()),
            image: Some(image()),
            finish_reason: Some("STOP".to_string()),
            text: Some("here you go".to_string()),
        };
        let err = classify(reply).unwrap_err();
        assert!(err.is_blocked());
    }

    #[test]
    fn test_image_wins_over_finish_reason() {
        let reply = TransformReply {
            image: Some(image()),
            finish_reason: Some("SAFETY".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(reply).unwrap().file_name(), "out.png");
    }

    #[test]
    fn test_abnormal_finish_reason_is_refused() {
        let reply = TransformReply {
            finish_reason: Some("IMAGE_SAFETY".to_string()),
            text: Some("I can't do that".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify(reply).unwrap_err(),
            EditFailure::Refused {
                reason: "IMAGE_SAFETY".to_string()
            }
        );
    }

    #[test]
    fn test_text_only_reply() {
        let reply = TransformReply {
            finish_reason: Some("STOP".to_string()),
            text: Some("  Here is a description instead. ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify(reply).unwrap_err(),
            EditFailure::NoImageReturned {
                text: Some("Here is a description instead.".to_string())
            }
        );
    }

    #[test]
    fn test_empty_reply_is_generic_no_image() {
        assert_eq!(
            classify(TransformReply::default()).unwrap_err(),
            EditFailure::NoImageReturned { text: None }
        );
        let blank_text = TransformReply {
            text: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify(blank_text).unwrap_err(),
            EditFailure::NoImageReturned { text: None }
        );
    }

    #[test]
    fn test_blocked_and_refused_messages_differ() {
        let op = Operation::Filter;
        let blocked = EditFailure::Blocked {
            reason: "SAFETY".to_string(),
            message: None,
        }
        .user_message(&op);
        let refused = EditFailure::Refused {
            reason: "SAFETY".to_string(),
        }
        .user_message(&op);

        assert_eq!(
            blocked,
            "Failed to apply the effect. Request was blocked. Reason: SAFETY."
        );
        assert!(refused.starts_with("Failed to apply the effect. Image generation for filter"));
        assert_ne!(blocked, refused);
    }

    #[test]
    fn test_quota_detection() {
        assert!(TransportError::new("boom").with_status(429).is_quota());
        assert!(TransportError::new("RESOURCE_EXHAUSTED: try later").is_quota());
        assert!(TransportError::new("You exceeded your current Quota").is_quota());
        assert!(!TransportError::new("connection reset").with_status(500).is_quota());

        let failure = EditFailure::from(TransportError::new("quota exceeded"));
        assert!(failure.is_quota());
        assert!(failure
            .user_message(&Operation::Outfit)
            .starts_with("API Quota Exceeded."));
    }

    #[test]
    fn test_transport_message_is_wrapped() {
        let failure = EditFailure::from(TransportError::new("connection refused"));
        assert_eq!(
            failure.user_message(&Operation::Background),
            "Failed to change the environment. connection refused"
        );
    }

    #[test]
    fn test_no_image_detail_quotes_text() {
        let failure = EditFailure::NoImageReturned {
            text: Some("nope".to_string()),
        };
        assert_eq!(
            failure.detail(&Operation::Outfit),
            "The AI model did not return an image for the outfit. The model responded with text: \"nope\""
        );
    }
}
