//! Edit operations and the requests sent to the image backend.

mod template;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::image::ImageArtifact;

pub use template::InstructionTemplates;

/// Pixel coordinate a localized edit focuses on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

impl Hotspot {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Every kind of transform the gateway can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Initial background isolation of an upload.
    Isolate,
    /// Natural edit around a focus point.
    LocalizedEdit { hotspot: Hotspot },
    /// Stylistic post-processing over the whole image.
    Filter,
    /// Cosmetic modification of the character.
    Adjustment,
    /// Clothing replacement.
    Outfit,
    /// Background replacement.
    Background,
    /// Pose or action change.
    Action,
}

impl Operation {
    /// Name of the instruction template for this operation.
    pub fn template_name(&self) -> &'static str {
        match self {
            Operation::Isolate => "isolate",
            Operation::LocalizedEdit { .. } => "localized_edit",
            Operation::Filter => "filter",
            Operation::Adjustment => "adjustment",
            Operation::Outfit => "outfit",
            Operation::Background => "background",
            Operation::Action => "action",
        }
    }

    /// Noun used in classification messages ("did not return an image for the outfit").
    pub fn context(&self) -> &'static str {
        match self {
            Operation::Isolate => "background removal",
            Operation::LocalizedEdit { .. } => "edit",
            Operation::Filter => "filter",
            Operation::Adjustment => "adjustment",
            Operation::Outfit => "outfit",
            Operation::Background => "background",
            Operation::Action => "action",
        }
    }

    /// Verb phrase used in user messages ("Failed to apply the outfit.").
    pub fn action_phrase(&self) -> &'static str {
        match self {
            Operation::Isolate => "remove background",
            Operation::LocalizedEdit { .. } => "apply the edit",
            Operation::Filter => "apply the effect",
            Operation::Adjustment => "apply the modification",
            Operation::Outfit => "apply the outfit",
            Operation::Background => "change the environment",
            Operation::Action => "apply the action",
        }
    }

    /// File name stem for produced images.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Operation::Isolate => "nobg",
            Operation::LocalizedEdit { .. } => "edited",
            Operation::Filter => "filtered",
            Operation::Adjustment => "adjusted",
            Operation::Outfit => "styled",
            Operation::Background => "background",
            Operation::Action => "action",
        }
    }

    /// Isolation works on the upload alone; every other operation needs a prompt.
    pub fn requires_prompt(&self) -> bool {
        !matches!(self, Operation::Isolate)
    }

    pub fn hotspot(&self) -> Option<Hotspot> {
        match self {
            Operation::LocalizedEdit { hotspot } => Some(*hotspot),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

/// A single transform request: consumed by the gateway, never retained.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub image: Arc<ImageArtifact>,
    pub operation: Operation,
    pub prompt: String,
}

impl EditRequest {
    pub fn new(image: Arc<ImageArtifact>, operation: Operation, prompt: impl Into<String>) -> Self {
        Self {
            image,
            operation,
            prompt: prompt.into(),
        }
    }

    /// Background isolation of an upload.
    pub fn isolate(image: Arc<ImageArtifact>) -> Self {
        Self::new(image, Operation::Isolate, String::new())
    }

    /// Checks the input constraints before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.operation.requires_prompt() && self.prompt.trim().is_empty() {
            return Err(format!(
                "A prompt is required to {}.",
                self.operation.action_phrase()
            ));
        }
        if self.image.is_empty() {
            return Err("The current image has no data.".to_string());
        }
        Ok(())
    }
}

/// The outbound payload for one call to the image backend.
#[derive(Debug, Clone)]
pub struct TransformCall {
    pub image: Arc<ImageArtifact>,
    pub instruction: String,
}
