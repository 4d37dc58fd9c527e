pub mod backend;
pub mod config;
pub mod error;
pub mod image;
pub mod operation;
pub mod outcome;
pub mod preset;
pub mod secret;
pub mod timeline;

// Re-export common types
pub use backend::ImageBackend;
pub use error::WardrobeError;
pub use image::ImageArtifact;
pub use operation::{EditRequest, Hotspot, Operation};
pub use outcome::{EditFailure, TransformReply, TransportError};
pub use preset::{Category, Theme};
pub use timeline::{PageBackground, Timeline, Version};
