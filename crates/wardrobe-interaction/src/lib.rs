//! Remote image backends.

pub mod gemini_image_agent;

pub use gemini_image_agent::GeminiImageAgent;
