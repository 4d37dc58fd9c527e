use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::image::ImageArtifact;

/// Full-page background associated with a version.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBackground {
    /// Image produced by an environment edit.
    Image(Arc<ImageArtifact>),
}

/// One immutable image state in the edit history.
#[derive(Debug, Clone)]
pub struct Version {
    pub id: String,
    pub image: Arc<ImageArtifact>,
    pub background: Option<PageBackground>,
    pub created_at: DateTime<Utc>,
}

impl Version {
    pub fn new(image: impl Into<Arc<ImageArtifact>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image: image.into(),
            background: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_background(mut self, background: Option<PageBackground>) -> Self {
        self.background = background;
        self
    }

    pub fn file_name(&self) -> &str {
        self.image.file_name()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
