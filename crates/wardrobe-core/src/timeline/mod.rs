//! Edit history: an ordered list of image versions plus a cursor.

mod history;
mod model;

pub use history::Timeline;
pub use model::{PageBackground, Version};

/// The edit history used by sessions.
pub type VersionTimeline = Timeline<Version>;
