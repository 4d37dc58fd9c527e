pub mod image_file;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::paths::WardrobePaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::storage::{ConfigStorage, SecretStorage};
