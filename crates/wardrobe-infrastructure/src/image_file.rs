//! Reading uploads from disk and writing downloads back.

use std::path::{Path, PathBuf};

use wardrobe_core::error::{Result, WardrobeError};
use wardrobe_core::image::{ImageArtifact, sniff_mime};

/// Loads an image file as an upload.
///
/// The MIME type comes from the file extension; when the extension is
/// missing or not an image type, the leading bytes are sniffed instead.
pub async fn load_image(path: &Path) -> Result<ImageArtifact> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WardrobeError::not_found("image", path.display().to_string())
        } else {
            e.into()
        }
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let guessed = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string());

    let mime_type = match guessed {
        Some(mime) => mime,
        None => sniff_mime(&bytes)
            .map(str::to_string)
            .ok_or_else(|| {
                WardrobeError::invalid_image(format!(
                    "{} is not a recognized image file",
                    path.display()
                ))
            })?,
    };

    tracing::debug!(
        "[ImageFile] Loaded {:?} ({} bytes, {})",
        path,
        bytes.len(),
        mime_type
    );
    ImageArtifact::new(file_name, mime_type, bytes)
}

/// Writes `image` into `dir` under `file_name`, creating `dir` if needed.
pub async fn save_image(dir: &Path, file_name: &str, image: &ImageArtifact) -> Result<PathBuf> {
    let file_name = Path::new(file_name)
        .file_name()
        .ok_or_else(|| WardrobeError::io(format!("invalid file name '{file_name}'")))?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, image.bytes()).await?;

    tracing::info!("[ImageFile] Saved {:?} ({} bytes)", path, image.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn test_load_uses_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("portrait.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.file_name(), "portrait.jpg");
    }

    #[tokio::test]
    async fn test_load_sniffs_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("portrait");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_load_rejects_non_images() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = load_image(&path).await.unwrap_err();
        assert!(matches!(err, WardrobeError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_image(&temp_dir.path().join("missing.png"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_strips_directories_from_name() {
        let temp_dir = TempDir::new().unwrap();
        let image = ImageArtifact::sniffed("p.png", PNG_HEADER.to_vec()).unwrap();

        let path = save_image(&temp_dir.path().join("out"), "../escape.png", &image)
            .await
            .unwrap();
        assert_eq!(path, temp_dir.path().join("out").join("escape.png"));
        assert_eq!(std::fs::read(&path).unwrap(), PNG_HEADER);
    }
}
