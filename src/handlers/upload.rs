use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde_json::json;
use std::path::Path;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::handlers::{internal_error, validation_error, ApiError};

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// POST /api/upload-image
///
/// Multipart upload of one `image` field. The file lands under the upload
/// directory with a generated unique name and is served back at
/// `/uploads/<name>`.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error(&format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| validation_error("No file selected"))?;
        let extension = allowed_extension(&filename).ok_or_else(|| {
            validation_error("Invalid file type. Only PNG, JPG, JPEG, GIF, and WebP are allowed.")
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| validation_error(&format!("Failed to read upload: {}", e)))?;

        tokio::fs::create_dir_all(&state.cfg.upload_dir)
            .await
            .map_err(|e| internal_error("Failed to upload image", e))?;

        let unique_filename = format!("{}.{}", Uuid::new_v4(), extension);
        let filepath = Path::new(&state.cfg.upload_dir).join(&unique_filename);
        tokio::fs::write(&filepath, &bytes)
            .await
            .map_err(|e| internal_error("Failed to upload image", e))?;

        let image_url = format!(
            "{}/uploads/{}",
            state.cfg.base_url.trim_end_matches('/'),
            unique_filename
        );

        return Ok(Json(json!({
            "success": true,
            "image_url": image_url,
            "filename": unique_filename,
            "message": "Image uploaded successfully",
        })));
    }

    Err(validation_error("No image file provided"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension_accepts_listed_types() {
        for name in ["a.png", "b.JPG", "c.jpeg", "d.gif", "photo.webp"] {
            assert!(allowed_extension(name).is_some(), "name: {}", name);
        }
    }

    #[test]
    fn test_allowed_extension_rejects_others() {
        for name in ["a.exe", "b.svg", "noext", "tricky.png.sh"] {
            assert!(allowed_extension(name).is_none(), "name: {}", name);
        }
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(allowed_extension("photo.WEBP").unwrap(), "webp");
    }
}
