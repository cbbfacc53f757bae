//! Media storage endpoints.

use std::path::Path;

use mec_core::{Ack, AssetUpload, AssetUrl};
use serde_json::json;

use crate::error::ApiError;
use crate::AdminApiClient;

/// Multipart field name the upload endpoint reads files from.
pub const UPLOAD_FIELD: &str = "images";

impl AdminApiClient {
    /// Upload one file.
    ///
    /// Calls `POST {base_url}/upload` with a multipart body holding the file
    /// under the `images` field. Returns the stored URLs in the order the
    /// API reported them.
    pub async fn upload(&self, file: &AssetUpload) -> Result<Vec<AssetUrl>, ApiError> {
        let endpoint = "POST /upload";
        let url = self.url("upload");

        let mut part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|e| ApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        }
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let envelope = self
            .send(endpoint, self.http.post(&url).multipart(form))
            .await?;
        let urls: Vec<AssetUrl> = envelope
            .files
            .iter()
            .filter_map(|f| AssetUrl::from_optional(&f.url))
            .collect();
        tracing::debug!(file = %file.file_name, count = urls.len(), "upload stored");
        Ok(urls)
    }

    /// Delete stored files.
    ///
    /// Calls `POST {base_url}/upload/delete` with `{"urls": [...]}`.
    pub async fn delete_uploads(&self, urls: &[AssetUrl]) -> Result<Ack, ApiError> {
        let endpoint = "POST /upload/delete";
        let url = self.url("upload/delete");

        let body = json!({ "urls": urls });
        let envelope = self.send(endpoint, self.http.post(&url).json(&body)).await?;
        Ok(Ack {
            message: envelope.message,
        })
    }
}

/// Read a local file into an upload, guessing the MIME type from the
/// extension.
pub async fn read_upload(path: impl AsRef<Path>) -> Result<AssetUpload, ApiError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let upload = AssetUpload::new(file_name, bytes);
    Ok(match content_type_for(path) {
        Some(content_type) => upload.with_content_type(content_type),
        None => upload,
    })
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("hero.PNG")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("a/b/photo.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("notes.txt")), None);
        assert_eq!(content_type_for(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn read_upload_reports_missing_file() {
        let err = read_upload("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }

    #[tokio::test]
    async fn read_upload_loads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.webp");
        std::fs::write(&path, b"RIFF").unwrap();

        let upload = read_upload(&path).await.unwrap();
        assert_eq!(upload.file_name, "logo.webp");
        assert_eq!(upload.bytes, b"RIFF");
        assert_eq!(upload.content_type.as_deref(), Some("image/webp"));
    }
}
