//! Multipart image uploads
//!
//! [`ImageUpload`] consumes a `multipart/form-data` body before the
//! handler runs. Text parts are collected as form fields; exactly one file
//! part is accepted under the configured field name. The file must carry
//! an allowed MIME type and stay under the size limit, otherwise the
//! request is rejected and nothing reaches the handler or the store.
//!
//! The extractor only parses and checks; the handler decides when the
//! file is written. Files are stored under the upload directory using the
//! client's filename, so two stored uploads with the same name overwrite
//! each other (last write wins).

use crate::config::UploadConfig;
use crate::core::error::{ApiError, UploadError};
use axum::extract::{FromRef, FromRequest, Multipart, Request};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Maximum accepted image size: 5 MiB
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Rules an uploaded file must satisfy
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Directory files are written to
    pub dir: PathBuf,
    /// Form field carrying the file
    pub field_name: String,
    /// Maximum file size in bytes
    pub max_file_size: usize,
    /// Accepted `Content-Type` values of the file part
    pub allowed_mime_types: Vec<String>,
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            field_name: config.field_name.clone(),
            max_file_size: config.max_file_size,
            allowed_mime_types: config.allowed_mime_types.clone(),
        }
    }

    /// Whether `content_type` is on the allow-list (parameters ignored)
    pub fn accepts(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }

    /// Body limit for a whole form: the file plus room for text fields
    pub fn body_limit(&self) -> usize {
        self.max_file_size.saturating_add(64 * 1024)
    }

    /// Path the file will be stored at, and the reference handed out for it
    fn destination(&self, file_name: &str) -> Result<(PathBuf, String), UploadError> {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| UploadError::MissingFile {
                field: self.field_name.clone(),
            })?;

        let path = self.dir.join(name);
        let reference = path.to_string_lossy().replace('\\', "/");
        Ok((path, reference))
    }
}

/// File part that passed the type and size checks, held in memory
///
/// Nothing touches the upload directory until [`ImageFile::store`] is
/// called, so a request rejected after parsing leaves existing files alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    /// Where the file will be written (directory components removed)
    pub path: PathBuf,
    /// Path reference persisted on the entity
    pub reference: String,
    pub content_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Write the file under the upload directory, replacing any file of
    /// the same name
    pub async fn store(&self, policy: &UploadPolicy) -> Result<&str, UploadError> {
        let io_error = |e: std::io::Error| UploadError::Io {
            message: e.to_string(),
        };
        tokio::fs::create_dir_all(&policy.dir)
            .await
            .map_err(io_error)?;
        tokio::fs::write(&self.path, &self.bytes)
            .await
            .map_err(io_error)?;

        tracing::info!(
            path = %self.reference,
            content_type = %self.content_type,
            size = self.size(),
            "stored upload"
        );
        Ok(&self.reference)
    }
}

/// A parsed multipart form with its (optional) image
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub fields: HashMap<String, String>,
    pub file: Option<ImageFile>,
}

impl ImageUpload {
    /// The image part, or a `400` when the form carried none
    pub fn require_file(&self, field_name: &str) -> Result<&ImageFile, UploadError> {
        self.file.as_ref().ok_or_else(|| UploadError::MissingFile {
            field: field_name.to_string(),
        })
    }

    async fn read(mut multipart: Multipart, policy: &UploadPolicy) -> Result<Self, UploadError> {
        let mut upload = ImageUpload::default();

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let text = field.text().await?;
                upload.fields.insert(name, text);
                continue;
            };

            if name != policy.field_name || upload.file.is_some() {
                return Err(UploadError::UnexpectedFile { field: name });
            }

            let content_type = field.content_type().unwrap_or_default().to_string();
            if !policy.accepts(&content_type) {
                tracing::warn!(%content_type, file = %file_name, "rejected upload: unsupported type");
                return Err(UploadError::UnsupportedMediaType {
                    content_type,
                    allowed: policy.allowed_mime_types.clone(),
                });
            }

            let (path, reference) = policy.destination(&file_name)?;

            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                if bytes.len() + chunk.len() > policy.max_file_size {
                    tracing::warn!(file = %file_name, limit = policy.max_file_size, "rejected upload: too large");
                    return Err(UploadError::TooLarge {
                        limit: policy.max_file_size,
                    });
                }
                bytes.extend_from_slice(&chunk);
            }

            upload.file = Some(ImageFile {
                path,
                reference,
                content_type,
                bytes,
            });
        }

        Ok(upload)
    }
}

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
    Arc<UploadPolicy>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let policy = Arc::<UploadPolicy>::from_ref(state);
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| UploadError::Multipart {
                status: axum::http::StatusCode::BAD_REQUEST,
                message: e.body_text(),
            })?;

        Ok(Self::read(multipart, &policy).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(dir: &Path) -> UploadPolicy {
        UploadPolicy {
            dir: dir.to_path_buf(),
            field_name: "productImage".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }

    #[test]
    fn test_default_limit_is_five_mebibytes() {
        assert_eq!(DEFAULT_MAX_FILE_SIZE, 5_242_880);
    }

    #[test]
    fn test_accepts_only_allowed_types() {
        let policy = policy(Path::new("uploads"));
        assert!(policy.accepts("image/png"));
        assert!(policy.accepts("IMAGE/JPEG"));
        assert!(policy.accepts("image/jpeg; charset=binary"));
        assert!(!policy.accepts("image/gif"));
        assert!(!policy.accepts("text/plain"));
        assert!(!policy.accepts(""));
    }

    #[test]
    fn test_destination_strips_directories() {
        let policy = policy(Path::new("uploads"));
        let (path, reference) = policy.destination("../../etc/lamp.png").unwrap();
        assert_eq!(path, Path::new("uploads").join("lamp.png"));
        assert_eq!(reference, "uploads/lamp.png");
    }

    #[test]
    fn test_destination_rejects_empty_name() {
        let policy = policy(Path::new("uploads"));
        assert!(policy.destination("").is_err());
        assert!(policy.destination("..").is_err());
    }

    #[test]
    fn test_body_limit_leaves_room_for_fields() {
        let policy = policy(Path::new("uploads"));
        assert!(policy.body_limit() > policy.max_file_size);
    }

    #[test]
    fn test_require_file() {
        let upload = ImageUpload::default();
        assert!(upload.require_file("productImage").is_err());
    }

    fn image(policy: &UploadPolicy, name: &str, bytes: &[u8]) -> ImageFile {
        let (path, reference) = policy.destination(name).unwrap();
        ImageFile {
            path,
            reference,
            content_type: "image/png".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_store_creates_directory_and_writes_file() {
        let root = tempfile::tempdir().unwrap();
        let policy = policy(&root.path().join("nested"));
        let file = image(&policy, "lamp.png", b"png-bytes");

        let reference = file.store(&policy).await.unwrap();
        assert!(reference.ends_with("nested/lamp.png"));
        assert_eq!(std::fs::read(&file.path).unwrap(), b"png-bytes");
        assert_eq!(file.size(), 9);
    }
}
