//! Photo-ID storage, a best-effort side channel of the consent flow.
//! Failures here are logged and surfaced as warnings, never escalated.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PhotoVault: Send + Sync {
    /// Stores the uploaded document and returns its storage path.
    async fn store(&self, fan_id: Uuid, filename: &str, bytes: &[u8]) -> Result<String, String>;
}

/// Writes uploads under a local directory.
pub struct LocalPhotoVault {
    upload_dir: PathBuf,
}

impl LocalPhotoVault {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    fn sanitize(filename: &str) -> String {
        let cleaned: String = filename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        cleaned.trim_matches(['.', '_']).to_string()
    }
}

#[async_trait]
impl PhotoVault for LocalPhotoVault {
    async fn store(&self, fan_id: Uuid, filename: &str, bytes: &[u8]) -> Result<String, String> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| format!("creating upload dir: {e}"))?;
        let path = self
            .upload_dir
            .join(format!("photo_id_{fan_id}_{}", Self::sanitize(filename)));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("writing photo id: {e}"))?;
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(LocalPhotoVault::sanitize("my id!.png"), "my_id_.png");
        assert_eq!(LocalPhotoVault::sanitize("../../etc/passwd"), "etc_passwd");
    }
}
