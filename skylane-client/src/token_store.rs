use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skylane_core::{SessionError, TokenStore};
use skylane_shared::Masked;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: Masked<String>,
}

/// Persists the access token as a small JSON file so a session survives restarts
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(e: impl std::fmt::Display) -> SessionError {
    SessionError::Storage(e.to_string())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Masked<String>>, SessionError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(e)),
        };

        let stored: StoredSession = serde_json::from_str(&raw).map_err(storage_error)?;
        if stored.access_token.is_blank() {
            return Ok(None);
        }
        Ok(Some(stored.access_token))
    }

    async fn save(&self, token: &Masked<String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage_error)?;
        }

        let body = serde_json::to_string(&StoredSession { access_token: token.clone() })
            .map_err(storage_error)?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await.map_err(storage_error)?;

        // An existing file keeps its old mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(storage_error)?;
        }

        file.write_all(body.as_bytes()).await.map_err(storage_error)?;
        file.flush().await.map_err(storage_error)?;

        debug!("Session token written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e)),
        }
    }
}
