//! File-backed persistence of the access token

use crate::error::{Result, SdkError};
use etcetera::{choose_base_strategy, BaseStrategy};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const TOKEN_FILE: &str = "access_token";

/// Get the default data directory for SDK token storage
/// Returns platform-specific data directory (e.g., ~/.local/share/coffee-shop on Linux)
pub fn get_sdk_data_dir() -> Result<PathBuf> {
    let strategy = choose_base_strategy().map_err(|e| SdkError::Internal {
        message: format!("Failed to determine base directories: {e}"),
    })?;

    Ok(strategy.data_dir().join("coffee-shop"))
}

/// Stores a single access token in a file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store the token under `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_FILE),
        }
    }

    /// Store in the platform data directory
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(get_sdk_data_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, permissions).await?;
        }

        debug!("Saved access token to {}", self.path.display());
        Ok(())
    }

    /// The stored token, or `None` if nothing was saved
    pub async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
