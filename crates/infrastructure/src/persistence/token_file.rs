//! File-backed token store.
//!
//! The pair lives in a small JSON file:
//!
//! ```json
//! {
//!   "access_token": "...",
//!   "refresh_token": "..."
//! }
//! ```
//!
//! The file is read once when the store is opened and rewritten on every
//! mutation (temp file + rename). Reads are served from memory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use farmhand_application::ports::TokenStore;
use farmhand_domain::TokenPair;

use crate::serialization::{SerializationError, from_json_bytes, to_json_pretty};

/// Errors reading or writing the token file.
#[derive(Debug, thiserror::Error)]
pub enum TokenFileError {
    /// Filesystem failure.
    #[error("token file {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The file content is not a token document.
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Token store persisted to a JSON file.
///
/// Storage failures never surface to callers: they are logged and the
/// in-memory view keeps the value the caller set.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    tokens: RwLock<StoredTokens>,
}

impl FileTokenStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tokens = match Self::load(&path) {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable token file");
                StoredTokens::default()
            }
        };
        Self {
            path,
            tokens: RwLock::new(tokens),
        }
    }

    /// Returns `<data dir>/farmhand/tokens.json`, if the platform has a data dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("farmhand").join("tokens.json"))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<StoredTokens, TokenFileError> {
        match fs::read(path) {
            Ok(bytes) => Ok(from_json_bytes(&bytes)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(StoredTokens::default()),
            Err(source) => Err(TokenFileError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn write(path: &Path, tokens: &StoredTokens) -> Result<(), TokenFileError> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| TokenFileError::Io { path, source }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, to_json_pretty(tokens)?).map_err(io_error(&temp))?;
        restrict_permissions(&temp).map_err(io_error(&temp))?;
        fs::rename(&temp, path).map_err(io_error(path))
    }

    fn persist(&self, tokens: &StoredTokens) {
        match Self::write(&self.path, tokens) {
            Ok(()) => debug!(path = %self.path.display(), "token file written"),
            Err(error) => warn!(%error, "could not persist tokens, keeping them in memory only"),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.tokens.read().access_token.clone()
    }

    fn get_refresh(&self) -> Option<String> {
        self.tokens.read().refresh_token.clone()
    }

    fn set(&self, access_token: &str, refresh_token: Option<&str>) {
        // Held across the write so the file never lags a later mutation.
        let mut tokens = self.tokens.write();
        tokens.access_token = Some(access_token.to_string());
        if let Some(refresh) = refresh_token {
            tokens.refresh_token = Some(refresh.to_string());
        }
        self.persist(&tokens);
    }

    fn remove(&self) {
        let mut tokens = self.tokens.write();
        *tokens = StoredTokens::default();
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "token file removed"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(path = %self.path.display(), %error, "could not remove token file"),
        }
    }

    fn pair(&self) -> Option<TokenPair> {
        let tokens = self.tokens.read();
        Some(TokenPair::new(
            tokens.access_token.clone()?,
            tokens.refresh_token.clone()?,
        ))
    }
}
