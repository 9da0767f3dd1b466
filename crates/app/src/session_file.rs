//! Signed-in session persisted between CLI invocations.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use storefront::prelude::Identity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionFileError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Identity and bearer token of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub identity: Identity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub saved_at: Timestamp,
}

impl SavedSession {
    #[must_use]
    pub fn new(identity: Identity, token: Option<String>) -> Self {
        Self {
            identity,
            token,
            saved_at: Timestamp::now(),
        }
    }
}

/// JSON file holding at most one [`SavedSession`].
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session. A missing file means nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<SavedSession>, SessionFileError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| SessionFileError::Json {
                path: self.path.clone(),
                source,
            })
    }

    /// Write `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, session: &SavedSession) -> Result<(), SessionFileError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let contents =
            serde_json::to_string_pretty(session).map_err(|source| SessionFileError::Json {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, contents).map_err(|source| self.io_error(source))
    }

    /// Forget the saved session. Clearing an absent file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> SessionFileError {
        SessionFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
