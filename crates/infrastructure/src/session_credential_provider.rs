use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use partilha_application::CredentialProvider;
use partilha_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Authenticated session issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    access_token: NonEmptyString,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session from a non-empty access token.
    pub fn new(access_token: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            access_token: NonEmptyString::new(access_token)?,
            expires_at: None,
        })
    }

    /// Sets the instant after which the token must not be used.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the expiry instant, when known.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns whether the session is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    access_token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

/// Credential provider backed by a locally persisted session.
///
/// The session is loaded once, replaced on refresh and cleared on sign-out;
/// expired sessions yield no token.
#[derive(Debug, Default)]
pub struct SessionCredentialProvider {
    session: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionCredentialProvider {
    /// Creates a provider without a session.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an in-memory provider holding one session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
            path: None,
        }
    }

    /// Loads the session persisted at `path`; a missing file means signed out.
    pub async fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let session = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(parse_session_file(&path, &bytes)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no persisted session found");
                None
            }
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read session file '{}': {error}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            session: RwLock::new(session),
            path: Some(path),
        })
    }

    /// Replaces the current session, persisting it when file-backed.
    pub async fn replace(&self, session: Session) -> AppResult<()> {
        if let Some(path) = &self.path {
            let contents = serde_json::to_vec_pretty(&SessionFile {
                access_token: session.access_token().to_owned(),
                expires_at: session.expires_at(),
            })
            .map_err(|error| {
                AppError::Internal(format!("failed to encode session file: {error}"))
            })?;

            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|error| {
                    AppError::Internal(format!(
                        "failed to create session directory '{}': {error}",
                        parent.display()
                    ))
                })?;
            }
            tokio::fs::write(path, contents).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to write session file '{}': {error}",
                    path.display()
                ))
            })?;
        }

        *self.session.write().await = Some(session);
        info!("session replaced");
        Ok(())
    }

    /// Drops the current session and its persisted copy.
    pub async fn clear(&self) -> AppResult<()> {
        *self.session.write().await = None;

        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(AppError::Internal(format!(
                        "failed to remove session file '{}': {error}",
                        path.display()
                    )));
                }
            }
        }

        info!("session cleared");
        Ok(())
    }

    /// Returns a copy of the current session.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}

fn parse_session_file(path: &Path, bytes: &[u8]) -> AppResult<Session> {
    let file: SessionFile = serde_json::from_slice(bytes).map_err(|error| {
        AppError::Validation(format!(
            "invalid session file '{}': {error}",
            path.display()
        ))
    })?;

    let session = Session::new(file.access_token)?;
    Ok(match file.expires_at {
        Some(expires_at) => session.with_expiry(expires_at),
        None => session,
    })
}

#[async_trait]
impl CredentialProvider for SessionCredentialProvider {
    async fn bearer_token(&self) -> Option<String> {
        let session = self.session.read().await;
        let session = session.as_ref()?;

        if session.is_expired_at(Utc::now()) {
            debug!("session expired, withholding bearer token");
            return None;
        }

        Some(session.access_token().to_owned())
    }
}
