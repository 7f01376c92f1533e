use async_trait::async_trait;
use skylane_shared::{LoginRequest, Masked, ProfileUpdate, UserProfile};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::api::AuthApi;
use crate::{ApiError, ValidationError};

/// Bearer token slot shared between the session and the HTTP transport.
/// The session writes it; the transport reads it on every request.
#[derive(Clone, Default)]
pub struct TokenHandle {
    inner: Arc<RwLock<Option<Masked<String>>>>,
}

impl TokenHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|t| t.expose().clone())
    }

    pub async fn set(&self, token: Masked<String>) {
        *self.inner.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn is_set(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// Local persisted storage for the access token
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<Masked<String>>, SessionError>;
    async fn save(&self, token: &Masked<String>) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local token store, for sessions that should not outlive the process
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Masked<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(Masked::from(token))) }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<Masked<String>>, SessionError> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &Masked<String>) -> Result<(), SessionError> {
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().await = None;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not logged in")]
    NotAuthenticated,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Token storage failed: {0}")]
    Storage(String),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::NotAuthenticated => "Please log in to continue.".to_string(),
            SessionError::Validation(err) => err.message.clone(),
            SessionError::Api(err) => err.user_message(),
            SessionError::Storage(_) => "Your session could not be saved on this device.".to_string(),
        }
    }
}

/// Authenticated user and token with an explicit lifecycle: populated by `login` or
/// `restore`, cleared by `logout` or when the API stops accepting the token.
pub struct SessionContext {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    token: TokenHandle,
    user: RwLock<Option<UserProfile>>,
}

impl SessionContext {
    pub fn new(auth: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>, token: TokenHandle) -> Self {
        Self {
            auth,
            store,
            token,
            user: RwLock::new(None),
        }
    }

    pub fn token_handle(&self) -> TokenHandle {
        self.token.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.is_set().await
    }

    /// Pick up a token persisted by an earlier run and load the matching profile.
    /// A token the API no longer accepts is discarded.
    pub async fn restore(&self) -> Result<Option<UserProfile>, SessionError> {
        let Some(token) = self.store.load().await? else {
            return Ok(None);
        };

        self.token.set(token).await;
        match self.auth.fetch_profile().await {
            Ok(profile) => {
                info!("Session restored for {}", profile.email);
                *self.user.write().await = Some(profile.clone());
                Ok(Some(profile))
            }
            Err(ApiError::Unauthorized) => {
                warn!("Stored token rejected, clearing session");
                self.clear_local().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        if email.trim().is_empty() {
            return Err(ValidationError::missing("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::missing("password").into());
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: Masked::from(password),
        };
        let tokens = self.auth.login(&request).await?;

        // The profile request authenticates with the new token
        self.token.set(tokens.access.clone()).await;
        let profile = match tokens.user {
            Some(user) => user,
            None => match self.auth.fetch_profile().await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Profile unavailable after login, discarding token: {}", e);
                    if let Err(clear) = self.clear_local().await {
                        warn!("Failed to clear stored token: {}", clear);
                    }
                    return Err(e.into());
                }
            },
        };

        if let Err(e) = self.store.save(&tokens.access).await {
            // Still logged in for this process, just not persisted
            warn!("Failed to persist access token: {}", e);
        }

        info!("Logged in as {}", profile.email);
        *self.user.write().await = Some(profile.clone());
        Ok(profile)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.clear_local().await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn refresh_profile(&self) -> Result<UserProfile, SessionError> {
        self.require_token().await?;
        match self.auth.fetch_profile().await {
            Ok(profile) => {
                *self.user.write().await = Some(profile.clone());
                Ok(profile)
            }
            Err(ApiError::Unauthorized) => {
                self.clear_local().await?;
                Err(SessionError::NotAuthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, SessionError> {
        self.require_token().await?;
        if update.is_empty() {
            if let Some(user) = self.current_user().await {
                return Ok(user);
            }
            return self.refresh_profile().await;
        }

        match self.auth.update_profile(update).await {
            Ok(profile) => {
                info!("Profile updated for {}", profile.email);
                *self.user.write().await = Some(profile.clone());
                Ok(profile)
            }
            Err(ApiError::Unauthorized) => {
                self.clear_local().await?;
                Err(SessionError::NotAuthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn require_token(&self) -> Result<(), SessionError> {
        if self.token.is_set().await {
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    async fn clear_local(&self) -> Result<(), SessionError> {
        self.token.clear().await;
        *self.user.write().await = None;
        self.store.clear().await
    }
}
