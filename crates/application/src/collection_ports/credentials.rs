use async_trait::async_trait;

/// Port supplying the bearer token attached to authenticated requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the current bearer token, or `None` when no usable session exists.
    async fn bearer_token(&self) -> Option<String>;
}
