use crate::domain::model::AccountSession;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Produces a fresh account-scoped session. Implementations must not reuse
/// tokens between calls.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<AccountSession>;
}
