//! Explicit session context threaded through every core call.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::api::{ApiClient, ApiError};
use crate::identity::{IdentityBootstrap, IdentityError};
use crate::models::OwnerId;
use crate::storage::KeyValueStore;

/// Everything a core operation needs: the service client and the owner
/// identity of this installation.
///
/// Built once at startup. Concurrent callers of
/// [`Session::get_or_bootstrap_owner_id`] share one in-flight bootstrap.
#[derive(Debug)]
pub struct Session {
    api: ApiClient,
    identity: IdentityBootstrap,
    owner: OnceCell<OwnerId>,
}

impl Session {
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            identity: IdentityBootstrap::new(store),
            owner: OnceCell::new(),
        }
    }

    /// Display name sent when a new identity is bootstrapped.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.identity = self.identity.with_display_name(display_name);
        self
    }

    /// Prefix of synthesized installation emails.
    pub fn with_email_prefix(mut self, email_prefix: impl Into<String>) -> Self {
        self.identity = self.identity.with_email_prefix(email_prefix);
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn identity(&self) -> &IdentityBootstrap {
        &self.identity
    }

    /// Returns the owner id, bootstrapping it on first use.
    ///
    /// A failed bootstrap is not cached; the next call tries again.
    pub async fn get_or_bootstrap_owner_id(&self) -> Result<OwnerId, IdentityError> {
        self.owner
            .get_or_try_init(|| self.identity.get_or_bootstrap(&self.api))
            .await
            .copied()
    }

    /// Forgets the owner identity, both on disk and in this session.
    pub fn clear_owner_session(&mut self) -> Result<(), IdentityError> {
        self.identity.clear()?;
        self.owner = OnceCell::new();
        tracing::info!("Owner session cleared");
        Ok(())
    }

    pub async fn check_health(&self) -> Result<bool, ApiError> {
        self.api.fetch_health().await
    }

    pub fn resolve_asset_url(&self, path_or_url: &str) -> String {
        self.api.resolve_asset_url(path_or_url)
    }
}
