//! Owner identity bootstrap.
//!
//! The owner id is resolved once per installation:
//!
//! 1. A cached positive id in the key/value store wins, with no network call.
//! 2. Otherwise the cached email (or a freshly synthesized one) is sent to
//!    the bootstrap endpoint, which returns the same id for the same email.
//! 3. The returned id and email are persisted.

use std::sync::Arc;

use rand::Rng;

use crate::api::{ApiClient, ApiError};
use crate::models::{BootstrapRequest, OwnerId};
use crate::storage::{KeyValueStore, StorageError};

pub const OWNER_ID_KEY: &str = "cloakroom_owner_id";
pub const OWNER_EMAIL_KEY: &str = "cloakroom_owner_email";

/// Domain of synthesized installation emails.
pub const EMAIL_DOMAIN: &str = "cloakroom.ai";
pub const DEFAULT_EMAIL_PREFIX: &str = "cli";
pub const DEFAULT_DISPLAY_NAME: &str = "Cloakroom CLI User";

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Resolves the owner id against a key/value store and the catalog service.
#[derive(Clone)]
pub struct IdentityBootstrap {
    store: Arc<dyn KeyValueStore>,
    display_name: String,
    email_prefix: String,
}

impl std::fmt::Debug for IdentityBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityBootstrap")
            .field("display_name", &self.display_name)
            .field("email_prefix", &self.email_prefix)
            .finish_non_exhaustive()
    }
}

impl IdentityBootstrap {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            email_prefix: DEFAULT_EMAIL_PREFIX.to_string(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_email_prefix(mut self, email_prefix: impl Into<String>) -> Self {
        self.email_prefix = email_prefix.into();
        self
    }

    /// The cached owner id, if one is stored and valid.
    ///
    /// A stored value that is not a positive integer is treated as absent.
    pub fn cached_owner_id(&self) -> Result<Option<OwnerId>, IdentityError> {
        let Some(raw) = self.store.get(OWNER_ID_KEY)? else {
            return Ok(None);
        };
        match raw.parse::<OwnerId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                tracing::warn!("Ignoring cached owner id: {}", e);
                Ok(None)
            }
        }
    }

    pub fn cached_email(&self) -> Result<Option<String>, IdentityError> {
        Ok(self
            .store
            .get(OWNER_EMAIL_KEY)?
            .filter(|email| !email.trim().is_empty()))
    }

    /// Returns the cached owner id or bootstraps a new one.
    ///
    /// Not single-flight on its own; see [`crate::Session`].
    pub async fn get_or_bootstrap(&self, api: &ApiClient) -> Result<OwnerId, IdentityError> {
        if let Some(id) = self.cached_owner_id()? {
            tracing::debug!(owner_id = %id, "Using cached owner id");
            return Ok(id);
        }

        let email = match self.cached_email()? {
            Some(email) => email,
            None => synthesize_email(&self.email_prefix),
        };

        tracing::info!(%email, "Bootstrapping owner identity");
        let identity = api
            .bootstrap_user(&BootstrapRequest {
                email,
                full_name: self.display_name.clone(),
                avatar_image_url: None,
            })
            .await?;

        self.store.set(OWNER_ID_KEY, &identity.id.to_string())?;
        self.store.set(OWNER_EMAIL_KEY, &identity.email)?;
        tracing::info!(owner_id = %identity.id, "Owner identity stored");

        Ok(identity.id)
    }

    /// Forgets the cached id and email. The next bootstrap starts over.
    pub fn clear(&self) -> Result<(), IdentityError> {
        self.store.remove(OWNER_ID_KEY)?;
        self.store.remove(OWNER_EMAIL_KEY)?;
        Ok(())
    }
}

/// `<prefix>-<6 base36 chars>@cloakroom.ai`.
pub fn synthesize_email(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}@{}", prefix, suffix, EMAIL_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn test_synthesize_email_shape() {
        let email = synthesize_email("web-mvp");
        let local = email.strip_suffix("@cloakroom.ai").unwrap();
        let suffix = local.strip_prefix("web-mvp-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_cached_owner_id_rejects_invalid_values() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let identity = IdentityBootstrap::new(store.clone());

        assert!(identity.cached_owner_id().unwrap().is_none());

        for bad in ["0", "-3", "abc", "1.5", ""] {
            store.set(OWNER_ID_KEY, bad).unwrap();
            assert!(identity.cached_owner_id().unwrap().is_none(), "{bad}");
        }

        store.set(OWNER_ID_KEY, "12").unwrap();
        assert_eq!(identity.cached_owner_id().unwrap().unwrap().get(), 12);
    }

    #[test]
    fn test_blank_cached_email_is_ignored() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(OWNER_EMAIL_KEY, "  ").unwrap();
        let identity = IdentityBootstrap::new(store);
        assert!(identity.cached_email().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(OWNER_ID_KEY, "4").unwrap();
        store.set(OWNER_EMAIL_KEY, "a@cloakroom.ai").unwrap();

        IdentityBootstrap::new(store.clone()).clear().unwrap();
        assert!(store.get(OWNER_ID_KEY).unwrap().is_none());
        assert!(store.get(OWNER_EMAIL_KEY).unwrap().is_none());
    }
}
