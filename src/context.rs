//! Wiring shared by every command that talks to the catalog service.

use std::sync::Arc;
use std::time::Duration;

use cloakroom_core::{ApiClient, Closet, ClothingItem, FileKeyValueStore, OwnerId, Session};

use crate::config::Config;
use crate::db::{init_db, ClosetRepository};

pub struct AppContext {
    pub session: Session,
    pub repo: ClosetRepository,
}

impl AppContext {
    pub async fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let base_url = config.api_base_url.value.clone();
        let api = match config.request_timeout_secs.value {
            Some(secs) => ApiClient::with_timeout(base_url, Duration::from_secs(secs))?,
            None => ApiClient::new(base_url),
        };

        let store = FileKeyValueStore::in_data_dir(&config.data_dir.value);
        tracing::debug!(path = %store.path().display(), "Using session store");

        let session = Session::new(api, Arc::new(store))
            .with_display_name(config.display_name.value.clone())
            .with_email_prefix(config.email_prefix.value.clone());

        let pool = init_db(config.database_path.value.clone()).await?;

        Ok(Self {
            session,
            repo: ClosetRepository::new(pool),
        })
    }

    /// Resolves the owner id, bootstrapping it on first use.
    pub async fn owner_id(&self) -> Result<OwnerId, Box<dyn std::error::Error>> {
        Ok(self.session.get_or_bootstrap_owner_id().await?)
    }

    /// The cached closet of the current owner, without touching the network.
    ///
    /// Empty when no identity has been established yet.
    pub async fn cached_closet(&self) -> Result<Closet, Box<dyn std::error::Error>> {
        match self.session.identity().cached_owner_id()? {
            Some(owner_id) => Ok(self.repo.load(owner_id).await?),
            None => Ok(Closet::new()),
        }
    }

    /// A copy of `item` with every image path turned into a full URL.
    pub fn with_asset_urls(&self, item: &ClothingItem) -> ClothingItem {
        let mut item = item.clone();
        item.processed_url = self.session.resolve_asset_url(&item.processed_url);
        item.original_url = item
            .original_url
            .take()
            .map(|url| self.session.resolve_asset_url(&url));
        for photo in &mut item.photos {
            photo.processed_url = self.session.resolve_asset_url(&photo.processed_url);
            photo.original_url = photo
                .original_url
                .take()
                .map(|url| self.session.resolve_asset_url(&url));
        }
        item
    }
}
