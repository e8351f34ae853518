//! Reconciliation of the remote closet into the local cache.
//!
//! Sync is additive: records missing from a response are kept as they are.

use crate::api::{ApiError, ValidationError};
use crate::closet::{self, Closet, UpsertOutcome};
use crate::models::{ClothingItem, ItemId, OwnerId};
use crate::session::Session;

/// Result of a full closet sync.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// The whole reconciled cache, newest first.
    pub items: Vec<ClothingItem>,
}

impl SyncReport {
    pub fn fetched(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }

    pub fn changed(&self) -> bool {
        self.inserted + self.updated > 0
    }
}

/// Fetches the owner's closet and upserts every record into `closet`.
///
/// The cache is untouched unless the whole response is fetched and valid.
pub async fn sync_closet(
    session: &Session,
    closet: &mut Closet,
    owner_id: OwnerId,
) -> Result<SyncReport, ApiError> {
    let remote = session.api().fetch_closet(owner_id).await.map_err(|e| {
        tracing::warn!(%owner_id, error = %e, "Closet fetch failed");
        e
    })?;

    for item in &remote {
        closet::validate(item)?;
    }

    let mut report = SyncReport::default();
    for item in remote {
        match closet.upsert(item)? {
            UpsertOutcome::Inserted => report.inserted += 1,
            UpsertOutcome::Updated => report.updated += 1,
            UpsertOutcome::Unchanged => report.unchanged += 1,
        }
    }
    report.items = closet.ordered();

    tracing::info!(
        %owner_id,
        inserted = report.inserted,
        updated = report.updated,
        unchanged = report.unchanged,
        cached = report.items.len(),
        "Closet synced"
    );

    Ok(report)
}

/// Renames an item on the server and caches the returned record.
pub async fn rename_item(
    session: &Session,
    closet: &mut Closet,
    item_id: ItemId,
    name: &str,
) -> Result<ClothingItem, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    let item = session.api().update_item_name(item_id, name).await?;
    closet.upsert(item.clone())?;
    tracing::debug!(item_id, "Item renamed");
    Ok(item)
}
