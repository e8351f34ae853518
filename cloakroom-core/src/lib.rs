//! Cloakroom Core Library
//!
//! Client-side engine for the Cloakroom catalog service: owner identity,
//! closet sync, the upload pipeline and outfit composition.

pub mod api;
pub mod closet;
pub mod identity;
pub mod models;
pub mod outfit;
pub mod session;
pub mod storage;
pub mod sync;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, ApiError, ErrorKind, ServerErrorBody, ValidationError, DEFAULT_BASE_URL};
pub use closet::{Closet, UpsertOutcome};
pub use identity::{synthesize_email, IdentityBootstrap, IdentityError};
pub use models::{
    AnglePhoto, BootstrapRequest, Category, ClothingItem, HealthStatus, ItemId, OwnerId,
    OwnerIdentity, TryOnRequest, TryOnResult, UploadResponse,
};
pub use outfit::{submit_try_on, OutfitComposer, SelectionChange, Slot};
pub use session::Session;
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};
pub use sync::{rename_item, sync_closet, SyncReport};
pub use upload::{add_angle_photos, upload_new_item, ImageFile};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
