mod category;
mod item;
mod owner;
pub mod timestamp;
mod tryon;

pub use category::Category;
pub use item::{AnglePhoto, ClothingItem, ItemId};
pub use owner::{BootstrapRequest, OwnerId, OwnerIdentity};
pub use tryon::{HealthStatus, TryOnRequest, TryOnResult, UploadResponse};
