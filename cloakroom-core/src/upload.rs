//! Upload and attach pipeline.
//!
//! Both operations validate and encode locally first, then make one request,
//! then hand the returned item to [`Closet::upsert`]. Either the full item
//! lands in the cache or nothing does.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::api::{ApiError, ValidationError};
use crate::closet::Closet;
use crate::models::{ClothingItem, ItemId, OwnerId};
use crate::session::Session;

/// An image file ready to be attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Wraps in-memory bytes; the MIME type is guessed from the extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Reads an image from disk. Unreadable or empty files fail here, before
    /// anything is sent.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = std::fs::read(path).map_err(|e| ValidationError::UnreadableImage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());

        let image = Self::new(file_name, bytes);
        image.ensure_not_empty()?;
        Ok(image)
    }

    fn ensure_not_empty(&self) -> Result<(), ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::EmptyImage(self.file_name.clone()));
        }
        Ok(())
    }

    fn into_part(self) -> Result<Part, ApiError> {
        let file_name = self.file_name.clone();
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| {
                ValidationError::UnreadableImage {
                    path: file_name,
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        // The service only accepts image/*; unknown extensions go as JPEG.
        _ => "image/jpeg",
    }
}

/// Trims an optional user label; blank labels are dropped.
fn normalized(label: Option<&str>) -> Option<String> {
    label
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

fn upload_form(owner_id: OwnerId, image: ImageFile, name: Option<&str>) -> Result<Form, ApiError> {
    image.ensure_not_empty()?;

    let mut form = Form::new()
        .text("owner_id", owner_id.to_string())
        .part("file", image.into_part()?);
    if let Some(name) = normalized(name) {
        form = form.text("item_name", name);
    }
    Ok(form)
}

fn photos_form(images: Vec<ImageFile>, angle_label: Option<&str>) -> Result<Form, ApiError> {
    if images.is_empty() {
        return Err(ValidationError::NoFiles.into());
    }
    for image in &images {
        image.ensure_not_empty()?;
    }

    let mut form = Form::new();
    for image in images {
        form = form.part("files", image.into_part()?);
    }
    if let Some(label) = normalized(angle_label) {
        form = form.text("angle_label", label);
    }
    Ok(form)
}

/// Uploads a new item and caches the record the service creates for it.
pub async fn upload_new_item(
    session: &Session,
    closet: &mut Closet,
    owner_id: OwnerId,
    image: ImageFile,
    name: Option<&str>,
) -> Result<ClothingItem, ApiError> {
    let file_name = image.file_name.clone();
    let form = upload_form(owner_id, image, name)?;

    let response = session.api().upload_item(form).await?;
    closet.upsert(response.item.clone())?;

    tracing::info!(
        item_id = response.item.id,
        category = %response.item.category,
        file = %file_name,
        "Item uploaded"
    );
    Ok(response.item)
}

/// Attaches angle photos to an existing item and caches the full updated
/// record, including every photo the item already had.
pub async fn add_angle_photos(
    session: &Session,
    closet: &mut Closet,
    item_id: ItemId,
    images: Vec<ImageFile>,
    angle_label: Option<&str>,
) -> Result<ClothingItem, ApiError> {
    let count = images.len();
    let form = photos_form(images, angle_label)?;

    let item = session.api().add_item_photos(item_id, form).await?;
    closet.upsert(item.clone())?;

    tracing::info!(item_id, added = count, photos = item.photos.len(), "Angle photos attached");
    Ok(item)
}
