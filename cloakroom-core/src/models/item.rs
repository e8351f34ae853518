use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use super::owner::OwnerId;
use super::timestamp;

/// Server-assigned clothing item identifier.
pub type ItemId = i64;

/// A supplementary photo of an item taken from another viewpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnglePhoto {
    pub id: i64,
    pub item_id: ItemId,
    pub original_url: Option<String>,
    pub processed_url: String,
    pub angle_label: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A catalog item as the service reports it.
///
/// The service is authoritative for every field; the local cache only ever
/// holds copies of these records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClothingItem {
    pub id: ItemId,
    pub owner_id: OwnerId,
    pub name: Option<String>,
    pub original_url: Option<String>,
    pub processed_url: String,
    pub category: Category,
    pub color: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub photos: Vec<AnglePhoto>,
}

impl ClothingItem {
    /// Name shown to the user, falling back to the category.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.category.to_string(),
        }
    }
}

impl fmt::Display for ClothingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("#{} {}", self.id, self.display_name());
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        writeln!(f, "Category: {}", self.category)?;
        if let Some(color) = &self.color {
            writeln!(f, "Color: {}", color)?;
        }
        writeln!(f, "Image: {}", self.processed_url)?;
        if let Some(original) = &self.original_url {
            writeln!(f, "Original: {}", original)?;
        }
        writeln!(f, "Added: {}", self.created_at.format("%Y-%m-%d %H:%M"))?;

        if !self.photos.is_empty() {
            writeln!(f, "\nPhotos:")?;
            for photo in &self.photos {
                match &photo.angle_label {
                    Some(label) => writeln!(f, "  - #{} [{}] {}", photo.id, label, photo.processed_url)?,
                    None => writeln!(f, "  - #{} {}", photo.id, photo.processed_url)?,
                }
            }
        }

        Ok(())
    }
}
