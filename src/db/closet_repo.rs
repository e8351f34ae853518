use std::str::FromStr;

use chrono::{DateTime, Utc};
use cloakroom_core::models::timestamp;
use cloakroom_core::{AnglePhoto, Category, Closet, ClothingItem, ItemId, OwnerId};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Persists the core's in-memory closet cache between runs.
pub struct ClosetRepository {
    pool: SqlitePool,
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    owner_id: i64,
    name: Option<String>,
    original_url: Option<String>,
    processed_url: String,
    category: String,
    color: Option<String>,
    created_at: String,
}

#[derive(sqlx::FromRow)]
struct PhotoRow {
    id: i64,
    item_id: i64,
    original_url: Option<String>,
    processed_url: String,
    angle_label: Option<String>,
    created_at: String,
}

impl ClosetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads every cached item of one owner.
    pub async fn load(&self, owner_id: OwnerId) -> Result<Closet, sqlx::Error> {
        let rows: Vec<ItemRow> = sqlx::query_as("SELECT * FROM items WHERE owner_id = ?")
            .bind(owner_id.get())
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.hydrate_item(row).await?);
        }
        Ok(Closet::from_items(items))
    }

    /// One cached item, only if it belongs to `owner_id`.
    pub async fn get_by_id(
        &self,
        owner_id: OwnerId,
        id: ItemId,
    ) -> Result<Option<ClothingItem>, sqlx::Error> {
        let row: Option<ItemRow> =
            sqlx::query_as("SELECT * FROM items WHERE id = ? AND owner_id = ?")
                .bind(id)
                .bind(owner_id.get())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_item(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Writes every item of `closet`. Rows not in `closet` are left alone.
    pub async fn save(&self, closet: &Closet) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for item in closet.ordered() {
            write_item(&mut tx, &item).await?;
        }
        tx.commit().await
    }

    /// Writes one item, replacing its row and all of its photos.
    pub async fn save_item(&self, item: &ClothingItem) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_item(&mut tx, item).await?;
        tx.commit().await
    }

    /// Drops every cached item. Returns how many were removed.
    pub async fn clear(&self) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM item_photos").execute(&mut *tx).await?;
        let result = sqlx::query("DELETE FROM items").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn hydrate_item(&self, row: ItemRow) -> Result<ClothingItem, sqlx::Error> {
        let photos: Vec<PhotoRow> =
            sqlx::query_as("SELECT * FROM item_photos WHERE item_id = ? ORDER BY id")
                .bind(row.id)
                .fetch_all(&self.pool)
                .await?;

        let photos = photos
            .into_iter()
            .map(|photo| -> Result<AnglePhoto, sqlx::Error> {
                Ok(AnglePhoto {
                    id: photo.id,
                    item_id: photo.item_id,
                    original_url: photo.original_url,
                    processed_url: photo.processed_url,
                    angle_label: photo.angle_label,
                    created_at: parse_time(&photo.created_at)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let owner_id = OwnerId::new(row.owner_id)
            .ok_or_else(|| decode_error(format!("invalid owner id {}", row.owner_id)))?;
        let category = Category::from_str(&row.category).map_err(decode_error)?;

        Ok(ClothingItem {
            id: row.id,
            owner_id,
            name: row.name,
            original_url: row.original_url,
            processed_url: row.processed_url,
            category,
            color: row.color,
            created_at: parse_time(&row.created_at)?,
            photos,
        })
    }
}

async fn write_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &ClothingItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO items (id, owner_id, name, original_url, processed_url, category, color, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            owner_id = excluded.owner_id,
            name = excluded.name,
            original_url = excluded.original_url,
            processed_url = excluded.processed_url,
            category = excluded.category,
            color = excluded.color,
            created_at = excluded.created_at
        "#,
    )
    .bind(item.id)
    .bind(item.owner_id.get())
    .bind(&item.name)
    .bind(&item.original_url)
    .bind(&item.processed_url)
    .bind(item.category.as_str())
    .bind(&item.color)
    .bind(item.created_at.to_rfc3339())
    .execute(&mut **tx)
    .await?;

    // Replace photos
    sqlx::query("DELETE FROM item_photos WHERE item_id = ?")
        .bind(item.id)
        .execute(&mut **tx)
        .await?;

    for photo in &item.photos {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO item_photos (id, item_id, original_url, processed_url, angle_label, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(photo.id)
        .bind(item.id)
        .bind(&photo.original_url)
        .bind(&photo.processed_url)
        .bind(&photo.angle_label)
        .bind(photo.created_at.to_rfc3339())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    timestamp::parse(value).ok_or_else(|| decode_error(format!("invalid timestamp '{}'", value)))
}

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    struct TestContext {
        repo: ClosetRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(db_path).await.unwrap();
        TestContext {
            repo: ClosetRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn item(id: i64, owner: i64, category: &str, created_at: &str) -> ClothingItem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "owner_id": owner,
            "name": null,
            "original_url": format!("/static/{}_orig.jpg", id),
            "processed_url": format!("/static/{}_proc.png", id),
            "category": category,
            "color": null,
            "created_at": created_at,
        }))
        .unwrap()
    }

    fn owner(id: i64) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_closet() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let mut shirt = item(1, 1, "top", "2024-01-01T10:00:00");
        shirt.name = Some("Oxford".to_string());
        shirt.color = Some("blue".to_string());
        shirt.photos = serde_json::from_value(serde_json::json!([{
            "id": 9, "item_id": 1, "processed_url": "/static/9.png",
            "angle_label": "back", "created_at": "2024-01-02T10:00:00"
        }]))
        .unwrap();
        let closet = Closet::from_items([shirt, item(2, 1, "shoes", "2024-02-01T10:00:00")]);

        repo.save(&closet).await.unwrap();
        let loaded = repo.load(owner(1)).await.unwrap();

        assert_eq!(loaded, closet);
    }

    #[tokio::test]
    async fn test_load_is_scoped_to_owner() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.save_item(&item(1, 1, "top", "2024-01-01T10:00:00"))
            .await
            .unwrap();
        repo.save_item(&item(2, 2, "top", "2024-01-01T10:00:00"))
            .await
            .unwrap();

        let loaded = repo.load(owner(1)).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains(1));
    }

    #[tokio::test]
    async fn test_get_by_id_is_scoped_to_owner() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.save_item(&item(1, 1, "top", "2024-01-01T10:00:00"))
            .await
            .unwrap();

        assert!(repo.get_by_id(owner(1), 1).await.unwrap().is_some());
        assert!(repo.get_by_id(owner(2), 1).await.unwrap().is_none());
        assert!(repo.get_by_id(owner(1), 7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_item_replaces_row_and_photos() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let mut original = item(1, 1, "top", "2024-01-01T10:00:00");
        original.color = Some("red".to_string());
        original.photos = serde_json::from_value(serde_json::json!([{
            "id": 9, "item_id": 1, "processed_url": "/static/9.png",
            "created_at": "2024-01-02T10:00:00"
        }]))
        .unwrap();
        repo.save_item(&original).await.unwrap();

        let mut updated = item(1, 1, "outerwear", "2024-01-01T10:00:00");
        updated.name = Some("Coat".to_string());
        repo.save_item(&updated).await.unwrap();

        let stored = repo.get_by_id(owner(1), 1).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert!(stored.color.is_none());
        assert!(stored.photos.is_empty());
    }

    #[tokio::test]
    async fn test_save_never_deletes_missing_items() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.save_item(&item(1, 1, "top", "2024-01-01T10:00:00"))
            .await
            .unwrap();
        repo.save(&Closet::from_items([item(2, 1, "bottom", "2024-01-01T10:00:00")]))
            .await
            .unwrap();

        assert_eq!(repo.load(owner(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.save(&Closet::from_items([
            item(1, 1, "top", "2024-01-01T10:00:00"),
            item(2, 1, "bottom", "2024-01-01T10:00:00"),
        ]))
        .await
        .unwrap();

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert!(repo.load(owner(1)).await.unwrap().is_empty());
        assert!(repo.get_by_id(owner(1), 1).await.unwrap().is_none());
    }
}
