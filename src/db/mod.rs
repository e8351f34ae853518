mod closet_repo;

pub use closet_repo::ClosetRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};

/// Opens the closet cache at `path`, creating the file and its directory on
/// first use, and brings the schema up to date.
pub async fn init_db(path: PathBuf) -> Result<SqlitePool, sqlx::Error> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(cache_options(&path))
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

fn cache_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .foreign_keys(true)
        .create_if_missing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_db_in_missing_directory_migrates_closet_schema() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("cache").join("closet.db");

        let pool = init_db(db_path.clone()).await.unwrap();
        assert!(db_path.exists());

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(names, ["item_photos", "items"]);
    }

    #[tokio::test]
    async fn test_init_db_twice_reuses_existing_cache() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("closet.db");

        let first = init_db(db_path.clone()).await.unwrap();
        sqlx::query(
            "INSERT INTO items (id, owner_id, processed_url, category, created_at) VALUES (1, 1, '/p.png', 'top', '2024-01-01T00:00:00Z')",
        )
        .execute(&first)
        .await
        .unwrap();
        first.close().await;

        let second = init_db(db_path).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
