//! Category Repository

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
use shared::models::Category;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>("SELECT id, title, slug FROM category ORDER BY title")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, Category>("SELECT id, title, slug FROM category WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Test seeding only; catalog rows are written by the back-office
#[cfg(test)]
pub async fn create(pool: &SqlitePool, title: &str) -> RepoResult<Category> {
    let id = shared::util::snowflake_id();
    let slug = format!("{}-{}", super::product::slugify(title), id);
    sqlx::query("INSERT INTO category (id, title, slug) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(title)
        .bind(&slug)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}
