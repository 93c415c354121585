//! Review Repository

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
#[cfg(test)]
use shared::models::Review;
use shared::models::ReviewStats;
use sqlx::SqlitePool;

/// Test seeding only; reviews are written by the back-office
#[cfg(test)]
pub async fn create(
    pool: &SqlitePool,
    product_id: i64,
    user_id: Option<i64>,
    rating: i64,
    review: Option<&str>,
) -> RepoResult<Review> {
    if !(1..=5).contains(&rating) {
        return Err(RepoError::Validation(format!("rating {rating} is outside 1-5")));
    }
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO review (id, product_id, user_id, rating, review, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
        .bind(id)
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(review)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(Review {
        id,
        product_id,
        user_id,
        rating,
        review: review.map(str::to_string),
        created_at: now,
    })
}

/// Review count, average and best rating per reviewed product
pub async fn stats_all(pool: &SqlitePool) -> RepoResult<Vec<ReviewStats>> {
    let rows = sqlx::query_as::<_, ReviewStats>(
        "SELECT product_id, COUNT(*) AS review_count, AVG(rating) AS avg_rating, MAX(rating) AS max_rating FROM review GROUP BY product_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;

    #[tokio::test]
    async fn test_stats() {
        let pool = testing::pool().await;
        let p = testing::product(&pool, testing::product_data("Mug", 8.0)).await;
        create(&pool, p, Some(1), 5, None).await.unwrap();
        create(&pool, p, Some(2), 2, Some("chipped")).await.unwrap();

        let stats = stats_all(&pool).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].review_count, 2);
        assert_eq!(stats[0].avg_rating, Some(3.5));
        assert_eq!(stats[0].max_rating, Some(5));
    }

    #[tokio::test]
    async fn test_rating_bounds() {
        let pool = testing::pool().await;
        let p = testing::product(&pool, testing::product_data("Mug", 8.0)).await;
        assert!(create(&pool, p, None, 6, None).await.is_err());
    }
}
