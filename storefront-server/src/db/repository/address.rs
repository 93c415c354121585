//! Address Repository

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
#[cfg(test)]
use shared::models::AddressCreate;
use shared::models::Address;
use sqlx::SqlitePool;

const ADDRESS_SELECT: &str = "SELECT id, user_id, full_name, email, mobile, country, state, city, address, zip_code FROM address";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Address>> {
    let sql = format!("{ADDRESS_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Address>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Test seeding only; addresses are managed by the account service
#[cfg(test)]
pub async fn create(pool: &SqlitePool, user_id: i64, data: AddressCreate) -> RepoResult<Address> {
    let country = data.country.trim().to_ascii_uppercase();
    if country.is_empty() {
        return Err(RepoError::Validation("country is required".into()));
    }
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO address (id, user_id, full_name, email, mobile, country, state, city, address, zip_code) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(id)
    .bind(user_id)
    .bind(data.full_name)
    .bind(data.email)
    .bind(data.mobile)
    .bind(country)
    .bind(data.state)
    .bind(data.city)
    .bind(data.address)
    .bind(data.zip_code)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create address".into()))
}
