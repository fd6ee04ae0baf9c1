use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::core::traits::{PackageStore, ProfileReader, StoreError};
use crate::models::{CandidateProfile, NewUser, Package, User};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            e => StoreError::Backend(e.to_string()),
        }
    }
}

/// PostgreSQL-backed store for user and package documents.
///
/// Package reference data is immutable, so lookups go through a small
/// in-process cache in front of the table.
pub struct PostgresStore {
    pool: PgPool,
    package_cache: moka::future::Cache<String, Package>,
    op_timeout: Duration,
}

impl PostgresStore {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        op_timeout: Duration,
        package_ttl: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let package_cache = moka::future::CacheBuilder::new(256)
            .time_to_live(package_ttl)
            .build();

        Ok(Self {
            pool,
            package_cache,
            op_timeout,
        })
    }

    /// Bound every query; a slow or unreachable database surfaces as a
    /// retryable error rather than a stuck request.
    async fn run<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    pub async fn health_check(&self) -> Result<bool, StoreError> {
        let row = self.run(sqlx::query("SELECT 1 AS one").fetch_one(&self.pool)).await?;
        Ok(row.get::<i32, _>("one") == 1)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let row = self
            .run(
                sqlx::query(
                    "SELECT id, full_name, email, password_hash, photo_url, package_ids \
                     FROM users WHERE email = $1",
                )
                .bind(email)
                .fetch_optional(&self.pool),
            )
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no user with email {}", email)))?;

        let package_ids: Vec<Uuid> = row.get("package_ids");
        let packages = self.packages_by_ids(&package_ids).await?;

        Ok(User {
            id: row.get::<Uuid, _>("id").to_string(),
            full_name: row.get("full_name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            photo_url: row.get("photo_url"),
            package_ids: package_ids.iter().map(Uuid::to_string).collect(),
            packages,
        })
    }

    /// Insert a new user document with an empty owned-package set.
    pub async fn create_user(&self, user: &NewUser) -> Result<String, StoreError> {
        let row = self
            .run(
                sqlx::query(
                    "INSERT INTO users (full_name, email, password_hash) \
                     VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(&user.full_name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(row.get::<Uuid, _>("id").to_string())
    }

    pub async fn set_photo_url(&self, user_id: &str, url: &str) -> Result<(), StoreError> {
        let id = parse_id(user_id)?;
        let result = self
            .run(
                sqlx::query("UPDATE users SET photo_url = $2 WHERE id = $1")
                    .bind(id)
                    .bind(url)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("no user {}", user_id)));
        }
        Ok(())
    }

    async fn packages_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Package>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = self
            .run(
                sqlx::query(
                    "SELECT id, name, description FROM packages WHERE id = ANY($1) ORDER BY name",
                )
                .bind(ids)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.iter().map(package_from_row).collect())
    }

    async fn package_ids_of(&self, user_id: &str) -> Result<Vec<Uuid>, StoreError> {
        let id = parse_id(user_id)?;
        let row = self
            .run(
                sqlx::query("SELECT package_ids FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool),
            )
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no user {}", user_id)))?;

        Ok(row.get("package_ids"))
    }
}

#[async_trait]
impl ProfileReader for PostgresStore {
    async fn get_profile(&self, id: &str) -> Result<CandidateProfile, StoreError> {
        let uid = parse_id(id)?;
        let row = self
            .run(
                sqlx::query(
                    "SELECT id, full_name, email, photo_url, package_ids \
                     FROM users WHERE id = $1",
                )
                .bind(uid)
                .fetch_optional(&self.pool),
            )
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no user {}", id)))?;

        let package_ids: Vec<Uuid> = row.get("package_ids");
        let packages = self.packages_by_ids(&package_ids).await?;

        Ok(profile_from_row(&row, packages))
    }

    async fn random_profile(
        &self,
        exclude_ids: &[String],
    ) -> Result<CandidateProfile, StoreError> {
        let exclude: Vec<Uuid> = exclude_ids
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| parse_id(v))
            .collect::<Result<_, _>>()?;

        let row = self
            .run(
                sqlx::query(
                    "SELECT id, full_name, email, photo_url, package_ids \
                     FROM users WHERE id <> ALL($1) ORDER BY random() LIMIT 1",
                )
                .bind(&exclude)
                .fetch_optional(&self.pool),
            )
            .await?
            .ok_or_else(|| StoreError::NotFound("no eligible profile".to_string()))?;

        let package_ids: Vec<Uuid> = row.get("package_ids");
        let packages = self.packages_by_ids(&package_ids).await?;

        Ok(profile_from_row(&row, packages))
    }

    async fn owned_packages(&self, user_id: &str) -> Result<Vec<Package>, StoreError> {
        let ids = self.package_ids_of(user_id).await?;
        self.packages_by_ids(&ids).await
    }
}

#[async_trait]
impl PackageStore for PostgresStore {
    async fn owned_package_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let ids = self.package_ids_of(user_id).await?;
        Ok(ids.iter().map(Uuid::to_string).collect())
    }

    async fn get_package(&self, id: &str) -> Result<Package, StoreError> {
        if let Some(package) = self.package_cache.get(id).await {
            tracing::trace!("package cache hit: {}", id);
            return Ok(package);
        }

        let pid = parse_id(id)?;
        let row = self
            .run(
                sqlx::query("SELECT id, name, description FROM packages WHERE id = $1")
                    .bind(pid)
                    .fetch_optional(&self.pool),
            )
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no package {}", id)))?;

        let package = package_from_row(&row);
        self.package_cache
            .insert(id.to_string(), package.clone())
            .await;
        Ok(package)
    }

    async fn list_packages(&self) -> Result<Vec<Package>, StoreError> {
        let rows = self
            .run(
                sqlx::query("SELECT id, name, description FROM packages ORDER BY name")
                    .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.iter().map(package_from_row).collect())
    }

    async fn set_owned_packages(
        &self,
        user_id: &str,
        package_ids: &[String],
    ) -> Result<(), StoreError> {
        let uid = parse_id(user_id)?;
        let ids: Vec<Uuid> = package_ids
            .iter()
            .map(|v| parse_id(v))
            .collect::<Result<_, _>>()?;

        let result = self
            .run(
                sqlx::query("UPDATE users SET package_ids = $2 WHERE id = $1")
                    .bind(uid)
                    .bind(&ids)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("no user {}", user_id)));
        }
        Ok(())
    }
}

/// Ids arrive as opaque strings from tokens and request bodies; a value that
/// is not a UUID can never match a document.
fn parse_id(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|_| StoreError::NotFound(format!("invalid id {}", value)))
}

fn package_from_row(row: &sqlx::postgres::PgRow) -> Package {
    Package {
        id: row.get::<Uuid, _>("id").to_string(),
        name: row.get("name"),
        description: row.get("description"),
    }
}

fn profile_from_row(row: &sqlx::postgres::PgRow, packages: Vec<Package>) -> CandidateProfile {
    CandidateProfile {
        id: row.get::<Uuid, _>("id").to_string(),
        full_name: row.get("full_name"),
        email: row.get("email"),
        photo_url: row.get("photo_url"),
        packages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_non_uuid() {
        assert!(matches!(parse_id("123"), Err(StoreError::NotFound(_))));
        assert!(parse_id("00000000-0000-0000-0000-000000000001").is_ok());
    }
}
