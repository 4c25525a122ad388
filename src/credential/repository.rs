//! Handle database requests.

use sqlx::SqlitePool;

use crate::credential::Credential;
use crate::error::{Result, ServerError};

#[derive(Clone)]
pub struct CredentialRepository {
    pool: SqlitePool,
}

impl CredentialRepository {
    /// Create a new [`CredentialRepository`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert [`Credential`] into database.
    ///
    /// The `name` uniqueness constraint is enforced here: colliding with an
    /// existing row fails with [`ServerError::Conflict`] and leaves the
    /// first credential untouched.
    pub async fn insert_unique(&self, credential: &Credential) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO credentials
                (name, secret, kind, algorithm, digits, period, counter, issuer, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&credential.name)
        .bind(&credential.secret)
        .bind(credential.kind.as_str())
        .bind(credential.algorithm.as_str())
        .bind(u8::from(credential.digits) as i64)
        .bind(credential.period)
        .bind(credential.counter)
        .bind(&credential.issuer)
        .bind(credential.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match err.as_database_error() {
            Some(db) if db.is_unique_violation() => ServerError::Conflict {
                name: credential.name.clone(),
            },
            _ => err.into(),
        })?;

        Ok(())
    }

    /// Find a credential using `name` field.
    pub async fn find_by_name(&self, name: &str) -> Result<Credential> {
        sqlx::query_as::<_, Credential>(
            "SELECT * FROM credentials WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServerError::NotFound {
            name: name.to_owned(),
        })
    }

    /// List every stored credential, newest first.
    pub async fn list_all(&self) -> Result<Vec<Credential>> {
        Ok(sqlx::query_as::<_, Credential>(
            "SELECT * FROM credentials ORDER BY created_at DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Delete a credential; deleting an absent name is an error, not a
    /// no-op.
    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM credentials WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound {
                name: name.to_owned(),
            });
        }

        Ok(())
    }

    /// Advance a counter only if it still holds the observed value.
    ///
    /// Returns whether the swap won. `false` means a concurrent operation
    /// advanced the counter first; callers re-read and search again.
    pub async fn compare_and_swap_counter(
        &self,
        name: &str,
        observed: i64,
        next: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE credentials SET counter = ? WHERE name = ? AND counter = ?",
        )
        .bind(next)
        .bind(name)
        .bind(observed)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
