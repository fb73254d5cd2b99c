//! SQLite-backed registry of deployed DAO instances.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::classify;
use crate::error::{DaoError, Result};
use crate::models::{DaoInstance, NewDaoInstance};
use crate::ports::InstanceRegistry;

#[derive(Clone)]
pub struct SqliteInstanceRegistry {
    pool: SqlitePool,
}

impl SqliteInstanceRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn instance_from_row(row: &SqliteRow) -> std::result::Result<DaoInstance, sqlx::Error> {
        Ok(DaoInstance {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            token_address: row.try_get("token_address")?,
            staking_address: row.try_get("staking_address")?,
            voting_address: row.try_get("voting_address")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl InstanceRegistry for SqliteInstanceRegistry {
    async fn create_instance(&self, dao: &NewDaoInstance) -> Result<DaoInstance> {
        // Uniqueness is left to the table constraints; a violation comes back
        // as a database error and is classified as a conflict.
        let row = sqlx::query(
            r#"INSERT INTO dao_instances
                   (name, token_address, staking_address, voting_address, created_at)
               VALUES (?, ?, ?, ?, ?)
               RETURNING id, name, token_address, staking_address, voting_address, created_at"#,
        )
        .bind(&dao.name)
        .bind(&dao.token_address)
        .bind(&dao.staking_address)
        .bind(&dao.voting_address)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, "Error saving DAO"))?;

        let instance = Self::instance_from_row(&row)
            .map_err(|e| DaoError::storage("Error saving DAO instance", e))?;
        info!(id = instance.id, name = %instance.name, "registered DAO instance");
        Ok(instance)
    }

    async fn list_instances(&self) -> Result<Vec<DaoInstance>> {
        let rows = sqlx::query(
            r#"SELECT id, name, token_address, staking_address, voting_address, created_at
               FROM dao_instances
               ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DaoError::storage("Error fetching DAO instances", e))?;

        let instances = rows
            .iter()
            .map(Self::instance_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DaoError::storage("Error fetching DAO instances", e))?;
        debug!(count = instances.len(), "listed DAO instances");
        Ok(instances)
    }

    async fn get_instance(&self, id: i64) -> Result<Option<DaoInstance>> {
        let row = sqlx::query(
            r#"SELECT id, name, token_address, staking_address, voting_address, created_at
               FROM dao_instances
               WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DaoError::storage("Error fetching DAO instance", e))?;

        row.as_ref()
            .map(Self::instance_from_row)
            .transpose()
            .map_err(|e| DaoError::storage("Error fetching DAO instance", e))
    }
}
