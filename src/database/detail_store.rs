//! SQLite-backed store for off-chain proposal details.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::classify;
use crate::error::{DaoError, Result};
use crate::models::{ProposalDetail, ProposalId};
use crate::ports::DetailStore;

#[derive(Clone)]
pub struct SqliteDetailStore {
    pool: SqlitePool,
}

impl SqliteDetailStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DetailStore for SqliteDetailStore {
    async fn get_details(
        &self,
        dao_instance_id: i64,
        proposal_id: &ProposalId,
    ) -> Result<String> {
        let text = sqlx::query_scalar::<_, String>(
            r#"SELECT details_text FROM proposal_details
               WHERE dao_instance_id = ? AND proposal_id = ?"#,
        )
        .bind(dao_instance_id)
        .bind(proposal_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DaoError::storage("Error fetching proposal details", e))?;

        Ok(text.unwrap_or_default())
    }

    async fn save_details(
        &self,
        dao_instance_id: i64,
        proposal_id: &ProposalId,
        text: &str,
    ) -> Result<ProposalDetail> {
        let now = Utc::now();
        // Single statement upsert; concurrent writers to one key resolve by
        // commit order.
        sqlx::query(
            r#"INSERT INTO proposal_details
                   (dao_instance_id, proposal_id, details_text, last_updated)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (dao_instance_id, proposal_id) DO UPDATE SET
                   details_text = excluded.details_text,
                   last_updated = excluded.last_updated"#,
        )
        .bind(dao_instance_id)
        .bind(proposal_id.as_str())
        .bind(text)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, "Error saving proposal details"))?;

        debug!(
            dao_instance_id,
            proposal_id = %proposal_id,
            bytes = text.len(),
            "saved proposal details"
        );
        Ok(ProposalDetail {
            dao_instance_id,
            proposal_id: proposal_id.to_string(),
            details_text: text.to_string(),
            last_updated: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseConfig, DatabaseManager};
    use crate::models::NewDaoInstance;
    use crate::ports::InstanceRegistry;

    /// Fresh store with one registered instance (id 1).
    async fn store() -> (DatabaseManager, SqliteDetailStore) {
        let db = DatabaseManager::new(DatabaseConfig::in_memory())
            .await
            .unwrap();
        db.run_migrations().await.unwrap();
        db.instance_registry()
            .create_instance(&NewDaoInstance::new("Alpha", "0xT", "0xS", "0xV").unwrap())
            .await
            .unwrap();
        let store = db.detail_store();
        (db, store)
    }

    fn pid(raw: &str) -> ProposalId {
        ProposalId::parse(raw).unwrap()
    }

    async fn row_count(db: &DatabaseManager) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM proposal_details")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_details_read_as_empty() {
        let (_db, store) = store().await;
        assert_eq!(store.get_details(1, &pid("7")).await.unwrap(), "");
    }

    #[tokio::test]
    async fn save_then_get() {
        let (_db, store) = store().await;
        store.save_details(1, &pid("7"), "hello").await.unwrap();
        assert_eq!(store.get_details(1, &pid("7")).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn second_save_replaces_first() {
        let (db, store) = store().await;
        let first = store.save_details(1, &pid("7"), "hello").await.unwrap();
        let second = store.save_details(1, &pid("7"), "world").await.unwrap();

        assert_eq!(store.get_details(1, &pid("7")).await.unwrap(), "world");
        assert!(second.last_updated >= first.last_updated);
        assert_eq!(row_count(&db).await, 1);
    }

    #[tokio::test]
    async fn empty_text_is_stored() {
        let (db, store) = store().await;
        store.save_details(1, &pid("7"), "").await.unwrap();
        assert_eq!(store.get_details(1, &pid("7")).await.unwrap(), "");
        assert_eq!(row_count(&db).await, 1);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (_db, store) = store().await;
        store.save_details(1, &pid("7"), "seven").await.unwrap();
        assert_eq!(store.get_details(1, &pid("8")).await.unwrap(), "");
        assert_eq!(store.get_details(2, &pid("7")).await.unwrap(), "");
    }

    #[tokio::test]
    async fn unknown_instance_is_rejected_by_foreign_key() {
        let (db, store) = store().await;
        let err = store.save_details(42, &pid("1"), "orphan").await.unwrap_err();
        assert!(matches!(err, DaoError::NotFound(_)), "got {err:?}");
        assert_eq!(row_count(&db).await, 0);
    }
}
