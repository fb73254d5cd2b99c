//! Storage seams injected into the HTTP layer.
//!
//! The SQLite adapters in [`crate::database`] implement these; handlers only
//! see `Arc<dyn InstanceRegistry>` / `Arc<dyn DetailStore>`.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DaoInstance, NewDaoInstance, ProposalDetail, ProposalId};

#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    /// Register a deployment. Name, staking and voting address collisions
    /// surface as `DaoError::Conflict`.
    async fn create_instance(&self, dao: &NewDaoInstance) -> Result<DaoInstance>;

    /// All known instances, newest first.
    async fn list_instances(&self) -> Result<Vec<DaoInstance>>;

    async fn get_instance(&self, id: i64) -> Result<Option<DaoInstance>>;
}

#[async_trait]
pub trait DetailStore: Send + Sync {
    /// Stored text for the key, or `""` when nothing has been saved yet.
    async fn get_details(&self, dao_instance_id: i64, proposal_id: &ProposalId)
        -> Result<String>;

    /// Insert or replace the text for the key, refreshing `last_updated`.
    async fn save_details(
        &self,
        dao_instance_id: i64,
        proposal_id: &ProposalId,
        text: &str,
    ) -> Result<ProposalDetail>;
}
