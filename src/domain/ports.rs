use crate::domain::model::{
    Collection, CollectionId, DataType, Group, ImportRecord, NewParameter, ParameterPage,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

/// The remote backend holding shared parameters and collections.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn fetch_by_user(
        &self,
        username: &str,
        page_size: usize,
        offset: usize,
    ) -> Result<ParameterPage>;

    async fn fetch_by_collection(
        &self,
        collection_id: &CollectionId,
        page_size: usize,
        offset: usize,
    ) -> Result<ParameterPage>;

    async fn create_record(&self, record: &ImportRecord, collection_id: &CollectionId)
        -> Result<()>;

    async fn find_exact_match(&self, record: &ImportRecord) -> Result<bool>;

    async fn create_collection(&self, name: &str, description: &str) -> Result<()>;

    async fn list_collections(&self) -> Result<Vec<Collection>>;

    async fn list_groups(&self) -> Result<Vec<Group>>;

    async fn list_data_types(&self) -> Result<Vec<DataType>>;

    async fn add_to_collection(&self, parameter_id: &str, collection_id: &CollectionId)
        -> Result<()>;

    /// Creates a hand-entered parameter and returns the record that was sent.
    async fn create_parameter(
        &self,
        parameter: NewParameter,
        collection_id: &CollectionId,
    ) -> Result<ImportRecord> {
        let record = parameter.into_record();
        self.create_record(&record, collection_id).await?;
        Ok(record)
    }
}

#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn read_all_text(&self, path: &Path) -> Result<String>;
}

/// Hands out one identifier per import run.
pub trait BatchIdSource: Send + Sync {
    fn next_batch_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidBatchIds;

impl BatchIdSource for UuidBatchIds {
    fn next_batch_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
