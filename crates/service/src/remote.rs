use async_trait::async_trait;
use common::remote::HostedDataClient;

use crate::errors::ServiceError;

/// Source of the `/supabase-data` payload.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    async fn fetch(&self) -> Result<serde_json::Value, ServiceError>;
}

/// Reads one table of the hosted data API.
pub struct HostedTableSource {
    client: HostedDataClient,
    table: String,
}

impl HostedTableSource {
    pub fn new(client: HostedDataClient, table: impl Into<String>) -> Self {
        Self { client, table: table.into() }
    }
}

#[async_trait]
impl RemoteDataSource for HostedTableSource {
    async fn fetch(&self) -> Result<serde_json::Value, ServiceError> {
        Ok(self.client.fetch_table(&self.table).await?)
    }
}
