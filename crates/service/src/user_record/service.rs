use std::sync::Arc;
use tracing::{error, info, instrument};

use models::user_detail::{NewUserRecord, NewUserRecordInput, UserRecord};

use crate::errors::ServiceError;
use crate::remote::RemoteDataSource;
use crate::user_record::repository::UserRecordRepository;

/// Application service behind the four record routes.
/// Stateless between calls; the repository and remote source are injected at construction.
pub struct RecordService {
    repo: Arc<dyn UserRecordRepository>,
    remote: Arc<dyn RemoteDataSource>,
}

impl RecordService {
    pub fn new(repo: Arc<dyn UserRecordRepository>, remote: Arc<dyn RemoteDataSource>) -> Self {
        Self { repo, remote }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<UserRecord>, ServiceError> {
        let rows = self.repo.list_all().await.inspect_err(|e| error!(err = %e, "list users failed"))?;
        info!(count = rows.len(), "listed users");
        Ok(rows)
    }

    /// Shape-check the input, then insert it. Duplicate keys and other constraint
    /// failures come back from the store as `ServiceError::Db`.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create(&self, input: NewUserRecordInput) -> Result<UserRecord, ServiceError> {
        let record = NewUserRecord::try_from(input)?;
        let created = self.repo.insert(&record).await.inspect_err(|e| error!(err = %e, "create user failed"))?;
        info!(account_type = %created.account_type, "created user");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<UserRecord>, ServiceError> {
        let rows = self.repo.list_active().await.inspect_err(|e| error!(err = %e, "list active users failed"))?;
        info!(count = rows.len(), "listed active users");
        Ok(rows)
    }

    /// Remote body, untouched. Never touches the store.
    #[instrument(skip(self))]
    pub async fn list_remote(&self) -> Result<serde_json::Value, ServiceError> {
        self.remote.fetch().await.inspect_err(|e| error!(err = %e, "remote fetch failed"))
    }
}
