use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use models::user_detail::{self, NewUserRecord, UserRecord};

use crate::errors::ServiceError;

/// Persistence seam for account records. Each call is one statement against the store.
#[async_trait]
pub trait UserRecordRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<UserRecord>, ServiceError>;
    async fn list_active(&self) -> Result<Vec<UserRecord>, ServiceError>;
    async fn insert(&self, record: &NewUserRecord) -> Result<UserRecord, ServiceError>;
}

/// SeaORM-backed repository. The connection is a pool; each statement borrows and returns one connection.
pub struct SeaOrmUserRecordRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRecordRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl UserRecordRepository for SeaOrmUserRecordRepository {
    async fn list_all(&self) -> Result<Vec<UserRecord>, ServiceError> {
        Ok(user_detail::list_all(&self.db).await?)
    }

    async fn list_active(&self) -> Result<Vec<UserRecord>, ServiceError> {
        Ok(user_detail::list_active(&self.db).await?)
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<UserRecord, ServiceError> {
        Ok(user_detail::insert(&self.db, record).await?)
    }
}

/// In-memory repository for tests; enforces `user_id` uniqueness like the store does.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRecordRepository {
        rows: Mutex<Vec<UserRecord>>, // insertion order
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl MockUserRecordRepository {
        /// Repository whose every call fails with `message`, as an unreachable store would.
        pub fn failing(message: impl Into<String>) -> Self {
            Self { fail_with: Some(message.into()), ..Self::default() }
        }

        /// Start with existing rows, bypassing `insert`.
        pub fn with_rows(rows: Vec<UserRecord>) -> Self {
            Self { rows: Mutex::new(rows), ..Self::default() }
        }

        /// Number of repository calls made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn enter(&self) -> Result<std::sync::MutexGuard<'_, Vec<UserRecord>>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(msg) = &self.fail_with {
                return Err(ServiceError::Db(msg.clone()));
            }
            self.rows.lock().map_err(|_| ServiceError::Db("mock store poisoned".into()))
        }
    }

    #[async_trait]
    impl UserRecordRepository for MockUserRecordRepository {
        async fn list_all(&self) -> Result<Vec<UserRecord>, ServiceError> {
            Ok(self.enter()?.clone())
        }

        async fn list_active(&self) -> Result<Vec<UserRecord>, ServiceError> {
            Ok(self.enter()?.iter().filter(|r| r.is_active()).cloned().collect())
        }

        async fn insert(&self, record: &NewUserRecord) -> Result<UserRecord, ServiceError> {
            let mut rows = self.enter()?;
            if rows.iter().any(|r| r.user_id == record.user_id) {
                return Err(ServiceError::Db(format!(
                    "duplicate key value violates unique constraint \"user_details_pkey\": Key (user_id)=({}) already exists.",
                    record.user_id
                )));
            }
            let created = UserRecord {
                user_id: record.user_id.clone(),
                account_type: record.account_type.clone(),
                opening_date: record.opening_date,
                closing_date: record.closing_date,
                lop: record.lop,
            };
            rows.push(created.clone());
            Ok(created)
        }
    }
}
