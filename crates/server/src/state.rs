use std::sync::Arc;

use service::user_record::RecordService;

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordService>,
}

impl AppState {
    pub fn new(records: RecordService) -> Self {
        Self { records: Arc::new(records) }
    }
}
