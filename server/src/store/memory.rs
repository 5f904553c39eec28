use super::{PoolStore, StoreResult};
use log::debug;
use pool_api::standings::select_current_result;
use pool_api::{PredictionRecord, ResultRecord, Stored};
use tokio::sync::RwLock;

/// Process-local store. Contents vanish on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    predictions: RwLock<Vec<Stored<PredictionRecord>>>,
    results: RwLock<Vec<Stored<ResultRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-stamped result, keeping its id and timestamp.
    pub async fn push_result(&self, stored: Stored<ResultRecord>) {
        self.results.write().await.push(stored);
    }
}

impl PoolStore for MemoryStore {
    async fn find_all_predictions(&self) -> StoreResult<Vec<Stored<PredictionRecord>>> {
        Ok(self.predictions.read().await.clone())
    }

    async fn find_latest_result(&self) -> StoreResult<Option<Stored<ResultRecord>>> {
        let results = self.results.read().await;
        Ok(select_current_result(results.as_slice()).cloned())
    }

    async fn insert_prediction(&self, record: PredictionRecord) -> StoreResult<String> {
        let stored = Stored::new(record);
        let id = stored.id.clone();
        self.predictions.write().await.push(stored);
        debug!("stored prediction {id}");
        Ok(id)
    }

    async fn insert_result(&self, record: ResultRecord) -> StoreResult<String> {
        let stored = Stored::new(record);
        let id = stored.id.clone();
        self.results.write().await.push(stored);
        debug!("stored result {id}");
        Ok(id)
    }
}
