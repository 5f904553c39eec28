mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use pool_api::{PredictionRecord, ResultRecord, Stored};
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("corrupt record at {}:{line}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

/// Where predictions and results live. Documents are only ever inserted;
/// a newer result supersedes older ones by creation time.
pub trait PoolStore: Send + Sync + 'static {
    /// Every stored prediction, in submission order.
    fn find_all_predictions(&self) -> impl Future<Output = StoreResult<Vec<Stored<PredictionRecord>>>> + Send;

    fn find_latest_result(&self) -> impl Future<Output = StoreResult<Option<Stored<ResultRecord>>>> + Send;

    fn insert_prediction(&self, record: PredictionRecord) -> impl Future<Output = StoreResult<String>> + Send;

    fn insert_result(&self, record: ResultRecord) -> impl Future<Output = StoreResult<String>> + Send;
}
