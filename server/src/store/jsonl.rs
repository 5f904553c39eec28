use super::{PoolStore, StoreError, StoreResult};
use log::{debug, info, warn};
use pool_api::standings::select_current_result;
use pool_api::{PredictionRecord, ResultRecord, Stored};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

const PREDICTIONS_FILE: &str = "predictions.jsonl";
const RESULTS_FILE: &str = "results.jsonl";

/// Append-only store: one JSON document per line, one file per collection.
#[derive(Debug)]
pub struct JsonlStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!("using data directory {}", dir.display());
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_all<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Vec<Stored<T>>> {
        let path = self.dir.join(file);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let torn_tail = !content.is_empty() && !content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();
        let last = lines.len().saturating_sub(1);

        let mut records = Vec::with_capacity(lines.len());
        for (idx, line) in lines.into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                // An unterminated final line is an interrupted append, not a record.
                Err(_) if torn_tail && idx == last => {
                    warn!("ignoring partial trailing line {} in {}", idx + 1, path.display());
                }
                Err(source) => return Err(StoreError::Corrupt { path: path.clone(), line: idx + 1, source }),
            }
        }
        Ok(records)
    }

    /// Append one line. A partial line left by an earlier failed write is cut
    /// off first (a complete one just gets its newline back), and a failed
    /// write is rolled back to the previous length.
    async fn append<T: Serialize>(&self, file: &str, stored: &Stored<T>) -> StoreResult<()> {
        let mut line = serde_json::to_string(stored)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let path = self.dir.join(file);
        let mut handle = OpenOptions::new().create(true).read(true).append(true).open(&path).await?;

        let mut existing = Vec::new();
        handle.read_to_end(&mut existing).await?;
        let clean_len = existing.iter().rposition(|b| *b == b'\n').map_or(0, |pos| pos + 1);
        let mut keep_len = existing.len();
        let tail = &existing[clean_len..];
        if !tail.is_empty() {
            if serde_json::from_slice::<serde_json::Value>(tail).is_ok() {
                // Complete document that only lost its newline.
                line.insert(0, '\n');
            } else {
                warn!("truncating {} partial bytes at end of {}", tail.len(), path.display());
                handle.set_len(clean_len as u64).await?;
                keep_len = clean_len;
            }
        }

        if let Err(e) = write_line(&mut handle, line.as_bytes()).await {
            if let Err(rollback) = handle.set_len(keep_len as u64).await {
                warn!("could not roll back {}: {rollback}", path.display());
            }
            return Err(e.into());
        }
        debug!("appended {} to {file}", stored.id);
        Ok(())
    }
}

async fn write_line(handle: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    handle.write_all(bytes).await?;
    handle.sync_data().await
}

impl PoolStore for JsonlStore {
    async fn find_all_predictions(&self) -> StoreResult<Vec<Stored<PredictionRecord>>> {
        self.read_all(PREDICTIONS_FILE).await
    }

    async fn find_latest_result(&self) -> StoreResult<Option<Stored<ResultRecord>>> {
        let results = self.read_all::<ResultRecord>(RESULTS_FILE).await?;
        Ok(select_current_result(&results).cloned())
    }

    async fn insert_prediction(&self, record: PredictionRecord) -> StoreResult<String> {
        let stored = Stored::new(record);
        self.append(PREDICTIONS_FILE, &stored).await?;
        Ok(stored.id)
    }

    async fn insert_result(&self, record: ResultRecord) -> StoreResult<String> {
        let stored = Stored::new(record);
        self.append(RESULTS_FILE, &stored).await?;
        Ok(stored.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_api::{MatchupPick, SeriesLength, UserInfo};

    #[tokio::test]
    async fn empty_directory_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(tmp.path()).await.unwrap();
        assert!(store.find_all_predictions().await.unwrap().is_empty());
        assert!(store.find_latest_result().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let mut record = PredictionRecord {
            user: UserInfo { name: "Ann".into(), ..Default::default() },
            ..Default::default()
        };
        record
            .rounds
            .first_round
            .insert("east-0".into(), MatchupPick::new("Celtics", SeriesLength::new(5)));

        let id = {
            let store = JsonlStore::open(tmp.path()).await.unwrap();
            store.insert_prediction(record.clone()).await.unwrap()
        };

        let reopened = JsonlStore::open(tmp.path()).await.unwrap();
        let all = reopened.find_all_predictions().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].record, record);
    }

    #[tokio::test]
    async fn latest_result_is_the_last_posted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(tmp.path()).await.unwrap();
        store.insert_result(ResultRecord::default()).await.unwrap();
        let second = store.insert_result(ResultRecord::default()).await.unwrap();
        assert_eq!(store.find_latest_result().await.unwrap().unwrap().id, second);
    }

    #[tokio::test]
    async fn unparseable_line_is_reported_with_its_position() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(tmp.path()).await.unwrap();
        store.insert_prediction(PredictionRecord::default()).await.unwrap();
        let path = tmp.path().join(PREDICTIONS_FILE);
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("{not json\n");
        std::fs::write(&path, content).unwrap();

        let err = store.find_all_predictions().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }), "got: {err}");
    }

    #[tokio::test]
    async fn interrupted_append_is_dropped_and_repaired() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(tmp.path()).await.unwrap();
        let first = store.insert_prediction(PredictionRecord::default()).await.unwrap();

        let path = tmp.path().join(PREDICTIONS_FILE);
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str(r#"{"id":"half-writ"#);
        std::fs::write(&path, content).unwrap();

        let all = store.find_all_predictions().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first);

        let second = store.insert_prediction(PredictionRecord::default()).await.unwrap();
        let ids: Vec<String> = store.find_all_predictions().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with('\n'));
    }

    #[tokio::test]
    async fn record_missing_only_its_newline_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(tmp.path()).await.unwrap();
        let first = store.insert_prediction(PredictionRecord::default()).await.unwrap();

        let path = tmp.path().join(PREDICTIONS_FILE);
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, content.trim_end()).unwrap();
        assert_eq!(store.find_all_predictions().await.unwrap().len(), 1);

        let second = store.insert_prediction(PredictionRecord::default()).await.unwrap();
        let ids: Vec<String> = store.find_all_predictions().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
