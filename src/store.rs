use crate::models::{DailyRecord, ParticipantId, ProgressData};
use crate::storage;
use async_trait::async_trait;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to encode progress data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write progress data: {0}")]
    Write(#[from] std::io::Error),
}

/// A live registration on the shared progress history.
///
/// `recv` yields the full history immediately on the first call and
/// then once per store change. Dropping the subscription releases the
/// underlying channel registration; nothing is delivered afterwards.
pub struct Subscription {
    initial: Option<ProgressData>,
    rx: broadcast::Receiver<ProgressData>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<ProgressData> {
        if let Some(snapshot) = self.initial.take() {
            return Some(snapshot);
        }
        loop {
            match self.rx.recv().await {
                Ok(data) => return Some(data),
                // Every message is a full snapshot, so a lagged
                // receiver just picks up the freshest one.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Splits into the initial snapshot and the raw update channel,
    /// for bridging into an SSE stream.
    pub fn into_parts(self) -> (ProgressData, broadcast::Receiver<ProgressData>) {
        (self.initial.unwrap_or_default(), self.rx)
    }
}

/// The persistence gateway. Reads flow through `subscribe`; `toggle_check_in`
/// is fire-and-forget and propagates back through the subscription.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn subscribe(&self) -> Subscription;

    /// Flips the caller-observed status for one participant on one
    /// date. A record absent for the date is synthesized with every
    /// flag false before the target flag is set; an existing record
    /// keeps the other participants' flags untouched.
    async fn toggle_check_in(
        &self,
        date_key: &str,
        participant: ParticipantId,
        current_status: bool,
    ) -> Result<(), StoreError>;
}

/// In-memory mirror and update fan-out shared by both store variants.
struct Shared {
    data: Mutex<ProgressData>,
    updates: broadcast::Sender<ProgressData>,
}

impl Shared {
    fn new(data: ProgressData) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            data: Mutex::new(data),
            updates,
        }
    }

    async fn subscribe(&self) -> Subscription {
        // Register while holding the lock so no update lands between
        // the snapshot and the registration.
        let data = self.data.lock().await;
        let rx = self.updates.subscribe();
        Subscription {
            initial: Some(data.clone()),
            rx,
        }
    }

    fn updated_record(
        data: &ProgressData,
        date_key: &str,
        participant: ParticipantId,
        current_status: bool,
    ) -> DailyRecord {
        let mut record = data
            .get(date_key)
            .cloned()
            .unwrap_or_else(|| DailyRecord::new(date_key));
        record.set_flag(participant, !current_status);
        record
    }

    fn commit(&self, data: &mut ProgressData, date_key: &str, record: DailyRecord) {
        data.insert(date_key.to_string(), record);
        let _ = self.updates.send(data.clone());
    }
}

/// Shared document collection: one JSON document per date under a
/// directory, document id = date key.
pub struct DocumentStore {
    dir: PathBuf,
    shared: Shared,
}

impl DocumentStore {
    pub async fn open(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir).await?;
        let data = storage::load_collection(&dir).await;
        Ok(Self {
            dir,
            shared: Shared::new(data),
        })
    }
}

#[async_trait]
impl ProgressStore for DocumentStore {
    async fn subscribe(&self) -> Subscription {
        self.shared.subscribe().await
    }

    async fn toggle_check_in(
        &self,
        date_key: &str,
        participant: ParticipantId,
        current_status: bool,
    ) -> Result<(), StoreError> {
        let mut data = self.shared.data.lock().await;
        let record = Shared::updated_record(&data, date_key, participant, current_status);
        // A failed write leaves the mirror and subscribers untouched.
        storage::persist_document(&self.dir, &record).await?;
        self.shared.commit(&mut data, date_key, record);
        Ok(())
    }
}

/// Fallback layout: the whole mapping serialized into one JSON file,
/// read-modify-write on every toggle.
pub struct BlobStore {
    path: PathBuf,
    shared: Shared,
}

impl BlobStore {
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let data = storage::load_blob(&path).await;
        Ok(Self {
            path,
            shared: Shared::new(data),
        })
    }
}

#[async_trait]
impl ProgressStore for BlobStore {
    async fn subscribe(&self) -> Subscription {
        self.shared.subscribe().await
    }

    async fn toggle_check_in(
        &self,
        date_key: &str,
        participant: ParticipantId,
        current_status: bool,
    ) -> Result<(), StoreError> {
        let mut data = self.shared.data.lock().await;
        let record = Shared::updated_record(&data, date_key, participant, current_status);
        let mut next = data.clone();
        next.insert(date_key.to_string(), record.clone());
        storage::persist_blob(&self.path, &next).await?;
        self.shared.commit(&mut data, date_key, record);
        Ok(())
    }
}

/// Which layout to run, decided once at startup.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Collection(PathBuf),
    Blob(PathBuf),
}

/// `APP_COLLECTION_DIR` selects the shared document collection; without
/// it the store falls back to a single blob at `APP_DATA_PATH`.
pub fn resolve_store_config() -> StoreConfig {
    if let Ok(dir) = env::var("APP_COLLECTION_DIR") {
        return StoreConfig::Collection(PathBuf::from(dir));
    }
    let path = env::var("APP_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/progress.json"));
    StoreConfig::Blob(path)
}

pub async fn open_store(config: StoreConfig) -> Result<Arc<dyn ProgressStore>, StoreError> {
    match config {
        StoreConfig::Collection(dir) => {
            info!("using document collection at {}", dir.display());
            Ok(Arc::new(DocumentStore::open(dir).await?))
        }
        StoreConfig::Blob(path) => {
            info!(
                "no collection configured, using single-file store at {}",
                path.display()
            );
            Ok(Arc::new(BlobStore::open(path).await?))
        }
    }
}
