use crate::models::{DailyRecord, ProgressData};
use crate::store::StoreError;
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

/// Reads the single-blob layout: one JSON file holding the whole
/// date-to-record mapping. Missing file means an empty history; a
/// corrupt one is logged and treated the same.
pub async fn load_blob(path: &Path) -> ProgressData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse progress file: {err}");
                ProgressData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ProgressData::default(),
        Err(err) => {
            error!("failed to read progress file: {err}");
            ProgressData::default()
        }
    }
}

pub async fn persist_blob(path: &Path, data: &ProgressData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

/// Reads the document-collection layout: one `<date>.json` per record,
/// document id = date key. Unreadable documents are logged and skipped.
pub async fn load_collection(dir: &Path) -> ProgressData {
    let mut data = ProgressData::default();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return data,
        Err(err) => {
            error!("failed to read collection dir: {err}");
            return data;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<DailyRecord>(&bytes) {
                Ok(mut record) => {
                    // The document id is authoritative for the date.
                    record.date = key.to_string();
                    data.insert(key.to_string(), record);
                }
                Err(err) => warn!("skipping unreadable document {key}: {err}"),
            },
            Err(err) => warn!("skipping unreadable document {key}: {err}"),
        }
    }

    data
}

pub async fn persist_document(dir: &Path, record: &DailyRecord) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(record)?;
    fs::write(dir.join(format!("{}.json", record.date)), payload).await?;
    Ok(())
}
