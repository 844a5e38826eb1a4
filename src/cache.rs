//! Stage Result Store
//!
//! Flat-file memoization of pipeline stages. Each stage is identified by a
//! typed `StageId` carrying a payload schema version; entries are written as
//! pretty JSON envelopes `{schema, stage, payload}` and never expire.
//!
//! A cached entry whose schema differs from the running code is rejected
//! rather than silently loaded. Writes go through a temp file + rename so a
//! crash mid-write leaves no half-written entry behind.

use crate::error::FeeError;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;

/// Identity of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId {
    /// Position in its pipeline (file prefix)
    pub index: u8,
    pub name: &'static str,
    /// Bump whenever the payload type changes shape
    pub schema: u32,
}

impl StageId {
    pub const fn new(index: u8, name: &'static str, schema: u32) -> Self {
        Self { index, name, schema }
    }

    /// `{index:02}-{name}`
    pub fn key(&self) -> String {
        format!("{:02}-{}", self.index, self.name)
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.key())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    schema: u32,
    stage: String,
    payload: T,
}

/// Directory-backed stage store
#[derive(Debug, Clone)]
pub struct StageStore {
    dir: PathBuf,
}

impl StageStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn path(&self, stage: &StageId) -> PathBuf {
        self.dir.join(stage.file_name())
    }

    pub fn contains(&self, stage: &StageId) -> bool {
        self.path(stage).exists()
    }

    /// Load a cached payload, `None` if the stage has not run yet
    pub fn load<T: DeserializeOwned>(&self, stage: &StageId) -> Result<Option<T>> {
        let path = self.path(stage);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stage file: {:?}", path))?;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse stage file: {:?}", path))?;

        if envelope.schema != stage.schema {
            return Err(FeeError::SchemaMismatch {
                stage: stage.key(),
                expected: stage.schema,
                found: envelope.schema,
            }
            .into());
        }

        let payload = serde_json::from_value(envelope.payload)
            .with_context(|| format!("Stage {} payload does not match its schema", stage.key()))?;
        Ok(Some(payload))
    }

    /// Persist a payload for `stage`, replacing any previous entry
    pub fn store<T: Serialize>(&self, stage: &StageId, payload: &T) -> Result<()> {
        let path = self.path(stage);
        let tmp = path.with_extension("json.tmp");

        let envelope = Envelope {
            schema: stage.schema,
            stage: stage.key(),
            payload,
        };
        let json = serde_json::to_string_pretty(&envelope)
            .with_context(|| format!("Failed to serialize stage {}", stage.key()))?;

        fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to move {:?} into place", tmp))?;
        Ok(())
    }

    /// Return the cached payload for `stage`, or compute, persist and return it
    pub async fn load_or_compute<T, F, Fut>(&self, stage: StageId, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(payload) = self.load(&stage)? {
            info!("Stage {} loaded from cache", stage.key());
            return Ok(payload);
        }

        info!("Stage {} not cached, computing", stage.key());
        let payload = compute()
            .await
            .with_context(|| format!("Stage {} failed", stage.key()))?;
        self.store(&stage, &payload)?;
        info!("Stage {} written to {:?}", stage.key(), self.path(&stage));
        Ok(payload)
    }
}
