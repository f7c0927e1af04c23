//! One YAML file per actor under a records directory.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::trace;

use super::RecordPersistence;
use crate::core::ActorRecordSet;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct YamlDirectoryStore {
    root: PathBuf,
}

impl YamlDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Bytes outside `[A-Za-z0-9._-]` are percent-encoded.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
                name.push(char::from(byte));
            } else {
                let _ = write!(name, "%{byte:02X}");
            }
        }
        name.push_str(".yaml");
        self.root.join(name)
    }
}

#[async_trait]
impl RecordPersistence for YamlDirectoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }

    async fn load(&self, key: &str) -> Result<Option<ActorRecordSet>> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Some(ActorRecordSet::new()));
        }
        let records: ActorRecordSet = serde_yaml::from_str(&raw)?;
        trace!(path = %path.display(), records = records.len(), "loaded record set");
        Ok(Some(records))
    }

    async fn save(&self, key: &str, records: &ActorRecordSet) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("yaml.tmp");
        let raw = serde_yaml::to_string(records)?;
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &path).await?;
        trace!(path = %path.display(), records = records.len(), "saved record set");
        Ok(())
    }
}
