// src/artifact.rs
use crate::errors::{Result, ServiceError};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Length of generated artifact names.
///
/// 62^16 ≈ 4.8e28 possible names. Over 10^9 artifacts the birthday bound
/// n² / 2N stays near 1e-11, so no on-disk uniqueness check is made.
pub const ARTIFACT_NAME_LEN: usize = 16;

/// Longest identifier `locate` will accept from a client.
const MAX_ARTIFACT_NAME_LEN: usize = 64;

/// Returns a fresh random alphanumeric artifact name.
pub fn new_artifact_name() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ARTIFACT_NAME_LEN)
        .map(char::from)
        .collect()
}

fn is_valid_name(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ARTIFACT_NAME_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub created_at: DateTime<Utc>,
    pub size: u64,
}

/// The runtime directory plus a registry of the artifacts this process
/// has produced.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    registry: Arc<RwLock<HashMap<String, ArtifactInfo>>>,
}

impl ArtifactStore {
    /// Opens the store, creating the runtime directory if needed. The
    /// directory is made absolute so artifact paths are never looked up
    /// through `PATH`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let dir = std::fs::canonicalize(&dir)?;
        Ok(Self {
            dir,
            registry: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where an artifact with this name lives (or will live).
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(id)
    }

    /// Records a freshly compiled artifact. Returns `false` if no file
    /// with that name exists.
    pub async fn register(&self, id: &str) -> bool {
        let size = match tokio::fs::metadata(self.path_for(id)).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => return false,
        };
        let info = ArtifactInfo { created_at: Utc::now(), size };
        self.registry.write().await.insert(id.to_string(), info);
        true
    }

    pub async fn info(&self, id: &str) -> Option<ArtifactInfo> {
        self.registry.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Resolves an artifact name to its path on disk.
    ///
    /// Names that are not plain alphanumeric tokens are refused, so a
    /// client cannot reach outside the runtime directory. Files left by
    /// an earlier process are found through the filesystem even though
    /// they are not in the registry.
    pub async fn locate(&self, id: &str) -> Result<PathBuf> {
        if !is_valid_name(id) {
            return Err(ServiceError::InvalidArtifactName(id.to_string()));
        }
        let path = self.path_for(id);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => {
                // stale registry entry, the file was removed underneath us
                self.registry.write().await.remove(id);
                Err(ServiceError::ArtifactMissing(id.to_string()))
            }
        }
    }

    pub async fn read(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.locate(id).await?;
        Ok(tokio::fs::read(path).await?)
    }

    /// Removes an artifact file, registered or not. Missing files are fine.
    pub async fn discard(&self, id: &str) {
        self.registry.write().await.remove(id);
        if let Err(e) = tokio::fs::remove_file(self.path_for(id)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("[artifact] failed to remove {}: {}", id, e);
            }
        }
    }

    /// Deletes registered artifacts older than `ttl`. Returns how many
    /// were removed.
    pub async fn sweep(&self, ttl: Duration) -> usize {
        let cutoff = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => Utc::now() - ttl,
            Err(_) => return 0,
        };
        let expired: Vec<String> = {
            let registry = self.registry.read().await;
            registry
                .iter()
                .filter(|(_, info)| info.created_at <= cutoff)
                .map(|(id, _)| id.clone())
                .collect()
        };
        for id in &expired {
            self.discard(id).await;
        }
        if !expired.is_empty() {
            log::info!(
                "[artifact] swept {} expired artifact(s), {} left",
                expired.len(),
                self.len().await
            );
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn names_are_fixed_length_alphanumeric() {
        for _ in 0..100 {
            let name = new_artifact_name();
            assert_eq!(name.len(), ARTIFACT_NAME_LEN);
            assert!(name.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn names_do_not_repeat() {
        let names: HashSet<String> = (0..10_000).map(|_| new_artifact_name()).collect();
        assert_eq!(names.len(), 10_000);
    }

    #[tokio::test]
    async fn locate_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::open(tmp.path().join("runtime")).unwrap();
        for bad in ["../etc/passwd", "a/b", "", "..", "name.exe"] {
            assert!(matches!(
                store.locate(bad).await,
                Err(ServiceError::InvalidArtifactName(_))
            ));
        }
    }

    #[tokio::test]
    async fn register_locate_and_sweep() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::open(tmp.path().join("runtime")).unwrap();
        assert!(store.dir().is_dir());

        let id = new_artifact_name();
        assert!(!store.register(&id).await);
        assert!(matches!(store.locate(&id).await, Err(ServiceError::ArtifactMissing(_))));

        std::fs::write(store.path_for(&id), b"binary").unwrap();
        assert!(store.register(&id).await);
        assert_eq!(store.info(&id).await.unwrap().size, 6);
        assert_eq!(store.locate(&id).await.unwrap(), store.path_for(&id));
        assert_eq!(store.read(&id).await.unwrap(), b"binary");

        assert_eq!(store.sweep(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.sweep(Duration::ZERO).await, 1);
        assert_eq!(store.len().await, 0);
        assert!(!store.path_for(&id).exists());
    }

    #[tokio::test]
    async fn unregistered_files_are_still_found() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::open(tmp.path()).unwrap();
        std::fs::write(tmp.path().join("leftover01"), b"x").unwrap();
        assert!(store.locate("leftover01").await.is_ok());
    }
}
