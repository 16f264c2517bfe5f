use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, anyhow};

use crate::domain::repository::AttachmentStore;
use crate::error::PersonnelServiceError;

/// Attachment store on the local filesystem, rooted at one directory.
#[derive(Clone, Debug)]
pub struct LocalAttachmentStore {
    root: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Join a relative path onto the root. Absolute paths and any `..`
    /// component are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, PersonnelServiceError> {
        let relative = Path::new(path);
        let contained = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(PersonnelServiceError::Storage(anyhow!(
                "attachment path escapes storage root: {path:?}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn storage_err(e: std::io::Error, what: &'static str) -> PersonnelServiceError {
    PersonnelServiceError::Storage(anyhow::Error::new(e).context(what))
}

impl AttachmentStore for LocalAttachmentStore {
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<String, PersonnelServiceError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err(e, "create attachment directory"))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| storage_err(e, "write attachment"))?;
        Ok(path.to_owned())
    }

    async fn exists(&self, path: &str) -> Result<bool, PersonnelServiceError> {
        let target = self.resolve(path)?;
        tokio::fs::try_exists(&target)
            .await
            .map_err(|e| storage_err(e, "stat attachment"))
    }

    async fn retrieve(&self, path: &str) -> Result<Vec<u8>, PersonnelServiceError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PersonnelServiceError::AttachmentNotFound)
            }
            Err(e) => Err(storage_err(e, "read attachment")),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), PersonnelServiceError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(PersonnelServiceError::Storage(
                anyhow::Error::new(e).context(format!("delete attachment {path}")),
            )),
            _ => Ok(()),
        }
    }
}
