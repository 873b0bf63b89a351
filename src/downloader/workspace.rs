use std::path::{Path, PathBuf};
use crate::errors::{AppError, Result};

/// Temporary directory owned by exactly one job.
///
/// Removed by `remove()` on the normal path and by `Drop` on every other one
/// (early return, panic, task abort).
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    removed: bool,
}

impl Workspace {
    pub async fn create(path: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(path).await?;
        log::info!("📁 [TEMP] Created workspace {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn remove(mut self) {
        self.removed = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => log::info!("🧹 [TEMP] Removed workspace {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!("⚠️ [TEMP] Async removal of {:?} failed ({}), retrying", self.path, e);
                let _ = std::fs::remove_dir_all(&self.path);
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.removed && self.path.exists() {
            log::warn!("🧹 [TEMP] Removing abandoned workspace {:?}", self.path);
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

/// Picks the artifact: the largest regular file in `dir`.
///
/// The extractor may leave auxiliary files (thumbnails, partial streams);
/// size is the tie-breaker. It can be wrong for layouts where a side file
/// outgrows the real output.
pub async fn select_largest_file(dir: &Path) -> Result<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut best: Option<(u64, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        log::debug!("🔍 [FIND] {:?} ({} bytes)", entry.path(), metadata.len());
        if best.as_ref().map_or(true, |(size, _)| metadata.len() > *size) {
            best = Some((metadata.len(), entry.path()));
        }
    }

    best.map(|(_, path)| path)
        .ok_or_else(|| AppError::Extraction(format!("No output file found in {:?}", dir)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn largest_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("thumb.jpg"), vec![0u8; 10]).unwrap();
        std::fs::write(dir.path().join("song.mp3"), vec![0u8; 300]).unwrap();
        std::fs::write(dir.path().join("song.info.json"), vec![0u8; 40]).unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let picked = select_largest_file(dir.path()).await.unwrap();
        assert_eq!(picked.file_name().unwrap(), "song.mp3");
    }

    #[tokio::test]
    async fn empty_directory_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(select_largest_file(dir.path()).await, Err(AppError::Extraction(_))));
    }

    #[tokio::test]
    async fn remove_deletes_directory_with_contents() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("job");
        let ws = Workspace::create(&path).await.unwrap();
        std::fs::write(ws.path().join("a.bin"), b"abc").unwrap();
        ws.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropping_without_remove_still_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("job");
        {
            let ws = Workspace::create(&path).await.unwrap();
            std::fs::write(ws.path().join("partial.part"), b"x").unwrap();
        }
        assert!(!path.exists());
    }
}
