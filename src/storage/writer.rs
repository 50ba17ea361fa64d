use crate::MirrorError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// An open, freshly created file in the mirror
///
/// Files are only ever created, never truncated: [`AssetWriter::create`]
/// reports an existing file instead of opening it, so a re-run or a racing
/// writer can never overwrite bytes already on disk.
#[derive(Debug)]
pub struct AssetWriter {
    path: PathBuf,
    file: BufWriter<File>,
    written: u64,
}

impl AssetWriter {
    /// Creates `path` and any missing parent directories
    ///
    /// # Returns
    ///
    /// * `Ok(Some(AssetWriter))` - The file was created and is ready for writing
    /// * `Ok(None)` - A file already exists at `path`
    /// * `Err(MirrorError::Filesystem)` - Directory or file creation failed
    pub async fn create(path: &Path) -> Result<Option<Self>, MirrorError> {
        ensure_parent_dir(path).await?;

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(MirrorError::filesystem(path, e)),
        };

        Ok(Some(Self {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
            written: 0,
        }))
    }

    /// Appends one chunk to the file
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), MirrorError> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| MirrorError::filesystem(&self.path, e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes buffered bytes and returns the total written
    pub async fn finish(mut self) -> Result<u64, MirrorError> {
        self.file
            .flush()
            .await
            .map_err(|e| MirrorError::filesystem(&self.path, e))?;
        Ok(self.written)
    }
}

/// Creates every missing directory above `path`; a no-op when they exist
pub async fn ensure_parent_dir(path: &Path) -> Result<(), MirrorError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MirrorError::filesystem(parent, e)),
        _ => Ok(()),
    }
}
