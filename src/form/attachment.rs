use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-file size cap for uploads (25 MB).
pub const MAX_ATTACHMENT_SIZE: u64 = 25 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' is not a regular file")]
    NotAFile(PathBuf),
    #[error("'{path}' is {size} bytes (max {max} bytes)")]
    TooLarge { path: PathBuf, size: u64, max: u64 },
    #[error("No file path given")]
    EmptyPath,
}

/// A file picked for upload, held in memory until the form is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// File contents are omitted so a draft can be logged.
impl std::fmt::Debug for AttachedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachedFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl AttachedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk, enforcing [`MAX_ATTACHMENT_SIZE`].
    pub async fn load(path: &Path) -> Result<Self, AttachmentError> {
        let io_err = |source| AttachmentError::Io {
            path: path.to_path_buf(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
        if !metadata.is_file() {
            return Err(AttachmentError::NotAFile(path.to_path_buf()));
        }
        if metadata.len() > MAX_ATTACHMENT_SIZE {
            return Err(AttachmentError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max: MAX_ATTACHMENT_SIZE,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::debug!(path = %path.display(), size = bytes.len(), "Loaded attachment");
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Load every path in a comma-separated selection, in order.
///
/// The whole selection fails if any file fails, mirroring a file dialog that
/// either returns all picked files or none.
pub async fn load_selection(input: &str) -> Result<Vec<AttachedFile>, AttachmentError> {
    let paths: Vec<&str> = input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paths.is_empty() {
        return Err(AttachmentError::EmptyPath);
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(AttachedFile::load(Path::new(path)).await?);
    }
    Ok(files)
}
