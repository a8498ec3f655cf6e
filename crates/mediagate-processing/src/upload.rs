//! Uploaded file handles.
//!
//! An [`UploadedFile`] is created by the upload layer before validation. Its
//! content lives either in memory or in a temporary file on disk. Temporary
//! files belong to the caller: nothing in this crate deletes them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;

#[derive(Clone, Debug)]
enum FileContent {
    Memory(Bytes),
    TemporaryFile(PathBuf),
}

/// Uploaded file as received from the client.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    filename: String,
    content_type: String,
    size: u64,
    content: FileContent,
}

impl UploadedFile {
    pub fn from_bytes(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            content: FileContent::Memory(data),
        }
    }

    /// Wrap a caller-owned temporary file. The size is read once, here.
    pub fn from_temporary_path(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> io::Result<Self> {
        let path = path.into();
        let size = fs::metadata(&path)?.len();
        Ok(Self {
            filename: filename.into(),
            content_type: content_type.into(),
            size,
            content: FileContent::TemporaryFile(path),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared content type, as sent by the client.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// On-disk location for uploads spooled to a temporary file.
    pub fn temporary_file_path(&self) -> Option<&Path> {
        match &self.content {
            FileContent::TemporaryFile(path) => Some(path),
            FileContent::Memory(_) => None,
        }
    }

    /// False once the caller has removed the temporary file.
    pub fn is_available(&self) -> bool {
        match &self.content {
            FileContent::Memory(_) => true,
            FileContent::TemporaryFile(path) => path.is_file(),
        }
    }

    pub fn read_bytes(&self) -> io::Result<Bytes> {
        match &self.content {
            FileContent::Memory(data) => Ok(data.clone()),
            FileContent::TemporaryFile(path) => fs::read(path).map(Bytes::from),
        }
    }

    /// Lowercased extension of the original filename.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Successful validation outcome.
///
/// Unchanged uploads come back as the very handle that was validated;
/// converted images come back as a new, independent file.
#[derive(Debug)]
pub enum ValidatedUpload<'a> {
    Original(&'a UploadedFile),
    Converted(UploadedFile),
}

impl ValidatedUpload<'_> {
    pub fn file(&self) -> &UploadedFile {
        match self {
            ValidatedUpload::Original(file) => file,
            ValidatedUpload::Converted(file) => file,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ValidatedUpload::Converted(_))
    }

    pub fn into_owned(self) -> UploadedFile {
        match self {
            ValidatedUpload::Original(file) => file.clone(),
            ValidatedUpload::Converted(file) => file,
        }
    }
}
