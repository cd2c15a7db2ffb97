use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::BlobSource;
use crate::error::ReportError;
use crate::types::Blob;

/// Buckets laid out as directories under a common root.
///
/// Object names are paths relative to the bucket directory, joined with `/`.
pub struct FsBucket {
    root: PathBuf,
}

impl FsBucket {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

fn object_name(bucket_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(bucket_dir).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

impl BlobSource for FsBucket {
    fn list_blobs(&self, bucket: &str, prefix: &str) -> Result<Vec<Blob>, ReportError> {
        let bucket_dir = self.root.join(bucket);
        if !bucket_dir.is_dir() {
            return Err(ReportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("bucket {bucket} not found under {}", self.root.display()),
            )));
        }

        let mut blobs = Vec::new();
        for entry in WalkDir::new(&bucket_dir).follow_links(false) {
            let entry = entry.map_err(|e| ReportError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = object_name(&bucket_dir, entry.path()) else {
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }
            let size = entry.metadata().map_err(|e| ReportError::Io(e.into()))?.len();
            blobs.push(Blob { name, size });
        }

        debug!(bucket, prefix, count = blobs.len(), "Listed blobs");
        Ok(blobs)
    }
}
