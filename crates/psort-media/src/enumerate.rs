//! Working directory enumeration.

use std::path::Path;

use tracing::debug;

use psort_models::MediaFile;

use crate::error::{MediaError, MediaResult};

/// Declared MIME type for a file name, derived from its extension only.
pub fn mime_from_extension(file_name: impl AsRef<Path>) -> Option<&'static str> {
    let ext = file_name.as_ref().extension()?.to_str()?.to_ascii_lowercase();

    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "json" => "application/json",
        "xz" => "application/x-xz",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

/// List the regular files directly inside `dir`, sorted by file name.
///
/// Every file is returned regardless of type; allow-list filtering is the
/// caller's concern. Fails with [`MediaError::NoMedia`] when the directory
/// is missing or holds no regular files.
pub async fn enumerate_media(dir: impl AsRef<Path>) -> MediaResult<Vec<MediaFile>> {
    let dir = dir.as_ref();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MediaError::NoMedia(dir.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let mime = mime_from_extension(&path).map(str::to_string);
        files.push(MediaFile::new(path, mime));
    }

    if files.is_empty() {
        return Err(MediaError::NoMedia(dir.to_path_buf()));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(path = %dir.display(), count = files.len(), "Enumerated working directory");
    Ok(files)
}
