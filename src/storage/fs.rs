//! Module to turn paths picked by the user into upload candidates

use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::{domain::media::FileCandidate, storage::error::StorageError};

/// Map file extension (without dot) to the MIME type browsers expect.
/// Returns None if the extension is not recognized.
pub fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext {
        "m4a" => Some("audio/x-m4a"),
        "aac" => Some("audio/aac"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        "mp4" => Some("video/mp4"),
        _ => None,
    }
}

pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    let default = || {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string()
    };
    ext.and_then(|ext| mime_from_ext(&ext).map(str::to_string))
        .unwrap_or_else(default)
}

fn is_media_mime(mime: &str) -> bool {
    ["audio/", "video/", "image/"]
        .iter()
        .any(|prefix| mime.starts_with(prefix))
}

pub fn read_candidate(path: &Path) -> Result<FileCandidate, StorageError> {
    let content = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    Ok(FileCandidate::new(name, mime_for_path(path), content))
}

/// Reads the given paths in order.
///
/// Files are always taken, so the validator can tell the user why one was
/// refused. Directories are walked recursively and only contribute files
/// that look like audio, video or images.
pub fn collect_candidates(
    paths: &[PathBuf],
    follow_symlinks: bool,
) -> Result<Vec<FileCandidate>, StorageError> {
    let mut candidates = Vec::new();

    for path in paths {
        if !path.is_dir() {
            candidates.push(read_candidate(path)?);
            continue;
        }

        let root_str = path.to_string_lossy();
        let mut files = WalkDir::new(path)
            .follow_links(follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(err) => {
                    log::warn!("error while scanning dir {root_str}, skipping an entry: {err:?}");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| is_media_mime(&mime_for_path(p)))
            .collect::<Vec<PathBuf>>();

        files.sort();
        for file in files {
            candidates.push(read_candidate(&file)?);
        }
    }

    Ok(candidates)
}
