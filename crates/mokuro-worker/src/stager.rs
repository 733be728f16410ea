//! Archive staging.
//!
//! Extracts an input archive into a scratch directory and collects
//! the page images it contains. Validation here is deliberately
//! thin: only "at least one recognized image file" — image content
//! is never inspected. Cleanup of the destination is the caller's
//! responsibility.

use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::error::{WorkerError, WorkerResult};

/// Recognized page-image extensions, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "bmp"];

/// The image files discovered in an extracted archive, in
/// deterministic walk order.
#[derive(Debug, Clone)]
pub struct PageImageCollection {
    pub files: Vec<PathBuf>,
}

impl PageImageCollection {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Extract `archive_path` into `dest_dir` and scan for page images.
///
/// Fails with `EmptyArchive` when extraction succeeds but no
/// recognized image file is found anywhere in the resulting tree.
pub async fn stage(archive_path: &Path, dest_dir: &Path) -> WorkerResult<PageImageCollection> {
    info!("Extracting archive: {}", archive_path.display());
    tokio::fs::create_dir_all(dest_dir).await?;

    let archive = archive_path.to_owned();
    let dest = dest_dir.to_owned();
    tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
        .await
        .map_err(|e| WorkerError::extraction(format!("extraction task failed: {e}")))??;

    let files = scan_images(dest_dir);
    if files.is_empty() {
        return Err(WorkerError::EmptyArchive);
    }

    info!("Found {} images in archive", files.len());
    Ok(PageImageCollection { files })
}

fn extract_archive(archive_path: &Path, dest: &Path) -> WorkerResult<()> {
    let file = std::fs::File::open(archive_path).map_err(|e| {
        WorkerError::extraction(format!("cannot open {}: {}", archive_path.display(), e))
    })?;

    let mut archive = zip::ZipArchive::new(file)?;
    archive.extract(dest)?;
    Ok(())
}

/// Recursive scan for image files, sorted by file name per directory
/// so the result is deterministic for a fixed tree.
fn scan_images(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_image_extension(path))
        .collect()
}

/// Whether `path` has one of the recognized image extensions.
pub(crate) fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn stages_images_from_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("vol.cbz");
        write_zip(
            &archive,
            &[
                ("001.jpg", b"jpg bytes" as &[u8]),
                ("002.PNG", b"png bytes"),
                ("nested/003.webp", b"webp bytes"),
                ("info.txt", b"not an image"),
            ],
        );

        let dest = dir.path().join("extracted");
        let staged = stage(&archive, &dest).await.unwrap();

        assert_eq!(staged.len(), 3);
        assert!(staged.files.iter().all(|p| p.starts_with(&dest)));
        assert!(dest.join("001.jpg").exists());
    }

    #[tokio::test]
    async fn rejects_archive_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("empty.cbz");
        write_zip(&archive, &[("readme.txt", b"hello" as &[u8])]);

        let err = stage(&archive, &dir.path().join("extracted"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::EmptyArchive));
    }

    #[tokio::test]
    async fn missing_archive_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = stage(&dir.path().join("nope.cbz"), &dir.path().join("extracted"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Extraction(_)));
    }

    #[tokio::test]
    async fn corrupt_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bad.cbz");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let err = stage(&archive, &dir.path().join("extracted"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Zip(_)));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(has_image_extension(Path::new("a.JPG")));
        assert!(has_image_extension(Path::new("b.Jpeg")));
        assert!(has_image_extension(Path::new("c.webp")));
        assert!(!has_image_extension(Path::new("d.gif")));
        assert!(!has_image_extension(Path::new("noext")));
    }
}
