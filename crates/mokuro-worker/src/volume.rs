//! Volume construction from a staged archive.
//!
//! This is the second validation layer, independent of the stager's
//! image scan: it applies structural rules (flat page directory, or
//! a chain of single wrapper directories around one) and orders the
//! pages for reading. A tree the stager accepted can still be
//! rejected here, so both checks stay.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::{WorkerError, WorkerResult};
use crate::stager::has_image_extension;

/// The logical content unit handed to the OCR engine: one ordered
/// set of page images under a single root.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume title, taken from the page directory name
    pub title: String,
    /// Directory the page images live in
    pub root: PathBuf,
    /// Page images in reading order
    pub pages: Vec<PathBuf>,
}

impl Volume {
    /// Build a volume from an extracted archive tree.
    ///
    /// `fallback_title` is used when the pages sit directly at the
    /// extraction root, which carries no meaningful name of its own.
    pub fn from_staged(extracted_root: &Path, fallback_title: &str) -> WorkerResult<Self> {
        let page_root = locate_page_root(extracted_root)?;

        let mut pages: Vec<PathBuf> = std::fs::read_dir(&page_root)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();

        if pages.is_empty() {
            return Err(WorkerError::NoContentFound);
        }

        pages.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));

        let title = if page_root == extracted_root {
            fallback_title.to_string()
        } else {
            file_name(&page_root)
        };

        Ok(Self {
            title,
            root: page_root,
            pages,
        })
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Find the directory that actually holds the page images.
///
/// Accepts images directly in `root`, or descends through a chain of
/// single wrapper directories (the common `Title/Volume 01/*.jpg`
/// archive layout). Anything else is not recognized as one volume.
fn locate_page_root(root: &Path) -> WorkerResult<PathBuf> {
    let mut current = root.to_path_buf();

    loop {
        let mut subdirs = Vec::new();
        let mut has_images = false;

        for entry in std::fs::read_dir(&current)?.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else if has_image_extension(&path) {
                has_images = true;
            }
        }

        if has_images {
            return Ok(current);
        }

        match subdirs.len() {
            1 => current = subdirs.remove(0),
            _ => return Err(WorkerError::NoContentFound),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Natural ordering: runs of digits compare numerically, so
/// `page2 < page10`. Case-insensitive on the text runs.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum NaturalPart {
    Number(u64),
    Text(String),
}

fn natural_key(name: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut chars = name.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut value = 0u64;
            while let Some(&d) = chars.peek() {
                let Some(digit) = d.to_digit(10) else { break };
                value = value.saturating_mul(10).saturating_add(digit as u64);
                chars.next();
            }
            parts.push(NaturalPart::Number(value));
        } else {
            let mut text = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    break;
                }
                text.extend(d.to_lowercase());
                chars.next();
            }
            parts.push(NaturalPart::Text(text));
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn natural_order_sorts_numerically() {
        let mut names = vec!["page10.jpg", "page2.jpg", "page1.jpg", "cover.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["cover.jpg", "page1.jpg", "page2.jpg", "page10.jpg"]);
    }

    #[test]
    fn builds_volume_from_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("002.jpg"));
        touch(&dir.path().join("001.jpg"));

        let volume = Volume::from_staged(dir.path(), "vol-1").unwrap();
        assert_eq!(volume.title, "vol-1");
        assert_eq!(volume.page_count(), 2);
        assert_eq!(volume.pages[0].file_name().unwrap(), "001.jpg");
    }

    #[test]
    fn descends_through_wrapper_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Series/Volume 01/p1.png"));
        touch(&dir.path().join("Series/Volume 01/p2.png"));

        let volume = Volume::from_staged(dir.path(), "fallback").unwrap();
        assert_eq!(volume.title, "Volume 01");
        assert_eq!(volume.page_count(), 2);
    }

    #[test]
    fn rejects_empty_tree() {
        let dir = tempfile::tempdir().unwrap();

        let err = Volume::from_staged(dir.path(), "v").unwrap_err();
        assert!(matches!(err, WorkerError::NoContentFound));
    }

    #[test]
    fn rejects_ambiguous_sibling_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/p1.jpg"));
        touch(&dir.path().join("b/p1.jpg"));

        // Two page directories are not one volume.
        let err = Volume::from_staged(dir.path(), "v").unwrap_err();
        assert!(matches!(err, WorkerError::NoContentFound));
    }
}
