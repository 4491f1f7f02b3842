//! Image directory discovery.

use std::path::{Path, PathBuf};

use crate::error::ReviewError;

/// Check if a path has the given extension (case-insensitive).
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Image names (file stems) in a folder, sorted by file name, non-recursive.
pub fn list_images(folder: &Path, extension: &str) -> Result<Vec<String>, ReviewError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, extension))
        .collect();

    // Sort by filename for consistent ordering
    paths.sort();

    let names: Vec<String> = paths
        .iter()
        .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
        .map(String::from)
        .collect();

    log::info!(
        "Scanned folder {:?}: found {} .{} images",
        folder,
        names.len(),
        extension
    );

    Ok(names)
}

/// Path of an image file from its name.
pub fn image_path(folder: &Path, image: &str, extension: &str) -> PathBuf {
    folder.join(format!("{}.{}", image, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.JPG", "c.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.jpg")).unwrap();

        let names = list_images(dir.path(), "jpg").unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_folder_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_images(&dir.path().join("absent"), "jpg").unwrap_err();
        assert!(matches!(err, ReviewError::Io(_)));
    }

    #[test]
    fn test_image_path() {
        let path = image_path(Path::new("/data/test_full"), "img_01", "jpg");
        assert_eq!(path, PathBuf::from("/data/test_full/img_01.jpg"));
    }
}
