//! Input discovery: directory scanning and TSV manifests.

use crate::core::{ScoreError, ScoreResult};
use crate::pipeline::ImageRecord;
use std::path::Path;

/// File extensions treated as raster images during directory scans.
const RASTER_EXTENSIONS: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

fn has_raster_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            RASTER_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Builds records from every raster image file in a directory.
///
/// Non-image files are skipped. Entries are sorted by path so repeated
/// scans of the same directory produce the same record order. Each record's
/// ground-truth label defaults to its file name.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be read.
pub fn scan_directory(dir: &Path) -> ScoreResult<Vec<ImageRecord>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_raster_extension(path))
        .collect();
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| {
            let label = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string);
            ImageRecord {
                true_label: label,
                path,
            }
        })
        .collect())
}

/// Reads records from a tab-separated manifest file.
///
/// Each non-empty line is `<relative-image-path>\t<true-label>`; paths are
/// resolved against `image_root`. An empty label field yields a record with
/// no ground truth.
///
/// # Errors
///
/// Returns an IO error if the manifest cannot be read, and
/// [`ScoreError::InvalidInput`] for a line without a tab separator.
pub fn read_manifest(manifest: &Path, image_root: &Path) -> ScoreResult<Vec<ImageRecord>> {
    let content = std::fs::read_to_string(manifest)?;
    let mut records = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (rel_path, label) = line.split_once('\t').ok_or_else(|| {
            ScoreError::invalid_input(format!(
                "manifest '{}' line {}: expected <path>\\t<label>",
                manifest.display(),
                line_no + 1
            ))
        })?;
        let path = image_root.join(rel_path);
        let record = if label.is_empty() {
            ImageRecord::new(path)
        } else {
            ImageRecord::with_label(path, label)
        };
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn scan_skips_non_images_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("README.md"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let records = scan_directory(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].true_label.as_deref(), Some("a.png"));
        assert_eq!(records[1].true_label.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn manifest_resolves_against_root() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("tags.tsv");
        let mut file = fs::File::create(&manifest).unwrap();
        writeln!(file, "dog.jpg\tdog").unwrap();
        writeln!(file, "cat.png\tcat").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "unknown.png\t").unwrap();

        let records = read_manifest(&manifest, Path::new("/images")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].path, Path::new("/images/dog.jpg"));
        assert_eq!(records[0].true_label.as_deref(), Some("dog"));
        assert_eq!(records[2].true_label, None);
    }

    #[test]
    fn manifest_rejects_untabbed_lines() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("tags.tsv");
        fs::write(&manifest, "dog.jpg dog\n").unwrap();

        let err = read_manifest(&manifest, Path::new("/images")).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
