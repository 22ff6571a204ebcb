//! File intake: reading import candidates from disk

use crate::config::ImportConfig;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file to import: its name (title source) and raw text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub name: String,
    pub text: String,
}

impl RawFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a file; invalid UTF-8 is replaced rather than rejected
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            name,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Collect the files to import from `paths`, in order
///
/// Directories contribute their direct children, sorted by name. Only files
/// whose extension the configuration accepts are read.
pub fn collect_files(paths: &[PathBuf], config: &ImportConfig) -> io::Result<Vec<RawFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut children: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            children.sort();
            for child in children {
                push_accepted(&child, config, &mut files)?;
            }
        } else {
            push_accepted(path, config, &mut files)?;
        }
    }
    Ok(files)
}

fn push_accepted(path: &Path, config: &ImportConfig, files: &mut Vec<RawFile>) -> io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if !config.accepts(&name) {
        debug!(path = %path.display(), "skipping file with unsupported extension");
        return Ok(());
    }
    files.push(RawFile::read(path)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_directory_children_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "bee").unwrap();
        std::fs::write(dir.path().join("a.txt"), "ay").unwrap();
        std::fs::write(dir.path().join("photo.png"), [0u8, 1, 2]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("deep.md"), "deep").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()], &ImportConfig::default()).unwrap();
        assert_eq!(
            files,
            vec![RawFile::new("a.txt", "ay"), RawFile::new("b.md", "bee")]
        );
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let z = dir.path().join("z.md");
        let a = dir.path().join("a.md");
        std::fs::write(&z, "zed").unwrap();
        std::fs::write(&a, "ay").unwrap();

        let files = collect_files(&[z, a], &ImportConfig::default()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z.md", "a.md"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.md");
        std::fs::write(&path, [b'o', b'k', 0xff]).unwrap();

        let file = RawFile::read(&path).unwrap();
        assert!(file.text.starts_with("ok"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.md");
        assert!(collect_files(&[missing], &ImportConfig::default()).is_err());
    }
}
