//! Destinations for finished exports.

use crate::error::{Error, Result};
use crate::model::{Bundle, ExportDocument};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Something that accepts a finished [`ExportDocument`].
///
/// A failed write must leave nothing behind.
pub trait ExportSink {
    /// Write `document` under `name` and return where it went.
    fn write(&mut self, name: &str, document: &ExportDocument) -> Result<PathBuf>;
}

/// Writes exports into a directory: single documents as files, bundles as
/// sub-directories holding every file plus `_export_metadata.json`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ExportSink for DirectorySink {
    fn write(&mut self, name: &str, document: &ExportDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let name = safe_component(name);
        let path = match document {
            ExportDocument::Bundle(_) => self.root.join(&name),
            _ if Path::new(&name).extension().is_some() => self.root.join(&name),
            _ => self.root.join(format!("{}.{}", name, document.extension())),
        };

        write_document(&path, document)?;
        log::info!("wrote {}", path.display());
        self.written.push(path.clone());
        Ok(path)
    }
}

/// Write a document to `path`.
///
/// Text documents become one file; a bundle becomes a directory. Output is
/// staged next to the target and moved into place only when complete.
pub fn write_document(path: &Path, document: &ExportDocument) -> Result<()> {
    let staging = staging_path(path);
    let staged = match document {
        ExportDocument::Bundle(bundle) => write_bundle_dir(&staging, bundle),
        _ => {
            let body = document.as_str().unwrap_or_default();
            fs::write(&staging, body).map_err(Error::from)
        }
    };

    if let Err(e) = staged.and_then(|_| replace(&staging, path)) {
        discard(&staging);
        return Err(e);
    }
    Ok(())
}

fn write_bundle_dir(dir: &Path, bundle: &Bundle) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut used = HashSet::new();
    for file in &bundle.files {
        let name = unique_name(&safe_component(&file.filename), &mut used);
        fs::write(dir.join(&name), file.content.as_bytes())?;
    }
    fs::write(dir.join(Bundle::METADATA_FILE), bundle.metadata.to_json()?)?;
    Ok(())
}

fn replace(staging: &Path, target: &Path) -> Result<()> {
    if target.is_dir() {
        fs::remove_dir_all(target)?;
    } else if target.exists() {
        fs::remove_file(target)?;
    }
    fs::rename(staging, target)?;
    Ok(())
}

fn discard(staging: &Path) {
    let removed = if staging.is_dir() {
        fs::remove_dir_all(staging)
    } else {
        fs::remove_file(staging)
    };
    if let Err(e) = removed {
        log::debug!("could not remove {}: {}", staging.display(), e);
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{}.partial", name))
}

/// Last path component only; no directory escapes from captured names.
fn safe_component(name: &str) -> String {
    Path::new(name.trim())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| "Unknown_File".to_string())
}

/// `name`, or `name_2.ext`, `name_3.ext`, ... if already used.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.split_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (name, String::new()),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractedFile;
    use crate::render::bundle;

    #[test]
    fn test_write_single_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        let path = sink
            .write("chat-2025-01-01", &ExportDocument::Markdown("# Hi\n".into()))
            .unwrap();

        assert_eq!(path, dir.path().join("chat-2025-01-01.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hi\n");
        assert_eq!(sink.written().len(), 1);
        assert!(!dir.path().join(".chat-2025-01-01.md.partial").exists());
    }

    #[test]
    fn test_write_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let files = vec![
            ExtractedFile::text("notes.md", "notes.md", "md", "# Notes"),
            ExtractedFile::text("notes.md", "notes.md", "md", "# Other"),
            ExtractedFile::text("../escape.txt", "x", "txt", "nope"),
        ];

        let path = sink
            .write("project", &bundle(files, "Project", "https://claude.ai/project/1"))
            .unwrap();

        assert_eq!(fs::read_to_string(path.join("notes.md")).unwrap(), "# Notes");
        assert_eq!(fs::read_to_string(path.join("notes_2.md")).unwrap(), "# Other");
        assert!(path.join("escape.txt").exists());
        assert!(!dir.path().join("escape.txt").exists());

        let metadata = fs::read_to_string(path.join(Bundle::METADATA_FILE)).unwrap();
        assert!(metadata.contains("\"fileCount\": 3"));
    }

    #[test]
    fn test_failed_write_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.md");

        let result = write_document(&target, &ExportDocument::Markdown("x".into()));

        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_safe_component() {
        assert_eq!(safe_component("a/b/c.txt"), "c.txt");
        assert_eq!(safe_component(".."), "Unknown_File");
        assert_eq!(safe_component(""), "Unknown_File");
    }
}
