//! Files collected from a directory on disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;

use crate::core::{CoreError, FileHandle, FileOrigin, Result, SharedHandle};
use crate::utils::file_detection::mime_type_for;

/// A file on the local filesystem.
///
/// The relative path starts with the name of the folder that was collected,
/// the way a folder picker reports it: collecting `~/code/app` yields paths
/// such as `app/src/main.rs`.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    relative_path: String,
    size: u64,
    last_modified: DateTime<Utc>,
    mime_type: String,
}

impl LocalFile {
    /// Builds a handle for `path`, reading its metadata now.
    pub fn from_path(path: &Path, relative_path: impl Into<String>) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        let relative_path = relative_path.into();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        Ok(Self {
            path: path.to_path_buf(),
            mime_type: mime_type_for(&name),
            name,
            relative_path,
            size: metadata.len(),
            last_modified,
        })
    }

    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn origin(&self) -> FileOrigin {
        FileOrigin::Local
    }

    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    async fn read_text(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CoreError::Read {
                path: self.relative_path.clone(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Walks a directory and produces one [`LocalFile`] per regular file,
/// sorted by name within each directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    respect_gitignore: bool,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: false,
        }
    }

    /// Also skip whatever `.gitignore`/`.ignore` files exclude.
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Collects handles on the blocking pool.
    pub async fn collect(self) -> Result<Vec<SharedHandle>> {
        tokio::task::spawn_blocking(move || self.collect_blocking()).await?
    }

    pub fn collect_blocking(&self) -> Result<Vec<SharedHandle>> {
        let canonical = std::fs::canonicalize(&self.root).map_err(|e| CoreError::Io(e, self.root.clone()))?;
        if !canonical.is_dir() {
            return Err(CoreError::Io(
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
                self.root.clone(),
            ));
        }
        let root = Utf8PathBuf::from_path_buf(canonical).map_err(|path| {
            CoreError::Io(
                io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
                path,
            )
        })?;
        let root_name = root.file_name().unwrap_or("").to_string();

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(self.respect_gitignore)
            .hidden(false)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut handles: Vec<SharedHandle> = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth().is_some_and(|depth| depth > 0) => {
                    tracing::warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!("Skipping non UTF-8 path {:?}", entry.path());
                continue;
            };
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };

            let relative_path = Self::slash_path(&root_name, relative);
            match LocalFile::from_path(path.as_std_path(), relative_path) {
                Ok(file) => handles.push(Arc::new(file)),
                Err(e) => tracing::warn!("Skipping {}: {}", path, e),
            }
        }

        tracing::info!("📂 Collected {} files from {}", handles.len(), root);
        Ok(handles)
    }

    fn slash_path(root_name: &str, relative: &Utf8Path) -> String {
        let mut segments: Vec<&str> = Vec::new();
        if !root_name.is_empty() {
            segments.push(root_name);
        }
        segments.extend(relative.components().map(|c| c.as_str()));
        segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::running_as_root;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_collects_sorted_slash_paths_under_root_name() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("project");
        write(&root, "src/main.rs", "fn main() {}\n");
        write(&root, "src/lib.rs", "");
        write(&root, "README.md", "# project\n");

        let handles = LocalSource::new(&root).collect().await.unwrap();
        let paths: Vec<&str> = handles.iter().map(|h| h.relative_path()).collect();

        assert_eq!(
            paths,
            vec!["project/README.md", "project/src/lib.rs", "project/src/main.rs"]
        );
        assert_eq!(handles[2].name(), "main.rs");
        assert_eq!(handles[2].origin(), FileOrigin::Local);
        assert_eq!(handles[2].size(), 13);
    }

    #[tokio::test]
    async fn test_gitignore_is_optional() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("repo");
        write(&root, ".gitignore", "generated/\n");
        write(&root, "generated/out.txt", "x");
        write(&root, "keep.txt", "y");

        let all = LocalSource::new(&root).collect().await.unwrap();
        assert!(all.iter().any(|h| h.relative_path() == "repo/generated/out.txt"));

        let filtered = LocalSource::new(&root)
            .respect_gitignore(true)
            .collect()
            .await
            .unwrap();
        assert!(!filtered.iter().any(|h| h.relative_path() == "repo/generated/out.txt"));
        assert!(filtered.iter().any(|h| h.relative_path() == "repo/keep.txt"));
    }

    #[tokio::test]
    async fn test_read_text_decodes_lossily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.txt");
        fs::write(&path, [b'o', b'k', 0xff, b'\n']).unwrap();

        let file = LocalFile::from_path(&path, "d/mixed.txt").unwrap();
        assert_eq!(file.read_text().await.unwrap(), "ok\u{FFFD}\n");
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = LocalSource::new(dir.path().join("absent")).collect().await;
        assert!(matches!(result, Err(CoreError::Io(_, _))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_fails_per_file() {
        use std::os::unix::fs::PermissionsExt;

        if running_as_root() {
            return;
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.rs");
        fs::write(&path, "let x = 1;").unwrap();
        let file = LocalFile::from_path(&path, "d/secret.rs").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let err = file.read_text().await.unwrap_err();
        assert!(err.is_per_file());
        assert!(err.to_string().contains("d/secret.rs"));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
