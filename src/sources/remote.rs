//! Repository files whose content is fetched by an external client.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{CoreError, FileHandle, FileOrigin, Result, SharedHandle};
use crate::utils::file_detection::mime_type_for;

/// Entries of this size or larger are listed without their content.
pub const MAX_REMOTE_CONTENT_SIZE: u64 = 1024 * 1024;

/// One file of a repository listing, as returned by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl RemoteEntry {
    /// Whether the fetcher should download this entry's content.
    pub fn wants_content(&self) -> bool {
        self.size < MAX_REMOTE_CONTENT_SIZE && self.download_url.is_some()
    }
}

/// A repository file held in memory.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    name: String,
    path: String,
    size: u64,
    mime_type: String,
    last_modified: DateTime<Utc>,
    download_url: Option<String>,
    content: Option<String>,
}

impl RemoteFile {
    /// Builds a handle directly; `size` is taken as given.
    pub fn from_parts(path: &str, size: u64, content: Option<String>) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            mime_type: mime_type_for(&name),
            name,
            path: path.to_string(),
            size,
            last_modified: Utc::now(),
            download_url: None,
            content,
        }
    }

    /// A fetched entry; the size becomes the content's byte length.
    pub fn with_content(entry: &RemoteEntry, content: String) -> Self {
        let mut file = Self::from_parts(&entry.path, content.len() as u64, Some(content));
        file.download_url = entry.download_url.clone();
        file
    }

    /// An entry whose content was never fetched.
    pub fn without_content(entry: &RemoteEntry) -> Self {
        let mut file = Self::from_parts(&entry.path, entry.size, None);
        file.download_url = entry.download_url.clone();
        file
    }

    /// Pairs listed entries with whatever content the fetcher obtained.
    ///
    /// Oversized entries never carry content, even if some was supplied.
    pub fn from_entries<I>(entries: I) -> Vec<SharedHandle>
    where
        I: IntoIterator<Item = (RemoteEntry, Option<String>)>,
    {
        entries
            .into_iter()
            .map(|(entry, content)| {
                let file = match content {
                    Some(content) if entry.size < MAX_REMOTE_CONTENT_SIZE => {
                        Self::with_content(&entry, content)
                    }
                    _ => {
                        if entry.wants_content() {
                            tracing::warn!("Could not fetch content for: {}", entry.path);
                        }
                        Self::without_content(&entry)
                    }
                };
                Arc::new(file) as SharedHandle
            })
            .collect()
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

#[async_trait]
impl FileHandle for RemoteFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn relative_path(&self) -> &str {
        &self.path
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
        FileOrigin::Remote
    }

    async fn read_text(&self) -> Result<String> {
        self.content
            .clone()
            .ok_or_else(|| CoreError::ContentUnavailable(self.path.clone()))
    }
}

static URL_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"github\.com/([^/]+)/([^/]+?)(?:\.git)?(?:/.*)?$")
            .expect("valid url regex"),
        Regex::new(r"^([^/]+)/([^/]+)$").expect("valid owner/repo regex"),
    ]
});

/// An `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Accepts repository URLs (with or without scheme, `.git` suffix or a
    /// trailing `/tree/...`) and bare `owner/repo`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        for regex in URL_PATTERNS.iter() {
            if let Some(captures) = regex.captures(input) {
                return Ok(Self {
                    owner: captures[1].to_string(),
                    repo: captures[2].to_string(),
                });
            }
        }
        Err(CoreError::InvalidRepositoryUrl(input.to_string()))
    }

    /// The hosting API's contents endpoint for `path`.
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{}",
            self.owner, self.repo, path
        )
    }
}

impl FromStr for RepositoryRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
