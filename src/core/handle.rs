//! The file-handle abstraction every pipeline input goes through.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;

/// Where a handle's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Local,
    Remote,
}

/// Metadata plus an asynchronous text-read capability.
///
/// `relative_path` is root-relative and always uses `/` as the separator,
/// whatever the origin.
#[async_trait]
pub trait FileHandle: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn relative_path(&self) -> &str;
    fn size(&self) -> u64;
    fn last_modified(&self) -> DateTime<Utc>;
    fn mime_type(&self) -> &str;
    fn origin(&self) -> FileOrigin;

    /// Produces the full decoded text content.
    async fn read_text(&self) -> Result<String>;
}

/// A handle shared between the coordinating task and read workers.
pub type SharedHandle = Arc<dyn FileHandle>;
