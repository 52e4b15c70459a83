//! Producers of [`FileHandle`](crate::core::FileHandle) lists: a local
//! directory walk and repository listings fetched elsewhere.

pub mod local;
pub mod remote;

pub use local::{LocalFile, LocalSource};
pub use remote::{RemoteEntry, RemoteFile, RepositoryRef, MAX_REMOTE_CONTENT_SIZE};
