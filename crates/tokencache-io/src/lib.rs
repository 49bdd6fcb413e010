//! Path resolution and filesystem backends.
//!
//! Every filesystem that can hand out delegation tokens implements
//! [`fs::FileSystem`]. Paths are turned into filesystem handles by the
//! [`registry::FileSystemRegistry`], which caches one handle per
//! scheme + authority.
//!
//! Backends:
//! - `file://` ([`local_fs::LocalFileSystem`]), never issues tokens
//! - `hdfs://`, `webhdfs://`, `swebhdfs://` over the WebHDFS REST API
//!   (`hdfs` feature)

pub mod fs;
pub mod hdfs_fs;
pub mod local_fs;
pub mod path;
pub mod registry;
