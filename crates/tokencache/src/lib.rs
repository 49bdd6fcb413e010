//! Collect delegation tokens for the filesystems behind a batch of paths.
//!
//! A job client calls [`obtain_tokens_for_namenodes`] before submission so
//! that its tasks can reach the same storage with the client's permissions:
//!
//! ```rust,ignore
//! use tokencache::{obtain_tokens_for_namenodes, Configuration, Credentials, FsPath};
//!
//! let conf = Configuration::from_pairs([("fs.defaultFS", "hdfs://nn1:8020")]);
//! let paths = vec![FsPath::parse("/user/alice/input")?, FsPath::parse("hdfs://nn2/out")?];
//! let mut credentials = Credentials::new();
//! obtain_tokens_for_namenodes(&mut credentials, &paths, &conf, "yarn")?;
//! ```

pub mod logging;
pub mod token_cache;

pub use token_cache::{
    obtain_tokens_for_file_system, obtain_tokens_for_namenodes, obtain_tokens_for_namenodes_with,
};
pub use tokencache_config::Configuration;
pub use tokencache_io::fs::FileSystem;
pub use tokencache_io::path::{FsKey, FsPath};
pub use tokencache_io::registry::{global_registry, FileSystemRegistry};
pub use tokencache_types::credentials::Credentials;
pub use tokencache_types::error::{Result, TokenCacheError};
pub use tokencache_types::token::Token;
