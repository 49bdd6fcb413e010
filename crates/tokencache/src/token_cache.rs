//! Obtain delegation tokens for every distinct filesystem behind a set of
//! paths and merge them into one [`Credentials`].
//!
//! Each filesystem is asked once, no matter how many paths point at it.
//! Filesystems are processed in the order their first path appears. The
//! first failure stops the run; tokens merged before it stay in the
//! credentials.

use std::collections::HashSet;
use std::sync::Arc;

use tokencache_config::Configuration;
use tokencache_io::fs::FileSystem;
use tokencache_io::path::FsPath;
use tokencache_io::registry::{global_registry, FileSystemRegistry};
use tokencache_types::credentials::Credentials;
use tokencache_types::error::Result;
use tracing::info;

/// Obtain delegation tokens from the filesystems owning `paths`, resolved
/// through the global registry, and add them to `credentials`.
pub fn obtain_tokens_for_namenodes(
    credentials: &mut Credentials,
    paths: &[FsPath],
    conf: &Configuration,
    renewer: &str,
) -> Result<()> {
    obtain_tokens_for_namenodes_with(global_registry(), credentials, paths, conf, renewer)
}

/// Same as [`obtain_tokens_for_namenodes`] with an explicit registry.
pub fn obtain_tokens_for_namenodes_with(
    registry: &FileSystemRegistry,
    credentials: &mut Credentials,
    paths: &[FsPath],
    conf: &Configuration,
    renewer: &str,
) -> Result<()> {
    // Every path is resolved before any token is requested.
    let mut seen = HashSet::new();
    let mut file_systems: Vec<Arc<dyn FileSystem>> = Vec::new();
    for path in paths {
        let fs = registry.get(path, conf)?;
        if seen.insert(fs.key().clone()) {
            file_systems.push(fs);
        }
    }

    for fs in &file_systems {
        obtain_tokens_for_file_system(fs.as_ref(), credentials, renewer)?;
    }
    Ok(())
}

/// Obtain delegation tokens from a single filesystem.
pub fn obtain_tokens_for_file_system(
    fs: &dyn FileSystem,
    credentials: &mut Credentials,
    renewer: &str,
) -> Result<()> {
    let tokens = fs.add_delegation_tokens(renewer, credentials)?;
    for token in &tokens {
        info!("Got dt for {}; {}", fs.uri(), token);
    }
    Ok(())
}
