//! Local filesystem backend. Local files need no delegation tokens.

use tokencache_types::error::Result;
use tokencache_types::token::Token;

use crate::fs::FileSystem;
use crate::path::FsKey;

/// The `file://` filesystem.
pub struct LocalFileSystem {
    key: FsKey,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        LocalFileSystem {
            key: FsKey::new("file", None),
        }
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFileSystem {
    fn key(&self) -> &FsKey {
        &self.key
    }

    fn canonical_service_name(&self) -> Option<String> {
        None
    }

    fn get_delegation_token(&self, _renewer: &str) -> Result<Option<Token>> {
        Ok(None)
    }
}
