//! The filesystem abstraction token collection works against.

use std::sync::Arc;

use tokencache_types::credentials::Credentials;
use tokencache_types::error::Result;
use tokencache_types::token::Token;
use tracing::debug;

use crate::path::FsKey;

/// A filesystem that may issue delegation tokens.
pub trait FileSystem: Send + Sync {
    /// Identity used to deduplicate and cache filesystems.
    fn key(&self) -> &FsKey;

    /// URI identifying this filesystem in log output.
    fn uri(&self) -> String {
        self.key().to_string()
    }

    /// Service name tokens from this filesystem are stored under.
    ///
    /// `None` means the filesystem does not issue delegation tokens.
    fn canonical_service_name(&self) -> Option<String>;

    /// Ask the backend for a new delegation token renewable by `renewer`.
    ///
    /// `Ok(None)` means the backend has tokens disabled.
    fn get_delegation_token(&self, renewer: &str) -> Result<Option<Token>>;

    /// Filesystems this one is composed of, whose tokens are collected too.
    fn child_file_systems(&self) -> Vec<Arc<dyn FileSystem>> {
        Vec::new()
    }

    /// Obtain tokens for this filesystem and its children, add them to
    /// `credentials` and return the ones that were newly obtained.
    ///
    /// Services that already have a token in `credentials` are skipped.
    fn add_delegation_tokens(
        &self,
        renewer: &str,
        credentials: &mut Credentials,
    ) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        collect_delegation_tokens(self, renewer, credentials, &mut tokens)?;
        Ok(tokens)
    }
}

/// Depth-first token collection over `fs` and its children.
pub fn collect_delegation_tokens<F: FileSystem + ?Sized>(
    fs: &F,
    renewer: &str,
    credentials: &mut Credentials,
    tokens: &mut Vec<Token>,
) -> Result<()> {
    if let Some(service) = fs.canonical_service_name() {
        if credentials.get_token(&service).is_some() {
            debug!(service = %service, "token already present, skipping");
        } else if let Some(token) = fs.get_delegation_token(renewer)? {
            credentials.add_token(service, token.clone());
            tokens.push(token);
        }
    }
    for child in fs.child_file_systems() {
        collect_delegation_tokens(child.as_ref(), renewer, credentials, tokens)?;
    }
    Ok(())
}
