//! Filesystem paths and the key that identifies their filesystem.

use std::fmt;
use std::str::FromStr;

use tokencache_config::Configuration;
use tokencache_types::error::{Result, TokenCacheError};

/// A path of the form `scheme://authority/path`, `scheme:/path` or `/path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsPath {
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
}

fn is_valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}

/// Split what follows `//` into the authority and the path (`/` if empty).
fn split_authority(after: &str) -> (Option<String>, &str) {
    let (auth, path) = match after.find('/') {
        Some(i) => (&after[..i], &after[i..]),
        None => (after, "/"),
    };
    ((!auth.is_empty()).then(|| auth.to_string()), path)
}

impl FsPath {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TokenCacheError::InvalidPath(
                "Can not create a path from an empty string".to_string(),
            ));
        }

        // A scheme only counts if its colon comes before the first slash.
        let colon = s.find(':').filter(|&i| match s.find('/') {
            Some(slash) => i < slash,
            None => true,
        });
        let Some(colon) = colon else {
            // `//host/path` names an authority without a scheme.
            let (authority, path) = match s.strip_prefix("//") {
                Some(after) => split_authority(after),
                None => (None, s),
            };
            return Ok(FsPath {
                scheme: None,
                authority,
                path: path.to_string(),
            });
        };

        let scheme = &s[..colon];
        if !is_valid_scheme(scheme) {
            return Err(TokenCacheError::InvalidPath(format!(
                "Invalid scheme in {}",
                s
            )));
        }
        let rest = &s[colon + 1..];

        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => split_authority(after),
            None => (None, rest),
        };
        let path = if path.is_empty() { "/" } else { path };

        Ok(FsPath {
            scheme: Some(scheme.to_string()),
            authority,
            path: path.to_string(),
        })
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl FromStr for FsPath {
    type Err = TokenCacheError;

    fn from_str(s: &str) -> Result<Self> {
        FsPath::parse(s)
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}:", scheme)?;
        }
        if let Some(authority) = &self.authority {
            write!(f, "//{}", authority)?;
        }
        write!(f, "{}", self.path)
    }
}

/// Identity of a filesystem: lower-cased scheme plus lower-cased authority.
///
/// Two paths whose keys compare equal are served by the same filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FsKey {
    scheme: String,
    authority: Option<String>,
}

impl FsKey {
    pub fn new(scheme: &str, authority: Option<&str>) -> Self {
        FsKey {
            scheme: scheme.to_ascii_lowercase(),
            authority: authority
                .filter(|a| !a.is_empty())
                .map(str::to_ascii_lowercase),
        }
    }

    /// Key of the filesystem that owns `path`.
    ///
    /// Paths without a scheme belong to `fs.defaultFS`; a scheme-less
    /// `//host/path` keeps its own authority under the default scheme.
    /// Paths with a scheme but no authority borrow the default filesystem's
    /// authority when the schemes match.
    pub fn for_path(path: &FsPath, conf: &Configuration) -> Result<Self> {
        match (path.scheme(), path.authority()) {
            (Some(scheme), Some(authority)) => Ok(FsKey::new(scheme, Some(authority))),
            (scheme, authority) => {
                let default = FsPath::parse(conf.default_fs())?;
                let default_scheme = default.scheme().ok_or_else(|| {
                    TokenCacheError::InvalidPath(format!(
                        "Default filesystem {} has no scheme",
                        conf.default_fs()
                    ))
                })?;
                match (scheme, authority) {
                    (None, Some(authority)) => Ok(FsKey::new(default_scheme, Some(authority))),
                    (Some(s), _) if !s.eq_ignore_ascii_case(default_scheme) => {
                        Ok(FsKey::new(s, None))
                    }
                    _ => Ok(FsKey::new(default_scheme, default.authority())),
                }
            }
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }
}

impl fmt::Display for FsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.authority {
            Some(authority) => write!(f, "{}://{}", self.scheme, authority),
            None => write!(f, "{}:///", self.scheme),
        }
    }
}

/// Split `host[:port]`. The port is `None` when absent. IPv6 hosts must be
/// bracketed (`[::1]:8020`) and keep their brackets.
pub fn split_host_port(authority: &str) -> Result<(&str, Option<u16>)> {
    if authority.starts_with('[') {
        let end = authority.find(']').ok_or_else(|| {
            TokenCacheError::InvalidPath(format!("Unclosed IPv6 host in authority {}", authority))
        })?;
        let (host, rest) = authority.split_at(end + 1);
        return match rest.strip_prefix(':') {
            Some(port) => {
                let port = port.parse::<u16>().map_err(|_| {
                    TokenCacheError::InvalidPath(format!("Invalid port in authority {}", authority))
                })?;
                Ok((host, Some(port)))
            }
            None if rest.is_empty() => Ok((host, None)),
            None => Err(TokenCacheError::InvalidPath(format!(
                "Unexpected characters after IPv6 host in authority {}",
                authority
            ))),
        };
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                TokenCacheError::InvalidPath(format!("Invalid port in authority {}", authority))
            })?;
            Ok((host, Some(port)))
        }
        None => Ok((authority, None)),
    }
}
