//! Configuration for filesystem resolution and token collection.
//!
//! Two layers live here:
//!
//! - [`Configuration`]: a string key/value map passed to every resolution
//!   call, in the Hadoop `core-site` style (`fs.defaultFS`,
//!   `fs.<scheme>.impl.disable.cache`, ...).
//! - Process globals, initialized from environment variables on first
//!   access and overridable at runtime via setter functions.
//!
//! # Environment variables
//!
//! - `TOKENCACHE_HTTP_TIMEOUT`: timeout applied to each token request made
//!   over HTTP. Accepts a plain number of seconds or a `ms`/`s`/`m` suffix.
//!   Default: 30s.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::time::Duration;

use tokencache_types::error::{Result, TokenCacheError};

/// Key naming the filesystem that qualifies scheme-less paths.
pub const FS_DEFAULT_NAME_KEY: &str = "fs.defaultFS";

/// Value of [`FS_DEFAULT_NAME_KEY`] when the configuration does not set it.
pub const FS_DEFAULT_NAME_DEFAULT: &str = "file:///";

/// Key carrying the user name sent along with token requests.
pub const USER_NAME_KEY: &str = "hadoop.user.name";

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

// ---------------------------------------------------------------------------
// Atomic globals
// ---------------------------------------------------------------------------

static HTTP_TIMEOUT_MS: AtomicU64 = AtomicU64::new(DEFAULT_HTTP_TIMEOUT_MS);

static INIT: Once = Once::new();

/// Ensure environment variable overrides are applied (idempotent).
fn ensure_init() {
    INIT.call_once(|| {
        if let Ok(val) = std::env::var("TOKENCACHE_HTTP_TIMEOUT") {
            if let Ok(d) = parse_duration(&val) {
                HTTP_TIMEOUT_MS.store(duration_to_millis(d), Ordering::Relaxed);
            }
        }
    });
}

/// Parse a duration string. Supports plain integers (seconds) and the
/// suffixes `ms`, `s` and `m` (case-insensitive).
fn parse_duration(s: &str) -> std::result::Result<Duration, ()> {
    let s = s.trim().to_ascii_lowercase();
    let (num_str, millis) = if let Some(n) = s.strip_suffix("ms") {
        (n.trim(), 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n.trim(), 1000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n.trim(), 60 * 1000)
    } else {
        (s.as_str(), 1000)
    };
    let n = num_str.parse::<u64>().map_err(|_| ())?;
    n.checked_mul(millis).map(Duration::from_millis).ok_or(())
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
fn duration_to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Timeout applied to each HTTP token request.
pub fn get_http_timeout() -> Duration {
    ensure_init();
    Duration::from_millis(HTTP_TIMEOUT_MS.load(Ordering::Relaxed))
}

/// Set the timeout applied to each HTTP token request.
pub fn set_http_timeout(timeout: Duration) {
    ensure_init();
    HTTP_TIMEOUT_MS.store(duration_to_millis(timeout), Ordering::Relaxed);
}

/// String key/value configuration consulted when resolving paths.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    props: HashMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `(key, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut conf = Configuration::new();
        for (k, v) in pairs {
            conf.set(k, v);
        }
        conf
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) {
        self.props.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Boolean value; anything but `true`/`false` (case-insensitive) yields
    /// `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            _ => default,
        }
    }

    /// Port-sized integer value; unparsable values yield `default`.
    pub fn get_u16(&self, key: &str, default: u16) -> u16 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// The default filesystem URI, `file:///` unless configured.
    pub fn default_fs(&self) -> &str {
        self.get_or(FS_DEFAULT_NAME_KEY, FS_DEFAULT_NAME_DEFAULT)
    }

    /// Whether filesystems of `scheme` bypass the shared instance cache.
    pub fn is_cache_disabled(&self, scheme: &str) -> bool {
        self.get_bool(&format!("fs.{}.impl.disable.cache", scheme), false)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Parse `key=value` lines. Blank lines and `#` comments are skipped;
    /// later keys override earlier ones.
    pub fn parse_properties(&mut self, content: &str) -> Result<()> {
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                TokenCacheError::Format(format!(
                    "Expected key=value on line {}: {}",
                    lineno + 1,
                    line
                ))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(TokenCacheError::Format(format!(
                    "Empty key on line {}",
                    lineno + 1
                )));
            }
            self.set(key, value.trim());
        }
        Ok(())
    }

    /// Load a properties file on top of the current values.
    pub fn load_properties(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.parse_properties(&content)
    }
}
