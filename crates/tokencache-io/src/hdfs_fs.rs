//! HDFS delegation tokens over the WebHDFS REST API.
//!
//! Enable with the `hdfs` feature flag (on by default).
//!
//! Tokens are requested with
//! `GET <namenode-http>/webhdfs/v1/?op=GETDELEGATIONTOKEN&renewer=<renewer>`,
//! which answers `{"Token": {"urlString": "..."}}`, or `{"Token": null}`
//! when security is off.
//!
//! | scheme      | endpoint                                      | token kind              | service      |
//! |-------------|-----------------------------------------------|-------------------------|--------------|
//! | `webhdfs`   | `http://host:port` (default 9870)             | `WEBHDFS delegation`    | `host:port`  |
//! | `swebhdfs`  | `https://host:port` (default 9871)            | `SWEBHDFS delegation`   | `host:port`  |
//! | `hdfs`      | `http://host:<dfs.namenode.http-port>` (9870) | `HDFS_DELEGATION_TOKEN` | `host:rpc` (default rpc 8020) |

#[cfg(feature = "hdfs")]
mod inner {
    use std::io::Read;

    use serde::Deserialize;
    use tokencache_config::{Configuration, USER_NAME_KEY};
    use tokencache_types::error::{Result, TokenCacheError};
    use tokencache_types::token::Token;
    use tracing::debug;

    use crate::fs::FileSystem;
    use crate::path::{split_host_port, FsKey};

    pub const HDFS_TOKEN_KIND: &str = "HDFS_DELEGATION_TOKEN";
    pub const WEBHDFS_TOKEN_KIND: &str = "WEBHDFS delegation";
    pub const SWEBHDFS_TOKEN_KIND: &str = "SWEBHDFS delegation";

    /// Key overriding the NameNode HTTP port used for `hdfs://` paths.
    pub const NAMENODE_HTTP_PORT_KEY: &str = "dfs.namenode.http-port";

    const DEFAULT_RPC_PORT: u16 = 8020;
    const DEFAULT_HTTP_PORT: u16 = 9870;
    const DEFAULT_HTTPS_PORT: u16 = 9871;

    /// Where and how to ask a NameNode for tokens.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct WebHdfsConfig {
        /// NameNode HTTP(S) base URL, e.g. `http://namenode:9870`.
        pub base_url: String,
        /// Kind stamped on issued tokens.
        pub token_kind: String,
        /// Service issued tokens are stored under.
        pub service: String,
        /// Sent as `user.name` when set.
        pub user: Option<String>,
    }

    impl WebHdfsConfig {
        pub fn from_key(key: &FsKey, conf: &Configuration) -> Result<Self> {
            let authority = key.authority().ok_or_else(|| {
                TokenCacheError::InvalidPath(format!("{} has no NameNode authority", key))
            })?;
            let (host, port) = split_host_port(authority)?;
            if host.is_empty() {
                return Err(TokenCacheError::InvalidPath(format!(
                    "{} has an empty host",
                    key
                )));
            }

            let (base_url, token_kind, service) = match key.scheme() {
                "webhdfs" => {
                    let port = port.unwrap_or(DEFAULT_HTTP_PORT);
                    (
                        format!("http://{}:{}", host, port),
                        WEBHDFS_TOKEN_KIND,
                        format!("{}:{}", host, port),
                    )
                }
                "swebhdfs" => {
                    let port = port.unwrap_or(DEFAULT_HTTPS_PORT);
                    (
                        format!("https://{}:{}", host, port),
                        SWEBHDFS_TOKEN_KIND,
                        format!("{}:{}", host, port),
                    )
                }
                "hdfs" => {
                    let rpc_port = port.unwrap_or(DEFAULT_RPC_PORT);
                    let http_port = conf.get_u16(NAMENODE_HTTP_PORT_KEY, DEFAULT_HTTP_PORT);
                    (
                        format!("http://{}:{}", host, http_port),
                        HDFS_TOKEN_KIND,
                        format!("{}:{}", host, rpc_port),
                    )
                }
                other => return Err(TokenCacheError::UnsupportedScheme(other.to_string())),
            };

            Ok(WebHdfsConfig {
                base_url,
                token_kind: token_kind.to_string(),
                service,
                user: conf.get(USER_NAME_KEY).map(str::to_string),
            })
        }

        /// URL of the GETDELEGATIONTOKEN call for `renewer`.
        pub fn token_request_url(&self, renewer: &str) -> String {
            let mut url = format!(
                "{}/webhdfs/v1/?op=GETDELEGATIONTOKEN&renewer={}",
                self.base_url,
                urlencoding::encode(renewer)
            );
            if let Some(user) = &self.user {
                url.push_str("&user.name=");
                url.push_str(&urlencoding::encode(user));
            }
            url
        }

        /// Turn a GETDELEGATIONTOKEN response body into a token.
        pub fn parse_token_response(&self, body: &str) -> Result<Option<Token>> {
            let response: TokenResponse = serde_json::from_str(body).map_err(|e| {
                TokenCacheError::Format(format!("Malformed GETDELEGATIONTOKEN response: {}", e))
            })?;
            Ok(response.token.map(|t| {
                Token::new(self.token_kind.clone(), self.service.clone(), t.url_string)
            }))
        }
    }

    #[derive(Deserialize)]
    struct TokenResponse {
        #[serde(rename = "Token")]
        token: Option<UrlToken>,
    }

    #[derive(Deserialize)]
    struct UrlToken {
        #[serde(rename = "urlString")]
        url_string: String,
    }

    /// HDFS NameNode reached over WebHDFS.
    pub struct WebHdfsFileSystem {
        key: FsKey,
        config: WebHdfsConfig,
        agent: ureq::Agent,
    }

    impl WebHdfsFileSystem {
        pub fn new(key: &FsKey, conf: &Configuration) -> Result<Self> {
            let config = WebHdfsConfig::from_key(key, conf)?;
            let agent: ureq::Agent = ureq::Agent::config_builder()
                .timeout_global(Some(tokencache_config::get_http_timeout()))
                .build()
                .into();
            Ok(WebHdfsFileSystem {
                key: key.clone(),
                config,
                agent,
            })
        }

        pub fn config(&self) -> &WebHdfsConfig {
            &self.config
        }
    }

    impl FileSystem for WebHdfsFileSystem {
        fn key(&self) -> &FsKey {
            &self.key
        }

        fn canonical_service_name(&self) -> Option<String> {
            Some(self.config.service.clone())
        }

        fn get_delegation_token(&self, renewer: &str) -> Result<Option<Token>> {
            let url = self.config.token_request_url(renewer);
            debug!(fs = %self.key, renewer, "requesting delegation token");

            let body = self
                .agent
                .get(&url)
                .call()
                .map_err(|e| {
                    TokenCacheError::Http(format!(
                        "GETDELEGATIONTOKEN on {} failed: {}",
                        self.key, e
                    ))
                })?
                .into_body();

            let mut content = String::new();
            body.into_reader().read_to_string(&mut content)?;

            self.config.parse_token_response(&content)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn key(s: &str) -> FsKey {
            let (scheme, authority) = s.split_once("://").unwrap();
            FsKey::new(scheme, Some(authority))
        }

        #[test]
        fn test_config_for_webhdfs() {
            let cfg = WebHdfsConfig::from_key(&key("webhdfs://nn1"), &Configuration::new()).unwrap();
            assert_eq!(cfg.base_url, "http://nn1:9870");
            assert_eq!(cfg.token_kind, "WEBHDFS delegation");
            assert_eq!(cfg.service, "nn1:9870");
            assert_eq!(cfg.user, None);

            let cfg =
                WebHdfsConfig::from_key(&key("swebhdfs://nn1:443"), &Configuration::new()).unwrap();
            assert_eq!(cfg.base_url, "https://nn1:443");
            assert_eq!(cfg.token_kind, "SWEBHDFS delegation");
            assert_eq!(cfg.service, "nn1:443");
        }

        #[test]
        fn test_config_for_hdfs() {
            let conf = Configuration::from_pairs([
                ("dfs.namenode.http-port", "50070"),
                ("hadoop.user.name", "alice"),
            ]);
            let cfg = WebHdfsConfig::from_key(&key("hdfs://nn1:9000"), &conf).unwrap();
            assert_eq!(cfg.base_url, "http://nn1:50070");
            assert_eq!(cfg.token_kind, "HDFS_DELEGATION_TOKEN");
            assert_eq!(cfg.service, "nn1:9000");
            assert_eq!(cfg.user.as_deref(), Some("alice"));

            let cfg = WebHdfsConfig::from_key(&key("hdfs://nn1"), &Configuration::new()).unwrap();
            assert_eq!(cfg.base_url, "http://nn1:9870");
            assert_eq!(cfg.service, "nn1:8020");
        }

        #[test]
        fn test_config_errors() {
            let conf = Configuration::new();
            assert!(WebHdfsConfig::from_key(&FsKey::new("hdfs", None), &conf).is_err());
            assert!(WebHdfsConfig::from_key(&key("hdfs://nn1:rpc"), &conf).is_err());
            assert!(WebHdfsConfig::from_key(&key("hdfs://:8020"), &conf).is_err());
            assert!(matches!(
                WebHdfsConfig::from_key(&key("s3a://bucket"), &conf),
                Err(TokenCacheError::UnsupportedScheme(_))
            ));
        }

        #[test]
        fn test_token_request_url() {
            let mut cfg =
                WebHdfsConfig::from_key(&key("webhdfs://nn1:9870"), &Configuration::new()).unwrap();
            assert_eq!(
                cfg.token_request_url("yarn"),
                "http://nn1:9870/webhdfs/v1/?op=GETDELEGATIONTOKEN&renewer=yarn"
            );

            cfg.user = Some("alice".to_string());
            assert_eq!(
                cfg.token_request_url("rm/host@REALM"),
                "http://nn1:9870/webhdfs/v1/?op=GETDELEGATIONTOKEN\
                 &renewer=rm%2Fhost%40REALM&user.name=alice"
            );
        }

        #[test]
        fn test_parse_token_response() {
            let cfg = WebHdfsConfig::from_key(&key("hdfs://nn1:8020"), &Configuration::new()).unwrap();

            let token = cfg
                .parse_token_response(r#"{"Token":{"urlString":"JQAIaG9ydG9ud29ya3MAAAA"}}"#)
                .unwrap()
                .unwrap();
            assert_eq!(token.kind(), "HDFS_DELEGATION_TOKEN");
            assert_eq!(token.service(), "nn1:8020");
            assert_eq!(token.encoded(), "JQAIaG9ydG9ud29ya3MAAAA");

            assert!(cfg.parse_token_response(r#"{"Token":null}"#).unwrap().is_none());

            let err = cfg.parse_token_response("<html>").unwrap_err();
            assert!(matches!(err, TokenCacheError::Format(_)));
        }

        #[test]
        fn test_unreachable_namenode_is_io_failure() {
            // Port 1 on localhost refuses connections.
            let fs = WebHdfsFileSystem::new(&key("webhdfs://127.0.0.1:1"), &Configuration::new())
                .unwrap();
            assert_eq!(fs.canonical_service_name().as_deref(), Some("127.0.0.1:1"));
            let err = fs.get_delegation_token("yarn").unwrap_err();
            assert!(matches!(err, TokenCacheError::Http(_)));
            assert!(err.is_io_failure());
        }
    }
}

#[cfg(feature = "hdfs")]
pub use inner::{
    WebHdfsConfig, WebHdfsFileSystem, HDFS_TOKEN_KIND, NAMENODE_HTTP_PORT_KEY,
    SWEBHDFS_TOKEN_KIND, WEBHDFS_TOKEN_KIND,
};
