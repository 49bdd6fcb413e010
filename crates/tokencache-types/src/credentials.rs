//! In-memory credential container handed from the job client to its tasks.
//!
//! Tokens and secret keys are both keyed by an alias. For tokens the alias
//! is the service name they were issued for.

use std::collections::HashMap;

use crate::token::Token;

/// Collection of delegation tokens and secret keys.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    tokens: HashMap<String, Token>,
    secret_keys: HashMap<String, Vec<u8>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token under `alias`, replacing any token already there.
    pub fn add_token(&mut self, alias: impl Into<String>, token: Token) {
        self.tokens.insert(alias.into(), token);
    }

    pub fn get_token(&self, alias: &str) -> Option<&Token> {
        self.tokens.get(alias)
    }

    /// All tokens, in no particular order.
    pub fn all_tokens(&self) -> Vec<&Token> {
        self.tokens.values().collect()
    }

    pub fn number_of_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn add_secret_key(&mut self, alias: impl Into<String>, key: Vec<u8>) {
        self.secret_keys.insert(alias.into(), key);
    }

    pub fn get_secret_key(&self, alias: &str) -> Option<&[u8]> {
        self.secret_keys.get(alias).map(Vec::as_slice)
    }

    pub fn number_of_secret_keys(&self) -> usize {
        self.secret_keys.len()
    }

    /// Copy everything from `other`, overwriting entries with the same alias.
    pub fn add_all(&mut self, other: &Credentials) {
        self.add_all_inner(other, true);
    }

    /// Copy everything from `other`, keeping existing entries on conflict.
    pub fn merge_all(&mut self, other: &Credentials) {
        self.add_all_inner(other, false);
    }

    fn add_all_inner(&mut self, other: &Credentials, overwrite: bool) {
        for (alias, key) in &other.secret_keys {
            if overwrite || !self.secret_keys.contains_key(alias) {
                self.secret_keys.insert(alias.clone(), key.clone());
            }
        }
        for (alias, token) in &other.tokens {
            if overwrite || !self.tokens.contains_key(alias) {
                self.tokens.insert(alias.clone(), token.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(service: &str, payload: &str) -> Token {
        Token::new("HDFS_DELEGATION_TOKEN", service, payload)
    }

    #[test]
    fn test_add_and_get_token() {
        let mut creds = Credentials::new();
        assert_eq!(creds.number_of_tokens(), 0);

        creds.add_token("nn1:8020", token("nn1:8020", "a"));
        creds.add_token("nn2:8020", token("nn2:8020", "b"));
        assert_eq!(creds.number_of_tokens(), 2);
        assert_eq!(creds.get_token("nn1:8020").unwrap().encoded(), "a");
        assert!(creds.get_token("nn3:8020").is_none());

        // Same alias replaces
        creds.add_token("nn1:8020", token("nn1:8020", "c"));
        assert_eq!(creds.number_of_tokens(), 2);
        assert_eq!(creds.get_token("nn1:8020").unwrap().encoded(), "c");
    }

    #[test]
    fn test_secret_keys() {
        let mut creds = Credentials::new();
        creds.add_secret_key("job.key", vec![1, 2, 3]);
        assert_eq!(creds.get_secret_key("job.key"), Some(&[1u8, 2, 3][..]));
        assert_eq!(creds.number_of_secret_keys(), 1);
        assert!(creds.get_secret_key("missing").is_none());
    }

    #[test]
    fn test_add_all_overwrites() {
        let mut a = Credentials::new();
        a.add_token("nn1:8020", token("nn1:8020", "old"));
        a.add_secret_key("k", vec![0]);

        let mut b = Credentials::new();
        b.add_token("nn1:8020", token("nn1:8020", "new"));
        b.add_token("nn2:8020", token("nn2:8020", "x"));
        b.add_secret_key("k", vec![9]);

        a.add_all(&b);
        assert_eq!(a.number_of_tokens(), 2);
        assert_eq!(a.get_token("nn1:8020").unwrap().encoded(), "new");
        assert_eq!(a.get_secret_key("k"), Some(&[9u8][..]));
    }

    #[test]
    fn test_merge_all_keeps_existing() {
        let mut a = Credentials::new();
        a.add_token("nn1:8020", token("nn1:8020", "old"));
        a.add_secret_key("k", vec![0]);

        let mut b = Credentials::new();
        b.add_token("nn1:8020", token("nn1:8020", "new"));
        b.add_token("nn2:8020", token("nn2:8020", "x"));
        b.add_secret_key("k", vec![9]);

        a.merge_all(&b);
        assert_eq!(a.number_of_tokens(), 2);
        assert_eq!(a.get_token("nn1:8020").unwrap().encoded(), "old");
        assert_eq!(a.get_token("nn2:8020").unwrap().encoded(), "x");
        assert_eq!(a.get_secret_key("k"), Some(&[0u8][..]));
    }
}
