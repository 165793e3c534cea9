use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const IDENTITY_LEN: usize = 12;

// Content-derived key used to address stored content and build shareable routes.
// An empty identity means "nothing saved yet".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Identity(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identity: {0:?}")]
pub struct InvalidIdentity(pub String);

impl Identity {
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self(digest[..IDENTITY_LEN].to_string())
    }

    pub fn parse(s: &str) -> Result<Self, InvalidIdentity> {
        if s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidIdentity(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
