// ABOUTME: Validated source-control commit hash.
// ABOUTME: Rejects empty or non-hex values before they are interpolated into request URLs.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitHashError {
    #[error("commit hash cannot be empty")]
    Empty,

    #[error("commit hash exceeds maximum length of 64 characters")]
    TooLong,

    #[error("invalid character in commit hash: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn new(value: &str) -> Result<Self, CommitHashError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CommitHashError::Empty);
        }

        // SHA-1 and SHA-256 object names
        if trimmed.len() > 64 {
            return Err(CommitHashError::TooLong);
        }

        if let Some(c) = trimmed.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(CommitHashError::InvalidChar(c));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(10)]
    }
}

impl FromStr for CommitHash {
    type Err = CommitHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_and_full_hashes() {
        assert!(CommitHash::new("abc123def456").is_ok());
        assert!(CommitHash::new(&"a".repeat(40)).is_ok());
        assert!(CommitHash::new(&"b".repeat(64)).is_ok());
    }

    #[test]
    fn trims_and_lowercases() {
        let hash = CommitHash::new("  ABC123DEF456\n").unwrap();
        assert_eq!(hash.as_str(), "abc123def456");
        assert_eq!(hash.short(), "abc123def4");
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(CommitHash::new("   "), Err(CommitHashError::Empty));
        assert_eq!(
            CommitHash::new(&"c".repeat(65)),
            Err(CommitHashError::TooLong)
        );
        assert_eq!(
            CommitHash::new("abc/../x"),
            Err(CommitHashError::InvalidChar('/'))
        );
    }
}
