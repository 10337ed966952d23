use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::time::Duration;
use time::OffsetDateTime;

/// Length of every token plaintext: 16 random bytes, base32 without padding.
pub const TOKEN_LENGTH: usize = 26;

/// Namespace restricting which action a token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Activation,
    Authentication,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Activation => "activation",
            Scope::Authentication => "authentication",
        }
    }
}

/// A scoped, expiring bearer token. `plaintext` is disclosed to the client
/// exactly once; only the SHA-256 `hash` is ever persisted, so a leaked
/// token table yields no usable credentials.
#[derive(Debug, Clone)]
pub struct Token {
    pub plaintext: String,
    pub hash: Vec<u8>,
    pub user_id: i64,
    pub expiry: OffsetDateTime,
    pub scope: Scope,
}

impl Token {
    pub fn generate(user_id: i64, ttl: Duration, scope: Scope) -> Token {
        let mut random = [0u8; 16];
        OsRng.fill_bytes(&mut random);

        let plaintext = base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &random);
        let hash = Self::hash_plaintext(&plaintext);

        Token {
            plaintext,
            hash,
            user_id,
            expiry: OffsetDateTime::now_utc() + ttl,
            scope,
        }
    }

    /// Recompute the persisted digest for a presented plaintext.
    pub fn hash_plaintext(plaintext: &str) -> Vec<u8> {
        Sha256::digest(plaintext.as_bytes()).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_is_26_chars() {
        let token = Token::generate(1, Duration::from_secs(60), Scope::Activation);
        assert_eq!(token.plaintext.len(), TOKEN_LENGTH);
        assert!(token
            .plaintext
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn hash_matches_plaintext_digest() {
        let token = Token::generate(1, Duration::from_secs(60), Scope::Authentication);
        assert_eq!(token.hash, Token::hash_plaintext(&token.plaintext));
        assert_eq!(token.hash.len(), 32);
    }

    #[test]
    fn tokens_are_unique() {
        let a = Token::generate(1, Duration::from_secs(60), Scope::Activation);
        let b = Token::generate(1, Duration::from_secs(60), Scope::Activation);
        assert_ne!(a.plaintext, b.plaintext);
    }

    #[test]
    fn expiry_matches_ttl() {
        let token = Token::generate(1, Duration::from_secs(3600), Scope::Authentication);
        let expected = OffsetDateTime::now_utc() + Duration::from_secs(3600);
        assert!((token.expiry - expected).whole_seconds().abs() < 5);
    }
}
