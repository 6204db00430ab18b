//! Salted, adaptive-cost password hashing (Argon2id, PHC string format).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("invalid hasher parameters: {0}")]
    InvalidParams(String),
}

/// Argon2 work factor. Raising either cost makes every hash proportionally
/// more expensive to compute (and to brute-force).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HasherParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way credential hasher.
///
/// `verify` reads the cost parameters embedded in the stored hash, so hashes
/// produced under an older work factor keep verifying after it is raised.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(params: HasherParams) -> Result<Self, PasswordError> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<Vec<u8>, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string().into_bytes())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    pub fn verify(&self, hash: &[u8], plaintext: &str) -> Result<bool, PasswordError> {
        let encoded =
            std::str::from_utf8(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        let parsed =
            PasswordHash::new(encoded).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cheap_hasher() -> CredentialHasher {
        CredentialHasher::new(HasherParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_then_verify_matches() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("correct horse battery staple").unwrap();

        assert!(hash.starts_with(b"$argon2id$"));
        assert!(hasher.verify(&hash, "correct horse battery staple").unwrap());
    }

    #[test]
    fn wrong_password_is_mismatch_not_error() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("secret").unwrap();

        assert_eq!(hasher.verify(&hash, "Secret"), Ok(false));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();
        let a = hasher.hash("secret").unwrap();
        let b = hasher.hash("secret").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify(&a, "secret").unwrap());
        assert!(hasher.verify(&b, "secret").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hasher = cheap_hasher();

        assert!(matches!(
            hasher.verify(b"not-a-phc-string", "secret"),
            Err(PasswordError::MalformedHash(_))
        ));
        assert!(matches!(
            hasher.verify(&[0xff, 0xfe, 0x00], "secret"),
            Err(PasswordError::MalformedHash(_))
        ));
    }

    #[test]
    fn verify_uses_cost_embedded_in_hash() {
        let old = cheap_hasher();
        let hash = old.hash("secret").unwrap();

        let stronger = CredentialHasher::new(HasherParams {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        assert!(stronger.verify(&hash, "secret").unwrap());
    }

    #[test]
    fn invalid_params_rejected() {
        let err = CredentialHasher::new(HasherParams {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap_err();

        assert!(matches!(err, PasswordError::InvalidParams(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        #[test]
        fn verify_accepts_only_the_hashed_password(
            p1 in "\\PC{1,32}",
            p2 in "\\PC{1,32}",
        ) {
            let hasher = cheap_hasher();
            let hash = hasher.hash(&p1).unwrap();

            prop_assert!(hasher.verify(&hash, &p1).unwrap());
            if p1 != p2 {
                prop_assert!(!hasher.verify(&hash, &p2).unwrap());
            }
        }
    }
}
