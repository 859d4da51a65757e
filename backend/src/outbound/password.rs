//! Argon2id password encoder.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so each hash carries its own salt and cost parameters. Verification reads
//! the parameters back from the stored string, which keeps old hashes valid
//! after the configured cost changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::PasswordHash;
use crate::domain::ports::{GatewayError, PasswordEncoder};

#[derive(Clone, Default)]
pub struct Argon2PasswordEncoder {
    argon2: Argon2<'static>,
}

impl Argon2PasswordEncoder {
    /// Encoder using the recommended Argon2id cost.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder with explicit memory (KiB), iteration and lane costs.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, password: &str) -> Result<PasswordHash, GatewayError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordHash::new(hash.to_string()))
            .map_err(|error| GatewayError::encoding(error.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let Ok(parsed) = PhcString::new(hash.as_ref()) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn encoder() -> Argon2PasswordEncoder {
        Argon2PasswordEncoder::with_cost(Params::MIN_M_COST, 1, 1).expect("minimal cost is valid")
    }

    #[rstest]
    fn encoded_hash_verifies_only_the_original(encoder: Argon2PasswordEncoder) {
        let hash = encoder.encode("correct horse").expect("hash");
        assert!(encoder.verify("correct horse", &hash));
        assert!(!encoder.verify("correct horsE", &hash));
    }

    #[rstest]
    fn hashes_are_salted_phc_strings(encoder: Argon2PasswordEncoder) {
        let first = encoder.encode("pw").expect("hash");
        let second = encoder.encode("pw").expect("hash");
        assert_ne!(first, second);
        assert!(first.as_ref().starts_with("$argon2id$v=19$m=8,t=1,p=1$"));
    }

    #[rstest]
    fn hashes_survive_cost_changes(encoder: Argon2PasswordEncoder) {
        let hash = encoder.encode("pw").expect("hash");
        let stronger = Argon2PasswordEncoder::with_cost(64, 2, 1).expect("valid cost");
        assert!(stronger.verify("pw", &hash));
    }

    #[rstest]
    #[case("")]
    #[case("plain$pw")]
    #[case("$argon2id$v=19$m=8,t=1,p=1$not-base64!$AAAA")]
    #[case("sha256$3$00$00")]
    fn malformed_hashes_never_verify(encoder: Argon2PasswordEncoder, #[case] encoded: &str) {
        assert!(!encoder.verify("pw", &PasswordHash::new(encoded)));
    }

    #[rstest]
    fn invalid_cost_is_rejected() {
        assert!(Argon2PasswordEncoder::with_cost(0, 0, 0).is_err());
    }
}
