use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Checked in place of a stored hash when a login names an unknown user.
    static ref DUMMY_DIGEST: Option<PasswordDigest> =
        PasswordDigest::from_plaintext("recipebox-unknown-user").ok();
}

/// Salted Argon2 hash of a password, in PHC string form.
///
/// Write-only: built from a plaintext or loaded from the store, then only
/// ever checked against a candidate plaintext. The default (empty) digest
/// verifies nothing.
#[derive(Clone, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn from_plaintext(plain: &str) -> anyhow::Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(Self(hash))
    }

    /// Returns true when `plain` hashes to this digest. A malformed stored
    /// hash never verifies.
    pub fn verify(&self, plain: &str) -> bool {
        let parsed = match PasswordHash::new(&self.0) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "argon2 parse hash error");
                return false;
            }
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Spend the same work as a real check, then fail.
pub fn verify_unknown_user(plain: &str) -> bool {
    if let Some(dummy) = DUMMY_DIGEST.as_ref() {
        let _ = dummy.verify(plain);
    }
    false
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

#[cfg(test)]
impl PasswordDigest {
    pub(crate) fn from_raw(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
