//! Salted credential hashing for registered accounts.
//!
//! Stored form is `<salt-hex>$<blake3(salt || password)-hex>`.  Guests carry
//! no credential at all, so this module is only touched by register/login.

use rand::RngCore;

const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest.as_bytes()))
}

/// Verify a password against a stored `salt$hash` credential.
///
/// Returns `false` for malformed stored values rather than erroring; a
/// corrupt credential should read as "wrong password", not a server fault.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    digest(&salt, password).as_bytes() == expected.as_slice()
}

fn digest(salt: &[u8], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn malformed_stored_value_is_rejected() {
        assert!(!verify_password("pw", "no-separator"));
        assert!(!verify_password("pw", "nothex$deadbeef"));
        assert!(!verify_password("pw", "deadbeef$nothex"));
    }
}
