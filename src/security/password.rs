use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const SCHEME: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Salted PBKDF2-HMAC-SHA256 password hashing
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash with a fresh random salt.
    /// Output: `pbkdf2_sha256$<iterations>$<salt hex>$<key hex>`
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);

        let key = derive_key(password, &salt, self.iterations);

        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        )
    }
}

/// Check `password` against a stored hash, using the parameters recorded in it.
/// Malformed hashes never verify.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 4 || parts[0] != SCHEME {
        return false;
    }

    let iterations = match parts[1].parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return false,
    };

    let (salt, expected) = match (hex::decode(parts[2]), hex::decode(parts[3])) {
        (Ok(salt), Ok(expected)) if expected.len() == KEY_LEN => (salt, expected),
        _ => return false,
    };

    let key = derive_key(password, &salt, iterations);
    constant_time_eq(&key, &expected)
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Compare in constant time so timing does not leak how many bytes matched
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}
