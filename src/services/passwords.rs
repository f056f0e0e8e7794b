use crate::errors::AppError;

/// Work factor for stored password hashes.
pub const HASH_COST: u32 = 10;

pub const MIN_PASSWORD_LEN: usize = 5;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// Accounts created through Facebook have no local password and never match.
pub fn verify_password(password: &str, stored: Option<&str>) -> Result<bool, AppError> {
    match stored {
        Some(hash) if !hash.is_empty() => Ok(bcrypt::verify(password, hash)?),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", Some(&hash)).unwrap());
        assert!(!verify_password("secret2", Some(&hash)).unwrap());
    }

    #[test]
    fn missing_hash_never_matches() {
        assert!(!verify_password("anything", None).unwrap());
        assert!(!verify_password("anything", Some("")).unwrap());
    }
}
