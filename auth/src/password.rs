use crate::error::Error;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub fn new_hash(password: &str) -> Result<String, Error> {
    hash_password(password)
}

fn hash_password(password: &str) -> Result<String, Error> {
    let saltstring = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &saltstring)
        .map_err(|e| Error::PasswordHasherError(e.to_string()))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash_str: &str) -> Result<(), Error> {
    let hash =
        PasswordHash::new(hash_str).map_err(|e| Error::PasswordHasherError(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .map_err(|_| Error::InvalidPassword)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::Result;

    const KNOWN_HASH: &str = "$argon2id$v=19$m=15360,t=2,p=1$PUpyHXvHTSOKvr9Sc6vK8g$GSyd7TMMKrS7bkObHL3+aOtRmULRJTNP1xLP4C/3zzY";

    #[test]
    fn verifies_known_hash() -> Result<()> {
        verify_password("test password", KNOWN_HASH)?;
        assert_matches!(
            verify_password("wrong password", KNOWN_HASH),
            Err(Error::InvalidPassword)
        );
        Ok(())
    }

    #[test]
    fn malformed_hash() {
        assert_matches!(
            verify_password("abc", "not a hash"),
            Err(Error::PasswordHasherError(_))
        );
    }

    #[cfg(any(feature = "test_slow", feature = "test_password"))]
    #[test]
    fn good_password() -> Result<()> {
        let hash = new_hash("abcdef")?;
        verify_password("abcdef", &hash)
    }

    #[cfg(any(feature = "test_slow", feature = "test_password"))]
    #[test]
    fn bad_password() -> Result<()> {
        let hash = new_hash("abcdef")?;
        verify_password("abcdefg", &hash).expect_err("non-matching password");
        Ok(())
    }

    #[cfg(any(feature = "test_slow", feature = "test_password"))]
    #[test]
    fn unique_password_salt() {
        let p1 = new_hash("abc").unwrap();
        let p2 = new_hash("abc").unwrap();
        assert_ne!(p1, p2);
    }
}
