use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use uuid::Uuid;

/// Generate a single-use invitation token. The token is only ever shown once, to the
/// admin who created the invite.
pub fn new_invite_token() -> String {
    let first = URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes());
    let second = URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes());
    format!("{first}{second}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_unique() {
        let a = new_invite_token();
        let b = new_invite_token();
        assert_ne!(a, b);
        // Two 16 byte UUIDs, each 22 characters unpadded.
        assert_eq!(a.len(), 44);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
