//! Admin token check for the seed operation.

/// Fallback token accepted alongside `ADMIN_API_KEY`.
pub const LEGACY_ADMIN_KEY: &str = "pokemon-dashboard-secret-2024";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminKeys {
    keys: Vec<String>,
}

impl AdminKeys {
    /// The configured key (if any) plus the legacy fallback.
    pub fn new(configured: Option<String>) -> Self {
        let mut keys = Vec::with_capacity(2);
        if let Some(key) = configured.filter(|k| !k.is_empty()) {
            keys.push(key);
        }
        keys.push(LEGACY_ADMIN_KEY.to_string());
        Self { keys }
    }

    /// Compares against every key without short-circuiting.
    pub fn verify(&self, token: &str) -> bool {
        self.keys
            .iter()
            .fold(false, |ok, key| constant_time_eq(key.as_bytes(), token.as_bytes()) | ok)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_configured_and_legacy() {
        let keys = AdminKeys::new(Some("s3cret".to_string()));
        assert!(keys.verify("s3cret"));
        assert!(keys.verify(LEGACY_ADMIN_KEY));
        assert!(!keys.verify("s3cre"));
        assert!(!keys.verify(""));
    }

    #[test]
    fn legacy_only_when_unset() {
        let keys = AdminKeys::new(None);
        assert!(keys.verify(LEGACY_ADMIN_KEY));
        assert!(!keys.verify("anything"));
    }

    #[test]
    fn empty_configured_key_is_ignored() {
        let keys = AdminKeys::new(Some(String::new()));
        assert!(!keys.verify(""));
    }

    #[test]
    fn constant_time_eq_lengths() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
