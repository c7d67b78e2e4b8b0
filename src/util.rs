pub fn mask_secret(s: &str, left: usize, right: usize) -> String {
    if s.len() <= left + right {
        return "*".repeat(s.len());
    }
    format!(
        "{}{}{}",
        &s[..left],
        "*".repeat(s.len() - left - right),
        &s[s.len() - right..]
    )
}

pub fn is_valid_email(email: &str) -> bool {
    // Simple shape check; providers do the real validation
    let re = regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    re.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("supersecret", 2, 2), "su*******et");
        assert_eq!(mask_secret("ab", 2, 2), "**");
        assert_eq!(mask_secret("", 2, 2), "");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
