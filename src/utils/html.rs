use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization: safe tags (like <b>, <p>) are preserved
/// while dangerous tags (<script>, <iframe>) and malicious attributes
/// (onclick) are stripped.
///
/// Applied to free-text input that is later rendered back to other users:
/// feedback messages, admin responses and manual descriptions. Fail-safe
/// against stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_html("<p>ok</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>ok</p>");
    }
}
