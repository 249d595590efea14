//! Small text helpers used by listings.

/// Turn a product or category name into a URL slug.
///
/// Keeps ASCII letters, digits, whitespace, `_` and `-`; every run of
/// whitespace, `_` or `-` collapses into a single `-`.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_dash = true;
        }
    }

    slug
}

/// Cut `text` to at most `max_length` characters and append `...`.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let head: String = text.chars().take(max_length).collect();
    format!("{}...", head.trim())
}

/// Loose `local@domain.tld` check with no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(generate_slug("  Wireless Headphones Pro "), "wireless-headphones-pro");
    }

    #[test]
    fn test_slug_strips_punctuation_and_collapses() {
        assert_eq!(generate_slug("Men's  T-Shirt__(Blue)"), "mens-t-shirt-blue");
        assert_eq!(generate_slug("--edge--"), "edge");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("hello world again", 6), "hello...");
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("ana@shop.io"));
        assert!(!is_valid_email("ana@shop"));
        assert!(!is_valid_email("ana @shop.io"));
        assert!(!is_valid_email("@shop.io"));
        assert!(!is_valid_email("a@b@c.io"));
    }
}
