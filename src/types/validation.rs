use once_cell::sync::Lazy;
use regex::Regex;

const SLUG_MAX: usize = 50;
#[allow(clippy::expect_used)]
static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("compile slug regex"));

const USERNAME_MAX: usize = 30;
#[allow(clippy::expect_used)]
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9\.\-_]*[A-Za-z0-9]$").expect("compile username regex")
});

pub const DESCRIPTION_MAX: usize = 200;

/// Group slugs end up in URLs, so they are kept to the usual
/// lowercase-hyphenated shape.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug) && slug.len() <= SLUG_MAX
}

pub fn is_valid_description(description: &str) -> bool {
    let trimmed = description.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= DESCRIPTION_MAX
}

pub fn is_valid_username(name: &str) -> bool {
    USERNAME_REGEX.is_match(name) && name.len() <= USERNAME_MAX
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{is_valid_description, is_valid_slug, is_valid_username};

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("rust"));
        assert!(is_valid_slug("rust-news"));
        assert!(is_valid_slug("2024-roundup"));

        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Rust"));
        assert!(!is_valid_slug("rust news"));
        assert!(!is_valid_slug("rust--news"));
        assert!(!is_valid_slug("-rust"));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("memothelemo"));
        assert!(is_valid_username("mark.robes"));
        assert!(is_valid_username("salmon-ella"));
        assert!(is_valid_username("crossword_puzzle"));
        assert!(is_valid_username("2pac"));
        assert!(is_valid_username("_apple"));

        assert!(!is_valid_username("overlover_underscore_"));
        assert!(!is_valid_username("pretty ugly"));
    }

    #[test]
    fn test_is_valid_description() {
        assert!(is_valid_description("Everything about crosswords"));
        assert!(is_valid_description(&"a".repeat(200)));

        assert!(!is_valid_description(""));
        assert!(!is_valid_description("   "));
        assert!(!is_valid_description(&"a".repeat(201)));
    }
}
