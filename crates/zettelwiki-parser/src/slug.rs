//! URL slugs for note titles.

/// Generate a URL slug from a title.
///
/// Lowercases, keeps letters, digits and `_`, turns whitespace and `-` runs
/// into a single `-`, and trims hyphens from both ends. Non-Latin letters
/// are kept so Japanese titles still produce usable slugs.
///
/// # Examples
///
/// ```
/// use zettelwiki_parser::slugify;
///
/// assert_eq!(slugify("Setup Guide"), "setup-guide");
/// assert_eq!(slugify("  What's new? (v2) "), "whats-new-v2");
/// assert_eq!(slugify("GitHub の使い方"), "github-の使い方");
/// assert_eq!(slugify("!!!"), "");
/// ```
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '_' {
                Some(c)
            } else if c.is_whitespace() || c == '-' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("--lead and trail--"), "lead-and-trail");
    }

    #[test]
    fn test_keeps_underscore_and_digits() {
        assert_eq!(slugify("snake_case 101"), "snake_case-101");
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }
}
