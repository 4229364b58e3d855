//! SQL identifier checks.
//!
//! Table and column names are interpolated into statement text unquoted, so
//! they are restricted to plain lower-risk identifiers.

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]{0,62}$";

/// Whether `name` can be used unquoted as a table or column name.
pub fn is_valid_identifier(name: &str) -> bool {
    crate::validate::matches_pattern(name, IDENTIFIER_PATTERN)
}

/// Convert a CamelCase model name to snake_case.
///
/// A run of capitals is kept together as one word, ending before the capital
/// that starts the next word: `HTTPLog` becomes `http_log`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p));
            let next = chars.get(i + 1);
            let after_word = prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            let ends_acronym = prev.is_some_and(char::is_ascii_uppercase)
                && next.is_some_and(char::is_ascii_lowercase);
            if after_word || ends_acronym {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("heroes"));
        assert!(is_valid_identifier("_date_created2"));
        assert!(!is_valid_identifier("2heroes"));
        assert!(!is_valid_identifier("name; DROP TABLE heroes"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("Hero"), "hero");
        assert_eq!(to_snake_case("BlogPost"), "blog_post");
        assert_eq!(to_snake_case("HTTPLog"), "http_log");
        assert_eq!(to_snake_case("LogHTTP"), "log_http");
        assert_eq!(to_snake_case("IDCard2Go"), "id_card2_go");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }
}
