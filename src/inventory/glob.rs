//! Exclude-pattern glob matching
//!
//! `*` matches within a path segment, `**` crosses segments, `?` matches a
//! single non-slash character. Everything else is literal, including regex
//! metacharacters. Patterns are matched against `pathname + search`.

use regex::Regex;

/// Translate a glob pattern into an anchored regex.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');

    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'*' {
                    out.push_str(".*");
                    i += 2;
                } else {
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            b'?' => {
                out.push_str("[^/]");
                i += 1;
            }
            c => {
                let ch = c as char;
                if ".+()[]{}^$|\\".contains(ch) {
                    out.push('\\');
                }
                out.push(ch);
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Check whether a path matches a glob pattern.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    match Regex::new(&glob_to_regex(pattern)) {
        Ok(re) => re.is_match(path),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_stays_within_segment() {
        assert!(glob_match("/blog/*", "/blog/post"));
        assert!(!glob_match("/blog/*", "/blog/2026/post"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(glob_match("/blog/**", "/blog/2026/post"));
        assert!(glob_match("/admin/**", "/admin/"));
    }

    #[test]
    fn test_double_star_matches_empty() {
        assert!(glob_match("/drafts**", "/drafts"));
    }

    #[test]
    fn test_question_mark_single_char() {
        assert!(glob_match("/p?ge", "/page"));
        assert!(!glob_match("/p?ge", "/pge"));
        assert!(!glob_match("/p?ge", "/p/ge"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert!(glob_match("/a.b", "/a.b"));
        assert!(!glob_match("/a.b", "/aXb"));
        assert!(glob_match("/price(usd)", "/price(usd)"));
    }

    #[test]
    fn test_matches_query_string() {
        assert!(glob_match("/search**", "/search?q=hotels"));
        assert!(!glob_match("/search*", "/search/hotels"));
    }
}
