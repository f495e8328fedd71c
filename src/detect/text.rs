//! Raw-text helpers shared by route and schema rules.

/// 1-indexed line of a byte offset.
pub fn line_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    1 + text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
}

/// Byte offset where 1-indexed `line` starts, or the text length when the
/// line is past the end.
pub fn line_offset(text: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    text.match_indices('\n')
        .nth(line - 2)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(text.len())
}

/// True when any marker occurs anywhere in the text.
pub fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

/// Strip one layer of matching quotes.
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    for q in ['"', '\'', '`'] {
        if let Some(inner) = value.strip_prefix(q).and_then(|v| v.strip_suffix(q)) {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_at() {
        let text = "a\nbb\nccc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 5), 3);
        assert_eq!(line_at(text, 100), 3);
    }

    #[test]
    fn test_line_offset() {
        let text = "a\nbb\nccc";
        assert_eq!(line_offset(text, 1), 0);
        assert_eq!(line_offset(text, 2), 2);
        assert_eq!(line_offset(text, 3), 5);
        assert_eq!(line_offset(text, 9), text.len());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'users.id'"), "users.id");
        assert_eq!(unquote(" \"User\" "), "User");
        assert_eq!(unquote("User"), "User");
        assert_eq!(unquote("'"), "'");
    }
}
