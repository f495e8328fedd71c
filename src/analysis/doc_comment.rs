//! Documentation comment cleanup for `/** ... */` blocks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOC_BLOCK_RE: Regex = Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap();
}

/// Find the doc block closest to the end of `leading` and return its text.
///
/// `leading` is the raw text between the previous sibling and the
/// declaration, so the last block in it is the one attached to the
/// declaration.
pub fn nearest_doc_block(leading: &str) -> Option<String> {
    let body = DOC_BLOCK_RE
        .captures_iter(leading)
        .last()
        .and_then(|caps| caps.get(1))?;
    clean_doc_block(body.as_str())
}

/// Strip leading `*`, drop `@tag` lines and blank lines, join with spaces.
pub fn clean_doc_block(body: &str) -> Option<String> {
    let text = body
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty() && !line.starts_with('@'))
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_block() {
        let leading = r#"
/**
 * Fetch a user by id.
 * Falls back to the cache.
 *
 * @param id the user id
 * @returns the user
 */
"#;
        assert_eq!(
            nearest_doc_block(leading).as_deref(),
            Some("Fetch a user by id. Falls back to the cache.")
        );
    }

    #[test]
    fn test_single_line_block() {
        assert_eq!(nearest_doc_block("/** Adds two numbers. */\n").as_deref(), Some("Adds two numbers."));
    }

    #[test]
    fn test_nearest_block_wins() {
        let leading = "/** License header */\n\n/** Real description */\n";
        assert_eq!(nearest_doc_block(leading).as_deref(), Some("Real description"));
    }

    #[test]
    fn test_plain_comments_ignored() {
        assert_eq!(nearest_doc_block("/* not a doc */\n// nor this\n"), None);
    }

    #[test]
    fn test_only_tags() {
        assert_eq!(nearest_doc_block("/**\n * @deprecated\n */"), None);
    }
}
