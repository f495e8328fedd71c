//! Small state machines for line-oriented scanning.
//!
//! - [`TripleQuote`] tracks Python triple-quoted strings across lines.
//! - [`CallCollector`] joins a parenthesized call that spans several lines.
//! - [`find_closing`] finds the matching bracket in raw text.
//!
//! All of them skip over quoted text on a single line so that brackets inside
//! string literals do not count.

/// What a line turned out to be, as far as triple-quoted strings go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteEvent {
    /// Ordinary code; later rules should look at it.
    Code,
    /// The line belongs to a string (opening, inside or closing without
    /// usable content); later rules must skip it.
    Inside,
    /// The line completed a docstring with this content.
    Docstring(String),
}

/// Triple-quoted string state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TripleQuote {
    #[default]
    Closed,
    Open {
        delimiter: &'static str,
        /// Docstrings keep their text; strings opened mid-statement do not.
        capture: bool,
        parts: Vec<String>,
    },
}

impl TripleQuote {
    pub fn new() -> Self {
        Self::Closed
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TripleQuote::Open { .. })
    }

    /// Feed the next line and report how later rules should treat it.
    pub fn feed(&mut self, line: &str) -> QuoteEvent {
        let trimmed = line.trim();

        if let TripleQuote::Open {
            delimiter,
            capture,
            parts,
        } = self
        {
            let Some(end) = trimmed.find(*delimiter) else {
                if *capture {
                    parts.push(trimmed.to_string());
                }
                return QuoteEvent::Inside;
            };

            let event = if *capture {
                parts.push(trimmed[..end].to_string());
                join_parts(parts)
            } else {
                QuoteEvent::Inside
            };
            *self = TripleQuote::Closed;
            return event;
        }

        if let Some((delimiter, rest)) = docstring_start(trimmed) {
            if let Some(end) = rest.find(delimiter) {
                let content = rest[..end].trim();
                return if content.is_empty() {
                    QuoteEvent::Inside
                } else {
                    QuoteEvent::Docstring(content.to_string())
                };
            }
            *self = TripleQuote::Open {
                delimiter,
                capture: true,
                parts: vec![rest.to_string()],
            };
            return QuoteEvent::Inside;
        }

        if let Some(delimiter) = unbalanced_delimiter(trimmed) {
            *self = TripleQuote::Open {
                delimiter,
                capture: false,
                parts: Vec::new(),
            };
        }
        QuoteEvent::Code
    }
}

fn join_parts(parts: &[String]) -> QuoteEvent {
    let text = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        QuoteEvent::Inside
    } else {
        QuoteEvent::Docstring(text)
    }
}

/// A line that starts with a (possibly prefixed) triple quote.
fn docstring_start(trimmed: &str) -> Option<(&'static str, &str)> {
    let body = trimmed.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F'));
    // Prefixes are at most two characters (`rb`, `Rf`, ...).
    if trimmed.len() - body.len() > 2 {
        return None;
    }
    for delimiter in [r#"""""#, "'''"] {
        if let Some(rest) = body.strip_prefix(delimiter) {
            return Some((delimiter, rest));
        }
    }
    None
}

/// A triple quote that opens on this line and does not close on it.
fn unbalanced_delimiter(trimmed: &str) -> Option<&'static str> {
    if trimmed.starts_with('#') {
        return None;
    }
    [r#"""""#, "'''"]
        .into_iter()
        .find(|d| trimmed.matches(d).count() % 2 == 1)
}

/// Indentation width of a line; tabs count as four columns.
pub fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Accumulates lines of a call until its parentheses balance.
#[derive(Debug, Clone, Default)]
pub struct CallCollector {
    depth: i32,
    opened: bool,
    text: String,
}

impl CallCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line. Returns true once at least one `(` was seen and all
    /// opened parentheses are closed again.
    pub fn feed(&mut self, line: &str) -> bool {
        let piece = line.trim();
        if !self.text.is_empty() && !piece.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(piece);

        for ch in unquoted_chars(piece) {
            match ch {
                '(' => {
                    self.depth += 1;
                    self.opened = true;
                }
                ')' => self.depth -= 1,
                _ => {}
            }
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.opened && self.depth <= 0
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Collect `lines[start..]` until the parentheses opened on them balance.
///
/// Returns the joined text and the index of the last line consumed. Stops at
/// the end of input when the call never closes.
pub fn collect_call(lines: &[&str], start: usize) -> (String, usize) {
    let mut collector = CallCollector::new();
    let mut last = start;
    for (offset, line) in lines[start..].iter().enumerate() {
        last = start + offset;
        if collector.feed(line) {
            break;
        }
        // A first line without any parenthesis is a complete statement.
        if offset == 0 && !collector.opened {
            break;
        }
    }
    (collector.into_text(), last)
}

/// Byte index of the bracket closing the one at `open_idx`.
///
/// Works across newlines and ignores brackets inside single-line quoted
/// strings.
pub fn find_closing(text: &str, open_idx: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in text.get(open_idx..)?.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q || ch == '\n' {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open_idx + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Characters of a single line that are outside quoted strings.
fn unquoted_chars(line: &str) -> impl Iterator<Item = char> + '_ {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    line.chars().filter(move |&ch| {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            return false;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            return false;
        }
        if ch == '#' {
            // Rest of the line is a comment; treat it as quoted.
            quote = Some('\n');
            return false;
        }
        true
    })
}

/// Split on commas that are not nested inside brackets or quotes.
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut current = String::new();

    for ch in text.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    parts.push(current.trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_docstring() {
        let mut state = TripleQuote::new();
        assert_eq!(
            state.feed(r#"    """A widget store."""  "#),
            QuoteEvent::Docstring("A widget store.".to_string())
        );
        assert!(!state.is_open());
    }

    #[test]
    fn test_multiline_docstring() {
        let mut state = TripleQuote::new();
        assert_eq!(state.feed(r#"    """First line"#), QuoteEvent::Inside);
        assert!(state.is_open());
        assert_eq!(state.feed("       second line"), QuoteEvent::Inside);
        assert_eq!(state.feed(""), QuoteEvent::Inside);
        assert_eq!(
            state.feed(r#"    third."""#),
            QuoteEvent::Docstring("First line second line third.".to_string())
        );
        assert!(!state.is_open());
    }

    #[test]
    fn test_single_quote_style_and_empty_opening_line() {
        let mut state = TripleQuote::new();
        assert_eq!(state.feed("'''"), QuoteEvent::Inside);
        assert_eq!(state.feed("  Body text  "), QuoteEvent::Inside);
        assert_eq!(state.feed("'''"), QuoteEvent::Docstring("Body text".to_string()));
    }

    #[test]
    fn test_code_inside_docstring_is_skipped() {
        let mut state = TripleQuote::new();
        state.feed(r#"""""#);
        assert_eq!(state.feed("def not_a_function():"), QuoteEvent::Inside);
        assert_eq!(state.feed("class NotAClass:"), QuoteEvent::Inside);
    }

    #[test]
    fn test_assigned_string_is_not_a_docstring() {
        let mut state = TripleQuote::new();
        assert_eq!(state.feed(r#"QUERY = """"#), QuoteEvent::Code);
        assert!(state.is_open());
        assert_eq!(state.feed("SELECT * FROM users"), QuoteEvent::Inside);
        assert_eq!(state.feed(r#"""""#), QuoteEvent::Inside);
        assert!(!state.is_open());
        assert_eq!(state.feed(r#"x = """inline""""#), QuoteEvent::Code);
        assert!(!state.is_open());
    }

    #[test]
    fn test_prefixed_docstring() {
        let mut state = TripleQuote::new();
        assert_eq!(
            state.feed(r#"r"""Raw \d docs.""""#),
            QuoteEvent::Docstring(r"Raw \d docs.".to_string())
        );
    }

    #[test]
    fn test_call_collector_single_line() {
        let mut call = CallCollector::new();
        assert!(call.feed("id = Column(Integer, primary_key=True)"));
        assert_eq!(call.depth(), 0);
    }

    #[test]
    fn test_call_collector_nested_multiline() {
        let mut call = CallCollector::new();
        assert!(!call.feed("email = Column("));
        assert!(!call.feed("    String(120),"));
        assert_eq!(call.depth(), 1);
        assert!(!call.feed("    ForeignKey('users.id', ondelete='(cascade)'),"));
        assert!(call.feed(")"));
        assert_eq!(
            call.text(),
            "email = Column( String(120), ForeignKey('users.id', ondelete='(cascade)'), )"
        );
    }

    #[test]
    fn test_collect_call_advances_past_consumed_lines() {
        let lines = vec!["a = Column(", "  Integer,", "  nullable=False)", "b = 1"];
        let (text, last) = collect_call(&lines, 0);
        assert_eq!(last, 2);
        assert_eq!(text, "a = Column( Integer, nullable=False)");

        let (text, last) = collect_call(&lines, 3);
        assert_eq!(last, 3);
        assert_eq!(text, "b = 1");
    }

    #[test]
    fn test_collect_call_unbalanced_runs_to_end() {
        let lines = vec!["x = f(", "1,", "2"];
        let (_, last) = collect_call(&lines, 0);
        assert_eq!(last, 2);
    }

    #[test]
    fn test_find_closing() {
        let text = "Column(String(80), default=')')\nnext";
        assert_eq!(find_closing(text, 6, '(', ')'), Some(30));
        let body = "class A {\n  f() { return '}'; }\n}\n";
        let open = body.find('{').unwrap();
        assert_eq!(find_closing(body, open, '{', '}'), Some(body.len() - 2));
        assert_eq!(find_closing("f(a, b", 1, '(', ')'), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("self, items: Dict[str, int], limit=fn(1, 2), name='a,b'"),
            vec!["self", "items: Dict[str, int]", "limit=fn(1, 2)", "name='a,b'"]
        );
        assert!(split_top_level("  ").is_empty());
    }
}
