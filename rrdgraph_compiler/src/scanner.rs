//! Quote- and escape-aware word scanning over delimited element strings
//!
//! Element strings are colon separated, but legends may be quoted so that
//! they can carry the delimiter. `WordCursor` walks such a string one word at
//! a time without ever failing: exhausted input yields empty words.

/// Cursor over a delimited string
#[derive(Debug, Clone)]
pub struct WordCursor<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> WordCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// True once every byte has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Unconsumed remainder, without advancing
    pub fn remaining(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Byte offset of the cursor within the original input
    pub fn position(&self) -> usize {
        self.position
    }

    /// Return the next unquoted word and advance past `stop`
    ///
    /// A backslash-escaped delimiter stays in the word as written (`\:`), so
    /// it keeps its meaning in colon-delimited renderer syntax. A doubled
    /// backslash collapses to one.
    pub fn next_word(&mut self, stop: char) -> String {
        let rest = self.remaining();
        let mut word = String::new();
        let mut consumed = rest.len();
        let mut chars = rest.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if ch == '\\' {
                match chars.peek() {
                    Some(&(_, '\\')) => {
                        word.push('\\');
                        chars.next();
                    }
                    Some(&(_, next)) if next == stop => {
                        word.push('\\');
                        word.push(next);
                        chars.next();
                    }
                    _ => word.push('\\'),
                }
            } else if ch == stop {
                consumed = idx + ch.len_utf8();
                break;
            } else {
                word.push(ch);
            }
        }

        self.position += consumed;
        word
    }

    /// Return the next word, honouring a leading `"` or `'`
    ///
    /// Inside quotes the delimiter has no meaning and `\<quote>` / `\\` are
    /// unescaped. Anything between the closing quote and the next delimiter
    /// is discarded. Unquoted input falls back to [`WordCursor::next_word`].
    pub fn next_quoted_word(&mut self, stop: char) -> String {
        let rest = self.remaining();
        let quote = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return self.next_word(stop),
        };

        let body = &rest[quote.len_utf8()..];
        let mut word = String::new();
        let mut closing = body.len();
        let mut chars = body.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if ch == '\\' {
                if let Some(&(_, next)) = chars.peek() {
                    if next == quote || next == '\\' {
                        word.push(next);
                        chars.next();
                        continue;
                    }
                }
                word.push(ch);
            } else if ch == quote {
                closing = idx + ch.len_utf8();
                break;
            } else {
                word.push(ch);
            }
        }

        let trailing = &body[closing..];
        let discarded = match trailing.find(stop) {
            Some(idx) => idx + stop.len_utf8(),
            None => trailing.len(),
        };

        self.position += quote.len_utf8() + closing + discarded;
        word
    }

    /// Return and consume everything that is left
    pub fn rest(&mut self) -> &'a str {
        let rest = self.remaining();
        self.position = self.input.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_delimiter() {
        let mut cursor = WordCursor::new("LINE1:x#ff0000:legend:dashes");
        assert_eq!(cursor.next_word(':'), "LINE1");
        assert_eq!(cursor.next_word(':'), "x#ff0000");
        assert_eq!(cursor.next_quoted_word(':'), "legend");
        assert_eq!(cursor.rest(), "dashes");
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_exhausted_input_yields_empty_words() {
        let mut cursor = WordCursor::new("only");
        assert_eq!(cursor.next_word(':'), "only");
        assert_eq!(cursor.next_word(':'), "");
        assert_eq!(cursor.next_quoted_word(':'), "");
        assert_eq!(cursor.rest(), "");
    }

    #[test]
    fn test_quoted_word_keeps_delimiters() {
        let mut cursor = WordCursor::new("\"load: 5 min\":rest");
        assert_eq!(cursor.next_quoted_word(':'), "load: 5 min");
        assert_eq!(cursor.rest(), "rest");
    }

    #[test]
    fn test_quoted_word_unescapes_quote_and_backslash() {
        let mut cursor = WordCursor::new(r#"'it\'s a \\ \n test'"#);
        assert_eq!(cursor.next_quoted_word(':'), r"it's a \ \n test");
    }

    #[test]
    fn test_text_after_closing_quote_is_discarded() {
        let mut cursor = WordCursor::new("\"legend\"junk:next");
        assert_eq!(cursor.next_quoted_word(':'), "legend");
        assert_eq!(cursor.next_word(':'), "next");
    }

    #[test]
    fn test_unterminated_quote_takes_remainder() {
        let mut cursor = WordCursor::new("\"open ended:still inside");
        assert_eq!(cursor.next_quoted_word(':'), "open ended:still inside");
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_escaped_delimiter_survives_in_unquoted_word() {
        let mut cursor = WordCursor::new(r"at 10\:00:next");
        assert_eq!(cursor.next_word(':'), r"at 10\:00");
        assert_eq!(cursor.next_word(':'), "next");
    }

    #[test]
    fn test_double_backslash_collapses() {
        let mut cursor = WordCursor::new(r"a\\b:c");
        assert_eq!(cursor.next_word(':'), r"a\b");
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_multibyte_text() {
        let mut cursor = WordCursor::new("température:°C");
        assert_eq!(cursor.next_word(':'), "température");
        assert_eq!(cursor.remaining(), "°C");
    }
}
